//! Field configuration types
//!
//! This module defines how one output field is derived from a raw HubSpot
//! object. Configs are normally built in code (see `registry`), but they can
//! also be loaded from JSON documents, in which case the shape of each value
//! decides its variant:
//!
//! - a list of lists is a fallback list of paths
//! - any other list is a single path
//! - an object with `paths` is a transform config (`transform`, `then` optional)
//! - anything else is a literal value

use super::path_extractor::{Path, PathSegment};
use super::transform::Transform;
use crate::error::{IntegrationError, Result};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Function of the whole source object
pub type ConstantFn = fn(&Value) -> Value;

/// Output field name -> how to compute it
pub type FieldMapping = HashMap<String, FieldConfig>;

/// Descriptor for producing one output field
#[derive(Clone)]
pub enum FieldConfig {
    /// Computed from the whole source object, ignoring paths
    Constant(ConstantFn),
    /// Value at one path
    SinglePath(Path),
    /// First path that resolves wins
    Fallback(Vec<Path>),
    /// Paths gathered, transformed and optionally chained
    Transformed(TransformConfig),
    /// The value itself
    Literal(Value),
}

/// One position in a transform config's `paths` list
#[derive(Debug, Clone)]
pub enum PathSlot {
    Path(Path),
    /// Contributes an absent value at this position
    Null,
    /// Contributes this value directly; used when a chain feeds a result forward
    Literal(Value),
}

/// The `paths` entry of a transform config
#[derive(Debug, Clone)]
pub enum PathSpec {
    /// Values gathered positionally and handed to the transform as a list
    Slots(Vec<PathSlot>),
    /// One path whose value is handed to the transform directly
    Single(Path),
}

/// Paths + transform, optionally chained into a further transform config
#[derive(Debug, Clone)]
pub struct TransformConfig {
    pub paths: PathSpec,
    pub transform: Option<Transform>,
    pub then: Option<Box<TransformConfig>>,
}

impl TransformConfig {
    /// Gather the given paths positionally
    pub fn gather(paths: Vec<Path>) -> Self {
        Self {
            paths: PathSpec::Slots(paths.into_iter().map(PathSlot::Path).collect()),
            transform: None,
            then: None,
        }
    }

    /// Use explicit slots (paths, nulls, literals)
    pub fn slots(slots: Vec<PathSlot>) -> Self {
        Self {
            paths: PathSpec::Slots(slots),
            transform: None,
            then: None,
        }
    }

    /// Resolve a single path
    pub fn single(path: Path) -> Self {
        Self {
            paths: PathSpec::Single(path),
            transform: None,
            then: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn then(mut self, next: TransformConfig) -> Self {
        self.then = Some(Box::new(next));
        self
    }

    /// Copy of this config with its first path slot replaced by `value`.
    ///
    /// An empty slot list gets `value` as its only slot. For a single-path
    /// config `value` becomes the first segment of the path and the remaining
    /// segments are kept, so a string result keys into the source object.
    pub fn with_leading_literal(&self, value: Value) -> TransformConfig {
        let paths = match &self.paths {
            PathSpec::Slots(slots) => {
                let mut slots = slots.clone();
                match slots.first_mut() {
                    Some(first) => *first = PathSlot::Literal(value),
                    None => slots.push(PathSlot::Literal(value)),
                }
                PathSpec::Slots(slots)
            }
            PathSpec::Single(path) => {
                let mut segments = path.segments().to_vec();
                let head = PathSegment::from_value(&value);
                match segments.first_mut() {
                    Some(first) => *first = head,
                    None => segments.push(head),
                }
                PathSpec::Single(Path::new(segments))
            }
        };

        TransformConfig {
            paths,
            transform: self.transform.clone(),
            then: self.then.clone(),
        }
    }

    /// Parse an object of the form `{"paths": ..., "transform": ..., "then": ...}`
    pub fn from_object(obj: &Map<String, Value>) -> Result<Self> {
        let paths_value = obj
            .get("paths")
            .ok_or_else(|| IntegrationError::InvalidMapping("missing 'paths'".to_string()))?;

        let paths = match paths_value {
            Value::Array(entries) if entries.iter().all(|e| e.is_array() || e.is_null()) => {
                PathSpec::Slots(
                    entries
                        .iter()
                        .map(|entry| match Path::from_value(entry) {
                            Some(path) => PathSlot::Path(path),
                            None => PathSlot::Null,
                        })
                        .collect(),
                )
            }
            Value::Array(_) => PathSpec::Single(Path::from_value(paths_value).unwrap_or_default()),
            other => PathSpec::Single(Path::new(vec![PathSegment::from_value(other)])),
        };

        let transform = match obj.get("transform") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(Transform::parse(name)),
            Some(other) => {
                return Err(IntegrationError::InvalidMapping(format!(
                    "transform must be a string, got {}",
                    other
                )))
            }
        };

        let then = match obj.get("then") {
            None | Some(Value::Null) => None,
            Some(Value::Object(next)) => Some(Box::new(TransformConfig::from_object(next)?)),
            Some(other) => {
                return Err(IntegrationError::InvalidMapping(format!(
                    "'then' must be an object with 'paths', got {}",
                    other
                )))
            }
        };

        Ok(Self {
            paths,
            transform,
            then,
        })
    }
}

impl FieldConfig {
    /// Shorthand for a single-path config
    pub fn path<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        FieldConfig::SinglePath(super::path_extractor::path(segments))
    }

    /// Classify a JSON value as a field config
    ///
    /// # Arguments
    /// * `value` - A field config as written in a mappings document
    ///
    /// # Returns
    /// The config variant chosen by the value's shape, or `InvalidMapping`
    /// for a malformed transform config
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Array(entries) if entries.iter().all(Value::is_array) => Ok(
                FieldConfig::Fallback(entries.iter().filter_map(Path::from_value).collect()),
            ),
            Value::Array(_) => Ok(FieldConfig::SinglePath(
                Path::from_value(value).unwrap_or_default(),
            )),
            Value::Object(obj) if obj.contains_key("paths") => {
                TransformConfig::from_object(obj).map(FieldConfig::Transformed)
            }
            other => Ok(FieldConfig::Literal(other.clone())),
        }
    }
}

impl fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldConfig::Constant(_) => write!(f, "Constant(<fn>)"),
            FieldConfig::SinglePath(p) => f.debug_tuple("SinglePath").field(p).finish(),
            FieldConfig::Fallback(paths) => f.debug_tuple("Fallback").field(paths).finish(),
            FieldConfig::Transformed(tc) => f.debug_tuple("Transformed").field(tc).finish(),
            FieldConfig::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
        }
    }
}

impl<'de> Deserialize<'de> for FieldConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FieldConfig::from_value(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::path_extractor::path;
    use serde_json::json;

    #[test]
    fn test_list_of_lists_is_fallback() {
        let config = FieldConfig::from_value(&json!([["createdAt"], ["properties", "createdate"]]))
            .unwrap();
        match config {
            FieldConfig::Fallback(paths) => {
                assert_eq!(paths, vec![path(["createdAt"]), path(["properties", "createdate"])]);
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_flat_list_is_single_path() {
        let config = FieldConfig::from_value(&json!(["properties", "name"])).unwrap();
        assert!(matches!(config, FieldConfig::SinglePath(p) if p == path(["properties", "name"])));
    }

    #[test]
    fn test_object_with_paths_is_transform_config() {
        let config = FieldConfig::from_value(&json!({
            "paths": [["properties", "firstname"], null],
            "transform": "join_names"
        }))
        .unwrap();

        let FieldConfig::Transformed(tc) = config else {
            panic!("expected transform config");
        };
        assert!(matches!(tc.transform, Some(Transform::JoinNames)));
        let PathSpec::Slots(slots) = &tc.paths else {
            panic!("expected slots");
        };
        assert_eq!(slots.len(), 2);
        assert!(matches!(&slots[0], PathSlot::Path(p) if *p == path(["properties", "firstname"])));
        assert!(matches!(slots[1], PathSlot::Null));
        assert!(tc.then.is_none());
    }

    #[test]
    fn test_paths_single_path_variant() {
        let config = FieldConfig::from_value(&json!({
            "paths": ["properties", "domain"],
            "transform": "url_domain"
        }))
        .unwrap();

        let FieldConfig::Transformed(tc) = config else {
            panic!("expected transform config");
        };
        assert!(matches!(tc.paths, PathSpec::Single(ref p) if *p == path(["properties", "domain"])));
    }

    #[test]
    fn test_then_chain_is_parsed() {
        let config = FieldConfig::from_value(&json!({
            "paths": [["a"]],
            "transform": "url_domain",
            "then": {"paths": [null, ["b"]], "transform": "join_names"}
        }))
        .unwrap();

        let FieldConfig::Transformed(tc) = config else {
            panic!("expected transform config");
        };
        let next = tc.then.expect("chained config");
        assert!(matches!(next.transform, Some(Transform::JoinNames)));
    }

    #[test]
    fn test_invalid_then_is_rejected() {
        let err = FieldConfig::from_value(&json!({"paths": [["a"]], "then": ["b"]})).unwrap_err();
        assert!(matches!(err, IntegrationError::InvalidMapping(_)));
    }

    #[test]
    fn test_anything_else_is_literal() {
        for value in [json!("Contact"), json!(false), json!(3), json!({"no_paths": 1})] {
            let config = FieldConfig::from_value(&value).unwrap();
            assert!(matches!(config, FieldConfig::Literal(ref v) if *v == value));
        }
    }

    #[test]
    fn test_with_leading_literal_copies() {
        let config = TransformConfig::gather(vec![path(["a"]), path(["b"])]);
        let spliced = config.with_leading_literal(json!("x"));

        let PathSpec::Slots(slots) = &spliced.paths else {
            panic!("expected slots");
        };
        assert!(matches!(&slots[0], PathSlot::Literal(v) if *v == json!("x")));
        assert!(matches!(&slots[1], PathSlot::Path(p) if *p == path(["b"])));

        // the source config is untouched
        let PathSpec::Slots(original) = &config.paths else {
            panic!("expected slots");
        };
        assert!(matches!(&original[0], PathSlot::Path(p) if *p == path(["a"])));
    }

    #[test]
    fn test_with_leading_literal_on_single_path_keeps_tail() {
        let config = TransformConfig::single(path(["a", "b"]));
        let spliced = config.with_leading_literal(json!("properties"));
        assert!(matches!(&spliced.paths, PathSpec::Single(p) if *p == path(["properties", "b"])));
        assert!(matches!(&config.paths, PathSpec::Single(p) if *p == path(["a", "b"])));

        let indexed = TransformConfig::single(path(["a"])).with_leading_literal(json!(2));
        assert!(matches!(&indexed.paths, PathSpec::Single(p) if p.segments() == [PathSegment::Index(2)]));

        let empty = TransformConfig::single(Path::root()).with_leading_literal(json!("x"));
        assert!(matches!(&empty.paths, PathSpec::Single(p) if *p == path(["x"])));
    }

    #[test]
    fn test_deserialize_field_mapping() {
        let mapping: FieldMapping = serde_json::from_str(
            r#"{
                "id": ["id"],
                "type": "Ticket",
                "name": {"paths": [["properties", "subject"]]}
            }"#,
        )
        .unwrap();

        assert_eq!(mapping.len(), 3);
        assert!(matches!(mapping["type"], FieldConfig::Literal(_)));
        assert!(matches!(mapping["name"], FieldConfig::Transformed(_)));
    }
}
