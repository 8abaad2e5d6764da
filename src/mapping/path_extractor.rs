//! Path-based value extraction from JSON
//!
//! A [`Path`] is an ordered list of segments: string keys step into objects,
//! non-negative integers step into arrays. Resolution is a pure walk that
//! consumes one segment per step and yields `None` as soon as a segment does
//! not match the data it is applied to.

use serde_json::Value;
use std::fmt;

/// One step of a [`Path`]
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Object field access
    Key(String),
    /// Array element access
    Index(usize),
    /// A segment loaded from configuration that is neither a key nor an index
    /// (nested array, object, bool, negative number...). Never resolves.
    Malformed(Value),
}

impl PathSegment {
    /// Classify a JSON value as a path segment
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(key) => PathSegment::Key(key.clone()),
            Value::Number(n) => n
                .as_u64()
                .and_then(|i| usize::try_from(i).ok())
                .map(PathSegment::Index)
                .unwrap_or_else(|| PathSegment::Malformed(value.clone())),
            other => PathSegment::Malformed(other.clone()),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Ordered sequence of keys/indices locating one value in nested JSON
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path(Vec<PathSegment>);

impl Path {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// The empty path, which resolves to the data itself
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build a path from a JSON array. Returns `None` for anything that is not
    /// an array; individual elements are classified by [`PathSegment::from_value`].
    pub fn from_value(value: &Value) -> Option<Self> {
        value
            .as_array()
            .map(|items| Self(items.iter().map(PathSegment::from_value).collect()))
    }
}

/// Build a [`Path`] from anything that converts into segments
///
/// ```
/// use hubspot_bridge::mapping::path_extractor::path;
/// let p = path(["properties", "email"]);
/// assert_eq!(p.to_string(), "properties.email");
/// ```
pub fn path<I, S>(segments: I) -> Path
where
    I: IntoIterator<Item = S>,
    S: Into<PathSegment>,
{
    Path(segments.into_iter().map(Into::into).collect())
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
                PathSegment::Malformed(v) => write!(f, "<{}>", v)?,
            }
        }
        Ok(())
    }
}

/// Resolve a path against JSON data.
///
/// # Arguments
/// * `data` - The JSON value to walk
/// * `path` - Keys and indices to follow (e.g. `["properties", "email"]`)
///
/// # Returns
/// The value at the path, or `None` if any segment is missing, malformed or
/// type-mismatched. JSON `null` is treated as absent, both as input and as
/// the resolved leaf. An empty path returns the data itself.
pub fn resolve<'a>(data: &'a Value, path: &Path) -> Option<&'a Value> {
    resolve_segments(data, path.segments())
}

fn resolve_segments<'a>(data: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    if data.is_null() {
        return None;
    }

    let Some((head, rest)) = segments.split_first() else {
        return Some(data);
    };

    let next = match (data, head) {
        (_, PathSegment::Malformed(_)) => return None,
        (Value::Object(map), PathSegment::Key(key)) => map.get(key)?,
        (Value::Array(items), PathSegment::Index(idx)) => items.get(*idx)?,
        _ => return None,
    };

    resolve_segments(next, rest)
}

/// Owned variant of [`resolve`]
pub fn resolve_owned(data: &Value, path: &Path) -> Option<Value> {
    resolve(data, path).cloned()
}

/// Extract a list of items from JSON using a path.
///
/// # Arguments
/// * `json` - The JSON value to extract from
/// * `path` - Path to the list (e.g. `["results"]`)
///
/// # Returns
/// A vector of items (always a Vec): a missing value gives an empty list and
/// a single non-array value is wrapped as the only item.
pub fn extract_list(json: &Value, path: &Path) -> Vec<Value> {
    match resolve(json, path) {
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
        None => vec![],
    }
}

/// Render a JSON value as plain text
///
/// # Returns
/// Strings verbatim, every other value as its JSON text
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
