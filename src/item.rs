//! Normalized integration item

use crate::error::{IntegrationError, Result};
use crate::mapping::path_extractor::value_to_text;
use crate::mapping::transform::is_truthy;
use serde::Serialize;
use serde_json::Value;

/// Common-shape record produced from any supported HubSpot object
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedItem {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub directory: bool,
    pub name: Option<String>,
    pub creation_time: Option<String>,
    pub last_modified_time: Option<String>,
    pub url: Option<String>,
    pub visibility: Option<bool>,
    pub mime_type: Option<String>,
    pub parent_id: Option<String>,
    pub parent_path_or_name: Option<String>,
}

impl NormalizedItem {
    /// Names of every assignable field, in declaration order
    pub const FIELDS: [&'static str; 11] = [
        "id",
        "type",
        "directory",
        "name",
        "creation_time",
        "last_modified_time",
        "url",
        "visibility",
        "mime_type",
        "parent_id",
        "parent_path_or_name",
    ];

    /// Assign a resolved value to the field called `field`.
    ///
    /// Text fields take strings verbatim and render other JSON as text. Flag
    /// fields take booleans verbatim and fall back to truthiness. An absent
    /// value clears the field (`directory` becomes `false`).
    pub fn set_field(&mut self, field: &str, value: Option<Value>) -> Result<()> {
        let text = || value.as_ref().map(value_to_text);
        let flag = || value.as_ref().map(as_flag);

        match field {
            "id" => self.id = text(),
            "type" => self.item_type = text(),
            "directory" => self.directory = flag().unwrap_or(false),
            "name" => self.name = text(),
            "creation_time" => self.creation_time = text(),
            "last_modified_time" => self.last_modified_time = text(),
            "url" => self.url = text(),
            "visibility" => self.visibility = flag(),
            "mime_type" => self.mime_type = text(),
            "parent_id" => self.parent_id = text(),
            "parent_path_or_name" => self.parent_path_or_name = text(),
            other => return Err(IntegrationError::UnknownField(other.to_string())),
        }
        Ok(())
    }
}

fn as_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        other => is_truthy(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_text_fields() {
        let mut item = NormalizedItem::default();
        item.set_field("id", Some(json!(12345))).unwrap();
        item.set_field("name", Some(json!("Acme"))).unwrap();
        item.set_field("url", None).unwrap();

        assert_eq!(item.id.as_deref(), Some("12345"));
        assert_eq!(item.name.as_deref(), Some("Acme"));
        assert_eq!(item.url, None);
    }

    #[test]
    fn test_set_flag_fields() {
        let mut item = NormalizedItem::default();
        item.set_field("visibility", Some(json!(true))).unwrap();
        item.set_field("directory", Some(json!("yes"))).unwrap();
        assert_eq!(item.visibility, Some(true));
        assert!(item.directory);

        item.set_field("directory", None).unwrap();
        item.set_field("visibility", Some(json!(0))).unwrap();
        assert!(!item.directory);
        assert_eq!(item.visibility, Some(false));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut item = NormalizedItem::default();
        let err = item.set_field("children", Some(json!([]))).unwrap_err();
        assert!(matches!(err, IntegrationError::UnknownField(f) if f == "children"));
    }

    #[test]
    fn test_every_listed_field_is_assignable() {
        let mut item = NormalizedItem::default();
        for field in NormalizedItem::FIELDS {
            item.set_field(field, Some(json!("x"))).unwrap();
        }
    }

    #[test]
    fn test_serializes_type_field_name() {
        let item = NormalizedItem {
            item_type: Some("Deal".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "Deal");
        assert_eq!(json["directory"], false);
        assert!(json.get("item_type").is_none());
    }
}
