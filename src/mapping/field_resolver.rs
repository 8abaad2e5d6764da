//! Field value resolution
//!
//! Walks a [`FieldConfig`] against a raw object and produces the value for one
//! output field. `None` means the field is absent.

use super::field_config::{FieldConfig, PathSlot, PathSpec, TransformConfig};
use super::path_extractor::resolve_owned;
use super::transform::apply_transform;
use serde_json::Value;
use tracing::trace;

/// Extract a field value from a raw object
///
/// # Arguments
/// * `data` - The raw HubSpot object
/// * `config` - How the field is derived
///
/// # Returns
/// The field value, or `None` when the field is absent
pub fn extract_field_value(data: &Value, config: &FieldConfig) -> Option<Value> {
    match config {
        FieldConfig::Constant(f) => non_null(f(data)),
        FieldConfig::Fallback(paths) => paths.iter().find_map(|p| resolve_owned(data, p)),
        FieldConfig::SinglePath(p) => resolve_owned(data, p),
        FieldConfig::Transformed(tc) => extract_transformed(data, tc),
        FieldConfig::Literal(v) => non_null(v.clone()),
    }
}

fn extract_transformed(data: &Value, config: &TransformConfig) -> Option<Value> {
    let slots = match &config.paths {
        PathSpec::Single(p) => {
            return apply_transform(resolve_owned(data, p), config.transform.as_ref());
        }
        PathSpec::Slots(slots) => slots,
    };

    let values: Vec<Value> = slots
        .iter()
        .map(|slot| match slot {
            PathSlot::Path(p) => resolve_owned(data, p).unwrap_or(Value::Null),
            PathSlot::Null => Value::Null,
            PathSlot::Literal(v) => v.clone(),
        })
        .collect();

    let result = apply_transform(Some(Value::Array(values)), config.transform.as_ref())?;

    match &config.then {
        Some(next) => {
            trace!("Chaining transform result {} into next config", result);
            extract_transformed(data, &next.with_leading_literal(result))
        }
        None => Some(result),
    }
}

fn non_null(value: Value) -> Option<Value> {
    if value.is_null() {
        None
    } else {
        Some(value)
    }
}
