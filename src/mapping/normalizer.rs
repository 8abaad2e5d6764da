//! Field mapping application
//!
//! This module turns raw HubSpot API objects into [`NormalizedItem`]s using
//! a declarative [`FieldMapping`].

use super::field_config::FieldMapping;
use super::field_resolver::extract_field_value;
use crate::error::Result;
use crate::item::NormalizedItem;
use serde_json::Value;

/// Apply a field mapping to one raw API object
///
/// Every field named in the mapping is resolved and assigned; fields the
/// mapping does not mention keep their defaults.
///
/// # Arguments
/// * `raw` - The object as returned by the HubSpot API
/// * `mapping` - Output field name to field config
///
/// # Returns
/// The normalized item, or `UnknownField` if the mapping names a field the
/// item does not have
pub fn normalize_item(raw: &Value, mapping: &FieldMapping) -> Result<NormalizedItem> {
    let mut item = NormalizedItem::default();

    for (field, config) in mapping {
        item.set_field(field, extract_field_value(raw, config))?;
    }

    Ok(item)
}

/// Apply a field mapping to every object in a list
///
/// # Returns
/// The normalized items in input order; the first failure aborts the list
pub fn normalize_items(raws: &[Value], mapping: &FieldMapping) -> Result<Vec<NormalizedItem>> {
    raws.iter().map(|raw| normalize_item(raw, mapping)).collect()
}
