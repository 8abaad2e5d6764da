//! Declarative mapping from raw HubSpot objects to normalized items

pub mod field_config;
pub mod field_resolver;
pub mod normalizer;
pub mod path_extractor;
pub mod registry;
pub mod transform;

pub use field_config::{FieldConfig, FieldMapping, PathSlot, PathSpec, TransformConfig};
pub use field_resolver::extract_field_value;
pub use normalizer::{normalize_item, normalize_items};
pub use path_extractor::{path, resolve, Path, PathSegment};
pub use registry::{
    hubspot_mappings, MappingRegistry, ResourceCollection, HUBSPOT_OPTIONAL_SCOPES,
    HUBSPOT_SCOPES, RESOURCE_COLLECTIONS,
};
pub use transform::{apply_transform, Transform};
