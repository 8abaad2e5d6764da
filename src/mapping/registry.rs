//! HubSpot resource registry
//!
//! Scopes, fetched collections and per-object-type field mappings. The
//! built-in tables are assembled once and shared for the life of the process.

use super::field_config::{FieldConfig, FieldMapping, TransformConfig};
use super::path_extractor::path;
use super::transform::Transform;
use crate::error::{IntegrationError, Result};
use crate::item::NormalizedItem;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Scopes requested on the authorization redirect
pub const HUBSPOT_SCOPES: &[&str] = &[
    "crm.objects.contacts.write",
    "crm.objects.contacts.read",
    "crm.objects.companies.write",
    "crm.objects.companies.read",
    "crm.objects.deals.read",
    "crm.objects.deals.write",
    "crm.objects.users.read",
    "crm.objects.users.write",
    "oauth",
    "tickets",
    "content",
];

/// Scopes the user may decline
pub const HUBSPOT_OPTIONAL_SCOPES: &[&str] = &[];

/// A HubSpot collection endpoint, `/{domain}/v3/{object_type}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceCollection {
    /// API family ("crm", "cms")
    pub domain: &'static str,
    /// Object path, also the key into the mapping registry
    pub object_type: &'static str,
}

impl ResourceCollection {
    pub const fn new(domain: &'static str, object_type: &'static str) -> Self {
        Self {
            domain,
            object_type,
        }
    }

    pub fn endpoint_path(&self) -> String {
        format!("/{}/v3/{}", self.domain, self.object_type)
    }
}

/// Collections fetched on every load, in result order
pub const RESOURCE_COLLECTIONS: &[ResourceCollection] = &[
    ResourceCollection::new("crm", "objects/contacts"),
    ResourceCollection::new("crm", "objects/companies"),
    ResourceCollection::new("crm", "objects/deals"),
    ResourceCollection::new("cms", "pages/site-pages"),
];

/// Field mappings indexed by object type
#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
    mappings: HashMap<String, FieldMapping>,
}

static BUILTIN: OnceLock<MappingRegistry> = OnceLock::new();

/// The built-in HubSpot mappings
pub fn hubspot_mappings() -> &'static MappingRegistry {
    BUILTIN.get_or_init(MappingRegistry::builtin)
}

impl MappingRegistry {
    pub fn new(mappings: HashMap<String, FieldMapping>) -> Self {
        Self { mappings }
    }

    /// Parse a JSON document of the form `{"<object type>": {"<field>": <config>}}`
    pub fn from_json(json: &str) -> Result<Self> {
        let mappings: HashMap<String, FieldMapping> = serde_json::from_str(json)
            .map_err(|e| IntegrationError::InvalidMapping(e.to_string()))?;

        for (object_type, mapping) in &mappings {
            if let Some(field) = mapping
                .keys()
                .find(|field| !NormalizedItem::FIELDS.contains(&field.as_str()))
            {
                return Err(IntegrationError::InvalidMapping(format!(
                    "{} maps unknown item field '{}'",
                    object_type, field
                )));
            }
        }

        Ok(Self { mappings })
    }

    /// Replace whole object-type mappings with those from `overrides`
    pub fn with_overrides(mut self, overrides: MappingRegistry) -> Self {
        self.mappings.extend(overrides.mappings);
        self
    }

    pub fn get(&self, object_type: &str) -> Option<&FieldMapping> {
        self.mappings.get(object_type)
    }

    pub fn object_types(&self) -> impl Iterator<Item = &str> {
        self.mappings.keys().map(String::as_str)
    }

    pub fn builtin() -> Self {
        let mut mappings = HashMap::new();
        mappings.insert("objects/contacts".to_string(), contacts_mapping());
        mappings.insert("objects/companies".to_string(), companies_mapping());
        mappings.insert("objects/deals".to_string(), deals_mapping());
        mappings.insert("pages/site-pages".to_string(), site_pages_mapping());
        Self { mappings }
    }
}

fn not_directory(_: &Value) -> Value {
    Value::Bool(false)
}

fn gathered(paths: Vec<super::path_extractor::Path>, transform: Transform) -> FieldConfig {
    FieldConfig::Transformed(TransformConfig::gather(paths).with_transform(transform))
}

fn visible_unless_archived() -> FieldConfig {
    gathered(vec![path(["archived"])], Transform::BoolInverse)
}

fn fields(entries: Vec<(&str, FieldConfig)>) -> FieldMapping {
    entries
        .into_iter()
        .map(|(name, config)| (name.to_string(), config))
        .collect()
}

fn contacts_mapping() -> FieldMapping {
    fields(vec![
        ("id", FieldConfig::path(["id"])),
        ("type", FieldConfig::Constant(|_| json!("Contact"))),
        ("directory", FieldConfig::Constant(not_directory)),
        (
            "name",
            gathered(
                vec![
                    path(["properties", "firstname"]),
                    path(["properties", "lastname"]),
                ],
                Transform::JoinNames,
            ),
        ),
        ("creation_time", FieldConfig::path(["createdAt"])),
        ("last_modified_time", FieldConfig::path(["updatedAt"])),
        (
            "url",
            gathered(vec![path(["properties", "email"])], Transform::UrlEmail),
        ),
        ("visibility", visible_unless_archived()),
        (
            "mime_type",
            FieldConfig::Constant(|_| json!("application/vnd.hubspot.contact")),
        ),
    ])
}

fn companies_mapping() -> FieldMapping {
    fields(vec![
        ("id", FieldConfig::path(["id"])),
        ("type", FieldConfig::Constant(|_| json!("Company"))),
        ("directory", FieldConfig::Constant(not_directory)),
        ("name", FieldConfig::path(["properties", "name"])),
        (
            "creation_time",
            FieldConfig::Fallback(vec![path(["createdAt"]), path(["properties", "createdate"])]),
        ),
        (
            "last_modified_time",
            FieldConfig::Fallback(vec![
                path(["updatedAt"]),
                path(["properties", "hs_lastmodifieddate"]),
            ]),
        ),
        (
            "url",
            gathered(vec![path(["properties", "domain"])], Transform::UrlDomain),
        ),
        ("visibility", visible_unless_archived()),
        (
            "mime_type",
            FieldConfig::Constant(|_| json!("application/vnd.hubspot.company")),
        ),
    ])
}

fn deals_mapping() -> FieldMapping {
    fields(vec![
        ("id", FieldConfig::path(["id"])),
        ("type", FieldConfig::Constant(|_| json!("Deal"))),
        ("directory", FieldConfig::Constant(not_directory)),
        ("name", FieldConfig::path(["properties", "dealname"])),
        (
            "creation_time",
            FieldConfig::Fallback(vec![path(["createdAt"]), path(["properties", "createdate"])]),
        ),
        (
            "last_modified_time",
            FieldConfig::Fallback(vec![
                path(["updatedAt"]),
                path(["properties", "hs_lastmodifieddate"]),
            ]),
        ),
        ("visibility", visible_unless_archived()),
        (
            "mime_type",
            FieldConfig::Constant(|_| json!("application/vnd.hubspot.deal")),
        ),
    ])
}

fn site_pages_mapping() -> FieldMapping {
    fields(vec![
        ("id", FieldConfig::path(["id"])),
        ("type", FieldConfig::Constant(|_| json!("SitePage"))),
        ("directory", FieldConfig::Constant(not_directory)),
        ("name", FieldConfig::path(["htmlTitle"])),
        (
            "creation_time",
            FieldConfig::Fallback(vec![
                path(["createdAt"]),
                path(["properties", "hs_createdate"]),
            ]),
        ),
        (
            "last_modified_time",
            FieldConfig::Fallback(vec![
                path(["updatedAt"]),
                path(["properties", "hs_lastmodifieddate"]),
            ]),
        ),
        ("url", FieldConfig::path(["url"])),
        ("visibility", FieldConfig::path(["published"])),
        ("parent_path_or_name", FieldConfig::path(["name"])),
        ("parent_id", FieldConfig::path(["createdById"])),
        (
            "mime_type",
            FieldConfig::Constant(|_| json!("application/vnd.hubspot.sitepage")),
        ),
    ])
}
