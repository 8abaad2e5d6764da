//! Named value transformations
//!
//! Transforms run on the value a field config extracted: a single JSON value
//! or the positional list gathered from several paths. Falsy input is always
//! treated as absent and never reaches a transform.

use super::path_extractor::value_to_text;
use serde_json::Value;
use std::fmt;

/// Signature for transforms injected from code
pub type TransformFn = fn(&Value) -> Option<Value>;

/// A transform applied by a field config
#[derive(Clone)]
pub enum Transform {
    /// Logical NOT of the value's truthiness
    BoolInverse,
    /// Prefix `https://` onto a domain
    UrlDomain,
    /// Prefix `mailto:` onto an email address
    UrlEmail,
    /// Join the truthy parts of a list with a space
    JoinNames,
    /// Function supplied by the caller
    Custom(TransformFn),
    /// Name that is not registered; the value passes through unchanged
    Unknown(String),
}

impl Transform {
    /// Look up a transform by its configuration name
    pub fn parse(name: &str) -> Self {
        match name {
            "bool_inverse" => Transform::BoolInverse,
            "url_domain" => Transform::UrlDomain,
            "url_email" => Transform::UrlEmail,
            "join_names" => Transform::JoinNames,
            other => Transform::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Transform::BoolInverse => "bool_inverse",
            Transform::UrlDomain => "url_domain",
            Transform::UrlEmail => "url_email",
            Transform::JoinNames => "join_names",
            Transform::Custom(_) => "<custom>",
            Transform::Unknown(name) => name,
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transform({})", self.name())
    }
}

/// JSON truthiness: null, false, 0, "", [] and {} are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Apply a transform to an extracted value
///
/// # Arguments
/// * `value` - The extracted value, or the list gathered from several paths
/// * `transform` - The transform to run, if any
///
/// # Returns
/// `None` for absent or falsy input whatever the transform. A single-element
/// list is unwrapped before the transform sees it. With no transform (or an
/// unknown name) the unwrapped value is returned as-is.
pub fn apply_transform(value: Option<Value>, transform: Option<&Transform>) -> Option<Value> {
    let value = value.filter(is_truthy)?;
    let value = unwrap_single(value);

    match transform {
        Some(Transform::BoolInverse) => Some(Value::Bool(!is_truthy(&value))),
        Some(Transform::UrlDomain) => with_prefix("https://", &value),
        Some(Transform::UrlEmail) => with_prefix("mailto:", &value),
        Some(Transform::JoinNames) => join_names(&value),
        Some(Transform::Custom(f)) => f(&value),
        Some(Transform::Unknown(_)) | None => Some(value),
    }
}

fn unwrap_single(value: Value) -> Value {
    match value {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    }
}

fn with_prefix(prefix: &str, value: &Value) -> Option<Value> {
    if !is_truthy(value) {
        return None;
    }
    Some(Value::String(format!("{}{}", prefix, value_to_text(value))))
}

/// Join truthy name parts with a single space.
///
/// # Arguments
/// * `value` - A list of name parts; a scalar counts as a single part
///
/// # Returns
/// The joined name, or `None` when no part is truthy
pub fn join_names(value: &Value) -> Option<Value> {
    let parts = match value {
        Value::Array(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    };

    let full = parts
        .iter()
        .filter(|part| is_truthy(part))
        .map(value_to_text)
        .collect::<Vec<_>>()
        .join(" ");

    if full.is_empty() {
        None
    } else {
        Some(Value::String(full))
    }
}
