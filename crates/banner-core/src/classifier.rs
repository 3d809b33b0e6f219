//! Banner reference normalization and classification.
//!
//! Classification is a pure function of the normalized reference text and a
//! vault lookup. It never consults resolution state.

use crate::vault::VaultEntry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// How a banner reference should be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceKind {
    DirectUrl,
    VaultPath,
    InternalLink,
    Keyword,
    Invalid,
}

/// A raw banner reference as found in frontmatter or a folder rule.
#[derive(Debug, Clone, PartialEq)]
pub enum BannerReference {
    Text(String),
    /// A value that cannot name an image (number, object, empty list...).
    Unsupported(Value),
}

impl BannerReference {
    /// Normalize a frontmatter value.
    ///
    /// Returns `None` for values that mean "no banner": null and blank
    /// strings. YAML parses an unquoted `[[image.png]]` as a nested list, so
    /// list values are flattened and re-wrapped as an internal link.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(BannerReference::Text(s.clone())),
            Value::Array(_) => {
                let mut parts = Vec::new();
                if flatten_into(value, &mut parts) && !parts.is_empty() {
                    Some(BannerReference::Text(format!("[[{}]]", parts.concat())))
                } else {
                    Some(BannerReference::Unsupported(value.clone()))
                }
            }
            other => Some(BannerReference::Unsupported(other.clone())),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            BannerReference::Text(s) => Some(s),
            BannerReference::Unsupported(_) => None,
        }
    }
}

impl From<&str> for BannerReference {
    fn from(s: &str) -> Self {
        BannerReference::Text(s.to_string())
    }
}

impl From<String> for BannerReference {
    fn from(s: String) -> Self {
        BannerReference::Text(s)
    }
}

impl fmt::Display for BannerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BannerReference::Text(s) => f.write_str(s),
            BannerReference::Unsupported(v) => write!(f, "{}", v),
        }
    }
}

/// Collect the leaves of a nested list. Returns false on a non-scalar leaf.
fn flatten_into(value: &Value, parts: &mut Vec<String>) -> bool {
    match value {
        Value::Array(items) => items.iter().all(|item| flatten_into(item, parts)),
        Value::String(s) => {
            parts.push(s.clone());
            true
        }
        Value::Number(n) => {
            parts.push(n.to_string());
            true
        }
        _ => false,
    }
}

/// Trim and strip one layer of matching surrounding quotes.
pub fn clean_reference(reference: &str) -> &str {
    let trimmed = reference.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Classify a reference string.
///
/// `lookup` maps a vault path to the entry it names, if any.
pub fn classify<F>(reference: &str, lookup: F) -> ReferenceKind
where
    F: Fn(&str) -> Option<VaultEntry>,
{
    let cleaned = clean_reference(reference);
    if cleaned.is_empty() {
        return ReferenceKind::Invalid;
    }
    if cleaned.contains("[[") && cleaned.contains("]]") {
        return ReferenceKind::InternalLink;
    }
    if url::Url::parse(cleaned).is_ok() {
        return ReferenceKind::DirectUrl;
    }
    match lookup(cleaned) {
        Some(entry) if entry.is_image_file() => ReferenceKind::VaultPath,
        _ => ReferenceKind::Keyword,
    }
}

/// Classify a normalized [`BannerReference`].
pub fn classify_reference<F>(reference: &BannerReference, lookup: F) -> ReferenceKind
where
    F: Fn(&str) -> Option<VaultEntry>,
{
    match reference {
        BannerReference::Text(text) => classify(text, lookup),
        BannerReference::Unsupported(_) => ReferenceKind::Invalid,
    }
}
