//! Property declarations and the schema catalog
//!
//! A [`PropertySchema`] is an immutable catalog mapping property key to its
//! declaration: is the property multi-valued, and does it carry a default?
//! The resolver consults it on every query; it is built once and never
//! mutated. Keys absent from the schema are legal: an undeclared property
//! simply has no expectations attached to it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ConfigError, Result};

/// Declares the shape of a single configuration property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    /// Property key, matched exactly and case-sensitively
    pub key: String,
    /// Human-readable description surfaced by tooling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the value encodes an ordered field list
    #[serde(default)]
    pub multi_values: bool,
    /// Value used when the store has no entry for the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl PropertyDeclaration {
    /// Create a declaration for `key` (single-valued, no default)
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: None,
            multi_values: false,
            default_value: None,
        }
    }

    /// Attach a description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the property as multi-valued
    pub fn multi_values(mut self, multi_values: bool) -> Self {
        self.multi_values = multi_values;
        self
    }

    /// Attach a default value
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Immutable catalog of property declarations
#[derive(Debug, Clone, Default)]
pub struct PropertySchema {
    declarations: HashMap<String, PropertyDeclaration>,
}

impl PropertySchema {
    /// Build a schema from declarations. A later declaration of the same key
    /// replaces the earlier one.
    pub fn new(declarations: impl IntoIterator<Item = PropertyDeclaration>) -> Self {
        Self {
            declarations: declarations
                .into_iter()
                .map(|decl| (decl.key.clone(), decl))
                .collect(),
        }
    }

    /// Schema with no declarations
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a declaration catalog from TOML:
    ///
    /// ```toml
    /// [[properties]]
    /// key = "basalt.sources"
    /// multi_values = true
    /// default_value = "src"
    /// ```
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Catalog {
            #[serde(default)]
            properties: Vec<PropertyDeclaration>,
        }

        let catalog: Catalog = toml::from_str(toml_str)
            .map_err(|e| ConfigError::parse(format!("TOML parse error: {e}")))?;
        Ok(Self::new(catalog.properties))
    }

    /// Parse a declaration catalog from a JSON array
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let declarations: Vec<PropertyDeclaration> = serde_json::from_value(value)
            .map_err(|e| ConfigError::parse(format!("JSON parse error: {e}")))?;
        Ok(Self::new(declarations))
    }

    /// Exact-match lookup, no normalization
    pub fn declaration(&self, key: &str) -> Option<&PropertyDeclaration> {
        self.declarations.get(key)
    }

    /// Iterate over all declarations, in no particular order
    pub fn declarations(&self) -> impl Iterator<Item = &PropertyDeclaration> {
        self.declarations.values()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_builder_defaults() {
        let decl = PropertyDeclaration::new("basalt.host");
        assert_eq!(decl.key, "basalt.host");
        assert!(!decl.multi_values);
        assert!(decl.default_value.is_none());
        assert!(decl.description.is_none());
    }

    #[test]
    fn declaration_builder_chaining() {
        let decl = PropertyDeclaration::new("basalt.inclusions")
            .description("Glob patterns of files to analyze")
            .multi_values(true)
            .default_value("**/*");
        assert!(decl.multi_values);
        assert_eq!(decl.default_value.as_deref(), Some("**/*"));
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let schema = PropertySchema::new([PropertyDeclaration::new("basalt.host")]);
        assert!(schema.declaration("basalt.host").is_some());
        assert!(schema.declaration("basalt.Host").is_none());
        assert!(schema.declaration("basalt.host ").is_none());
    }

    #[test]
    fn later_declaration_replaces_earlier() {
        let schema = PropertySchema::new([
            PropertyDeclaration::new("k").default_value("first"),
            PropertyDeclaration::new("k").default_value("second"),
        ]);
        assert_eq!(schema.len(), 1);
        assert_eq!(
            schema.declaration("k").unwrap().default_value.as_deref(),
            Some("second")
        );
    }

    #[test]
    fn from_toml_catalog() {
        let schema = PropertySchema::from_toml(
            r#"
[[properties]]
key = "basalt.sources"
multi_values = true
default_value = "src"

[[properties]]
key = "basalt.host"
description = "Server base URL"
"#,
        )
        .unwrap();

        assert_eq!(schema.len(), 2);
        let sources = schema.declaration("basalt.sources").unwrap();
        assert!(sources.multi_values);
        assert_eq!(sources.default_value.as_deref(), Some("src"));
        let host = schema.declaration("basalt.host").unwrap();
        assert!(!host.multi_values);
        assert_eq!(host.description.as_deref(), Some("Server base URL"));
    }

    #[test]
    fn from_toml_empty_catalog() {
        let schema = PropertySchema::from_toml("").unwrap();
        assert!(schema.is_empty());
    }

    #[test]
    fn from_toml_rejects_malformed_input() {
        let err = PropertySchema::from_toml("properties = 42").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn from_json_catalog() {
        let schema = PropertySchema::from_json(serde_json::json!([
            { "key": "basalt.sources", "multi_values": true },
            { "key": "basalt.token" }
        ]))
        .unwrap();

        assert_eq!(schema.len(), 2);
        assert!(schema.declaration("basalt.sources").unwrap().multi_values);
        assert!(!schema.declaration("basalt.token").unwrap().multi_values);
    }

    #[test]
    fn from_json_rejects_non_array() {
        let err = PropertySchema::from_json(serde_json::json!({ "key": "x" })).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
