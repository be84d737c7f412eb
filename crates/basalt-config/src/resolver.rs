//! Schema-aware property resolution
//!
//! [`Configuration`] answers scalar and multi-valued queries over an
//! already-assembled key/value store. Resolution order is fixed: explicit
//! store value, else declared default, else absent. Secret values are
//! decrypted before being returned (and before multi-value decoding). When a
//! caller's access method disagrees with a property's declared shape, the
//! resolver emits an advisory notice and keeps going, a deliberate
//! backward-compatibility stance for integrations written against older
//! schemas.

use std::collections::HashMap;
use std::sync::Arc;

use crate::multivalue::parse_field_list;
use crate::schema::PropertySchema;
use crate::secrets::{PlainCodec, SecretCodec};
use crate::warnings::{TracingSink, WarnSink};
use crate::{ConfigError, Result};

/// Scanner execution mode the resolver was built for.
///
/// Kept alongside the schema and store so mode-dependent resolution behavior
/// has a place to live; no current query consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Full analysis whose results are published to the server
    #[default]
    Publish,
    /// Local analysis, results stay on the machine
    Preview,
}

/// Where a resolved raw value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueOrigin {
    Store,
    Default,
}

/// Builder for [`Configuration`]
pub struct ConfigurationBuilder {
    schema: PropertySchema,
    store: HashMap<String, String>,
    codec: Arc<dyn SecretCodec>,
    sink: Arc<dyn WarnSink>,
    mode: ScanMode,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self {
            schema: PropertySchema::empty(),
            store: HashMap::new(),
            codec: Arc::new(PlainCodec),
            sink: Arc::new(TracingSink),
            mode: ScanMode::default(),
        }
    }

    /// Set the property schema
    pub fn schema(mut self, schema: PropertySchema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the raw key/value store (already merged by the caller)
    pub fn store(mut self, store: HashMap<String, String>) -> Self {
        self.store = store;
        self
    }

    /// Set the secret codec
    pub fn codec(mut self, codec: Arc<dyn SecretCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Set the sink receiving mismatch notices
    pub fn sink(mut self, sink: Arc<dyn WarnSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Set the scanner mode
    pub fn mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn build(self) -> Configuration {
        Configuration {
            schema: self.schema,
            store: self.store,
            codec: self.codec,
            sink: self.sink,
            mode: self.mode,
        }
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolved view over a property store
///
/// Immutable after construction; queries are stateless and safe to issue
/// concurrently from multiple threads.
pub struct Configuration {
    schema: PropertySchema,
    store: HashMap<String, String>,
    codec: Arc<dyn SecretCodec>,
    sink: Arc<dyn WarnSink>,
    mode: ScanMode,
}

impl Configuration {
    /// Create a new builder
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// Resolve `key` as a scalar.
    ///
    /// Returns the store value if present, else the declared default, else
    /// `None`. A declared multi-valued property read this way still resolves
    /// (to the raw, unsplit string) but emits an advisory notice; callers
    /// should move to [`Configuration::get_string_array`].
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let Some((raw, origin)) = self.resolve_raw(key) else {
            return Ok(None);
        };

        if origin == ValueOrigin::Store
            && self
                .schema
                .declaration(key)
                .is_some_and(|decl| decl.multi_values)
        {
            self.sink.warn(&format!(
                "Access to the multi-valued property '{key}' should be made using \
                 'getStringArray' method. The plugin using this property should be updated."
            ));
        }

        self.decode(key, raw).map(Some)
    }

    /// Resolve `key` as an ordered field list.
    ///
    /// The raw value resolves exactly as in [`Configuration::get`]; an absent
    /// key yields an empty list. The secret codec runs over the whole scalar
    /// before it is split into fields. Reading a declared single-valued
    /// property this way emits an advisory notice.
    pub fn get_string_array(&self, key: &str) -> Result<Vec<String>> {
        if self
            .schema
            .declaration(key)
            .is_some_and(|decl| !decl.multi_values)
        {
            self.sink.warn(&format!(
                "Property '{key}' is not declared as multi-valued but was read using \
                 'getStringArray' method. The plugin declaring this property should be updated."
            ));
        }

        let Some((raw, _)) = self.resolve_raw(key) else {
            return Ok(Vec::new());
        };

        let decoded = self.decode(key, raw)?;
        parse_field_list(key, &decoded)
    }

    /// Whether `get` would resolve a value for `key` (store or default).
    /// Does not decrypt and never warns.
    pub fn has_key(&self, key: &str) -> bool {
        self.resolve_raw(key).is_some()
    }

    /// Resolve `key` as a boolean. Accepts `true`/`false`, case-insensitive,
    /// surrounding whitespace ignored.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key)? {
            None => Ok(None),
            Some(value) => {
                let trimmed = value.trim();
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(Some(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(Some(false))
                } else {
                    Err(ConfigError::invalid_value(key, trimmed, "boolean"))
                }
            }
        }
    }

    /// Resolve `key` as a signed integer
    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        match self.get(key)? {
            None => Ok(None),
            Some(value) => {
                let trimmed = value.trim();
                trimmed
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|_| ConfigError::invalid_value(key, trimmed, "integer"))
            }
        }
    }

    /// Resolve `key` as a floating-point number
    pub fn get_float(&self, key: &str) -> Result<Option<f64>> {
        match self.get(key)? {
            None => Ok(None),
            Some(value) => {
                let trimmed = value.trim();
                trimmed
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| ConfigError::invalid_value(key, trimmed, "number"))
            }
        }
    }

    /// Read-only view of the raw store
    pub fn properties(&self) -> &HashMap<String, String> {
        &self.store
    }

    /// The schema this resolver reconciles queries against
    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    /// The scanner mode this resolver was built for
    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    fn resolve_raw(&self, key: &str) -> Option<(&str, ValueOrigin)> {
        if let Some(value) = self.store.get(key) {
            return Some((value.as_str(), ValueOrigin::Store));
        }
        self.schema
            .declaration(key)
            .and_then(|decl| decl.default_value.as_deref())
            .map(|default| (default, ValueOrigin::Default))
    }

    fn decode(&self, key: &str, raw: &str) -> Result<String> {
        if self.codec.is_encrypted(raw) {
            self.codec
                .decrypt(raw)
                .map_err(|e| ConfigError::secret_decode(key, e.to_string()))
        } else {
            Ok(raw.to_string())
        }
    }
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("declarations", &self.schema.len())
            .field("properties", &self.store.len())
            .field("mode", &self.mode)
            .finish()
    }
}
