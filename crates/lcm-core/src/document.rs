//! Migration input document
//!
//! The legacy form reader emits one JSON document holding the legacy schema,
//! the target project's existing entities and every plugin's component trees.

use crate::error::CoreError;
use indexmap::IndexMap;
use lcm_datapath::eq_ignore_case;
use lcm_entity::{EntityModel, InMemorySchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Everything a migration run consumes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationDocument {
    /// Legacy database schema
    #[serde(default)]
    pub schema: InMemorySchema,
    /// Entities that already exist in the target project
    #[serde(default)]
    pub entities: EntityModel,
    /// Legacy plugins in migration order
    #[serde(default)]
    pub plugins: Vec<Plugin>,
}

impl MigrationDocument {
    /// Parse JSON text
    ///
    /// # Errors
    /// [`CoreError::InputParse`] on malformed JSON
    pub fn from_json_str(text: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load from a JSON file
    ///
    /// # Errors
    /// [`CoreError::InputIo`] if the file cannot be read, otherwise as
    /// [`Self::from_json_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CoreError::InputIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Total number of forms across plugins
    #[must_use]
    pub fn form_count(&self) -> usize {
        self.plugins.iter().map(|p| p.forms.len()).sum()
    }
}

/// Legacy plugin: a named group of forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    /// Plugin name, used to attribute diagnostics
    pub name: String,
    /// Root components, one per form
    #[serde(default)]
    pub forms: Vec<LegacyComponent>,
}

/// One component of a legacy form definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyComponent {
    /// Component name
    pub name: String,
    /// Legacy class name, e.g. `TEdit`
    #[serde(rename = "type")]
    pub type_name: String,
    /// Published properties
    #[serde(default)]
    pub properties: PropertyBag,
    /// Owned components
    #[serde(default)]
    pub children: Vec<LegacyComponent>,
}

impl LegacyComponent {
    /// Create component without properties or children
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            properties: PropertyBag::default(),
            children: Vec::new(),
        }
    }

    /// With a property set
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// With `Left`, `Top`, `Width` and `Height` set
    #[must_use]
    pub fn at(self, left: i32, top: i32, width: i32, height: i32) -> Self {
        self.with("Left", left)
            .with("Top", top)
            .with("Width", width)
            .with("Height", height)
    }

    /// With a child appended
    #[must_use]
    pub fn child(mut self, child: LegacyComponent) -> Self {
        self.children.push(child);
        self
    }
}

/// Ordered property bag; keys compare case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(IndexMap<String, Value>);

impl PropertyBag {
    /// Set a property, replacing any key that differs only in case
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        let existing = self.0.keys().find(|k| eq_ignore_case(k, key)).cloned();
        self.0.insert(existing.unwrap_or_else(|| key.to_string()), value.into());
    }

    /// Raw value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(k, _)| eq_ignore_case(k, key))
            .map(|(_, v)| v)
    }

    /// Check presence
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Integer value; numeric strings are accepted
    #[must_use]
    pub fn int(&self, key: &str) -> Option<i32> {
        match self.get(key)? {
            Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean value; `True`/`False` strings are accepted
    #[must_use]
    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// Non-empty string value
    #[must_use]
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str().filter(|s| !s.trim().is_empty())
    }

    /// Number of properties
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::default();
        for (k, v) in iter {
            bag.insert(&k.into(), v);
        }
        bag
    }
}
