//! Definition sinks
//!
//! A [`DefinitionSink`] validates and persists the final entity model.

use crate::model::{EntityId, EntityModel};
use lcm_datapath::NameKey;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sink failure
#[derive(Debug, Error)]
pub enum SinkError {
    /// Model rejected by validation
    #[error("model failed validation: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// I/O failure
    #[error("failed to write {path}: {source}")]
    Io {
        /// Output file
        path: PathBuf,
        /// Cause
        #[source]
        source: std::io::Error,
    },

    /// Serialization failure
    #[error("failed to serialize model: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for migrated entity definitions
pub trait DefinitionSink {
    /// Problems that would make the model unsaveable; empty when valid
    fn validate(&self, model: &EntityModel) -> Vec<String> {
        validate_model(model)
    }

    /// Persist the model
    ///
    /// # Errors
    /// [`SinkError::Invalid`] if validation fails, otherwise sink specific
    fn save(&mut self, model: &EntityModel) -> Result<(), SinkError>;
}

/// Structural checks shared by every sink
#[must_use]
pub fn validate_model(model: &EntityModel) -> Vec<String> {
    let mut problems = Vec::new();

    let mut names = HashSet::new();
    for (_, entity) in model.entities() {
        if !names.insert(NameKey::new(&entity.name)) {
            problems.push(format!("duplicate entity name '{}'", entity.name));
        }

        let mut properties = HashSet::new();
        let all = entity
            .properties
            .iter()
            .map(|p| p.name.as_str())
            .chain(entity.calculated.iter().map(|c| c.name.as_str()));
        for property in all {
            if !properties.insert(NameKey::new(property)) {
                problems.push(format!(
                    "entity '{}' has duplicate property '{property}'",
                    entity.name
                ));
            }
        }
    }

    problems.extend(model.dangling_ids().iter().map(ToString::to_string));

    for (id, entity) in model.entities() {
        if extends_cycle(model, id) {
            problems.push(format!("entity '{}' extends itself", entity.name));
        }
    }

    problems
}

fn extends_cycle(model: &EntityModel, start: EntityId) -> bool {
    let mut seen = HashSet::from([start]);
    let mut current = model.get(start).and_then(|e| e.extends);
    while let Some(id) = current {
        if !seen.insert(id) {
            return id == start;
        }
        current = model.get(id).and_then(|e| e.extends);
    }
    false
}

/// Keeps the last saved model in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    saved: Option<EntityModel>,
}

impl MemorySink {
    /// Create empty sink
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last saved model
    #[inline]
    #[must_use]
    pub fn saved(&self) -> Option<&EntityModel> {
        self.saved.as_ref()
    }
}

impl DefinitionSink for MemorySink {
    fn save(&mut self, model: &EntityModel) -> Result<(), SinkError> {
        let problems = self.validate(model);
        if !problems.is_empty() {
            return Err(SinkError::Invalid(problems));
        }
        self.saved = Some(model.clone());
        Ok(())
    }
}

/// Writes the model as pretty-printed JSON
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// Create sink writing to `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Output file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl DefinitionSink for JsonFileSink {
    fn save(&mut self, model: &EntityModel) -> Result<(), SinkError> {
        let problems = self.validate(model);
        if !problems.is_empty() {
            return Err(SinkError::Invalid(problems));
        }

        let file = File::create(&self.path).map_err(|e| self.io(e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, model)?;
        writer.flush().map_err(|e| self.io(e))?;

        tracing::info!(path = %self.path.display(), entities = model.entity_count(), "saved entity model");
        Ok(())
    }
}
