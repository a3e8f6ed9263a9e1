//! Error types for translation and relationship inference
//!
//! Two families, both recoverable:
//! - [`MigrationError`]: a single binding cannot be translated
//! - [`InferenceError`]: a table or join cannot be materialized
//!
//! [`DanglingEntity`] rejects a loaded entity model whose ids do not resolve.

use crate::model::EntityId;

/// A data path cannot be resolved into a property path
///
/// Callers skip the offending binding and carry on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// No relationship was resolved for this exact join
    #[error("no relationship resolved for join '{join}'")]
    MissingRelationship { join: String },

    /// A field path tried to cross a one-to-many edge
    #[error("join '{join}' leads to a collection and cannot be crossed by a field path")]
    CollectionInPath { join: String },

    /// No entity was resolved for the table
    #[error("no entity resolved for table '{table}'")]
    MissingEntity { table: String },

    /// Entity has no property mapped to the column
    #[error("entity '{entity}' has no property for '{table}.{field}'")]
    MissingProperty {
        entity: String,
        table: String,
        field: String,
    },

    /// Entity has no calculated property of that name
    #[error("entity '{entity}' has no calculated property for '{table}.@{field}'")]
    MissingCalculatedField {
        entity: String,
        table: String,
        field: String,
    },

    /// Final edge does not land on the requested table and field
    #[error("path '{path}' does not end on '{table}.{field}'")]
    TargetMismatch {
        path: String,
        table: String,
        field: String,
    },

    /// Relationship translation needs at least one join
    #[error("path '{path}' has no joins")]
    EmptyPath { path: String },

    /// Final edge has the wrong cardinality for the request
    #[error("join '{join}' is {actual}, expected {expected}")]
    CardinalityMismatch {
        join: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Relative path does not start where its prefix ends
    #[error("path '{path}' cannot be spliced after '{prefix}'")]
    InvalidPrefix { prefix: String, path: String },
}

/// A table or join cannot be turned into an entity or relationship
///
/// Logged and collected; the table or join is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    /// Legacy schema has no such table and no entity exists
    #[error("table '{table}' has no entity and is missing from the legacy schema")]
    MissingTable { table: String },

    /// Registered column is not in the legacy table
    #[error("column '{table}.{column}' is referenced but does not exist")]
    MissingColumn { table: String, column: String },

    /// Calculated field metadata was not found
    #[error("calculated field '{table}.@{field}' has no metadata")]
    MissingCalculatedField { table: String, field: String },

    /// One side of a join has no entity
    #[error("join '{join}' references table '{table}' which has no entity")]
    MissingEntity { join: String, table: String },

    /// Neither side of a join is a primary key
    #[error("join '{join}' connects no primary key")]
    NoPrimaryKey { join: String },

    /// Both sides scored the same in the extension heuristic
    #[error("join '{join}' is an ambiguous extension (both sides score {score})")]
    AmbiguousExtension { join: String, score: u8 },

    /// The opposite extension already exists
    #[error("join '{join}' conflicts with existing extension of '{parent}' by '{child}'")]
    ConflictingExtension {
        join: String,
        parent: String,
        child: String,
    },

    /// Child already extends a different entity
    #[error("join '{join}': entity '{entity}' already extends '{existing}'")]
    AlreadyExtended {
        join: String,
        entity: String,
        existing: String,
    },

    /// Foreign key column is not mapped on the child entity
    #[error("join '{join}': entity '{entity}' has no property for foreign key '{column}'")]
    MissingFkProperty {
        join: String,
        entity: String,
        column: String,
    },

    /// A new relationship or property is needed but the model is fixed
    #[error("join '{join}' needs a new property on '{entity}' but the entity model does not support schema generation")]
    SchemaGenerationUnsupported { join: String, entity: String },

    /// Secondary join paths start at different tables
    #[error("secondary join '{join}' links paths with different root tables")]
    SecondaryJoinOwnerMismatch { join: String },

    /// Secondary join paths could not be translated
    #[error("secondary join '{join}' cannot be synchronized: {reason}")]
    UnresolvedSecondaryJoin { join: String, reason: String },
}

/// Entity model refers to an entity id outside its arena
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{owner} refers to missing {id}")]
pub struct DanglingEntity {
    /// Entity or relationship holding the reference
    pub owner: String,
    /// Id that does not resolve
    pub id: EntityId,
}

impl InferenceError {
    /// Table or join text the error is about
    #[must_use]
    pub fn subject(&self) -> &str {
        match self {
            Self::MissingTable { table }
            | Self::MissingColumn { table, .. }
            | Self::MissingCalculatedField { table, .. } => table,
            Self::MissingEntity { join, .. }
            | Self::NoPrimaryKey { join }
            | Self::AmbiguousExtension { join, .. }
            | Self::ConflictingExtension { join, .. }
            | Self::AlreadyExtended { join, .. }
            | Self::MissingFkProperty { join, .. }
            | Self::SchemaGenerationUnsupported { join, .. }
            | Self::SecondaryJoinOwnerMismatch { join }
            | Self::UnresolvedSecondaryJoin { join, .. } => join,
        }
    }
}
