//! LCM Entities
//!
//! Table registry, data-path translation and relationship inference.
//!
//! # Overview
//!
//! - **TableRegistry**: tables, columns and joins referenced by legacy forms
//! - **DataPathTranslationService**: registration front end and path translation
//! - **RelationshipEngine**: turns registered joins into entities, foreign keys
//!   and extended entity pairs
//! - **DefinitionSink**: validates and saves the resulting model
//!
//! # Example
//!
//! ```rust
//! use lcm_datapath::DataPath;
//! use lcm_entity::{DataPathTranslationService, EntityModel, InMemorySchema, TableSchema};
//!
//! let schema = InMemorySchema::new()
//!     .with_table(TableSchema::new("ACCOUNT", "ACCOUNTID", &["ACCOUNT"]))
//!     .with_table(TableSchema::new("CONTACT", "CONTACTID", &["ACCOUNTID", "LASTNAME"]));
//!
//! let mut service = DataPathTranslationService::new(EntityModel::new());
//! let path: DataPath = "CONTACT:ACCOUNTID=ACCOUNT.ACCOUNTID!ACCOUNT".parse().unwrap();
//! service.register_field(&path);
//!
//! let report = service.persist(&schema);
//! assert!(report.is_clean());
//! assert_eq!(service.translate_field(&path).unwrap(), "Account.Account");
//! ```

pub mod error;
pub mod model;
pub mod naming;
pub mod persistence;
pub mod registry;
pub mod relationship;
pub mod schema;
pub mod sink;
pub mod translation;

// Re-exports
pub use error::{DanglingEntity, InferenceError, MigrationError};
pub use model::{
    CalculatedProperty, Cardinality, Entity, EntityId, EntityModel, EntityProperty, HookEvent,
    LifecycleHook, Relationship, RelationshipId,
};
pub use persistence::{PersistenceReport, RelationshipEngine};
pub use registry::{SecondaryJoin, TableId, TableInfo, TableRegistry};
pub use relationship::{RelationshipInfo, RelationshipKind, Resolution};
pub use schema::{CalculatedField, InMemorySchema, SchemaSource, TableSchema};
pub use sink::{validate_model, DefinitionSink, JsonFileSink, MemorySink, SinkError};
pub use translation::{DataPathTranslationService, Translator, KEY_PROPERTY};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
