//! LCM Core
//!
//! Orchestrates one legacy CRM migration: builds forms from the legacy
//! component trees, infers entities and relationships, saves the entity
//! model, translates bindings and reconstructs grid layouts.
//!
//! # Overview
//!
//! - **MigrationDocument**: schema, existing entities and plugin forms
//! - **ControlRegistry**: legacy component class → layout and binding shape
//! - **MigrationRun**: the ordered steps, with cooperative cancellation
//! - **MigrationReport**: forms, bindings and diagnostics for review
//!
//! # Example
//!
//! ```rust
//! use lcm_core::{LegacyComponent, MigrationDocument, MigrationRun, NoProgress, Plugin};
//! use lcm_entity::{InMemorySchema, MemorySink, TableSchema};
//!
//! let document = MigrationDocument {
//!     schema: InMemorySchema::new().with_table(TableSchema::new("CONTACT", "CONTACTID", &["LASTNAME"])),
//!     plugins: vec![Plugin {
//!         name: "Contacts".into(),
//!         forms: vec![LegacyComponent::new("ContactForm", "TForm").child(
//!             LegacyComponent::new("edName", "TEdit").at(8, 8, 120, 21).with("DataPath", "CONTACT:LASTNAME"),
//!         )],
//!     }],
//!     ..MigrationDocument::default()
//! };
//!
//! let mut sink = MemorySink::new();
//! let report = MigrationRun::default().execute(&document, &mut sink, &mut NoProgress).unwrap();
//! assert_eq!(report.forms[0].bindings[0].property.as_deref(), Some("Lastname"));
//! ```

pub mod builder;
pub mod classify;
pub mod config;
pub mod document;
pub mod error;
pub mod report;
pub mod run;
pub mod status;

// Re-exports
pub use builder::{Binding, BuiltForm, FormBuilder};
pub use classify::{BindingKind, ControlRegistry, ControlTemplate, Nesting};
pub use config::{EntityOptions, LoggingOptions, MigrationConfig};
pub use document::{LegacyComponent, MigrationDocument, Plugin, PropertyBag};
pub use error::CoreError;
pub use report::{Diagnostic, FormReport, MigrationReport, Severity};
pub use run::MigrationRun;
pub use status::{CancellationToken, NoProgress, OperationStatus, StepBudget};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
