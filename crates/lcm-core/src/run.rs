//! Migration run
//!
//! # Steps
//! 1. Build every plugin's forms, registering their bindings
//! 2. Persist entities and relationships
//! 3. Validate and save the entity model
//! 4. Translate bindings
//! 5. Align and lay out every form
//!
//! The run is single-threaded. [`OperationStatus::advance`] is polled before
//! every plugin, form, table, join and layout.

use crate::builder::{BuiltForm, FormBuilder};
use crate::classify::ControlRegistry;
use crate::config::MigrationConfig;
use crate::document::MigrationDocument;
use crate::error::CoreError;
use crate::report::{Diagnostic, FormReport, MigrationReport, Severity};
use crate::status::OperationStatus;
use chrono::Utc;
use lcm_datapath::NameKey;
use lcm_entity::{
    DataPathTranslationService, DefinitionSink, InferenceError, PersistenceReport, SchemaSource,
};
use lcm_layout::{Aligner, Form, LayoutEngine, LayoutWarning};
use std::collections::HashMap;
use ulid::Ulid;

/// One configured migration
#[derive(Debug, Clone)]
pub struct MigrationRun {
    config: MigrationConfig,
    registry: ControlRegistry,
}

impl Default for MigrationRun {
    fn default() -> Self {
        Self::new(MigrationConfig::default())
    }
}

impl MigrationRun {
    /// Create run with the stock control classes
    #[must_use]
    pub fn new(config: MigrationConfig) -> Self {
        Self {
            config,
            registry: ControlRegistry::standard(),
        }
    }

    /// With a custom classification registry
    #[inline]
    #[must_use]
    pub fn with_registry(mut self, registry: ControlRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Migrate `document`, saving the entity model to `sink`
    ///
    /// Skipped bindings, relationships and overlaps become diagnostics in the
    /// report. A model that fails validation is reported and not saved.
    ///
    /// # Errors
    /// [`CoreError::Cancelled`] if `status` refuses a unit of work,
    /// [`CoreError::Sink`] if saving fails
    pub fn execute(
        &self,
        document: &MigrationDocument,
        sink: &mut dyn DefinitionSink,
        status: &mut dyn OperationStatus,
    ) -> Result<MigrationReport, CoreError> {
        let run_id = Ulid::new();
        let started_at = Utc::now();
        let _span = tracing::info_span!("migration", run_id = %run_id).entered();
        tracing::info!(plugins = document.plugins.len(), forms = document.form_count(), "migration started");

        let model = document
            .entities
            .clone()
            .with_dynamic_schema(self.config.entities.dynamic_schema);
        let mut service = DataPathTranslationService::new(model);
        let mut diagnostics = Vec::new();

        // 1. build and register
        let builder = FormBuilder::new(&self.registry);
        let mut owners: HashMap<NameKey, String> = HashMap::new();
        let mut built = Vec::with_capacity(document.form_count());
        for plugin in &document.plugins {
            checkpoint(status, &format!("plugin {}", plugin.name))?;
            let _plugin = tracing::info_span!("plugin", name = %plugin.name).entered();
            for root in &plugin.forms {
                checkpoint(status, &format!("form {}", root.name))?;
                let _form = tracing::info_span!("form", name = %root.name).entered();
                built.push(builder.build(&plugin.name, root, &mut service, &mut diagnostics));
            }
            for table in service.registry().tables() {
                owners
                    .entry(NameKey::new(table.name()))
                    .or_insert_with(|| plugin.name.clone());
            }
        }

        // 2. persistence
        let persistence = persist(&mut service, &document.schema, status)?;
        diagnostics.extend(
            persistence
                .errors
                .iter()
                .map(|err| inference_diagnostic(err, &owners)),
        );

        // 3. validate and save
        checkpoint(status, "save entity model")?;
        let problems = sink.validate(service.model());
        if problems.is_empty() {
            sink.save(service.model())?;
        } else {
            for problem in problems {
                tracing::error!(%problem, "entity model not saved");
                diagnostics.push(Diagnostic::error(None, "entity model", problem));
            }
        }

        // 4-5. translate, align, lay out
        let translator = service.translator();
        let aligner = Aligner::new(self.config.alignment);
        let layout = LayoutEngine::new(self.config.layout);
        let mut forms = Vec::with_capacity(built.len());
        for mut form in built {
            checkpoint(status, &format!("layout {}", form.form.name))?;
            let _plugin = tracing::info_span!("plugin", name = %form.plugin).entered();

            form.translate_bindings(&translator, &mut diagnostics);
            let snaps = aligner.align_form(&mut form.form);
            let report = layout.layout_form(&mut form.form);
            diagnostics.extend(report.warnings.iter().map(|w| layout_diagnostic(&form, w)));

            let BuiltForm {
                plugin,
                form,
                bindings,
            } = form;
            forms.push(FormReport {
                plugin,
                form,
                layout: report,
                snaps,
                bindings,
            });
        }

        let report = MigrationReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            persistence,
            forms,
            diagnostics,
        };
        tracing::info!(
            forms = report.forms.len(),
            bindings = report.translated_bindings(),
            warnings = report.count(Severity::Warning),
            errors = report.count(Severity::Error),
            "migration finished"
        );
        Ok(report)
    }
}

fn checkpoint(status: &mut dyn OperationStatus, unit: &str) -> Result<(), CoreError> {
    if status.advance(unit) {
        Ok(())
    } else {
        tracing::warn!(unit, "migration cancelled");
        Err(CoreError::Cancelled {
            unit: unit.to_string(),
        })
    }
}

fn persist<S: SchemaSource + ?Sized>(
    service: &mut DataPathTranslationService,
    schema: &S,
    status: &mut dyn OperationStatus,
) -> Result<PersistenceReport, CoreError> {
    let names: Vec<String> = service
        .registry()
        .tables()
        .map(|t| t.name().to_string())
        .collect();

    let mut engine = service.engine(schema);
    for (table, name) in engine.table_ids().into_iter().zip(&names) {
        checkpoint(status, &format!("table {name}"))?;
        engine.resolve_table(table);
    }
    for join in engine.join_keys() {
        checkpoint(status, &format!("join {join}"))?;
        engine.resolve_join(&join);
    }
    checkpoint(status, "secondary joins")?;
    engine.attach_secondary_joins();
    Ok(engine.finish())
}

/// Table a persistence error is about; join subjects start with their
/// from-table
fn subject_table(err: &InferenceError) -> &str {
    let subject = err.subject();
    subject.split('.').next().unwrap_or(subject)
}

fn inference_diagnostic(err: &InferenceError, owners: &HashMap<NameKey, String>) -> Diagnostic {
    let plugin = owners.get(&NameKey::new(subject_table(err)));
    Diagnostic::warning(plugin.map(String::as_str), err.subject(), err.to_string())
}

fn layout_diagnostic(form: &BuiltForm, warning: &LayoutWarning) -> Diagnostic {
    let names = control_names(&form.form, warning);
    let severity = match warning {
        LayoutWarning::Contained { .. } => Severity::Info,
        LayoutWarning::Overlap { .. } | LayoutWarning::Unresolved { .. } => Severity::Warning,
    };
    Diagnostic::new(
        severity,
        Some(form.plugin.as_str()),
        format!("{}.{}", form.form.name, names[0]),
        format!("{warning} ({} / {})", names[0], names[1]),
    )
}

fn control_names<'f>(form: &'f Form, warning: &LayoutWarning) -> [&'f str; 2] {
    warning
        .controls()
        .map(|id| form.arena.get(id).name.as_str())
}
