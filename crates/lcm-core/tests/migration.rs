//! End-to-end migration runs over the sample CRM

use lcm_core::{
    CancellationToken, CoreError, MigrationConfig, MigrationDocument, MigrationReport,
    MigrationRun, NoProgress, Severity, StepBudget,
};
use lcm_entity::{DefinitionSink, EntityModel, HookEvent, JsonFileSink, MemorySink, SinkError};
use lcm_test_utils::{init_test_tracing, sample_document, sample_document_json};
use pretty_assertions::assert_eq;

fn migrate(config: MigrationConfig) -> (MigrationReport, MemorySink) {
    init_test_tracing();
    let mut sink = MemorySink::new();
    let report = MigrationRun::new(config)
        .execute(&sample_document(), &mut sink, &mut NoProgress)
        .unwrap();
    (report, sink)
}

fn properties(report: &MigrationReport, form: &str) -> Vec<(String, Option<String>)> {
    report
        .form(form)
        .unwrap()
        .bindings
        .iter()
        .map(|b| (b.control_name.clone(), b.property.clone()))
        .collect()
}

fn owned(pairs: &[(&str, &str)]) -> Vec<(String, Option<String>)> {
    pairs
        .iter()
        .map(|(c, p)| ((*c).to_string(), Some((*p).to_string())))
        .collect()
}

#[test]
fn sample_document_migrates_cleanly() {
    let (report, sink) = migrate(MigrationConfig::default());

    assert!(report.is_clean(), "{:#?}", report.diagnostics);
    assert_eq!(report.persistence.created_entities, 3);
    assert_eq!(report.persistence.created_relationships, 2);
    assert_eq!(report.persistence.reused_relationships, 1);
    assert_eq!(report.persistence.hooks, 1);
    assert_eq!(sink.saved().unwrap().entity_count(), 3);
    assert_eq!(report.translated_bindings(), 8);
}

#[test]
fn bindings_translate_to_property_paths() {
    let (report, _) = migrate(MigrationConfig::default());

    assert_eq!(
        properties(&report, "ContactForm"),
        owned(&[
            ("edLastName", "Lastname"),
            ("edFirstName", "Firstname"),
            ("edAccount", "Account"),
            ("edCity", "Address.City"),
        ])
    );
    assert_eq!(
        properties(&report, "AccountForm"),
        owned(&[
            ("edName", "Account"),
            ("edDisplay", "DisplayName"),
            ("grdContacts", "Contacts"),
            ("edType", "Type"),
        ])
    );
}

#[test]
fn cached_lookup_text_gets_write_hooks() {
    let (_, sink) = migrate(MigrationConfig::default());
    let model = sink.saved().unwrap();
    let contact = model.entity(model.find_by_table("CONTACT").unwrap());

    let events: Vec<HookEvent> = contact.hooks.iter().map(|h| h.event).collect();
    assert_eq!(events, vec![HookEvent::BeforeInsert, HookEvent::BeforeUpdate]);
    assert!(contact
        .hooks
        .iter()
        .all(|h| h.snippet == "this.Accountname = this.Account?.Account;"));
}

#[test]
fn captions_are_merged_and_tools_skipped() {
    let (report, _) = migrate(MigrationConfig::default());
    let contact = report.form("ContactForm").unwrap();

    assert_eq!(contact.layout.merged_labels, 2);
    let by_name = |name: &str| {
        contact
            .form
            .arena
            .iter()
            .find(|(_, c)| c.name == name)
            .map(|(_, c)| c)
            .unwrap()
    };
    assert!(by_name("lblLastName").excluded);
    assert_eq!(by_name("edLastName").caption.as_deref(), Some("Last name"));
    assert_eq!(by_name("tmrRefresh").cell, None);
    assert!(by_name("edCity").cell.is_some());
    // 4 placed edits on the root surface
    assert_eq!(contact.layout.placed, 4);
}

#[test]
fn page_control_surfaces_are_laid_out() {
    let (report, _) = migrate(MigrationConfig::default());
    let account = report.form("AccountForm").unwrap();

    // root plus one surface per tab sheet
    assert_eq!(account.layout.surfaces, 3);
    assert_eq!(account.snaps.len(), 3);
    let pages = account
        .form
        .arena
        .iter()
        .find(|(_, c)| c.name == "pgDetails")
        .map(|(_, c)| c)
        .unwrap();
    let names: Vec<&str> = pages.surfaces.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["tsContacts", "tsDetails"]);
    assert!(pages.surfaces.iter().all(|s| s.grid.columns() == 1));
}

#[test]
fn static_entity_model_drops_navigation() {
    let (report, _) = migrate(MigrationConfig::new().with_dynamic_schema(false));

    assert_eq!(report.persistence.created_relationships, 0);
    assert!(report.count(Severity::Warning) > 0);
    let lost: Vec<&str> = report
        .forms
        .iter()
        .flat_map(|f| &f.bindings)
        .filter(|b| b.property.is_none())
        .map(|b| b.control_name.as_str())
        .collect();
    assert_eq!(lost, vec!["edAccount", "edCity", "grdContacts"]);
    // plain fields still translate
    assert_eq!(report.translated_bindings(), 5);
}

#[test]
fn cancelled_token_stops_run() {
    let mut token = CancellationToken::new();
    token.cancel();
    let err = MigrationRun::default()
        .execute(&sample_document(), &mut MemorySink::new(), &mut token)
        .unwrap_err();
    assert!(matches!(err, CoreError::Cancelled { ref unit } if unit == "plugin Contacts"));
}

#[test]
fn cancellation_during_persistence_saves_nothing() {
    let mut sink = MemorySink::new();
    // both plugins and forms, then the first table; the second is refused
    let mut budget = StepBudget::new(5);
    let err = MigrationRun::default()
        .execute(&sample_document(), &mut sink, &mut budget)
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(budget.seen().last().map(String::as_str), Some("table ACCOUNT"));
    assert!(sink.saved().is_none());
}

#[test]
fn json_round_trip_of_document_and_model() {
    let dir = tempfile::tempdir().unwrap();
    let doc = MigrationDocument::from_json_str(&sample_document_json()).unwrap();
    let mut sink = JsonFileSink::new(dir.path().join("entities.json"));

    MigrationRun::default()
        .execute(&doc, &mut sink, &mut NoProgress)
        .unwrap();

    let written = std::fs::read_to_string(sink.path()).unwrap();
    let model: EntityModel = serde_json::from_str(&written).unwrap();
    assert_eq!(model.entity_count(), 3);
    assert!(model.find_by_name("Address").is_some());
}

struct RejectingSink;

impl DefinitionSink for RejectingSink {
    fn validate(&self, _model: &EntityModel) -> Vec<String> {
        vec!["target project is read-only".into()]
    }

    fn save(&mut self, _model: &EntityModel) -> Result<(), SinkError> {
        Err(SinkError::Invalid(vec!["unreachable".into()]))
    }
}

#[test]
fn invalid_model_is_reported_not_saved() {
    let report = MigrationRun::default()
        .execute(&sample_document(), &mut RejectingSink, &mut NoProgress)
        .unwrap();

    assert_eq!(report.count(Severity::Error), 1);
    let error = report
        .diagnostics
        .iter()
        .find(|d| d.severity == Severity::Error)
        .unwrap();
    assert_eq!(error.subject, "entity model");
    // forms are still laid out for review
    assert_eq!(report.forms.len(), 2);
}

#[test]
fn report_serializes_for_review() {
    let (report, _) = migrate(MigrationConfig::default());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["forms"].as_array().unwrap().len(), 2);
    assert_eq!(json["forms"][0]["plugin"], "Contacts");
    assert_eq!(json["persistence"]["created_entities"], 3);
    assert!(json["run_id"].is_string());
}
