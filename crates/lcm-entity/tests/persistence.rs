//! Persistence engine scenarios

use lcm_datapath::DataPath;
use lcm_entity::{
    CalculatedField, Cardinality, DataPathTranslationService, Entity, EntityModel, HookEvent,
    InMemorySchema, InferenceError, RelationshipKind, TableSchema,
};
use pretty_assertions::assert_eq;

fn path(text: &str) -> DataPath {
    DataPath::parse(text).unwrap()
}

fn crm_schema() -> InMemorySchema {
    InMemorySchema::new()
        .with_table(TableSchema::new("ACCOUNT", "ACCOUNTID", &["ACCOUNT", "TYPE"]))
        .with_table(TableSchema::new("ACCOUNTEXT", "ACCOUNTID", &["CUSTOMFIELD"]))
        .with_table(TableSchema::new(
            "CONTACT",
            "CONTACTID",
            &["ACCOUNTID", "ACCOUNTNAME", "LASTNAME"],
        ))
        .with_table(TableSchema::new("A", "XID", &["NAME"]))
        .with_table(TableSchema::new("B", "XID", &["NAME"]))
        .with_calculated(CalculatedField {
            table: "ACCOUNT".into(),
            name: "DISPLAYNAME".into(),
            property_name: "DisplayName".into(),
            expression: "{ACCOUNT} ({TYPE})".into(),
        })
}

fn service() -> DataPathTranslationService {
    DataPathTranslationService::new(EntityModel::new())
}

#[test]
fn generates_entities_for_registered_tables() {
    let mut service = service();
    service.register_field(&path("ACCOUNT:TYPE"));
    service.register_table("CONTACT");

    let report = service.persist(&crm_schema());

    assert!(report.is_clean());
    assert_eq!(report.created_entities, 2);
    assert_eq!(service.translate_table("account").unwrap(), "Account");
    assert_eq!(service.translate_table("CONTACT").unwrap(), "Contact");
    assert!(service.registry().tables().all(|t| t.exists()));
    assert!(service.model().entities().all(|(_, e)| e.generated));
}

#[test]
fn existing_entity_is_reused() {
    let mut model = EntityModel::new();
    model.add_entity(Entity::new("Company", "ACCOUNT", vec!["ACCOUNTID".into()]).with_property("Kind", "TYPE"));

    let mut service = DataPathTranslationService::new(model);
    service.register_field(&path("ACCOUNT:TYPE"));
    let report = service.persist(&crm_schema());

    assert_eq!(report.existing_entities, 1);
    assert_eq!(report.created_entities, 0);
    assert_eq!(service.translate_field(&path("ACCOUNT:TYPE")).unwrap(), "Kind");
    assert_eq!(service.translate_table("ACCOUNT").unwrap(), "Company");
}

#[test]
fn unknown_table_and_column_are_reported() {
    let mut service = service();
    service.register_field(&path("CONTACT:NOPE"));
    service.register_table("GHOST");

    let report = service.persist(&crm_schema());

    assert_eq!(
        report.errors,
        vec![
            InferenceError::MissingColumn {
                table: "CONTACT".into(),
                column: "NOPE".into(),
            },
            InferenceError::MissingTable {
                table: "GHOST".into(),
            },
        ]
    );
    // the entity is still generated despite the bad column
    assert!(service.translate_table("CONTACT").is_ok());
}

#[test]
fn calculated_field_attaches_metadata() {
    let mut service = service();
    let display = path("ACCOUNT:@DISPLAYNAME");
    service.register_field(&display);
    service.register_field(&path("ACCOUNT:@MISSING"));

    let report = service.persist(&crm_schema());

    assert_eq!(
        report.errors,
        vec![InferenceError::MissingCalculatedField {
            table: "ACCOUNT".into(),
            field: "MISSING".into(),
        }]
    );
    assert_eq!(service.translate_field(&display).unwrap(), "DisplayName");
}

#[test]
fn extension_picks_parent_by_name_similarity() {
    let mut service = service();
    service.register_field(&path("ACCOUNT:ACCOUNTID=ACCOUNTEXT.ACCOUNTID!CUSTOMFIELD"));

    let report = service.persist(&crm_schema());
    assert!(report.is_clean());
    assert_eq!(report.extensions, 1);

    let model = service.model();
    let account = model.find_by_table("ACCOUNT").unwrap();
    let ext = model.find_by_table("ACCOUNTEXT").unwrap();
    assert_eq!(model.entity(ext).extends, Some(account));
    assert_eq!(model.entity(account).extends, None);

    let binding = path("ACCOUNT:ACCOUNTID=ACCOUNTEXT.ACCOUNTID!CUSTOMFIELD");
    let join = &binding.joins()[0];
    let info = service.resolution().relationship(join).unwrap();
    assert_eq!(
        info.kind(),
        RelationshipKind::Extension {
            parent: account,
            child: ext
        }
    );
}

#[test]
fn extension_walked_from_child_keeps_single_link() {
    let mut service = service();
    service.register_field(&path("ACCOUNT:ACCOUNTID=ACCOUNTEXT.ACCOUNTID!CUSTOMFIELD"));
    service.register_field(&path("ACCOUNTEXT:ACCOUNTID=ACCOUNT.ACCOUNTID!TYPE"));

    let report = service.persist(&crm_schema());

    assert!(report.is_clean());
    assert_eq!(report.extensions, 1);
    assert_eq!(
        service
            .translate_field(&path("ACCOUNTEXT:ACCOUNTID=ACCOUNT.ACCOUNTID!TYPE"))
            .unwrap(),
        "Account.Type"
    );
}

#[test]
fn tied_similarity_is_ambiguous() {
    let mut service = service();
    service.register_field(&path("A:XID=B.XID!NAME"));

    let report = service.persist(&crm_schema());

    assert_eq!(
        report.errors,
        vec![InferenceError::AmbiguousExtension {
            join: "A.XID=B.XID".into(),
            score: 0,
        }]
    );
}

fn keyed(name: &str, table: &str) -> Entity {
    Entity::new(name, table, vec!["ACCOUNTID".into()])
}

#[test]
fn opposite_extension_conflicts() {
    let mut model = EntityModel::new();
    let account = model.add_entity(keyed("Account", "ACCOUNT"));
    let ext = model.add_entity(keyed("AccountExt", "ACCOUNTEXT"));
    model.entity_mut(account).extends = Some(ext);

    let mut service = DataPathTranslationService::new(model);
    service.register_field(&path("ACCOUNT:ACCOUNTID=ACCOUNTEXT.ACCOUNTID!CUSTOMFIELD"));
    service.register_field(&path("CONTACT:ACCOUNTID=ACCOUNT.ACCOUNTID!ACCOUNT"));

    let report = service.persist(&crm_schema());

    assert_eq!(
        report.errors,
        vec![InferenceError::ConflictingExtension {
            join: "ACCOUNT.ACCOUNTID=ACCOUNTEXT.ACCOUNTID".into(),
            parent: "AccountExt".into(),
            child: "Account".into(),
        }]
    );
    assert_eq!(report.extensions, 0);
    assert_eq!(service.model().entity(ext).extends, None);
    // the next join is still materialized
    assert_eq!(report.created_relationships, 1);
    assert_eq!(report.created_entities, 1);
}

#[test]
fn child_extending_another_entity_is_rejected() {
    let mut model = EntityModel::new();
    model.add_entity(keyed("Account", "ACCOUNT"));
    let ext = model.add_entity(keyed("AccountExt", "ACCOUNTEXT"));
    let legacy = model.add_entity(keyed("Legacy", "LEGACY"));
    model.entity_mut(ext).extends = Some(legacy);

    let mut service = DataPathTranslationService::new(model);
    service.register_field(&path("ACCOUNT:ACCOUNTID=ACCOUNTEXT.ACCOUNTID!CUSTOMFIELD"));
    service.register_field(&path("CONTACT:ACCOUNTID=ACCOUNT.ACCOUNTID!ACCOUNT"));

    let report = service.persist(&crm_schema());

    assert_eq!(
        report.errors,
        vec![InferenceError::AlreadyExtended {
            join: "ACCOUNT.ACCOUNTID=ACCOUNTEXT.ACCOUNTID".into(),
            entity: "AccountExt".into(),
            existing: "Legacy".into(),
        }]
    );
    assert_eq!(service.model().entity(ext).extends, Some(legacy));
    assert_eq!(report.created_relationships, 1);
}

#[test]
fn unmapped_foreign_key_column_is_rejected() {
    let mut model = EntityModel::new();
    model.add_entity(Entity::new("Contact", "CONTACT", vec!["CONTACTID".into()]));

    let mut service = DataPathTranslationService::new(model);
    let lookup = path("CONTACT:ACCOUNTID=ACCOUNT.ACCOUNTID!ACCOUNT");
    service.register_field(&lookup);
    service.register_field(&path("ACCOUNT:TYPE"));

    let report = service.persist(&crm_schema());

    assert_eq!(
        report.errors,
        vec![InferenceError::MissingFkProperty {
            join: "CONTACT.ACCOUNTID=ACCOUNT.ACCOUNTID".into(),
            entity: "Contact".into(),
            column: "ACCOUNTID".into(),
        }]
    );
    assert_eq!(report.created_relationships, 0);
    assert!(service.translate_field(&lookup).is_err());
    assert_eq!(service.translate_field(&path("ACCOUNT:TYPE")).unwrap(), "Type");
}

#[test]
fn join_without_key_is_rejected() {
    let mut service = service();
    service.register_field(&path("CONTACT:LASTNAME=ACCOUNT.ACCOUNT!TYPE"));

    let report = service.persist(&crm_schema());

    assert!(matches!(
        report.errors.as_slice(),
        [InferenceError::NoPrimaryKey { .. }]
    ));
    assert_eq!(service.resolution().relationship_count(), 0);
}

#[test]
fn foreign_key_from_child_creates_reference() {
    let mut service = service();
    let lookup = path("CONTACT:ACCOUNTID=ACCOUNT.ACCOUNTID!ACCOUNT");
    service.register_field(&lookup);

    let report = service.persist(&crm_schema());

    assert!(report.is_clean());
    assert_eq!(report.created_relationships, 1);

    let (_, relationship) = service.model().relationships().next().unwrap();
    assert_eq!(relationship.cardinality, Cardinality::OneToMany);
    assert_eq!(relationship.child_property.as_deref(), Some("Account"));
    assert_eq!(relationship.parent_property, None);
    assert_eq!(service.translate_field(&lookup).unwrap(), "Account.Account");
}

#[test]
fn both_walks_share_one_relationship() {
    let mut service = service();
    service.register_field(&path("CONTACT:ACCOUNTID=ACCOUNT.ACCOUNTID!ACCOUNT"));
    service.register_field(&path("ACCOUNT:ACCOUNTID=CONTACT.ACCOUNTID!LASTNAME"));

    let report = service.persist(&crm_schema());

    assert!(report.is_clean());
    assert_eq!(report.created_relationships, 1);
    assert_eq!(report.reused_relationships, 1);

    let (_, relationship) = service.model().relationships().next().unwrap();
    assert_eq!(relationship.parent_property.as_deref(), Some("Contacts"));
    assert_eq!(relationship.child_property.as_deref(), Some("Account"));
}

#[test]
fn static_schema_refuses_new_relationships() {
    let mut service = DataPathTranslationService::new(EntityModel::new().with_dynamic_schema(false));
    service.register_field(&path("CONTACT:ACCOUNTID=ACCOUNT.ACCOUNTID!ACCOUNT"));

    let report = service.persist(&crm_schema());

    assert_eq!(
        report.errors,
        vec![InferenceError::SchemaGenerationUnsupported {
            join: "CONTACT.ACCOUNTID=ACCOUNT.ACCOUNTID".into(),
            entity: "Contact".into(),
        }]
    );
    assert_eq!(service.model().relationships().count(), 0);
}

#[test]
fn secondary_join_adds_write_hooks() {
    let mut service = service();
    service.register_join(
        &path("CONTACT:ACCOUNTNAME"),
        &path("CONTACT:ACCOUNTID=ACCOUNT.ACCOUNTID!ACCOUNT"),
    );

    let report = service.persist(&crm_schema());

    assert!(report.is_clean(), "{:?}", report.errors);
    assert_eq!(report.hooks, 1);

    let contact = service.model().find_by_table("CONTACT").unwrap();
    let hooks = &service.model().entity(contact).hooks;
    assert_eq!(hooks.len(), 2);
    assert_eq!(hooks[0].event, HookEvent::BeforeInsert);
    assert_eq!(hooks[1].event, HookEvent::BeforeUpdate);
    assert_eq!(hooks[0].snippet, "this.Accountname = this.Account?.Account;");
}

#[test]
fn secondary_join_across_roots_is_rejected() {
    let mut service = service();
    service.register_join(&path("CONTACT:ACCOUNTNAME"), &path("ACCOUNT:ACCOUNT"));

    let report = service.persist(&crm_schema());

    assert!(matches!(
        report.errors.as_slice(),
        [InferenceError::SecondaryJoinOwnerMismatch { .. }]
    ));
    assert_eq!(report.hooks, 0);
}

#[test]
fn step_wise_engine_matches_persist() {
    let schema = crm_schema();
    let mut stepped = service();
    let mut whole = service();
    for svc in [&mut stepped, &mut whole] {
        svc.register_field(&path("CONTACT:ACCOUNTID=ACCOUNT.ACCOUNTID!ACCOUNT"));
        svc.register_field(&path("ACCOUNT:ACCOUNTID=ACCOUNTEXT.ACCOUNTID!CUSTOMFIELD"));
    }

    let mut engine = stepped.engine(&schema);
    for table in engine.table_ids() {
        engine.resolve_table(table);
    }
    for join in engine.join_keys() {
        engine.resolve_join(&join);
    }
    engine.attach_secondary_joins();
    let stepped_report = engine.finish();

    assert_eq!(stepped_report, whole.persist(&schema));
    assert_eq!(stepped.model(), whole.model());
}
