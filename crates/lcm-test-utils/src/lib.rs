//! Testing utilities for LCM workspace
//!
//! Shared fixtures: a small CRM schema and two plugins whose forms exercise
//! field, lookup, collection and calculated bindings.

#![allow(missing_docs)]

use lcm_core::{LegacyComponent, MigrationDocument, Plugin};
use lcm_datapath::DataPath;
use lcm_entity::{CalculatedField, InMemorySchema, TableSchema};
use lcm_layout::{ControlInfo, ControlKind, Form, Rect};

pub fn path(text: &str) -> DataPath {
    DataPath::parse(text).unwrap()
}

/// ACCOUNT ← CONTACT → ADDRESS, plus a calculated account display name
pub fn sample_schema() -> InMemorySchema {
    InMemorySchema::new()
        .with_table(TableSchema::new("ACCOUNT", "ACCOUNTID", &["ACCOUNT", "TYPE"]))
        .with_table(TableSchema::new(
            "CONTACT",
            "CONTACTID",
            &["ACCOUNTID", "ACCOUNTNAME", "ADDRESSID", "LASTNAME", "FIRSTNAME"],
        ))
        .with_table(TableSchema::new("ADDRESS", "ADDRESSID", &["CITY"]))
        .with_calculated(CalculatedField {
            table: "ACCOUNT".into(),
            name: "DISPLAYNAME".into(),
            property_name: "DisplayName".into(),
            expression: "{ACCOUNT} ({TYPE})".into(),
        })
}

/// Two captioned edits, a lookup with a cached display column, a field
/// through a join, and a timer
pub fn contact_form() -> LegacyComponent {
    LegacyComponent::new("ContactForm", "TForm")
        .child(
            LegacyComponent::new("lblLastName", "TLabel")
                .at(8, 10, 60, 16)
                .with("Caption", "Last name"),
        )
        .child(
            LegacyComponent::new("edLastName", "TEdit")
                .at(76, 8, 120, 21)
                .with("DataPath", "CONTACT:LASTNAME"),
        )
        .child(
            LegacyComponent::new("lblFirstName", "TLabel")
                .at(8, 38, 60, 16)
                .with("Caption", "First name"),
        )
        .child(
            LegacyComponent::new("edFirstName", "TEdit")
                .at(76, 36, 120, 21)
                .with("DataPath", "CONTACT:FIRSTNAME"),
        )
        .child(
            LegacyComponent::new("edAccount", "TEdit")
                .at(76, 64, 120, 21)
                .with("LookupPath", "CONTACT:ACCOUNTID=ACCOUNT.ACCOUNTID!ACCOUNT")
                .with("TextPath", "CONTACT:ACCOUNTNAME"),
        )
        .child(
            LegacyComponent::new("edCity", "TEdit")
                .at(76, 92, 120, 21)
                .with("DataPath", "CONTACT:ADDRESSID=ADDRESS.ADDRESSID!CITY"),
        )
        .child(LegacyComponent::new("tmrRefresh", "TTimer").at(200, 0, 24, 24))
}

/// Account name, a calculated field, and a page control with a contact grid
pub fn account_form() -> LegacyComponent {
    LegacyComponent::new("AccountForm", "TForm")
        .child(
            LegacyComponent::new("edName", "TEdit")
                .at(8, 8, 200, 21)
                .with("DataPath", "ACCOUNT:ACCOUNT"),
        )
        .child(
            LegacyComponent::new("edDisplay", "TEdit")
                .at(216, 8, 200, 21)
                .with("DataPath", "ACCOUNT:@DISPLAYNAME"),
        )
        .child(
            LegacyComponent::new("pgDetails", "TPageControl")
                .at(8, 40, 408, 200)
                .child(
                    LegacyComponent::new("tsContacts", "TTabSheet").child(
                        LegacyComponent::new("grdContacts", "TDBGrid")
                            .at(0, 0, 400, 170)
                            .with("DataPath", "ACCOUNT:ACCOUNTID=CONTACT.ACCOUNTID!LASTNAME"),
                    ),
                )
                .child(
                    LegacyComponent::new("tsDetails", "TTabSheet").child(
                        LegacyComponent::new("edType", "TEdit")
                            .at(8, 8, 120, 21)
                            .with("DataPath", "ACCOUNT:TYPE"),
                    ),
                ),
        )
}

pub fn sample_document() -> MigrationDocument {
    MigrationDocument {
        schema: sample_schema(),
        plugins: vec![
            Plugin {
                name: "Contacts".into(),
                forms: vec![contact_form()],
            },
            Plugin {
                name: "Accounts".into(),
                forms: vec![account_form()],
            },
        ],
        ..MigrationDocument::default()
    }
}

pub fn sample_document_json() -> String {
    serde_json::to_string_pretty(&sample_document()).unwrap()
}

/// Form of standard controls at `rects`, named `c0`, `c1`, ...
pub fn form_of(rects: &[Rect]) -> Form {
    let mut form = Form::new("Generated");
    for (i, rect) in rects.iter().enumerate() {
        form.add_control(ControlInfo::new(format!("c{i}"), ControlKind::Standard, *rect));
    }
    form
}

/// Route `tracing` output through the test harness; `RUST_LOG` filters
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
