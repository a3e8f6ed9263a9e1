//! Command tests without spawning the binary

use lcm_cli::{
    cli, default_config, describe_path, load_config, run_migration, summary, RunArgs, ENTITIES_FILE,
    REPORT_FILE,
};
use lcm_core::MigrationConfig;
use lcm_entity::EntityModel;
use lcm_test_utils::sample_document_json;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

#[test]
fn run_arguments_parse() {
    let matches = cli()
        .try_get_matches_from(["lcm-migrate", "run", "--input", "doc.json", "-o", "out"])
        .unwrap();
    let (name, sub) = matches.subcommand().unwrap();
    assert_eq!(name, "run");
    assert_eq!(
        RunArgs::from_matches(sub).unwrap(),
        RunArgs {
            input: PathBuf::from("doc.json"),
            config: None,
            output: PathBuf::from("out"),
        }
    );
}

#[test]
fn run_requires_input() {
    assert!(cli().try_get_matches_from(["lcm-migrate", "run"]).is_err());
}

#[test]
fn parse_path_describes_joins() {
    let description = describe_path("CONTACT:ADDRESSID=ADDRESS.ADDRESSID!CITY").unwrap();
    assert_eq!(description.root_table, "CONTACT");
    assert_eq!(description.joins, vec!["CONTACT.ADDRESSID=ADDRESS.ADDRESSID"]);
    assert_eq!(description.target_table, "ADDRESS");
    assert_eq!(description.target_field, "CITY");
    assert!(!description.calculated);
    assert_eq!(description.reversed, "ADDRESS:ADDRESSID=CONTACT.ADDRESSID!CITY");

    let text = description.to_string();
    assert!(text.contains("join 1:"));
}

#[test]
fn parse_path_rejects_garbage() {
    let err = describe_path("no separator").unwrap_err();
    assert!(err.to_string().contains("no separator"));
}

#[test]
fn default_config_round_trips() {
    let text = default_config().unwrap();
    assert!(text.contains("[layout]"));
    assert_eq!(MigrationConfig::from_toml_str(&text).unwrap(), MigrationConfig::default());
}

#[test]
fn config_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lcm.toml");
    std::fs::write(&path, "[alignment]\nenabled = false\n").unwrap();

    let config = load_config(Some(path.as_path())).unwrap();
    assert!(!config.alignment.enabled);
    assert_eq!(load_config(None).unwrap(), MigrationConfig::default());
    assert!(load_config(Some(dir.path().join("missing.toml").as_path())).is_err());
}

#[test]
fn run_writes_model_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("doc.json");
    std::fs::write(&input, sample_document_json()).unwrap();
    let args = RunArgs {
        input,
        config: None,
        output: dir.path().join("out"),
    };

    let report = run_migration(&args, &MigrationConfig::default()).unwrap();

    let model: EntityModel =
        serde_json::from_str(&std::fs::read_to_string(args.output.join(ENTITIES_FILE)).unwrap()).unwrap();
    assert_eq!(model.entity_count(), 3);
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(args.output.join(REPORT_FILE)).unwrap()).unwrap();
    assert_eq!(written["run_id"], report.run_id.to_string());
    assert!(summary(&report).starts_with("2 forms, 8 bindings translated"));
}

#[test]
fn run_reports_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let args = RunArgs {
        input: dir.path().join("absent.json"),
        config: None,
        output: dir.path().to_path_buf(),
    };
    let err = run_migration(&args, &MigrationConfig::default()).unwrap_err();
    assert!(err.to_string().contains("loading input document"));
}
