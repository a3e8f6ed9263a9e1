//! `lcm-migrate` command implementations
//!
//! The binary only parses arguments and prints; everything it does lives here
//! so it can be tested without spawning a process.

use anyhow::{anyhow, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use lcm_core::{
    LoggingOptions, MigrationConfig, MigrationDocument, MigrationReport, MigrationRun, NoProgress,
    Severity,
};
use lcm_datapath::DataPath;
use lcm_entity::JsonFileSink;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Entity model file written by `run`
pub const ENTITIES_FILE: &str = "entities.json";

/// Report file written by `run`
pub const REPORT_FILE: &str = "report.json";

/// Argument definitions
#[must_use]
pub fn cli() -> Command {
    Command::new("lcm-migrate")
        .version(lcm_core::VERSION)
        .about("Migrate legacy CRM forms and data bindings")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Run a migration over an input document")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .short('i')
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Input document (JSON)"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .value_parser(value_parser!(PathBuf))
                        .help("Configuration file (TOML)"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .default_value(".")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory for entities.json and report.json"),
                ),
        )
        .subcommand(
            Command::new("parse-path")
                .about("Show the structure of a legacy binding path")
                .arg(Arg::new("path").required(true).help("Binding text, e.g. CONTACT:LASTNAME"))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(Command::new("default-config").about("Print the default configuration"))
}

/// Arguments of `run`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// Input document
    pub input: PathBuf,
    /// Optional configuration file
    pub config: Option<PathBuf>,
    /// Output directory
    pub output: PathBuf,
}

impl RunArgs {
    /// Extract from parsed `run` arguments
    ///
    /// # Errors
    /// Fails if a required argument is missing
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let input = matches
            .get_one::<PathBuf>("input")
            .cloned()
            .ok_or_else(|| anyhow!("--input is required"))?;
        let output = matches
            .get_one::<PathBuf>("output")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self {
            input,
            config: matches.get_one::<PathBuf>("config").cloned(),
            output,
        })
    }
}

/// Configuration from `path`, or the defaults
///
/// # Errors
/// Fails if the file cannot be read or parsed
pub fn load_config(path: Option<&Path>) -> anyhow::Result<MigrationConfig> {
    match path {
        Some(path) => MigrationConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(MigrationConfig::default()),
    }
}

/// Install the global subscriber; `RUST_LOG` overrides the configured filter
pub fn init_tracing(options: &LoggingOptions) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let installed = if options.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        tracing::debug!("subscriber already installed");
    }
}

/// Execute `run`: migrate, then write the entity model and report
///
/// # Errors
/// Fails on unreadable input, an unwritable output directory, cancellation or
/// a sink failure
pub fn run_migration(args: &RunArgs, config: &MigrationConfig) -> anyhow::Result<MigrationReport> {
    let document = MigrationDocument::load(&args.input)
        .with_context(|| format!("loading input document {}", args.input.display()))?;
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("creating output directory {}", args.output.display()))?;

    let mut sink = JsonFileSink::new(args.output.join(ENTITIES_FILE));
    let report = MigrationRun::new(config.clone())
        .execute(&document, &mut sink, &mut NoProgress)
        .context("migration failed")?;

    let path = args.output.join(REPORT_FILE);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writer.flush()?;
    tracing::info!(path = %path.display(), "report written");

    Ok(report)
}

/// One-line outcome of a run
#[must_use]
pub fn summary(report: &MigrationReport) -> String {
    format!(
        "{} forms, {} bindings translated, {} entities created, {} relationships created, {} warnings, {} errors",
        report.forms.len(),
        report.translated_bindings(),
        report.persistence.created_entities,
        report.persistence.created_relationships,
        report.count(Severity::Warning),
        report.count(Severity::Error),
    )
}

/// Parsed structure of a binding path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathDescription {
    /// Table the path starts at
    pub root_table: String,
    /// Joins in walk order
    pub joins: Vec<String>,
    /// Table the field lives on
    pub target_table: String,
    /// Terminal field
    pub target_field: String,
    /// Field is calculated
    pub calculated: bool,
    /// Same path walked backward
    pub reversed: String,
}

impl PathDescription {
    /// Describe `path`
    #[must_use]
    pub fn new(path: &DataPath) -> Self {
        Self {
            root_table: path.root_table().to_string(),
            joins: path.joins().iter().map(ToString::to_string).collect(),
            target_table: path.target_table().to_string(),
            target_field: path.target_field().to_string(),
            calculated: path.is_calculated(),
            reversed: path.reverse().to_string(),
        }
    }
}

impl Display for PathDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "root table:   {}", self.root_table)?;
        for (i, join) in self.joins.iter().enumerate() {
            writeln!(f, "join {}:       {join}", i + 1)?;
        }
        writeln!(f, "target table: {}", self.target_table)?;
        writeln!(f, "target field: {}", self.target_field)?;
        writeln!(f, "calculated:   {}", self.calculated)?;
        write!(f, "reversed:     {}", self.reversed)
    }
}

/// Execute `parse-path`
///
/// # Errors
/// Fails if `text` is not a valid binding path
pub fn describe_path(text: &str) -> anyhow::Result<PathDescription> {
    let path = DataPath::parse(text).with_context(|| format!("parsing '{text}'"))?;
    Ok(PathDescription::new(&path))
}

/// Execute `default-config`
///
/// # Errors
/// Fails if the configuration cannot be rendered
pub fn default_config() -> anyhow::Result<String> {
    Ok(MigrationConfig::default().to_toml_string()?)
}
