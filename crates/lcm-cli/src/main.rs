//! `lcm-migrate`: legacy CRM migration from the command line

use anyhow::anyhow;
use lcm_cli::{cli, default_config, describe_path, init_tracing, load_config, run_migration, summary, RunArgs};
use lcm_core::Severity;

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("run", args)) => {
            let run = RunArgs::from_matches(args)?;
            let config = load_config(run.config.as_deref())?;
            init_tracing(&config.logging);

            let report = run_migration(&run, &config)?;
            println!("{}", summary(&report));
            if report.count(Severity::Error) > 0 {
                std::process::exit(1);
            }
        }
        Some(("parse-path", args)) => {
            let text = args
                .get_one::<String>("path")
                .ok_or_else(|| anyhow!("missing path"))?;
            let description = describe_path(text)?;
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&description)?);
            } else {
                println!("{description}");
            }
        }
        Some(("default-config", _)) => {
            print!("{}", default_config()?);
        }
        _ => {}
    }
    Ok(())
}
