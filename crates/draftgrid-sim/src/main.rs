use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use draftgrid_core::GridConfig;
use draftgrid_sim::{run, Scenario};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("draftgrid-sim")
        .version(draftgrid_core::VERSION)
        .about("Replay scripted editing sessions against an in-memory grid")
        .subcommand_required(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .subcommand(
            Command::new("run")
                .about("Replay a scenario and print the final grid state as JSON")
                .arg(
                    Arg::new("scenario")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Scenario TOML file"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Grid config TOML file"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Print the default grid config as TOML"),
        )
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("draftgrid=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run_command(args: &ArgMatches) -> anyhow::Result<()> {
    let Some(path) = args.get_one::<PathBuf>("scenario") else {
        anyhow::bail!("missing scenario path");
    };
    let scenario = Scenario::load(path)?;
    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => GridConfig::load(path)?,
        None => GridConfig::default(),
    };

    let outcome = run(&scenario, config).await?;
    let rendered = serde_json::to_string_pretty(&outcome).context("cannot render outcome")?;
    println!("{rendered}");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let result = match matches.subcommand() {
        Some(("run", args)) => run_command(args).await,
        Some(("config", _)) => GridConfig::default()
            .to_toml_string()
            .map(|toml| print!("{toml}"))
            .map_err(anyhow::Error::from),
        _ => Err(anyhow::anyhow!("unknown command")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
