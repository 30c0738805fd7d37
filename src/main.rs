//! uiverify - browser verification scenarios for the scheduling admin UI
//!
//! Main entry point for the CLI application.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use uiverify::cli::commands;
use uiverify::cli::RunOptions;
use uiverify::scenarios::ScenarioKind;
use uiverify::Config;

/// uiverify - scripted UI verification against a running instance
#[derive(Parser, Debug)]
#[command(name = "uiverify")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (default: ~/.config/uiverify/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run scenarios against their targets
    Run {
        /// Scenarios to run
        #[arg(value_enum)]
        scenarios: Vec<ScenarioKind>,

        /// Run every scenario
        #[arg(long, conflicts_with = "scenarios")]
        all: bool,

        /// Override the target URL of every selected scenario
        #[arg(long)]
        url: Option<String>,

        /// Run in headed browser mode (visible window)
        #[arg(long)]
        headed: bool,

        /// Directory screenshots are written below
        #[arg(long, short = 'o')]
        output_dir: Option<PathBuf>,

        /// Write a JSON report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Skip the HTTP reachability probe
        #[arg(long)]
        no_preflight: bool,

        /// Use fixture names without a run-unique suffix
        #[arg(long)]
        fixed_names: bool,

        /// Do not check selector contracts against the page
        #[arg(long)]
        skip_contract: bool,

        /// Exit 0 even when scenarios fail
        #[arg(long)]
        no_fail: bool,
    },

    /// List scenarios and their targets
    List,

    /// Show a scenario's selector contract
    Contract {
        #[arg(value_enum)]
        scenario: ScenarioKind,

        /// Write `<scenario>.toml` into this directory instead of printing
        #[arg(long)]
        write: Option<PathBuf>,
    },

    /// Show the default configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    uiverify::logging::init_cli(args.verbose);

    let mut config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load(),
    };

    match args.command {
        Command::Run {
            scenarios,
            all,
            url,
            headed,
            output_dir,
            report,
            no_preflight,
            fixed_names,
            skip_contract,
            no_fail,
        } => {
            // Apply CLI overrides
            if let Some(url) = url {
                config.set_all_targets(url);
            }
            if headed {
                config.browser.headed = true;
            }
            if let Some(dir) = output_dir {
                config.run.output_dir = dir;
            }
            if no_preflight {
                config.run.preflight = false;
            }
            if fixed_names {
                config.fixtures.unique_names = false;
            }

            let scenarios = if all || scenarios.is_empty() {
                ScenarioKind::ALL.to_vec()
            } else {
                scenarios
            };

            let options = RunOptions {
                scenarios,
                report,
                skip_contract,
            };
            let run = commands::run_scenarios(&config, &options).await?;

            if run.all_passed() || no_fail {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }

        Command::List => {
            println!("{}", commands::list(&config)?);
            Ok(ExitCode::SUCCESS)
        }

        Command::Contract { scenario, write } => {
            println!("{}", commands::contract(scenario, &config, write.as_deref())?);
            Ok(ExitCode::SUCCESS)
        }

        Command::Config { init } => {
            println!("{}", commands::config(init)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
