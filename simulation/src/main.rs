use anyhow::Context;
use clap::{Parser, Subcommand};

use fee_recycler_simulation::{create_example_config, ScenarioConfig, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "recycler-sim")]
#[command(about = "Replay fee recycler scenarios against an in-memory curve engine")]
struct Args {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario and print its report as JSON
    Run {
        /// Path to scenario configuration file
        #[arg(short, long, default_value = "scenario.toml")]
        config: String,
    },
    /// Write an example scenario
    Init {
        /// Path of the scenario file to create
        #[arg(short, long, default_value = "scenario.toml")]
        config: String,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .init();

    match args.command {
        Command::Init { config } => {
            create_example_config(&config)
                .with_context(|| format!("writing example scenario to {}", config))?;
            log::info!("Wrote example scenario to {}", config);
        }
        Command::Run { config } => {
            let scenario = ScenarioConfig::load(&config)
                .with_context(|| format!("loading scenario {}", config))?;
            log::info!("Running scenario '{}'", scenario.name);

            let mut runner = ScenarioRunner::new(scenario)?;
            let report = runner.run();
            if !report.conserved {
                log::error!("Token conservation violated");
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
