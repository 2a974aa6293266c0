//! plccoms command line tool
//!
//! Polls a Tecomat Foxtrot PLC through PLCComS and prints every published
//! result as JSON. Configuration comes from an optional TOML file, then
//! `PLCCOMS_*` environment variables, then the command line.
//!
//! Usage: plccoms --host 192.168.1.10 [poll|once|info|list|set]
//! Example: plccoms --config foxtrot.toml once --sensors

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use plccoms::config::ENV_PREFIX;
use plccoms::sensor::{display_value, entity_name, unique_id};
use plccoms::{
    classify, PlcConfig, PlcValue, PollCoordinator, PollResult, SensorDescription,
};

/// Tecomat Foxtrot PLCComS poller
#[derive(Parser)]
#[command(name = "plccoms")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// PLCComS host, overrides configuration
    #[arg(long, global = true)]
    host: Option<String>,

    /// PLCComS port, overrides configuration
    #[arg(long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll at the configured interval until Ctrl-C (default)
    Poll,

    /// Run a single poll cycle
    Once {
        /// Print sensor descriptions instead of bare values
        #[arg(long)]
        sensors: bool,
    },

    /// Print PLC diagnostics
    Info,

    /// List the variables published by the server
    List {
        /// Apply the configured include/exclude patterns
        #[arg(long)]
        filtered: bool,
    },

    /// Write one variable
    Set {
        name: String,
        value: String,
    },
}

#[derive(Serialize)]
struct SensorEntry {
    unique_id: String,
    name: String,
    value: PlcValue,
    #[serde(flatten)]
    description: SensorDescription,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config);

    let coordinator = PollCoordinator::from_config(&config);
    info!(endpoint = %config.endpoint(), "{}", plccoms::info());

    match cli.command.unwrap_or(Commands::Poll) {
        Commands::Poll => {
            let initial = coordinator.first_refresh().await?;
            print_json(&*initial)?;

            let mut updates = coordinator.subscribe();
            let printer = async {
                while updates.changed().await.is_ok() {
                    let result = updates.borrow_and_update().clone();
                    if let Err(e) = print_json(&*result) {
                        error!(error = %e, "Failed to print result");
                    }
                }
            };

            tokio::select! {
                _ = coordinator.run(shutdown_signal()) => {}
                _ = printer => {}
            }
        }
        Commands::Once { sensors } => {
            let result = coordinator.refresh().await?;
            if sensors {
                print_json(&sensor_entries(&config.endpoint(), &result))?;
            } else {
                print_json(&*result)?;
            }
        }
        Commands::Info => {
            let snapshot = coordinator.diagnostics().await?;
            print_json(&snapshot)?;
        }
        Commands::List { filtered } => {
            let names = coordinator.client().list_variables().await?;
            let names = if filtered {
                config.filter().apply(&names)
            } else {
                names
            };
            print_json(&names)?;
        }
        Commands::Set { name, value } => {
            coordinator.client().set_variable(&name, &value).await?;
            info!(variable = %name, value = %value, "Variable written");
        }
    }

    coordinator.client().disconnect().await;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<PlcConfig, Box<dyn std::error::Error>> {
    let mut figment = Figment::new();
    if let Some(path) = &cli.config {
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Env::prefixed(ENV_PREFIX));
    if let Some(host) = &cli.host {
        figment = figment.merge(Serialized::default("host", host));
    }
    if let Some(port) = cli.port {
        figment = figment.merge(Serialized::default("port", port));
    }
    Ok(PlcConfig::from_figment(figment)?)
}

/// RUST_LOG wins over the configured level.
fn init_logging(config: &PlcConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.directive(config.detailed_logging)));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Cannot listen for Ctrl-C, polling until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

fn sensor_entries(entry_id: &str, result: &PollResult) -> BTreeMap<String, SensorEntry> {
    result
        .iter()
        .map(|(variable, value)| {
            let entry = SensorEntry {
                unique_id: unique_id(entry_id, variable),
                name: entity_name(variable),
                value: display_value(value),
                description: classify(variable, value),
            };
            (variable.clone(), entry)
        })
        .collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
