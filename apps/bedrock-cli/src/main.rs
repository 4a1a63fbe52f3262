//! # Bedrock Console CLI
//!
//! Drives the [`Store`] the way the console views do: restore the session,
//! run one action, show its result and the notification it left behind.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bedrock <command>                                                      │
//! │     │                                                                   │
//! │     ├─► ClientConfig::load (client.toml + BEDROCK_* env)                │
//! │     ├─► Store (FileStorage, or MemoryStorage with --ephemeral)          │
//! │     ├─► check_auth (skipped for login and theme)                        │
//! │     ├─► dispatch(Command)                                               │
//! │     └─► stdout: result    stderr: notification                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod render;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use bedrock_client::{ClientConfig, MemoryStorage};
use bedrock_core::{ResourceId, ResourceKind};
use bedrock_store::{Command, Store, StoreResult};

#[derive(Parser)]
#[command(name = "bedrock", author, version, about = "Bedrock inventory console")]
struct Cli {
    /// Path to client.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Keep tokens in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the token pair
    Login {
        #[arg(short, long)]
        username: String,
        /// Read from stdin when omitted
        #[arg(short, long, env = "BEDROCK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show session and preferences
    Status,
    /// List every record of a kind
    List {
        kind: ResourceKind,
        /// Print the raw JSON array
        #[arg(long)]
        json: bool,
    },
    /// Show one record
    Show { kind: ResourceKind, id: ResourceId },
    /// Create a record from a JSON object
    Create { kind: ResourceKind, body: String },
    /// Update a record; the JSON object must carry its id
    Update { kind: ResourceKind, body: String },
    Delete { kind: ResourceKind, id: ResourceId },
    /// Show or set the theme
    Theme { mode: Option<ThemeMode> },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeMode {
    Dark,
    Light,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "info,bedrock=debug"
        } else {
            "warn,bedrock=info"
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ClientConfig::load(cli.config.clone()).context("loading client config")?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
        config.validate()?;
    }

    let store = if cli.ephemeral {
        Store::new(config, Arc::new(MemoryStorage::new()))?
    } else {
        Store::from_config(config)?
    };

    run(&store, cli.command).await
}

async fn run(store: &Store, command: Commands) -> Result<()> {
    // restoring the session may already raise a notification
    if !matches!(command, Commands::Login { .. } | Commands::Theme { .. }) {
        if let Err(err) = store.check_auth().await {
            debug!(error = %err, "Stored session not restored");
        }
    }

    let outcome = match command {
        Commands::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            store
                .dispatch(Command::Login { username, password })
                .await
                .map(|_| render::status(store))
        }
        Commands::Logout => store.dispatch(Command::Logout).await,
        Commands::Status => Ok(render::status(store)),
        Commands::List { kind, json } => {
            let listed = store.dispatch(Command::FetchResources(kind)).await;
            match listed {
                Ok(Value::Array(records)) if !json => {
                    render::print_table(kind, &records);
                    Ok(Value::Null)
                }
                other => other,
            }
        }
        Commands::Show { kind, id } => store.dispatch(Command::FetchResource { kind, id }).await,
        Commands::Create { kind, body } => {
            let resource = parse_body(&body)?;
            store
                .dispatch(Command::CreateResource { kind, resource })
                .await
        }
        Commands::Update { kind, body } => {
            let resource = parse_body(&body)?;
            store
                .dispatch(Command::UpdateResource { kind, resource })
                .await
        }
        Commands::Delete { kind, id } => store.dispatch(Command::DeleteResource { kind, id }).await,
        Commands::Theme { mode } => {
            if let Some(mode) = mode {
                store.theme().set_dark(matches!(mode, ThemeMode::Dark))?;
            }
            let dark = store.theme().is_dark()?;
            Ok(Value::from(if dark { "dark" } else { "light" }))
        }
    };

    finish(store, outcome)
}

/// Prints the result and the latest notification. A failed action exits
/// non-zero; its message has already been shown as the notification.
/// Rejected credentials add a hint to log in again.
fn finish(store: &Store, outcome: StoreResult<Value>) -> Result<()> {
    if let Some(notification) = store.notification() {
        render::print_notification(&notification);
    }
    match outcome {
        Ok(Value::Null) => Ok(()),
        Ok(Value::String(text)) => {
            println!("{}", text);
            Ok(())
        }
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(err) if err.is_auth_rejected() => {
            bail!("{}\nRun `bedrock login` to sign in again", err)
        }
        Err(err) => bail!("{}", err),
    }
}

fn parse_body(body: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(body).context("body must be JSON")?;
    if !value.is_object() {
        bail!("body must be a JSON object");
    }
    Ok(value)
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
