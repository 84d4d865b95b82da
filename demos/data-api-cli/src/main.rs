//! NYPL Data API CLI
//!
//! Thin command-line front end for the Data API client.
//!
//! Configuration comes from the environment (or a `.env` file):
//! `NYPL_API_BASE_URL`, `NYPL_OAUTH_KEY`, `NYPL_OAUTH_SECRET`, `NYPL_OAUTH_URL`, `LOG_LEVEL`.
//!
//! Run with: cargo run -p nypl-data-api-cli -- get current-schemas/Item --no-auth

mod diff;
mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use console::style;
use nypl_data_api_client::{ClientConfig, DataApiClient, LogLevel, Payload, RequestOptions};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "nypl-data-api")]
#[command(about = "Query and update the NYPL Data API")]
struct Cli {
    /// Log level (trace, debug, info, warn, error, silent); overrides LOG_LEVEL
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Get arbitrary endpoint
    Get {
        /// Path relative to the API base URL (e.g. bibs/sierra-nypl/17746307)
        path: String,

        /// Skip authentication
        #[arg(long)]
        no_auth: bool,

        /// Print the raw response text instead of parsed JSON
        #[arg(long)]
        text: bool,
    },

    /// Post a JSON file to an endpoint
    Post {
        /// Path relative to the API base URL
        path: String,

        /// JSON file to send
        jsonfile: PathBuf,
    },

    /// Schema operations
    Schema {
        #[command(subcommand)]
        command: SchemaCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SchemaCommand {
    /// Post a version of a schema
    Post {
        /// Schema name (e.g. Item)
        name: String,

        /// JSON file holding the schema
        jsonfile: PathBuf,

        /// Upload without asking for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

fn init_tracing(level: LogLevel) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// A missing `.env` is normal; anything else is worth telling the user about
fn dotenv_warning(loaded: &dotenvy::Result<PathBuf>) -> Option<String> {
    match loaded {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env");
            None
        }
        Err(e) if e.not_found() => None,
        Err(e) => Some(format!("Could not load .env file: {e}")),
    }
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// The file must be a record-like JSON object that parses as an Avro schema
fn check_schema(schema: &Value) -> anyhow::Result<()> {
    if !schema.is_object() {
        bail!("Error parsing schema: expected a JSON object");
    }
    apache_avro::Schema::parse_str(&schema.to_string())
        .map_err(|e| anyhow::anyhow!("Error parsing schema: {e}"))?;
    Ok(())
}

async fn do_get(client: &DataApiClient, path: &str, no_auth: bool, text: bool) -> anyhow::Result<()> {
    println!("get path: {}", style(path).cyan());
    let options = RequestOptions::builder()
        .authenticate(!no_auth)
        .json(!text)
        .build();

    let payload = client.get(path, Some(options)).await?;
    output::print_payload(payload.as_ref());
    Ok(())
}

async fn do_post(client: &DataApiClient, path: &str, content: Value) -> anyhow::Result<()> {
    println!("client.post({path}, {content})");
    client.post(path, content, None).await?;
    println!("{} {path}", style("Done writing").green());
    Ok(())
}

async fn schema_post(
    client: &DataApiClient,
    name: &str,
    jsonfile: &Path,
    yes: bool,
) -> anyhow::Result<()> {
    println!(
        "Posting new {name} schema from {}",
        style(jsonfile.display()).cyan()
    );

    let next = read_json(jsonfile)?;
    check_schema(&next)?;
    println!("Schema looks like a schema.");

    let spinner = cliclack::spinner();
    spinner.start(format!("Fetching current {name} schema"));
    let previous = match client.get(&format!("current-schemas/{name}"), None).await {
        Ok(Some(Payload::Json(current))) => {
            spinner.stop(format!("Fetched current {name} schema"));
            current.get("schemaObject").cloned()
        }
        Ok(_) => {
            spinner.stop(format!("No current {name} schema"));
            None
        }
        Err(e) => {
            spinner.error(format!("Error fetching {name} ({e})"));
            None
        }
    };

    if let Some(previous) = &previous {
        output::print_json_diff(previous, &next);
    }

    if !yes && !cliclack::confirm("Really upload?").interact()? {
        println!("Aborting.");
        return Ok(());
    }

    do_post(client, &format!("schemas/{name}"), next).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = ClientConfig::default();
    if let Some(level) = &cli.log_level {
        config.log_level = Some(level.parse()?);
    }
    let config = config.with_env_fallback()?;
    init_tracing(config.log_level());

    if let Some(warning) = dotenv_warning(&dotenv) {
        output::print_warning(&warning);
    }

    let client = DataApiClient::builder()
        .config(config)
        .without_env_fallback()
        .build()?;

    let result = match cli.command {
        Command::Get {
            path,
            no_auth,
            text,
        } => do_get(&client, &path, no_auth, text).await,
        Command::Post { path, jsonfile } => {
            let content = read_json(&jsonfile)?;
            do_post(&client, &path, content).await
        }
        Command::Schema {
            command: SchemaCommand::Post {
                name,
                jsonfile,
                yes,
            },
        } => schema_post(&client, &name, &jsonfile, yes).await,
    };

    if let Err(e) = &result {
        output::print_error(&format!("{e:#}"));
    }
    result
}
