//! MrGaze configuration tool: entry point.
//!
//! Inspects and edits the `mrgaze.cfg` that the pipeline would use for a data
//! directory and optional subject/session subdirectory.
//!
//! # Usage
//!
//! ```text
//! mrgaze-config --data-dir <DIR> [--subj-sess <PATH>] [--json] [-v] <COMMAND>
//!
//! Commands:
//!   show                          Print the effective configuration
//!   get  <SECTION> <OPTION>       Print one value
//!   set  <SECTION> <OPTION> <VAL> Change one value (saved to the root file)
//!   init [--force]                Write the default configuration
//!   path                          Print the file the configuration comes from
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable            | Description                     |
//! |---------------------|---------------------------------|
//! | `MRGAZE_DATA_DIR`   | Data directory (`--data-dir`)   |
//! | `MRGAZE_SUBJ_SESS`  | Subject/session (`--subj-sess`) |
//! | `RUST_LOG`          | Log filter (overrides `-v`)     |
//!
//! Logs go to stderr so stdout carries only the requested output.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mrgaze_config::application::manage_config::ManageConfigUseCase;
use mrgaze_config::infrastructure::storage::config::FsConfigStore;
use mrgaze_core::Value;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inspect and edit MrGaze pipeline configuration files.
#[derive(Debug, Parser)]
#[command(
    name = "mrgaze-config",
    about = "Inspect and edit MrGaze pipeline configuration files",
    version
)]
struct Cli {
    /// Root data directory holding `mrgaze.cfg`.
    #[arg(long, env = "MRGAZE_DATA_DIR")]
    data_dir: PathBuf,

    /// Subject/session subdirectory whose `mrgaze.cfg` takes precedence.
    #[arg(long, default_value = "", env = "MRGAZE_SUBJ_SESS")]
    subj_sess: String,

    /// Print JSON instead of INI text.
    #[arg(long)]
    json: bool,

    /// Log store activity at info level.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the effective configuration.
    Show,
    /// Print one option's value.
    Get { section: String, option: String },
    /// Set one option and save to the root file.
    Set {
        section: String,
        option: String,
        value: String,
    },
    /// Write the default configuration to the root file.
    Init {
        /// Overwrite an existing root file.
        #[arg(long)]
        force: bool,
    },
    /// Print the path of the file the configuration is read from.
    Path,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Structured logging on stderr.  `RUST_LOG` wins over `--verbose`.
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = FsConfigStore::new(&cli.data_dir);
    let use_case = ManageConfigUseCase::new(store);

    match cli.command {
        Command::Show => {
            let resolved = use_case
                .show(&cli.subj_sess)
                .context("failed to resolve configuration")?;
            info!("using {}", resolved.origin);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&resolved.config)?);
            } else {
                print!("{}", resolved.config);
            }
        }
        Command::Get { section, option } => {
            if cli.json {
                let value = use_case
                    .get_typed_value(&cli.subj_sess, &section, &option)
                    .with_context(|| format!("failed to read [{section}] {option}"))?;
                println!("{}", value_to_json(value));
            } else {
                let value = use_case
                    .get_value(&cli.subj_sess, &section, &option)
                    .with_context(|| format!("failed to read [{section}] {option}"))?;
                println!("{value}");
            }
        }
        Command::Set {
            section,
            option,
            value,
        } => {
            let path = use_case
                .set_value(&cli.subj_sess, &section, &option, &value)
                .with_context(|| format!("failed to set [{section}] {option}"))?;
            println!("{}", path.display());
        }
        Command::Init { force } => {
            let path = use_case
                .reset_defaults(force)
                .context("failed to write default configuration")?;
            println!("{}", path.display());
        }
        Command::Path => {
            println!("{}", use_case.locate(&cli.subj_sess).display());
        }
    }

    Ok(())
}

/// Converts a typed configuration value to JSON.  Non-finite floats become
/// `null`.
fn value_to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Text(s) => serde_json::Value::String(s),
        Value::Bool(b) => serde_json::Value::Bool(b),
        Value::Int(i) => serde_json::Value::from(i),
        Value::Float(f) => float_to_json(f),
        Value::FloatList(items) => {
            serde_json::Value::Array(items.into_iter().map(float_to_json).collect())
        }
    }
}

fn float_to_json(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}
