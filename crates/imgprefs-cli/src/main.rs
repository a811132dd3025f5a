//! `imgprefs`: inspect and manage the imaging application's preferences.
//!
//! # Usage
//!
//! ```text
//! imgprefs [-v] <COMMAND>
//!
//! Commands:
//!   defaults   Print the built-in default preferences
//!   show       Print the effective preferences (defaults + file + --set)
//!   validate   Check the preferences file and overrides; exit 1 on error
//!   paths      Print the expanded data directories, one per line
//!   init       Write the defaults to the preferences file
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable           | Default                        | Description               |
//! |--------------------|--------------------------------|---------------------------|
//! | `IMGPREFS_FILE`    | platform config dir/prefs.toml | Preferences file          |
//! | `IMGPREFS_POLICY`  | `reject`                       | Unknown-key policy        |
//! | `RUST_LOG`         | `warn`                         | Log filter (stderr)       |

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use imgprefs_cli::application::init_prefs::write_default_preferences;
use imgprefs_cli::application::resolve::{resolve, ResolveRequest};
use imgprefs_cli::infrastructure::env::ProcessEnv;
use imgprefs_core::{defaults, DocumentFormat, UnknownKeyPolicy};

// ── CLI argument definitions ──────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "imgprefs",
    about = "Inspect and manage imaging application preferences",
    version
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    ///
    /// Ignored when `RUST_LOG` is set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the built-in default preferences.
    Defaults {
        #[arg(long, value_enum, default_value_t = OutputFormat::Toml)]
        format: OutputFormat,
    },
    /// Print the effective preferences.
    Show {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Toml)]
        format: OutputFormat,
    },
    /// Check the preferences file and overrides.
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the data directories with placeholders expanded.
    Paths {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Write the defaults to the preferences file.
    Init {
        /// Target file; defaults to the platform location.
        #[arg(long, env = "IMGPREFS_FILE")]
        file: Option<PathBuf>,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Where the effective preferences come from.
#[derive(Debug, Args)]
struct SourceArgs {
    /// Preferences file (`.toml` or `.json`).
    #[arg(long, env = "IMGPREFS_FILE")]
    file: Option<PathBuf>,

    /// Override one key, e.g. `--set imageOpts.scale=log`.  Repeatable.
    #[arg(long = "set", value_name = "SECTION.KEY=VALUE")]
    sets: Vec<String>,

    /// What to do with keys that are not part of the schema.
    #[arg(long, value_enum, default_value_t = PolicyArg::Reject, env = "IMGPREFS_POLICY")]
    policy: PolicyArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Toml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Reject,
    Ignore,
}

impl From<OutputFormat> for DocumentFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Json => DocumentFormat::Json,
            OutputFormat::Toml => DocumentFormat::Toml,
        }
    }
}

impl From<PolicyArg> for UnknownKeyPolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::Reject => UnknownKeyPolicy::Reject,
            PolicyArg::Ignore => UnknownKeyPolicy::Ignore,
        }
    }
}

impl SourceArgs {
    fn into_request(self) -> ResolveRequest {
        ResolveRequest {
            file: self.file,
            sets: self.sets,
            policy: self.policy.into(),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the printed preferences.
    let fallback = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();

    match cli.command {
        Command::Defaults { format } => {
            let text = defaults()
                .render(format.into())
                .context("failed to render default preferences")?;
            print!("{text}");
        }
        Command::Show { source, format } => {
            let resolved = resolve(&source.into_request(), &ProcessEnv)
                .context("failed to resolve preferences")?;
            let text = resolved
                .preferences
                .render(format.into())
                .context("failed to render preferences")?;
            print!("{text}");
        }
        Command::Validate { source } => {
            let resolved = resolve(&source.into_request(), &ProcessEnv)
                .context("preferences are invalid")?;
            match resolved.source {
                Some(path) => println!("ok: {}", path.display()),
                None => println!("ok: built-in defaults"),
            }
        }
        Command::Paths { source } => {
            let resolved = resolve(&source.into_request(), &ProcessEnv)
                .context("failed to resolve preferences")?;
            for dir in resolved.data_dirs {
                println!("{}", dir.display());
            }
        }
        Command::Init { file, force } => {
            let path = write_default_preferences(file.as_deref(), force)
                .context("failed to write preferences file")?;
            info!(path = %path.display(), "initialised preferences");
            println!("{}", path.display());
        }
    }

    Ok(())
}
