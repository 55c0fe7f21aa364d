use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

/// Behaviour switches for `ArchiveManager`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Emit info/warning/error lines, with timings, for every call.
    pub logging: bool,

    /// Fail `get_to_buffer` on a size mismatch instead of only warning,
    /// matching `get_to_file`.
    pub strict_buffer_size: bool,
}

/// Centralized application configuration for the `object-archive` binary.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_dir: String,
    pub database_url: String,
    pub archive: ArchiveConfig,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Object storage with archive-tier restores")]
pub struct Args {
    /// Log every operation (overrides OBJECT_ARCHIVE_LOGGING)
    #[arg(long)]
    pub logging: bool,

    /// Treat buffer download size mismatches as errors
    #[arg(long)]
    pub strict_buffer_size: bool,

    /// Directory where object payloads are stored (overrides OBJECT_ARCHIVE_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides OBJECT_ARCHIVE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a bucket in the local store
    CreateBucket {
        bucket: String,
        #[arg(long, default_value = "local")]
        region: String,
    },
    /// Delete a bucket together with every object in it
    DeleteBucket { bucket: String },
    /// Print object attributes as JSON
    Stat { bucket: String, key: String },
    /// Download an object to a file, or to stdout when the path is `-`
    Get {
        bucket: String,
        key: String,
        path: PathBuf,
    },
    /// Upload a file
    Put {
        bucket: String,
        key: String,
        path: PathBuf,
        /// Store under this storage class instead of STANDARD
        #[arg(long)]
        storage_class: Option<String>,
    },
    /// Start restoring an archived object
    Restore {
        bucket: String,
        key: String,
        /// expedited, standard or bulk
        #[arg(long, default_value = "standard")]
        tier: String,
        #[arg(long, default_value_t = 1)]
        days: u32,
    },
    /// Delete an object (absent keys are not an error)
    Delete { bucket: String, key: String },
    /// Move an object into the archive storage class
    Archive { bucket: String, key: String },
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig, the migrate flag
    /// and the requested command.
    pub fn from_env_and_args() -> Result<(Self, bool, Option<Command>)> {
        let args = Args::parse();
        let cfg = Self::merge(&args)?;
        Ok((cfg, args.migrate, args.command))
    }

    fn merge(args: &Args) -> Result<Self> {
        // --- Environment fallback ---
        let env_logging = match env::var("OBJECT_ARCHIVE_LOGGING") {
            Ok(value) => parse_flag(&value)
                .with_context(|| format!("parsing OBJECT_ARCHIVE_LOGGING value `{}`", value))?,
            Err(env::VarError::NotPresent) => false,
            Err(err) => return Err(err).context("reading OBJECT_ARCHIVE_LOGGING"),
        };
        let env_storage =
            env::var("OBJECT_ARCHIVE_STORAGE_DIR").unwrap_or_else(|_| "./data/objects".into());
        let env_db = env::var("OBJECT_ARCHIVE_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/object_archive.db".into());

        // --- Merge ---
        Ok(Self {
            storage_dir: args.storage_dir.clone().unwrap_or(env_storage),
            database_url: args.database_url.clone().unwrap_or(env_db),
            archive: ArchiveConfig {
                logging: args.logging || env_logging,
                strict_buffer_size: args.strict_buffer_size,
            },
        })
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got `{}`", other),
    }
}
