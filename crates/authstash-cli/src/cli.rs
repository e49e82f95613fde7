use std::path::PathBuf;

use authstash_types::KeyCategory;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "authstash",
    about = "Inspect and edit a session's stored auth state",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Session configuration file (TOML)
    #[arg(short, long, global = true, default_value = "authstash.toml")]
    pub config: PathBuf,

    /// Local directory mirroring the object store, one subdirectory per
    /// bucket. The configured access key, secret and region are not used.
    #[arg(long, global = true, default_value = "objects")]
    pub objects_root: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Open the session, generating credentials if none are stored
    Init,
    /// Show a summary of the stored credentials
    Creds,
    /// Print stored records
    Get(RecordArgs),
    /// Delete stored records
    Delete(RecordArgs),
    /// Show where a record is stored
    Location(LocationArgs),
}

#[derive(Args)]
pub struct RecordArgs {
    pub category: KeyCategory,
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Args)]
pub struct LocationArgs {
    pub category: KeyCategory,
    pub id: String,
}
