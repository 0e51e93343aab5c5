use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use passvault_core::VERSION;

use crate::constants::env_vars;

/// Passvault - a personal password vault, encrypted under your passphrase
#[derive(Parser)]
#[command(name = "passvault")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = env_vars::CONFIG)]
    pub config: Option<String>,

    /// Path to the vault database
    #[arg(long, global = true, env = env_vars::DATABASE)]
    pub db: Option<String>,

    /// User whose records to work with
    #[arg(short, long, global = true, env = env_vars::USER)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// PBKDF2 iterations for newly created profiles
    #[arg(long)]
    pub kdf_iterations: Option<u32>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `profile` command
#[derive(Args)]
pub struct ProfileArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Service name (e.g. "Bank")
    #[arg(value_name = "SERVICE")]
    pub service: String,

    /// Username for the service
    #[arg(long)]
    pub username: String,

    /// Service URL
    #[arg(long)]
    pub url: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub comments: Option<String>,

    /// Category to file the record under
    #[arg(long, default_value = "personal")]
    pub category: String,

    /// Read the secret from stdin instead of prompting
    #[arg(long)]
    pub secret_stdin: bool,
}

/// Arguments for the `edit` command
#[derive(Args)]
pub struct EditArgs {
    /// Record ID or service name
    #[arg(value_name = "RECORD")]
    pub record: String,

    /// Rename the service
    #[arg(long)]
    pub service: Option<String>,

    /// New username
    #[arg(long)]
    pub username: Option<String>,

    /// New service URL
    #[arg(long)]
    pub url: Option<String>,

    /// New notes
    #[arg(long)]
    pub comments: Option<String>,

    /// Move the record to another category
    #[arg(long)]
    pub category: Option<String>,

    /// Read a new secret from stdin
    #[arg(long)]
    pub secret_stdin: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Only records in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Record ID or service name
    #[arg(value_name = "RECORD")]
    pub record: String,

    /// Print the secret in clear text
    #[arg(long)]
    pub reveal: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Record ID or service name
    #[arg(value_name = "RECORD")]
    pub record: String,
}

/// Arguments for the `import` command
#[derive(Args)]
pub struct ImportArgs {
    /// Flat-text dump to import
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,

    /// Category to import into (overrides config)
    #[arg(long)]
    pub category: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    pub shell: Shell,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a config file and create the vault database
    Init(InitArgs),

    /// Show (and create on first use) your encryption profile
    Profile(ProfileArgs),

    /// Add a record
    Add(AddArgs),

    /// Change a record
    Edit(EditArgs),

    /// List records
    List(ListArgs),

    /// Show a record
    Show(ShowArgs),

    /// Delete a record
    Delete(DeleteArgs),

    /// Import records from a flat-text dump
    Import(ImportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
