//! CLI command implementations.

pub mod cart;
pub mod config;
pub mod session;
pub mod shell;

use clap::{Args, Subcommand};

/// Arguments for the add command.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct AddArgs {
    /// Product id.
    pub id: String,

    /// Product name.
    #[arg(short, long)]
    pub name: String,

    /// Unit price in major units (e.g. 24.50).
    #[arg(short, long)]
    pub price: String,

    /// Product image reference.
    #[arg(long)]
    pub image: Option<String>,

    /// Units to add.
    #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
    pub qty: i64,
}

/// Arguments for the remove command.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct RemoveArgs {
    /// Product id.
    pub id: String,
}

/// Arguments for the set command.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct SetArgs {
    /// Product id.
    pub id: String,

    /// New quantity; 0 removes the line.
    #[arg(allow_negative_numbers = true)]
    pub qty: i64,
}

/// Arguments for the session command.
#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Start a new session with an empty cart.
    New,
    /// Show the current session.
    Show,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Get a config value.
    Get {
        /// Config key (dot-separated).
        key: String,
    },
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}
