//! Cocina CLI - terminal storefront for the shared cart.
//!
//! Commands:
//! - `cocina add` - Add a product to the cart
//! - `cocina remove` - Remove a product
//! - `cocina set` - Set a line quantity
//! - `cocina clear` - Empty the cart
//! - `cocina show` - Print the cart
//! - `cocina shell` - Interactive session with the cart drawer
//! - `cocina session` - Manage the browsing session
//! - `cocina config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AddArgs, ConfigArgs, RemoveArgs, SessionArgs, SetArgs};

/// Cocina CLI - browse-side cart for CocinaShop
#[derive(Parser)]
#[command(name = "cocina")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a product to the cart
    Add(AddArgs),

    /// Remove a product from the cart
    Remove(RemoveArgs),

    /// Set the quantity of a cart line (0 removes it)
    Set(SetArgs),

    /// Remove every line from the cart
    Clear,

    /// Show the cart contents
    Show,

    /// Start an interactive cart session
    Shell,

    /// Manage the browsing session
    Session(SessionArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    let result = match cli.command {
        Commands::Add(args) => commands::cart::add(args, &ctx),
        Commands::Remove(args) => commands::cart::remove(args, &ctx),
        Commands::Set(args) => commands::cart::set(args, &ctx),
        Commands::Clear => commands::cart::clear(&ctx),
        Commands::Show => commands::cart::show(&ctx),
        Commands::Shell => commands::shell::run(&ctx),
        Commands::Session(args) => commands::session::run(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
