//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig, CONFIG_FILE_NAMES};
use crate::context::Context;

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Get { key } => get_config(&key, ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    ctx.output.info("");
    ctx.output.info("[store]");
    ctx.output.kv("currency", ctx.config.store.currency.code());
    ctx.output.kv("namespace", &ctx.config.store.namespace);
    ctx.output.kv(
        "max_quantity_per_item",
        &ctx.config.store.max_quantity_per_item.to_string(),
    );

    ctx.output.info("");
    ctx.output.info("[ui]");
    ctx.output.kv("show_cart", &ctx.config.ui.show_cart.to_string());
    ctx.output.kv("open_on_add", &ctx.config.ui.open_on_add.to_string());
    ctx.output.kv("badge_cap", &ctx.config.ui.badge_cap.to_string());

    ctx.output.info("");
    ctx.output.info("[storage]");
    ctx.output.kv("dir", &ctx.config.storage.dir.display().to_string());
    if let Some(ref session) = ctx.config.storage.session {
        ctx.output.kv("session", session);
    }

    Ok(())
}

fn get_config(key: &str, ctx: &Context) -> Result<()> {
    let value = get_config_value(&ctx.config, key)?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "key": key, "value": value }));
    } else {
        println!("{}", value);
    }

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_FILE_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn get_config_value(config: &CliConfig, key: &str) -> Result<serde_json::Value> {
    use serde_json::Value;

    let parts: Vec<&str> = key.split('.').collect();

    let value = match parts.as_slice() {
        ["store", "currency"] => Value::from(config.store.currency.code()),
        ["store", "namespace"] => Value::from(config.store.namespace.as_str()),
        ["store", "max_quantity_per_item"] => Value::from(config.store.max_quantity_per_item),
        ["ui", "show_cart"] => Value::from(config.ui.show_cart),
        ["ui", "open_on_add"] => Value::from(config.ui.open_on_add),
        ["ui", "badge_cap"] => Value::from(config.ui.badge_cap),
        ["storage", "dir"] => Value::from(config.storage.dir.display().to_string()),
        ["storage", "session"] => config
            .storage
            .session
            .as_deref()
            .map_or(Value::Null, Value::from),
        _ => bail!("Unknown config key: {}", key),
    };

    Ok(value)
}
