//! Session commands.

use anyhow::{Context as _, Result};
use serde_json::json;

use super::{SessionArgs, SessionCommand};
use crate::context::Context;

/// Run the session command.
pub fn run(args: SessionArgs, ctx: &Context) -> Result<()> {
    match args.command {
        SessionCommand::New => new_session(ctx),
        SessionCommand::Show => show_session(ctx),
    }
}

fn new_session(ctx: &Context) -> Result<()> {
    if ctx.config.storage.session.is_some() {
        ctx.output
            .warn("storage.session is pinned in the config file; the new session will not be used");
    }

    let session = ctx.sessions()?.start().context("Failed to start session")?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({ "session": session }));
    } else {
        ctx.output.success(&format!("Started session {}", session));
    }
    Ok(())
}

fn show_session(ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart()?;
    let totals = cart.storefront.store().totals();
    let stored = ctx
        .open_cache()?
        .keys_in(&ctx.config.store.namespace)
        .context("Failed to list stored carts")?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "session": cart.session,
            "total_items": totals.total_items,
            "subtotal": totals.subtotal,
            "stored_carts": stored,
        }));
        return Ok(());
    }

    ctx.output.header("Session");
    ctx.output.kv("id", cart.session.as_str());
    ctx.output.kv("storage", &ctx.storage_dir().display().to_string());
    ctx.output.kv("items", &totals.total_items.to_string());
    ctx.output.kv("subtotal", &totals.subtotal.display());

    if !stored.is_empty() {
        ctx.output.info("");
        ctx.output.info("Stored carts:");
        for key in &stored {
            ctx.output.list_item(key);
        }
    }
    Ok(())
}
