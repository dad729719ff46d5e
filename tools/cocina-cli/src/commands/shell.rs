//! Interactive cart session.
//!
//! Keeps one storefront alive across commands so the drawer state and the
//! write-behind persistence behave as they would on a page.

use anyhow::Result;
use cocina_commerce::Storefront;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};

use super::cart::{add_to, print_badge, remove_from, render_drawer, render_lines, set_in};
use super::AddArgs;
use crate::context::Context;

#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    Add { id: String, qty: i64 },
    Remove(String),
    Set { id: String, qty: i64 },
    Clear,
    Show,
    Open,
    Close,
    Toggle,
    Icon,
    Help,
    Quit,
}

fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((command, rest)) = words.split_first() else {
        return Ok(None);
    };

    let quantity = |raw: &str| {
        raw.parse::<i64>()
            .map_err(|_| format!("'{}' is not a quantity", raw))
    };

    let parsed = match (*command, rest) {
        ("add", [id]) => ShellCommand::Add {
            id: id.to_string(),
            qty: 1,
        },
        ("add", [id, qty]) => ShellCommand::Add {
            id: id.to_string(),
            qty: quantity(*qty)?,
        },
        ("remove" | "rm", [id]) => ShellCommand::Remove(id.to_string()),
        ("set", [id, qty]) => ShellCommand::Set {
            id: id.to_string(),
            qty: quantity(*qty)?,
        },
        ("clear", []) => ShellCommand::Clear,
        ("show" | "ls", []) => ShellCommand::Show,
        ("open", []) => ShellCommand::Open,
        ("close", []) => ShellCommand::Close,
        ("toggle", []) => ShellCommand::Toggle,
        ("cart", []) => ShellCommand::Icon,
        ("help" | "?", []) => ShellCommand::Help,
        ("quit" | "exit" | "q", []) => ShellCommand::Quit,
        _ => return Err(format!("Unknown command: {}. Type 'help'.", line.trim())),
    };
    Ok(Some(parsed))
}

/// Run the shell command.
pub fn run(ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart()?;
    let shop = &cart.storefront;
    let theme = ColorfulTheme::default();

    ctx.output.header(&format!("Cocina cart ({})", cart.session));
    print_help();
    print_badge(shop, &ctx.output);

    loop {
        let line: String = match Input::with_theme(&theme)
            .with_prompt("cart")
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => line,
            Err(e) => {
                tracing::debug!(error = %e, "input closed");
                break;
            }
        };

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(msg) => {
                ctx.output.warn(&msg);
                continue;
            }
        };

        if command == ShellCommand::Quit {
            break;
        }
        if let Err(e) = execute(command, shop, &theme, ctx) {
            ctx.output.error(&format!("{:#}", e));
        }
        render_drawer(shop, &ctx.output);
    }

    cart.flush();
    Ok(())
}

fn execute(
    command: ShellCommand,
    shop: &Storefront,
    theme: &ColorfulTheme,
    ctx: &Context,
) -> Result<()> {
    match command {
        ShellCommand::Add { id, qty } => {
            let args = prompt_product(id, qty, theme)?;
            add_to(shop, &args, ctx)?;
        }
        ShellCommand::Remove(id) => remove_from(shop, &id, ctx),
        ShellCommand::Set { id, qty } => set_in(shop, &id, qty, ctx)?,
        ShellCommand::Clear => {
            let confirmed = Confirm::with_theme(theme)
                .with_prompt("Remove everything from the cart?")
                .default(false)
                .interact()?;
            if confirmed {
                let removed = shop.store().clear();
                ctx.output.success(&format!("Cleared {} line(s)", removed));
            }
        }
        ShellCommand::Show => render_lines(&shop.store().snapshot(), &ctx.output),
        ShellCommand::Open => shop.ui().open(),
        ShellCommand::Close => shop.ui().close(),
        ShellCommand::Toggle => {
            shop.ui().toggle();
        }
        ShellCommand::Icon => shop.cart_icon_clicked(),
        ShellCommand::Help => print_help(),
        ShellCommand::Quit => {}
    }
    Ok(())
}

fn prompt_product(id: String, qty: i64, theme: &ColorfulTheme) -> Result<AddArgs> {
    let name: String = Input::with_theme(theme).with_prompt("Name").interact_text()?;
    let price: String = Input::with_theme(theme)
        .with_prompt("Price")
        .interact_text()?;
    let image: String = Input::with_theme(theme)
        .with_prompt("Image (optional)")
        .allow_empty(true)
        .interact_text()?;

    Ok(AddArgs {
        id,
        name,
        price,
        image: (!image.trim().is_empty()).then_some(image),
        qty,
    })
}

fn print_help() {
    println!("  add <id> [qty]   add a product (prompts for name and price)");
    println!("  remove <id>      remove a product");
    println!("  set <id> <qty>   set a quantity, 0 removes");
    println!("  clear            empty the cart");
    println!("  show             list the cart");
    println!("  cart             click the cart icon");
    println!("  open | close | toggle   drawer visibility");
    println!("  quit");
}
