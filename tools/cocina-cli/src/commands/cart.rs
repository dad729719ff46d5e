//! Cart commands.

use anyhow::{Context as _, Result};
use cocina_commerce::{CartProduct, CartSnapshot, Currency, ProductId, Storefront};
use console::style;
use serde_json::json;

use super::{AddArgs, RemoveArgs, SetArgs};
use crate::context::Context;
use crate::output::{cart_badge, Output};

/// Build the product for an add request.
pub fn product_from_args(args: &AddArgs, currency: Currency) -> Result<CartProduct> {
    let mut record = json!({
        "id": args.id,
        "name": args.name,
        "price": args.price,
    });
    if let Some(image) = &args.image {
        record["image"] = json!(image);
    }
    CartProduct::from_record(&record, currency)
        .with_context(|| format!("Invalid product '{}'", args.id))
}

/// Run the add command.
pub fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart()?;
    add_to(&cart.storefront, &args, ctx)?;
    cart.flush();

    if ctx.output.is_json() {
        ctx.output.json(&*cart.storefront.store().snapshot());
    }
    Ok(())
}

pub(crate) fn add_to(shop: &Storefront, args: &AddArgs, ctx: &Context) -> Result<()> {
    let product = product_from_args(args, ctx.config.store.currency)?;
    let quantity = shop
        .add_to_cart(&product, args.qty)
        .with_context(|| format!("Could not add '{}'", args.id))?;

    ctx.output.success(&format!(
        "Added {} x {} ({} in cart)",
        args.qty, product.name, quantity
    ));
    print_badge(shop, &ctx.output);
    Ok(())
}

/// Run the remove command.
pub fn remove(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart()?;
    remove_from(&cart.storefront, &args.id, ctx);
    cart.flush();

    if ctx.output.is_json() {
        ctx.output.json(&*cart.storefront.store().snapshot());
    }
    Ok(())
}

pub(crate) fn remove_from(shop: &Storefront, id: &str, ctx: &Context) {
    if shop.store().remove_item(&ProductId::new(id)) {
        ctx.output.success(&format!("Removed {}", id));
    } else {
        ctx.output.info(&format!("{} was not in the cart", id));
    }
    print_badge(shop, &ctx.output);
}

/// Run the set command.
pub fn set(args: SetArgs, ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart()?;
    set_in(&cart.storefront, &args.id, args.qty, ctx)?;
    cart.flush();

    if ctx.output.is_json() {
        ctx.output.json(&*cart.storefront.store().snapshot());
    }
    Ok(())
}

pub(crate) fn set_in(shop: &Storefront, id: &str, qty: i64, ctx: &Context) -> Result<()> {
    use cocina_commerce::cart::QuantityUpdate;

    let update = shop
        .store()
        .set_quantity(&ProductId::new(id), qty)
        .with_context(|| format!("Could not set quantity of '{}'", id))?;

    match update {
        QuantityUpdate::Updated { from, to } => {
            ctx.output.success(&format!("{}: {} -> {}", id, from, to))
        }
        QuantityUpdate::Removed { .. } => ctx.output.success(&format!("Removed {}", id)),
        QuantityUpdate::Unchanged => ctx.output.info(&format!("{} already at {}", id, qty)),
        QuantityUpdate::Missing => ctx.output.warn(&format!("{} is not in the cart", id)),
    }
    print_badge(shop, &ctx.output);
    Ok(())
}

/// Run the clear command.
pub fn clear(ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart()?;
    let removed = cart.storefront.store().clear();
    cart.flush();

    if ctx.output.is_json() {
        ctx.output.json(&json!({ "removed": removed }));
    } else {
        ctx.output.success(&format!("Cleared {} line(s)", removed));
    }
    Ok(())
}

/// Run the show command.
pub fn show(ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart()?;
    let snapshot = cart.storefront.store().snapshot();

    if ctx.output.is_json() {
        ctx.output.json(&*snapshot);
        return Ok(());
    }

    ctx.output.header(&format!("Cart ({})", cart.session));
    render_lines(&snapshot, &ctx.output);
    Ok(())
}

/// Print the header badge.
pub fn print_badge(shop: &Storefront, output: &Output) {
    if output.is_json() || !shop.config().show_cart {
        return;
    }
    println!("{}", cart_badge(shop.header_badge().as_deref()));
}

/// Print line items and totals.
pub fn render_lines(snapshot: &CartSnapshot, output: &Output) {
    if snapshot.is_empty() {
        output.info("Your cart is empty");
        return;
    }

    let widths = [14, 24, 5, 10, 10];
    output.table_row(&["ID", "PRODUCT", "QTY", "PRICE", "TOTAL"], &widths);
    for item in &snapshot.items {
        let qty = item.quantity.to_string();
        let price = item.unit_price.display();
        let total = item.line_total().display();
        output.table_row(
            &[item.product_id.as_str(), &item.name, &qty, &price, &total],
            &widths,
        );
    }
    output.kv("items", &snapshot.total_items.to_string());
    output.kv("subtotal", &style(snapshot.subtotal.display()).bold().to_string());
}

/// Print the drawer if it is open.
pub fn render_drawer(shop: &Storefront, output: &Output) {
    let Some(snapshot) = shop.drawer() else {
        return;
    };
    output.rule();
    println!("{}", style("Your cart").bold());
    render_lines(&snapshot, output);
    output.rule();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(price: &str) -> AddArgs {
        AddArgs {
            id: "olla-24".to_string(),
            name: "Olla 24cm".to_string(),
            price: price.to_string(),
            image: Some("/img/olla.jpg".to_string()),
            qty: 1,
        }
    }

    #[test]
    fn test_product_from_args() {
        let product = product_from_args(&args("39.90"), Currency::EUR).unwrap();
        assert_eq!(product.id.as_str(), "olla-24");
        assert_eq!(product.unit_price.amount_cents, 3990);
        assert_eq!(product.image.as_deref(), Some("/img/olla.jpg"));
    }

    #[test]
    fn test_product_from_args_rejects_bad_price() {
        assert!(product_from_args(&args("abc"), Currency::EUR).is_err());
        assert!(product_from_args(&args("-1"), Currency::EUR).is_err());
    }
}
