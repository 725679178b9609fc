//! Cart commands.

use anyhow::{Context as _, Result};
use basket_commerce::CommerceError;

use super::{ProductArgs, UpdateArgs};
use crate::context::{Context, Store};

/// Show the cart.
pub async fn show(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;

    ctx.output.header("Cart");
    ctx.output.cart(&store.entries());

    Ok(())
}

/// Add one unit of a product.
pub async fn add(args: ProductArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;

    let spinner = ctx.output.spinner(&format!("Adding product {}", args.id));
    let result = store.add(args.id).await;
    spinner.finish_and_clear();

    result.with_context(|| format!("Could not add product {}", args.id))?;
    report(
        ctx,
        &store,
        &format!(
            "Added product {} ({} in cart)",
            args.id,
            store.amount_of(args.id)
        ),
    );

    Ok(())
}

/// Remove a product.
pub async fn remove(args: ProductArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;

    store
        .remove(args.id)
        .await
        .with_context(|| format!("Could not remove product {}", args.id))?;
    report(ctx, &store, &format!("Removed product {}", args.id));

    Ok(())
}

/// Set the quantity of a product.
pub async fn update(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;

    if args.amount <= 0 {
        ctx.output
            .warn(&format!("Ignoring amount {}; use `basket remove {}` instead", args.amount, args.id));
    }

    let spinner = ctx.output.spinner("Checking stock");
    let result = store.update_amount(args.id, args.amount).await;
    spinner.finish_and_clear();

    if let Err(CommerceError::InsufficientStock { available, .. }) = &result {
        ctx.output.debug(&format!("Only {} in stock", available));
    }
    result.with_context(|| format!("Could not update product {}", args.id))?;

    if args.amount > 0 {
        report(
            ctx,
            &store,
            &format!("Product {} now at {}", args.id, store.amount_of(args.id)),
        );
    }

    Ok(())
}

fn report(ctx: &Context, store: &Store, msg: &str) {
    if ctx.output.is_json() {
        ctx.output.json(&store.entries());
        return;
    }
    ctx.output.success(msg);
    ctx.output.kv("items", &store.item_count().to_string());
}
