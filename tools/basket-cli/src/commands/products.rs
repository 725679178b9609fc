//! Catalog listing command.

use anyhow::{Context as _, Result};
use basket_commerce::catalog::{Catalog, Product};
use serde::Serialize;

use crate::context::Context;
use crate::output::truncate;

/// A catalog product with the quantity already in the cart.
#[derive(Serialize)]
struct ListedProduct {
    #[serde(flatten)]
    product: Product,
    in_cart: u32,
}

/// Run the products command.
pub async fn run(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;

    let spinner = ctx.output.spinner("Loading products");
    let products = store.catalog().products().await;
    spinner.finish_and_clear();
    let products = products.context("Failed to load products")?;

    let amounts = store.amounts();
    let listed: Vec<ListedProduct> = products
        .into_iter()
        .map(|product| ListedProduct {
            in_cart: amounts.get(&product.id).copied().unwrap_or(0),
            product,
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&listed);
        return Ok(());
    }

    ctx.output.header("Products");
    if listed.is_empty() {
        ctx.output.info("The catalog is empty");
        return Ok(());
    }

    let widths = [6, 50, 10, 7];
    ctx.output
        .table_row(&["ID", "PRODUCT", "PRICE", "IN CART"], &widths);
    for item in &listed {
        let in_cart = if item.in_cart > 0 {
            item.in_cart.to_string()
        } else {
            String::new()
        };
        ctx.output.table_row(
            &[
                &item.product.id.to_string(),
                &truncate(&item.product.title, widths[1]),
                &format!("{:.2}", item.product.price),
                &in_cart,
            ],
            &widths,
        );
    }

    Ok(())
}
