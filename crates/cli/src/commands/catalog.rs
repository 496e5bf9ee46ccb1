use pricebook_core::config::LoadOptions;
use pricebook_core::{CpqRuntime, Product};
use serde::Serialize;

use super::{load_runtime, CommandResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogListing<'a> {
    categories: Vec<String>,
    products: Vec<&'a Product>,
}

pub fn run(options: &LoadOptions, category: Option<&str>) -> CommandResult {
    let (_, runtime) = match load_runtime("catalog", options) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };
    let catalog = runtime.catalog();

    let category = category.map(str::trim).filter(|category| !category.is_empty());
    let products = match category {
        Some(category) => catalog.by_category(category),
        None => catalog.products().iter().collect(),
    };
    let message = match category {
        Some(category) => format!("{} products in category `{category}`", products.len()),
        None => format!("{} products", products.len()),
    };

    CommandResult::success(
        "catalog",
        message,
        CatalogListing { categories: catalog.categories(), products },
    )
}
