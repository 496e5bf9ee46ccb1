use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpq::standard;
use crate::domain::product::{OptionId, Product, ProductId};
use crate::errors::DomainError;

/// Catalog-level advice attached to a product family.
///
/// Fires for every product in `category` unless `unless_option` is selected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unless_option: Option<OptionId>,
    #[serde(default = "default_advisory_field")]
    pub field: String,
    pub message: String,
}

fn default_advisory_field() -> String {
    "selectedOptions".to_owned()
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog document: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate product id `{0}` in catalog")]
    DuplicateProduct(ProductId),
    #[error("duplicate option id `{option}` on product `{product}`")]
    DuplicateOption { product: ProductId, option: OptionId },
    #[error("product `{0}` has a negative or non-finite base price")]
    InvalidBasePrice(ProductId),
    #[error("option `{option}` on product `{product}` has a non-finite price")]
    InvalidOptionPrice { product: ProductId, option: OptionId },
}

#[derive(Debug, Default, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    advisories: Vec<Advisory>,
}

/// Read-only product registry. Never mutated once built.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
    advisories: Vec<Advisory>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products, advisories: Vec::new() }
    }

    pub fn with_advisories(mut self, advisories: Vec<Advisory>) -> Self {
        self.advisories = advisories;
        self
    }

    /// Checked constructor used by the loaders.
    pub fn try_new(products: Vec<Product>, advisories: Vec<Advisory>) -> Result<Self, CatalogError> {
        let mut product_ids = HashSet::new();
        for product in &products {
            if !product_ids.insert(&product.id) {
                return Err(CatalogError::DuplicateProduct(product.id.clone()));
            }
            if !product.base_price.is_finite() || product.base_price < 0.0 {
                return Err(CatalogError::InvalidBasePrice(product.id.clone()));
            }

            let mut option_ids = HashSet::new();
            for option in &product.options {
                if !option_ids.insert(&option.id) {
                    return Err(CatalogError::DuplicateOption {
                        product: product.id.clone(),
                        option: option.id.clone(),
                    });
                }
                if !option.price.is_finite() {
                    return Err(CatalogError::InvalidOptionPrice {
                        product: product.id.clone(),
                        option: option.id.clone(),
                    });
                }
            }
        }

        Ok(Self { products, advisories })
    }

    /// The compiled-in cloud services catalog.
    pub fn standard() -> Self {
        Self { products: standard::products(), advisories: standard::advisories() }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let document = toml::from_str::<CatalogDocument>(raw)?;
        Self::try_new(document.products, document.advisories)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    pub fn find(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == product_id)
    }

    pub fn get(&self, product_id: &ProductId) -> Result<&Product, DomainError> {
        self.find(product_id).ok_or_else(|| DomainError::ProductNotFound(product_id.clone()))
    }

    pub fn by_category(&self, category: &str) -> Vec<&Product> {
        self.products.iter().filter(|product| product.category == category).collect()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.products
            .iter()
            .filter(|product| seen.insert(product.category.as_str()))
            .map(|product| product.category.clone())
            .collect()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
