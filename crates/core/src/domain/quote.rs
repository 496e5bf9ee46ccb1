use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::product::{OptionId, ProductId};
use crate::domain::rule::RuleId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(pub String);

impl QuoteId {
    pub fn generate() -> Self {
        Self(format!("Q-{}", Uuid::new_v4().simple()))
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-form string-keyed JSON values carried through requests and quotes.
pub type CustomFields = BTreeMap<String, serde_json::Value>;

/// One requested product configuration. Built per request, never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub selected_options: Vec<OptionId>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub customization: CustomFields,
}

fn default_quantity() -> u32 {
    1
}

impl ConfigurationItem {
    pub fn new(product_id: &str, quantity: u32) -> Self {
        Self {
            product_id: ProductId::from(product_id),
            selected_options: Vec::new(),
            quantity,
            customization: BTreeMap::new(),
        }
    }

    pub fn with_options(mut self, option_ids: &[&str]) -> Self {
        self.selected_options.extend(option_ids.iter().map(|id| OptionId::from(*id)));
        self
    }

    pub fn is_selected(&self, option_id: &OptionId) -> bool {
        self.selected_options.contains(option_id)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOptionDetail {
    pub id: OptionId,
    pub name: String,
    pub price: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDiscount {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLineItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub base_price: f64,
    pub selected_options: Vec<SelectedOptionDetail>,
    /// Pre-discount amount: unit price times quantity.
    pub subtotal: f64,
    pub discounts: Vec<AppliedDiscount>,
    pub total: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: CustomFields,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: QuoteId,
    pub created_at: DateTime<Utc>,
    pub items: Vec<QuoteLineItem>,
    pub subtotal: f64,
    pub total_discounts: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
    pub total: f64,
    #[serde(default)]
    pub metadata: QuoteMetadata,
}
