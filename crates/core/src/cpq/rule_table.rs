//! Data form of pricing rules.
//!
//! A [`RuleDefinition`] is plain serde data (`[[rules]]` in TOML) that compiles
//! into a closure-backed [`PricingRule`]. Conditions and adjustments compose, so
//! new rules of the standard shapes need no code.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpq::rules::{PricingContext, PricingRule, RuleEngine};
use crate::domain::{
    product::OptionId,
    rule::{RuleCategory, RuleId},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Always,
    QuantityAtLeast { value: u32 },
    QuantityBelow { value: u32 },
    CustomerTier { value: String },
    Region { value: String },
    ProductCategory { value: String },
    OptionSelected { option: OptionId },
    /// Every listed category appears among the request's items.
    BundleCategories { categories: Vec<String> },
    /// Every listed product-id prefix appears among the request's items.
    BundlePrefixes { prefixes: Vec<String> },
    MinDistinctProducts { value: usize },
    MinSelectedOptions { value: usize },
    /// Numbers compare by value, so a TOML `5` matches a JSON `5.0`.
    CustomFieldEquals { key: String, value: serde_json::Value },
    All { conditions: Vec<Condition> },
    Any { conditions: Vec<Condition> },
    Not { condition: Box<Condition> },
}

impl Condition {
    pub fn matches(&self, context: &PricingContext<'_>) -> bool {
        match self {
            Self::Always => true,
            Self::QuantityAtLeast { value } => context.item.quantity >= *value,
            Self::QuantityBelow { value } => context.item.quantity < *value,
            Self::CustomerTier { value } => context.customer_tier == Some(value.as_str()),
            Self::Region { value } => context.region == Some(value.as_str()),
            Self::ProductCategory { value } => context.product.category == *value,
            Self::OptionSelected { option } => context.is_selected(option),
            Self::BundleCategories { categories } => {
                categories.iter().all(|category| context.has_category(category))
            }
            Self::BundlePrefixes { prefixes } => {
                prefixes.iter().all(|prefix| context.has_product_prefix(prefix))
            }
            Self::MinDistinctProducts { value } => context.distinct_products() >= *value,
            Self::MinSelectedOptions { value } => {
                context.item.selected_options.iter().collect::<HashSet<_>>().len() >= *value
            }
            Self::CustomFieldEquals { key, value } => {
                context.custom_field(key).is_some_and(|field| same_value(field, value))
            }
            Self::All { conditions } => conditions.iter().all(|condition| condition.matches(context)),
            Self::Any { conditions } => conditions.iter().any(|condition| condition.matches(context)),
            Self::Not { condition } => !condition.matches(context),
        }
    }
}

fn same_value(left: &serde_json::Value, right: &serde_json::Value) -> bool {
    match (left.as_f64(), right.as_f64()) {
        (Some(left), Some(right)) => left == right,
        _ => left == right,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Adjustment {
    PercentOff { percent: f64 },
    PercentSurcharge { percent: f64 },
    Multiplier { factor: f64 },
    FlatOff { amount: f64 },
    /// Subtracts the unit price of an option on the current product.
    CompOption { option: OptionId },
    None,
}

impl Adjustment {
    pub fn apply(&self, price: f64, context: &PricingContext<'_>) -> f64 {
        match self {
            Self::PercentOff { percent } => price * (1.0 - percent / 100.0),
            Self::PercentSurcharge { percent } => price * (1.0 + percent / 100.0),
            Self::Multiplier { factor } => price * factor,
            Self::FlatOff { amount } => price - amount,
            Self::CompOption { option } => price - context.option_price(option),
            Self::None => price,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: RuleId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: RuleCategory,
    pub priority: i32,
    pub when: Condition,
    pub adjust: Adjustment,
}

impl RuleDefinition {
    pub fn into_rule(self) -> PricingRule {
        let Self { id, name, description, category, priority, when, adjust } = self;
        PricingRule::new(
            &id.0,
            &name,
            category,
            priority,
            move |context| when.matches(context),
            move |price, context| adjust.apply(price, context),
        )
        .with_description(&description)
    }
}

#[derive(Debug, Error)]
pub enum RuleTableError {
    #[error("could not read rule table `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse rule table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate rule id `{0}` in rule table")]
    DuplicateRule(RuleId),
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RuleTable {
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl RuleTable {
    pub fn from_toml_str(raw: &str) -> Result<Self, RuleTableError> {
        let table = toml::from_str::<Self>(raw)?;
        table.check()?;
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, RuleTableError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| RuleTableError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    fn check(&self) -> Result<(), RuleTableError> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(&rule.id) {
                return Err(RuleTableError::DuplicateRule(rule.id.clone()));
            }
        }
        Ok(())
    }

    pub fn into_engine(self) -> RuleEngine {
        RuleEngine::new(self.rules.into_iter().map(RuleDefinition::into_rule).collect())
    }
}

impl RuleEngine {
    pub fn from_toml_str(raw: &str) -> Result<Self, RuleTableError> {
        RuleTable::from_toml_str(raw).map(RuleTable::into_engine)
    }

    pub fn load(path: &Path) -> Result<Self, RuleTableError> {
        RuleTable::load(path).map(RuleTable::into_engine)
    }
}
