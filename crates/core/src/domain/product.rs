use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(pub String);

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OptionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// An add-on that can be selected on top of a product.
///
/// `dependencies` and `conflicts` are declared from this option's side only;
/// the validator never infers the reverse relation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOption {
    pub id: OptionId,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<OptionId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<OptionId>,
}

impl ProductOption {
    pub fn new(id: &str, name: &str, price: f64) -> Self {
        Self {
            id: OptionId::from(id),
            name: name.to_owned(),
            price,
            is_required: false,
            category: None,
            dependencies: Vec::new(),
            conflicts: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn in_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_owned());
        self
    }

    pub fn depends_on(mut self, option_ids: &[&str]) -> Self {
        self.dependencies.extend(option_ids.iter().map(|id| OptionId::from(*id)));
        self
    }

    pub fn conflicts_with(mut self, option_ids: &[&str]) -> Self {
        self.conflicts.extend(option_ids.iter().map(|id| OptionId::from(*id)));
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_price: f64,
    pub category: String,
    #[serde(default)]
    pub options: Vec<ProductOption>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Product {
    pub fn option(&self, option_id: &OptionId) -> Option<&ProductOption> {
        self.options.iter().find(|option| &option.id == option_id)
    }

    pub fn has_option(&self, option_id: &OptionId) -> bool {
        self.option(option_id).is_some()
    }

    /// Sum of the prices of the selected options that exist on this product.
    /// Repeated ids are counted once.
    pub fn options_total(&self, selected: &[OptionId]) -> f64 {
        let mut seen = HashSet::new();
        selected
            .iter()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| self.option(id))
            .map(|option| option.price)
            .sum()
    }

    /// Unit price before any rule: base price plus selected option prices.
    pub fn unit_price(&self, selected: &[OptionId]) -> f64 {
        self.base_price + self.options_total(selected)
    }
}
