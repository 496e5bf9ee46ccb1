use std::fmt;
use std::sync::Arc;

use crate::cpq::catalog::Catalog;
use crate::domain::{
    product::{OptionId, Product},
    quote::{ConfigurationItem, CustomFields},
    rule::{AppliedRule, RuleCategory, RuleId, RuleOutcome, RuleSummary},
};

pub type RulePredicate = Arc<dyn Fn(&PricingContext<'_>) -> bool + Send + Sync>;
pub type RuleTransform = Arc<dyn Fn(f64, &PricingContext<'_>) -> f64 + Send + Sync>;

/// Everything a rule may look at while pricing one line item.
#[derive(Clone, Copy, Debug)]
pub struct PricingContext<'a> {
    pub product: &'a Product,
    pub item: &'a ConfigurationItem,
    /// All items of the request, the priced one included.
    pub items: &'a [ConfigurationItem],
    pub catalog: &'a Catalog,
    pub customer_tier: Option<&'a str>,
    pub region: Option<&'a str>,
    pub custom_fields: Option<&'a CustomFields>,
}

impl<'a> PricingContext<'a> {
    pub fn new(
        product: &'a Product,
        item: &'a ConfigurationItem,
        items: &'a [ConfigurationItem],
        catalog: &'a Catalog,
    ) -> Self {
        Self {
            product,
            item,
            items,
            catalog,
            customer_tier: None,
            region: None,
            custom_fields: None,
        }
    }

    pub fn with_customer_tier(mut self, customer_tier: Option<&'a str>) -> Self {
        self.customer_tier = customer_tier;
        self
    }

    pub fn with_region(mut self, region: Option<&'a str>) -> Self {
        self.region = region;
        self
    }

    pub fn with_custom_fields(mut self, custom_fields: Option<&'a CustomFields>) -> Self {
        self.custom_fields = custom_fields;
        self
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.items.iter().any(|item| {
            self.catalog
                .find(&item.product_id)
                .is_some_and(|product| product.category == category)
        })
    }

    pub fn has_product_prefix(&self, prefix: &str) -> bool {
        self.items.iter().any(|item| item.product_id.0.starts_with(prefix))
    }

    pub fn distinct_products(&self) -> usize {
        let mut ids = self.items.iter().map(|item| &item.product_id).collect::<Vec<_>>();
        ids.sort();
        ids.dedup();
        ids.len()
    }

    pub fn is_selected(&self, option_id: &OptionId) -> bool {
        self.item.is_selected(option_id)
    }

    /// Unit price of an option on the current product; zero when it does not exist.
    pub fn option_price(&self, option_id: &OptionId) -> f64 {
        self.product.option(option_id).map_or(0.0, |option| option.price)
    }

    pub fn custom_field(&self, key: &str) -> Option<&'a serde_json::Value> {
        self.custom_fields.and_then(|fields| fields.get(key))
    }
}

/// A conditional price transformation.
#[derive(Clone)]
pub struct PricingRule {
    pub id: RuleId,
    pub name: String,
    pub description: String,
    pub category: RuleCategory,
    pub priority: i32,
    predicate: RulePredicate,
    transform: RuleTransform,
}

impl PricingRule {
    pub fn new<P, T>(
        id: &str,
        name: &str,
        category: RuleCategory,
        priority: i32,
        predicate: P,
        transform: T,
    ) -> Self
    where
        P: Fn(&PricingContext<'_>) -> bool + Send + Sync + 'static,
        T: Fn(f64, &PricingContext<'_>) -> f64 + Send + Sync + 'static,
    {
        Self {
            id: RuleId::from(id),
            name: name.to_owned(),
            description: String::new(),
            category,
            priority,
            predicate: Arc::new(predicate),
            transform: Arc::new(transform),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    pub fn applies(&self, context: &PricingContext<'_>) -> bool {
        (self.predicate)(context)
    }

    pub fn transform(&self, price: f64, context: &PricingContext<'_>) -> f64 {
        (self.transform)(price, context)
    }

    pub fn summary(&self) -> RuleSummary {
        RuleSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category,
            priority: self.priority,
        }
    }
}

impl fmt::Debug for PricingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PricingRule")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Ordered rule table plus the fold that applies it.
#[derive(Clone, Debug, Default)]
pub struct RuleEngine {
    rules: Vec<PricingRule>,
}

impl RuleEngine {
    pub fn new(rules: Vec<PricingRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PricingRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in evaluation order: ascending priority, ties in declaration order.
    pub fn ordered(&self) -> Vec<&PricingRule> {
        let mut ordered = self.rules.iter().collect::<Vec<_>>();
        ordered.sort_by_key(|rule| rule.priority);
        ordered
    }

    pub fn describe(&self) -> Vec<RuleSummary> {
        self.ordered().into_iter().map(PricingRule::summary).collect()
    }

    pub fn apply_rules(&self, base_price: f64, context: &PricingContext<'_>) -> RuleOutcome {
        let mut matching =
            self.rules.iter().filter(|rule| rule.applies(context)).collect::<Vec<_>>();
        matching.sort_by_key(|rule| rule.priority);

        let mut current = base_price;
        let mut applied_rules = Vec::new();
        for rule in matching {
            let next = rule.transform(current, context);
            if !next.is_finite() {
                continue;
            }
            if round_to_cents(current - next) != 0.0 {
                applied_rules.push(AppliedRule {
                    rule_id: rule.id.clone(),
                    rule_name: rule.name.clone(),
                    discount_amount: current - next,
                });
            }
            current = next;
        }

        RuleOutcome { final_price: current.max(0.0), applied_rules }
    }
}

/// Rounds half away from zero to two decimal places.
pub fn round_to_cents(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
