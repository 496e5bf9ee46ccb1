use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::cpq::{
    catalog::Catalog,
    rules::{round_to_cents, PricingContext, RuleEngine},
    validator::ConfigurationValidator,
};
use crate::domain::{
    product::Product,
    quote::{
        AppliedDiscount, ConfigurationItem, CustomFields, Quote, QuoteId, QuoteLineItem,
        QuoteMetadata, SelectedOptionDetail,
    },
    rule::AppliedRule,
};
use crate::errors::DomainError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub configurations: Vec<ConfigurationItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<CustomFields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
}

impl QuoteRequest {
    pub fn new(configurations: Vec<ConfigurationItem>) -> Self {
        Self { configurations, ..Self::default() }
    }

    pub fn with_customer_tier(mut self, customer_tier: &str) -> Self {
        self.customer_tier = Some(customer_tier.to_owned());
        self
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_owned());
        self
    }

    pub fn with_tax_rate(mut self, tax_rate: f64) -> Self {
        self.tax_rate = Some(tax_rate);
        self
    }

    /// Shape checks applied by the outer surfaces before any pricing runs.
    pub fn check_shape(&self, max_configurations: usize) -> Result<(), String> {
        check_configurations(&self.configurations, max_configurations)?;
        if let Some(tax_rate) = self.tax_rate {
            if !tax_rate.is_finite() || !(0.0..=1.0).contains(&tax_rate) {
                return Err("taxRate must be a number between 0 and 1".to_owned());
            }
        }
        Ok(())
    }
}

pub fn check_configurations(items: &[ConfigurationItem], limit: usize) -> Result<(), String> {
    if items.is_empty() {
        return Err("configurations must not be empty".to_owned());
    }
    if items.len() > limit {
        return Err(format!("at most {limit} configurations are accepted per request"));
    }

    for (index, item) in items.iter().enumerate() {
        if item.product_id.0.trim().is_empty() {
            return Err(format!("configurations[{index}].productId must not be blank"));
        }
        if item.quantity == 0 {
            return Err(format!("configurations[{index}].quantity must be at least 1"));
        }
    }

    Ok(())
}

/// Rule-engine result for one configuration, before it becomes a line item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPricing {
    pub base_price: f64,
    pub final_price: f64,
    pub applied_rules: Vec<AppliedRule>,
}

/// Validates a request, prices every item and totals the quote.
pub struct QuoteAssembler<'a, V> {
    validator: V,
    rules: &'a RuleEngine,
    catalog: &'a Catalog,
}

impl<'a, V> QuoteAssembler<'a, V>
where
    V: ConfigurationValidator,
{
    pub fn new(validator: V, rules: &'a RuleEngine, catalog: &'a Catalog) -> Self {
        Self { validator, rules, catalog }
    }

    pub fn generate_quote(&self, request: &QuoteRequest) -> Result<Quote, DomainError> {
        let validation = self.validator.validate_batch(&request.configurations);
        if !validation.is_valid {
            return Err(DomainError::ConfigurationInvalid {
                message: format!(
                    "Configuration validation failed: {}",
                    validation.failure_summary()
                ),
                failures: validation.failures().cloned().collect(),
            });
        }

        let mut items = Vec::with_capacity(request.configurations.len());
        for item in &request.configurations {
            let product = self.catalog.get(&item.product_id)?;
            let pricing = self.price_with_product(product, item, request);
            items.push(line_item(product, item, pricing));
        }

        let subtotal = items.iter().map(|item| item.subtotal).sum::<f64>();
        let pre_tax_total = items.iter().map(|item| item.total).sum::<f64>();
        let total_discounts = subtotal - pre_tax_total;
        let (tax, total) = match request.tax_rate {
            Some(rate) => {
                let tax = pre_tax_total * rate;
                (Some(round_to_cents(tax)), round_to_cents(pre_tax_total + tax))
            }
            None => (None, round_to_cents(pre_tax_total)),
        };

        Ok(Quote {
            id: QuoteId::generate(),
            created_at: Utc::now(),
            items,
            subtotal,
            total_discounts,
            tax,
            total,
            metadata: QuoteMetadata {
                customer_tier: request.customer_tier.clone(),
                region: request.region.clone(),
                tax_rate: request.tax_rate,
                custom_fields: request.custom_fields.clone().unwrap_or_default(),
            },
        })
    }

    /// Prices `item` against the rule table using `request` as its context.
    /// `item` does not need to be one of the request's configurations.
    pub fn price_item(
        &self,
        item: &ConfigurationItem,
        request: &QuoteRequest,
    ) -> Result<ItemPricing, DomainError> {
        let product = self.catalog.get(&item.product_id)?;
        Ok(self.price_with_product(product, item, request))
    }

    fn price_with_product(
        &self,
        product: &Product,
        item: &ConfigurationItem,
        request: &QuoteRequest,
    ) -> ItemPricing {
        let base_price = product.unit_price(&item.selected_options) * f64::from(item.quantity);
        let context = PricingContext::new(product, item, &request.configurations, self.catalog)
            .with_customer_tier(request.customer_tier.as_deref())
            .with_region(request.region.as_deref())
            .with_custom_fields(request.custom_fields.as_ref());
        let outcome = self.rules.apply_rules(base_price, &context);

        ItemPricing {
            base_price,
            final_price: outcome.final_price,
            applied_rules: outcome.applied_rules,
        }
    }
}

fn line_item(product: &Product, item: &ConfigurationItem, pricing: ItemPricing) -> QuoteLineItem {
    let mut selected_options = Vec::new();
    for option_id in &item.selected_options {
        if selected_options.iter().any(|detail: &SelectedOptionDetail| &detail.id == option_id) {
            continue;
        }
        if let Some(option) = product.option(option_id) {
            selected_options.push(SelectedOptionDetail {
                id: option.id.clone(),
                name: option.name.clone(),
                price: option.price,
            });
        }
    }

    QuoteLineItem {
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        quantity: item.quantity,
        base_price: product.base_price,
        selected_options,
        subtotal: pricing.base_price,
        discounts: pricing
            .applied_rules
            .into_iter()
            .map(|rule| AppliedDiscount {
                rule_id: rule.rule_id,
                rule_name: rule.rule_name,
                amount: rule.discount_amount,
            })
            .collect(),
        total: pricing.final_price,
    }
}

#[cfg(test)]
mod tests {
    use super::{check_configurations, QuoteAssembler, QuoteRequest};
    use crate::cpq::{
        catalog::Catalog,
        rules::{PricingRule, RuleEngine},
        validator::CatalogValidator,
    };
    use crate::domain::{
        product::{Product, ProductId, ProductOption},
        quote::ConfigurationItem,
        rule::RuleCategory,
    };
    use crate::errors::DomainError;

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-9
    }

    fn plain_catalog() -> Catalog {
        Catalog::new(vec![
            Product {
                id: ProductId::from("widget"),
                name: "Widget".to_owned(),
                description: String::new(),
                base_price: 50.0,
                category: "compute".to_owned(),
                options: vec![
                    ProductOption::new("extra", "Extra", 10.0),
                    ProductOption::new("rebate", "Rebate", -5.0),
                ],
                metadata: Default::default(),
            },
            Product {
                id: ProductId::from("vault"),
                name: "Vault".to_owned(),
                description: String::new(),
                base_price: 80.0,
                category: "database".to_owned(),
                options: vec![ProductOption::new("encryption", "Encryption", 0.0).required()],
                metadata: Default::default(),
            },
        ])
    }

    #[test]
    fn single_item_without_rules_is_priced_at_base() {
        let catalog = plain_catalog();
        let rules = RuleEngine::standard();
        let assembler = QuoteAssembler::new(CatalogValidator::new(&catalog), &rules, &catalog);

        let request = QuoteRequest::new(vec![ConfigurationItem::new("widget", 1)]);
        let pricing = assembler.price_item(&request.configurations[0], &request).expect("priced");

        assert_eq!(pricing.base_price, 50.0);
        assert_eq!(pricing.final_price, 50.0);
        assert!(pricing.applied_rules.is_empty());
    }

    #[test]
    fn standard_rules_price_the_canonical_scenarios() {
        let catalog = plain_catalog();
        let rules = RuleEngine::standard();
        let assembler = QuoteAssembler::new(CatalogValidator::new(&catalog), &rules, &catalog);

        let volume = QuoteRequest::new(vec![ConfigurationItem::new("widget", 5)]);
        let volume = assembler.price_item(&volume.configurations[0], &volume).expect("volume");
        assert_eq!(volume.base_price, 250.0);
        assert!(close(volume.final_price, 225.0));
        assert_eq!(volume.applied_rules[0].rule_id.0, "volume-discount-10");

        let enterprise = QuoteRequest::new(vec![ConfigurationItem::new("widget", 1)])
            .with_customer_tier("enterprise");
        let enterprise =
            assembler.price_item(&enterprise.configurations[0], &enterprise).expect("tier");
        assert!(close(enterprise.final_price, 42.5));

        let regional =
            QuoteRequest::new(vec![ConfigurationItem::new("widget", 1)]).with_region("eu-central");
        let regional = assembler.price_item(&regional.configurations[0], &regional).expect("region");
        assert!(close(regional.final_price, 54.0));
    }

    #[test]
    fn bundle_rule_applies_to_every_item_of_the_bundle() {
        let catalog = plain_catalog();
        let rules = RuleEngine::standard();
        let assembler = QuoteAssembler::new(CatalogValidator::new(&catalog), &rules, &catalog);

        let quote = assembler
            .generate_quote(&QuoteRequest::new(vec![
                ConfigurationItem::new("widget", 1),
                ConfigurationItem::new("vault", 1).with_options(&["encryption"]),
            ]))
            .expect("quote");

        for item in &quote.items {
            assert!(
                item.discounts.iter().any(|discount| discount.rule_id.0 == "bundle-compute-database"),
                "{} should carry the bundle discount",
                item.product_id
            );
        }
    }

    #[test]
    fn quote_totals_discounts_and_tax() {
        let catalog = plain_catalog();
        let rules = RuleEngine::standard();
        let assembler = QuoteAssembler::new(CatalogValidator::new(&catalog), &rules, &catalog);

        let quote = assembler
            .generate_quote(
                &QuoteRequest::new(vec![
                    ConfigurationItem::new("widget", 5).with_options(&["extra", "rebate"]),
                    ConfigurationItem::new("widget", 1),
                ])
                .with_tax_rate(0.1),
            )
            .expect("quote");

        // 5 x 55 = 275 -> 247.5 after 10%; second item 50 untouched.
        assert_eq!(quote.items[0].subtotal, 275.0);
        assert_eq!(quote.items[0].base_price, 50.0);
        assert_eq!(quote.items[0].selected_options.len(), 2);
        assert!(close(quote.items[0].total, 247.5));
        assert!(close(quote.subtotal, 325.0));
        assert!(close(quote.total_discounts, 27.5));
        assert_eq!(quote.tax, Some(29.75));
        assert_eq!(quote.total, 327.25);
        assert_eq!(quote.metadata.tax_rate, Some(0.1));
    }

    #[test]
    fn quote_without_tax_rate_omits_tax() {
        let catalog = plain_catalog();
        let rules = RuleEngine::default();
        let assembler = QuoteAssembler::new(CatalogValidator::new(&catalog), &rules, &catalog);

        let quote = assembler
            .generate_quote(&QuoteRequest::new(vec![ConfigurationItem::new("widget", 3)]))
            .expect("quote");
        let json = serde_json::to_value(&quote).expect("serialize");

        assert_eq!(quote.tax, None);
        assert_eq!(quote.total, 150.0);
        assert_eq!(quote.total_discounts, 0.0);
        assert!(json.get("tax").is_none());
        assert!(json["id"].as_str().is_some_and(|id| id.starts_with("Q-")));
    }

    #[test]
    fn invalid_configuration_fails_the_whole_quote() {
        let catalog = plain_catalog();
        let rules = RuleEngine::standard();
        let assembler = QuoteAssembler::new(CatalogValidator::new(&catalog), &rules, &catalog);

        let error = assembler
            .generate_quote(&QuoteRequest::new(vec![
                ConfigurationItem::new("widget", 1),
                ConfigurationItem::new("vault", 1).with_options(&["turbo"]),
                ConfigurationItem::new("ghost", 1),
            ]))
            .expect_err("quote must fail");

        match error {
            DomainError::ConfigurationInvalid { message, failures } => {
                assert_eq!(failures.len(), 2);
                assert_eq!(
                    message,
                    "Configuration validation failed: vault: Required option 'Encryption' is \
                     missing, Invalid option 'turbo' for product 'Vault'; ghost: Product 'ghost' \
                     not found"
                );
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn identical_requests_produce_identical_totals() {
        let catalog = plain_catalog();
        let rules = RuleEngine::standard();
        let assembler = QuoteAssembler::new(CatalogValidator::new(&catalog), &rules, &catalog);
        let request = QuoteRequest::new(vec![
            ConfigurationItem::new("widget", 7).with_options(&["extra"]),
            ConfigurationItem::new("vault", 12).with_options(&["encryption"]),
        ])
        .with_customer_tier("startup")
        .with_region("ap-southeast")
        .with_tax_rate(0.0825);

        let first = assembler.generate_quote(&request).expect("first");
        let second = assembler.generate_quote(&request).expect("second");

        assert_ne!(first.id, second.id);
        assert_eq!(first.subtotal, second.subtotal);
        assert_eq!(first.total_discounts, second.total_discounts);
        assert_eq!(first.total, second.total);
        assert_eq!(first.items, second.items);
    }

    #[test]
    fn custom_rules_can_drive_prices_below_zero_only_to_zero() {
        let catalog = plain_catalog();
        let rules = RuleEngine::new(vec![PricingRule::new(
            "giveaway",
            "Giveaway",
            RuleCategory::Promotional,
            1,
            |_| true,
            |price, _| price - 1_000.0,
        )]);
        let assembler = QuoteAssembler::new(CatalogValidator::new(&catalog), &rules, &catalog);

        let quote = assembler
            .generate_quote(&QuoteRequest::new(vec![ConfigurationItem::new("widget", 2)]))
            .expect("quote");

        assert_eq!(quote.items[0].total, 0.0);
        assert_eq!(quote.total, 0.0);
        assert_eq!(quote.total_discounts, 100.0);
        assert_eq!(quote.items[0].discounts[0].amount, 1_000.0);
    }

    #[test]
    fn shape_checks_reject_malformed_requests() {
        let ok = QuoteRequest::new(vec![ConfigurationItem::new("widget", 1)]).with_tax_rate(0.0);
        let mut blank = ConfigurationItem::new("widget", 1);
        blank.product_id = ProductId::from("   ");

        assert_eq!(ok.check_shape(1), Ok(()));
        assert!(QuoteRequest::new(Vec::new()).check_shape(10).is_err());
        assert!(ok.clone().with_tax_rate(1.01).check_shape(10).is_err());
        assert!(ok.clone().with_tax_rate(f64::INFINITY).check_shape(10).is_err());
        assert_eq!(
            check_configurations(&[ConfigurationItem::new("widget", 0)], 10),
            Err("configurations[0].quantity must be at least 1".to_owned())
        );
        assert_eq!(
            check_configurations(&[ConfigurationItem::new("widget", 1), blank], 10),
            Err("configurations[1].productId must not be blank".to_owned())
        );
        assert!(check_configurations(&vec![ConfigurationItem::new("widget", 1); 3], 2).is_err());
    }
}
