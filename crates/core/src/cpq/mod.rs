pub mod assembler;
pub mod catalog;
pub mod rule_table;
pub mod rules;
pub mod standard;
pub mod validator;

use crate::domain::{
    product::{OptionId, ProductId},
    quote::{ConfigurationItem, Quote},
    rule::RuleSummary,
    validation::{BatchValidation, ValidationResult},
};
use crate::config::PricingConfig;
use crate::errors::{ApplicationError, DomainError};

use self::{
    assembler::{ItemPricing, QuoteAssembler, QuoteRequest},
    catalog::Catalog,
    rules::RuleEngine,
    validator::{CatalogValidator, ConfigurationValidator},
};

/// Entry point used by the HTTP and CLI surfaces. Every call is a pure
/// function of its inputs plus the loaded catalog and rule table.
pub trait CpqRuntime: Send + Sync {
    fn catalog(&self) -> &Catalog;

    fn rules(&self) -> &RuleEngine;

    fn validate(&self, product_id: &ProductId, selected: &[OptionId]) -> ValidationResult;

    fn validate_batch(&self, items: &[ConfigurationItem]) -> BatchValidation;

    fn price_item(
        &self,
        item: &ConfigurationItem,
        request: &QuoteRequest,
    ) -> Result<ItemPricing, DomainError>;

    fn generate_quote(&self, request: &QuoteRequest) -> Result<Quote, DomainError>;

    fn describe_rules(&self) -> Vec<RuleSummary> {
        self.rules().describe()
    }
}

#[derive(Clone, Debug)]
pub struct DeterministicCpqRuntime {
    catalog: Catalog,
    rules: RuleEngine,
}

impl DeterministicCpqRuntime {
    pub fn new(catalog: Catalog, rules: RuleEngine) -> Self {
        Self { catalog, rules }
    }

    pub fn standard() -> Self {
        Self::new(Catalog::standard(), RuleEngine::standard())
    }

    /// Loads the configured catalog and rule files, falling back to the
    /// compiled-in tables for whichever path is unset.
    pub fn from_config(pricing: &PricingConfig) -> Result<Self, ApplicationError> {
        let catalog = match &pricing.catalog_path {
            Some(path) => {
                Catalog::load(path).map_err(|error| ApplicationError::Catalog(error.to_string()))?
            }
            None => Catalog::standard(),
        };
        let rules = match &pricing.rules_path {
            Some(path) => {
                RuleEngine::load(path).map_err(|error| ApplicationError::Rules(error.to_string()))?
            }
            None => RuleEngine::standard(),
        };

        Ok(Self::new(catalog, rules))
    }

    fn assembler(&self) -> QuoteAssembler<'_, CatalogValidator<'_>> {
        QuoteAssembler::new(CatalogValidator::new(&self.catalog), &self.rules, &self.catalog)
    }
}

impl Default for DeterministicCpqRuntime {
    fn default() -> Self {
        Self::standard()
    }
}

impl CpqRuntime for DeterministicCpqRuntime {
    fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    fn validate(&self, product_id: &ProductId, selected: &[OptionId]) -> ValidationResult {
        CatalogValidator::new(&self.catalog).validate(product_id, selected)
    }

    fn validate_batch(&self, items: &[ConfigurationItem]) -> BatchValidation {
        CatalogValidator::new(&self.catalog).validate_batch(items)
    }

    fn price_item(
        &self,
        item: &ConfigurationItem,
        request: &QuoteRequest,
    ) -> Result<ItemPricing, DomainError> {
        self.assembler().price_item(item, request)
    }

    fn generate_quote(&self, request: &QuoteRequest) -> Result<Quote, DomainError> {
        self.assembler().generate_quote(request)
    }
}
