pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use cpq::assembler::{ItemPricing, QuoteAssembler, QuoteRequest};
pub use cpq::catalog::{Advisory, Catalog, CatalogError};
pub use cpq::rule_table::{Adjustment, Condition, RuleDefinition, RuleTable, RuleTableError};
pub use cpq::rules::{round_to_cents, PricingContext, PricingRule, RuleEngine};
pub use cpq::validator::{CatalogValidator, ConfigurationValidator};
pub use cpq::{CpqRuntime, DeterministicCpqRuntime};
pub use domain::product::{OptionId, Product, ProductId, ProductOption};
pub use domain::quote::{ConfigurationItem, CustomFields, Quote, QuoteId, QuoteLineItem};
pub use domain::rule::{AppliedRule, RuleCategory, RuleId, RuleSummary};
pub use domain::validation::{BatchValidation, ItemValidation, ValidationIssue, ValidationResult};
pub use errors::{ApplicationError, DomainError, InterfaceError};
