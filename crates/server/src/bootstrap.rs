use std::sync::Arc;

use pricebook_core::config::{AppConfig, ConfigError, LoadOptions};
use pricebook_core::{ApplicationError, CpqRuntime, DeterministicCpqRuntime};
use thiserror::Error;
use tracing::info;

use crate::api::AppState;

pub struct Application {
    pub config: AppConfig,
    pub runtime: Arc<DeterministicCpqRuntime>,
}

impl Application {
    pub fn state(&self) -> AppState {
        AppState::new(self.runtime.clone(), self.config.server.max_configurations)
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("pricing tables could not be loaded: {0}")]
    Pricing(#[from] ApplicationError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let runtime = DeterministicCpqRuntime::from_config(&config.pricing)?;
    info!(
        event_name = "system.bootstrap.pricing_loaded",
        correlation_id = "bootstrap",
        products = runtime.catalog().len(),
        rules = runtime.rules().len(),
        catalog_source = if config.pricing.catalog_path.is_some() { "file" } else { "standard" },
        rules_source = if config.pricing.rules_path.is_some() { "file" } else { "standard" },
        "catalog and rule table loaded"
    );

    Ok(Application { config, runtime: Arc::new(runtime) })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pricebook_core::config::{ConfigOverrides, LoadOptions};
    use pricebook_core::{CpqRuntime, QuoteRequest};
    use tempfile::TempDir;

    use crate::bootstrap::{bootstrap, BootstrapError};

    #[test]
    fn bootstrap_uses_standard_tables_by_default() {
        let app = bootstrap(LoadOptions::default()).expect("bootstrap should succeed");

        assert_eq!(app.runtime.catalog().len(), 6);
        assert_eq!(app.runtime.rules().len(), 11);
        assert_eq!(app.state().max_configurations, app.config.server.max_configurations);
    }

    #[test]
    fn bootstrap_fails_fast_on_malformed_rule_file() {
        let dir = TempDir::new().expect("tempdir");
        let rules = dir.path().join("rules.toml");
        fs::write(&rules, "[[rules]]\nid = \"broken\"\n").expect("write rules");

        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides { rules_path: Some(rules), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        });

        assert!(matches!(result, Err(BootstrapError::Pricing(_))));
    }

    #[test]
    fn bootstrap_loads_a_catalog_file() {
        let dir = TempDir::new().expect("tempdir");
        let catalog = dir.path().join("catalog.toml");
        fs::write(
            &catalog,
            r#"
[[products]]
id = "seat"
name = "Seat"
basePrice = 9.5
category = "licenses"
"#,
        )
        .expect("write catalog");

        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides { catalog_path: Some(catalog), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        })
        .expect("bootstrap should succeed");
        let quote = app
            .runtime
            .generate_quote(&QuoteRequest::new(vec![pricebook_core::ConfigurationItem::new(
                "seat", 2,
            )]))
            .expect("quote");

        assert_eq!(app.runtime.catalog().categories(), vec!["licenses".to_string()]);
        assert_eq!(quote.total, 19.0);
    }
}
