use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use pricebook_core::config::{AppConfig, LoadOptions};
use serde::Serialize;
use toml::Value;

use super::{CommandResult, EXIT_LOAD_FAILURE};

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_LOAD_FAILURE,
            )
        }
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_key: &str| {
        field_source(key_path, env_key, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let entries = vec![
        ConfigEntry {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            source: source("server.bind_address", "PRICEBOOK_SERVER_BIND_ADDRESS"),
        },
        ConfigEntry {
            key: "server.port",
            value: config.server.port.to_string(),
            source: source("server.port", "PRICEBOOK_SERVER_PORT"),
        },
        ConfigEntry {
            key: "server.graceful_shutdown_secs",
            value: config.server.graceful_shutdown_secs.to_string(),
            source: source(
                "server.graceful_shutdown_secs",
                "PRICEBOOK_SERVER_GRACEFUL_SHUTDOWN_SECS",
            ),
        },
        ConfigEntry {
            key: "server.max_configurations",
            value: config.server.max_configurations.to_string(),
            source: source("server.max_configurations", "PRICEBOOK_SERVER_MAX_CONFIGURATIONS"),
        },
        ConfigEntry {
            key: "pricing.catalog_path",
            value: display_path(config.pricing.catalog_path.as_deref(), "<standard catalog>"),
            source: source("pricing.catalog_path", "PRICEBOOK_PRICING_CATALOG_PATH"),
        },
        ConfigEntry {
            key: "pricing.rules_path",
            value: display_path(config.pricing.rules_path.as_deref(), "<standard rules>"),
            source: source("pricing.rules_path", "PRICEBOOK_PRICING_RULES_PATH"),
        },
        ConfigEntry {
            key: "logging.level",
            value: config.logging.level.clone(),
            source: source("logging.level", "PRICEBOOK_LOGGING_LEVEL"),
        },
        ConfigEntry {
            key: "logging.format",
            value: format!("{:?}", config.logging.format).to_ascii_lowercase(),
            source: source("logging.format", "PRICEBOOK_LOGGING_FORMAT"),
        },
    ];

    CommandResult::success(
        "config",
        "effective config (source precedence: env > file > default)",
        entries,
    )
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("pricebook.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/pricebook.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let alias = env_key.replace("_LOGGING_", "_LOG_");
    for key in [env_key, alias.as_str()] {
        if env::var(key).is_ok_and(|value| !value.trim().is_empty()) {
            return format!("env ({key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn display_path(path: Option<&Path>, unset: &str) -> String {
    path.map(|path| path.display().to_string()).unwrap_or_else(|| unset.to_string())
}
