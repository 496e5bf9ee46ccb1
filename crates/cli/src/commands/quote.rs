use std::fs;
use std::path::Path;

use pricebook_core::config::LoadOptions;
use pricebook_core::{CpqRuntime, DomainError, QuoteRequest};

use super::{load_runtime, CommandResult, EXIT_INVALID, EXIT_LOAD_FAILURE};

pub fn run(options: &LoadOptions, file: &Path) -> CommandResult {
    let (config, runtime) = match load_runtime("quote", options) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    let raw = match fs::read_to_string(file) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "request_read",
                format!("could not read `{}`: {error}", file.display()),
                EXIT_LOAD_FAILURE,
            )
        }
    };
    let request = match serde_json::from_str::<QuoteRequest>(&raw) {
        Ok(request) => request,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "request_malformed",
                format!("invalid quote request: {error}"),
                EXIT_INVALID,
            )
        }
    };
    if let Err(message) = request.check_shape(config.server.max_configurations) {
        return CommandResult::failure("quote", "request_malformed", message, EXIT_INVALID);
    }

    match runtime.generate_quote(&request) {
        Ok(quote) => {
            let message = format!("quote {} total {:.2}", quote.id, quote.total);
            CommandResult::success("quote", message, quote)
        }
        Err(DomainError::ConfigurationInvalid { message, failures }) => {
            CommandResult::failure_with_data(
                "quote",
                "configuration_invalid",
                message,
                EXIT_INVALID,
                serde_json::to_value(&failures)
                    .ok()
                    .map(|failures| serde_json::json!({ "failures": failures })),
            )
        }
        Err(error) => {
            CommandResult::failure("quote", "quote_failed", error.to_string(), EXIT_INVALID)
        }
    }
}
