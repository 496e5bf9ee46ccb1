use pricebook_core::config::LoadOptions;
use pricebook_core::{CpqRuntime, OptionId, ProductId};

use super::{load_runtime, CommandResult, EXIT_INVALID};

pub fn run(options: &LoadOptions, product: &str, selected: &[String]) -> CommandResult {
    let (_, runtime) = match load_runtime("validate", options) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    let product_id = ProductId::from(product.trim());
    let selected = selected.iter().map(|id| OptionId::from(id.trim())).collect::<Vec<_>>();
    let result = runtime.validate(&product_id, &selected);

    if result.is_valid {
        let message = format!(
            "configuration for `{product_id}` is valid ({} warnings)",
            result.warnings().len()
        );
        CommandResult::success("validate", message, result)
    } else {
        CommandResult::failure_with_data(
            "validate",
            "configuration_invalid",
            result.error_messages().join(", "),
            EXIT_INVALID,
            serde_json::to_value(&result).ok(),
        )
    }
}
