use pricebook_core::config::LoadOptions;
use pricebook_core::{CpqRuntime, RuleCategory};

use super::{load_runtime, CommandResult, EXIT_INVALID};

const CATEGORIES: [RuleCategory; 5] = [
    RuleCategory::Volume,
    RuleCategory::CustomerTier,
    RuleCategory::Bundle,
    RuleCategory::Regional,
    RuleCategory::Promotional,
];

pub fn run(options: &LoadOptions, category: Option<&str>) -> CommandResult {
    let category = match category.map(|raw| (raw, RuleCategory::parse(raw))) {
        None => None,
        Some((_, Some(category))) => Some(category),
        Some((raw, None)) => {
            let known = CATEGORIES.iter().map(RuleCategory::as_str).collect::<Vec<_>>();
            return CommandResult::failure(
                "rules",
                "unknown_category",
                format!(
                    "unknown rule category `{}` (expected one of: {})",
                    raw.trim(),
                    known.join(", ")
                ),
                EXIT_INVALID,
            );
        }
    };

    let (_, runtime) = match load_runtime("rules", options) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    let rules = runtime
        .describe_rules()
        .into_iter()
        .filter(|rule| category.map_or(true, |category| rule.category == category))
        .collect::<Vec<_>>();
    let message = match category {
        Some(category) => format!("{} {category} rules in evaluation order", rules.len()),
        None => format!("{} rules in evaluation order", rules.len()),
    };
    CommandResult::success("rules", message, rules)
}
