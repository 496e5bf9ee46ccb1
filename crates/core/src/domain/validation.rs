use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self { field: field.to_owned(), message: message.into() }
    }
}

/// Outcome of checking one option selection against a product.
///
/// `warnings` is `None` when no advisory applied; callers treat that the same
/// as an empty list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<ValidationIssue>>,
}

impl ValidationResult {
    pub fn from_issues(errors: Vec<ValidationIssue>, warnings: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings: (!warnings.is_empty()).then_some(warnings),
        }
    }

    pub fn warnings(&self) -> &[ValidationIssue] {
        self.warnings.as_deref().unwrap_or_default()
    }

    pub fn error_messages(&self) -> Vec<&str> {
        self.errors.iter().map(|issue| issue.message.as_str()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemValidation {
    pub index: usize,
    pub product_id: ProductId,
    pub result: ValidationResult,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchValidation {
    pub is_valid: bool,
    pub items: Vec<ItemValidation>,
}

impl BatchValidation {
    pub fn failures(&self) -> impl Iterator<Item = &ItemValidation> {
        self.items.iter().filter(|item| !item.result.is_valid)
    }

    /// `<productId>: <e1>, <e2>; <productId2>: ...` over the invalid items.
    pub fn failure_summary(&self) -> String {
        self.failures()
            .map(|item| format!("{}: {}", item.product_id, item.result.error_messages().join(", ")))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
