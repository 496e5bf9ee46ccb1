use thiserror::Error;

use crate::domain::{product::ProductId, validation::ItemValidation};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("product `{0}` not found")]
    ProductNotFound(ProductId),
    #[error("{message}")]
    ConfigurationInvalid { message: String, failures: Vec<ItemValidation> },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("catalog failure: {0}")]
    Catalog(String),
    #[error("rule table failure: {0}")]
    Rules(String),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, details: Option<serde_json::Value>, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::NotFound { .. } => "The requested resource was not found.",
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(DomainError::ProductNotFound(_)) => Self::NotFound {
                message: "Product not found".to_owned(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Domain(DomainError::ConfigurationInvalid { message, failures }) => {
                Self::BadRequest {
                    message,
                    details: serde_json::to_value(&failures)
                        .ok()
                        .map(|failures| serde_json::json!({ "failures": failures })),
                    correlation_id: "unassigned".to_owned(),
                }
            }
            ApplicationError::Catalog(message) | ApplicationError::Rules(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{
        product::ProductId,
        validation::{ItemValidation, ValidationIssue, ValidationResult},
    };
    use crate::errors::{ApplicationError, DomainError, InterfaceError};

    #[test]
    fn invalid_configuration_maps_to_bad_request_with_details() {
        let failure = ItemValidation {
            index: 0,
            product_id: ProductId::from("compute-standard"),
            result: ValidationResult::from_issues(
                vec![ValidationIssue::new("selectedOptions", "Required option 'OS' is missing")],
                Vec::new(),
            ),
        };
        let interface = ApplicationError::from(DomainError::ConfigurationInvalid {
            message: "Configuration validation failed".to_owned(),
            failures: vec![failure],
        })
        .into_interface("req-1");

        match interface {
            InterfaceError::BadRequest { ref details, ref correlation_id, .. } => {
                assert_eq!(correlation_id, "req-1");
                let details = details.as_ref().expect("details should be present");
                assert_eq!(details["failures"][0]["productId"], "compute-standard");
            }
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn missing_product_maps_to_not_found() {
        let interface =
            ApplicationError::from(DomainError::ProductNotFound(ProductId::from("nope")))
                .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::NotFound { ref message, .. } if message == "Product not found"));
        assert_eq!(interface.correlation_id(), "req-2");
        assert_eq!(interface.user_message(), "The requested resource was not found.");
    }

    #[test]
    fn catalog_error_maps_to_internal() {
        let interface =
            ApplicationError::Catalog("duplicate product id".to_owned()).into_interface("req-3");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }

    #[test]
    fn rule_table_error_maps_to_internal() {
        let interface = ApplicationError::Rules("duplicate rule id `dup`".to_owned())
            .into_interface("req-4");

        match interface {
            InterfaceError::Internal { ref message, ref correlation_id } => {
                assert_eq!(message, "duplicate rule id `dup`");
                assert_eq!(correlation_id, "req-4");
            }
            other => panic!("expected internal error, got {other:?}"),
        }
    }
}
