use std::collections::HashSet;

use crate::cpq::catalog::Catalog;
use crate::domain::{
    product::{OptionId, Product, ProductId},
    quote::ConfigurationItem,
    validation::{BatchValidation, ItemValidation, ValidationIssue, ValidationResult},
};

const PRODUCT_FIELD: &str = "productId";
const OPTIONS_FIELD: &str = "selectedOptions";

pub trait ConfigurationValidator: Send + Sync {
    fn validate(&self, product_id: &ProductId, selected: &[OptionId]) -> ValidationResult;

    fn validate_batch(&self, items: &[ConfigurationItem]) -> BatchValidation {
        let items = items
            .iter()
            .enumerate()
            .map(|(index, item)| ItemValidation {
                index,
                product_id: item.product_id.clone(),
                result: self.validate(&item.product_id, &item.selected_options),
            })
            .collect::<Vec<_>>();

        BatchValidation { is_valid: items.iter().all(|item| item.result.is_valid), items }
    }
}

/// Checks selections against the constraints declared in a catalog.
#[derive(Clone, Copy, Debug)]
pub struct CatalogValidator<'a> {
    catalog: &'a Catalog,
}

impl<'a> CatalogValidator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }
}

impl ConfigurationValidator for CatalogValidator<'_> {
    fn validate(&self, product_id: &ProductId, selected: &[OptionId]) -> ValidationResult {
        match self.catalog.find(product_id) {
            Some(product) => validate_selection(product, selected, self.catalog),
            None => ValidationResult::from_issues(
                vec![ValidationIssue::new(
                    PRODUCT_FIELD,
                    format!("Product '{product_id}' not found"),
                )],
                Vec::new(),
            ),
        }
    }
}

/// Runs every option check against an existing product and accumulates the
/// findings; nothing short-circuits here.
pub fn validate_selection(
    product: &Product,
    selected: &[OptionId],
    catalog: &Catalog,
) -> ValidationResult {
    let mut seen = HashSet::new();
    let selected = selected.iter().filter(|id| seen.insert(*id)).collect::<Vec<_>>();
    let is_selected = |id: &OptionId| selected.iter().any(|candidate| *candidate == id);

    let mut errors = Vec::new();

    for option in product.options.iter().filter(|option| option.is_required) {
        if !is_selected(&option.id) {
            errors.push(ValidationIssue::new(
                OPTIONS_FIELD,
                format!("Required option '{}' is missing", option.name),
            ));
        }
    }

    for option_id in &selected {
        if !product.has_option(*option_id) {
            errors.push(ValidationIssue::new(
                OPTIONS_FIELD,
                format!("Invalid option '{}' for product '{}'", option_id, product.name),
            ));
        }
    }

    for option in selected.iter().filter_map(|id| product.option(id)) {
        for conflict_id in option.conflicts.iter().filter(|id| is_selected(*id)) {
            let conflict_name = product
                .option(conflict_id)
                .map(|conflict| conflict.name.as_str())
                .unwrap_or(conflict_id.0.as_str());
            errors.push(ValidationIssue::new(
                OPTIONS_FIELD,
                format!(
                    "Options '{}' and '{}' cannot be selected together",
                    option.name, conflict_name
                ),
            ));
        }
    }

    for option in selected.iter().filter_map(|id| product.option(id)) {
        for dependency_id in option.dependencies.iter().filter(|id| !is_selected(*id)) {
            let dependency_name = product
                .option(dependency_id)
                .map(|dependency| dependency.name.as_str())
                .unwrap_or(dependency_id.0.as_str());
            errors.push(ValidationIssue::new(
                OPTIONS_FIELD,
                format!("Option '{}' requires '{}'", option.name, dependency_name),
            ));
        }
    }

    let warnings = catalog
        .advisories()
        .iter()
        .filter(|advisory| advisory.category == product.category)
        .filter(|advisory| advisory.unless_option.as_ref().map_or(true, |id| !is_selected(id)))
        .map(|advisory| ValidationIssue::new(&advisory.field, advisory.message.clone()))
        .collect();

    ValidationResult::from_issues(errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::{CatalogValidator, ConfigurationValidator};
    use crate::cpq::catalog::{Advisory, Catalog};
    use crate::domain::{
        product::{OptionId, Product, ProductId, ProductOption},
        quote::ConfigurationItem,
    };

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Product {
                id: ProductId::from("compute-standard"),
                name: "Standard Compute".to_owned(),
                description: String::new(),
                base_price: 50.0,
                category: "compute".to_owned(),
                options: vec![
                    ProductOption::new("linux", "Linux", 0.0).conflicts_with(&["windows"]),
                    ProductOption::new("windows", "Windows", 25.0),
                    ProductOption::new("ssd-storage", "SSD Storage", 10.0),
                    ProductOption::new("backup", "Backup", 8.0).depends_on(&["ssd-storage"]),
                ],
                metadata: Default::default(),
            },
            Product {
                id: ProductId::from("database-postgres"),
                name: "Managed Postgres".to_owned(),
                description: String::new(),
                base_price: 80.0,
                category: "database".to_owned(),
                options: vec![
                    ProductOption::new("encryption", "Encryption at Rest", 0.0).required(),
                    ProductOption::new("automated-backup", "Automated Backup", 15.0),
                ],
                metadata: Default::default(),
            },
        ])
        .with_advisories(vec![Advisory {
            category: "database".to_owned(),
            unless_option: Some(OptionId::from("automated-backup")),
            field: "selectedOptions".to_owned(),
            message: "Automated backups are recommended".to_owned(),
        }])
    }

    fn ids(values: &[&str]) -> Vec<OptionId> {
        values.iter().map(|value| OptionId::from(*value)).collect()
    }

    #[test]
    fn unknown_product_short_circuits_with_single_error() {
        let catalog = catalog();
        let result = CatalogValidator::new(&catalog)
            .validate(&ProductId::from("mainframe"), &ids(&["linux", "bogus"]));

        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "productId");
        assert!(result.errors[0].message.contains("not found"));
        assert!(result.warnings.is_none());
    }

    #[test]
    fn empty_selection_without_required_options_is_valid() {
        let catalog = catalog();
        let result =
            CatalogValidator::new(&catalog).validate(&ProductId::from("compute-standard"), &[]);

        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn conflicting_options_report_cannot_be_selected_together() {
        let catalog = catalog();
        let result = CatalogValidator::new(&catalog)
            .validate(&ProductId::from("compute-standard"), &ids(&["linux", "windows"]));

        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0].message,
            "Options 'Linux' and 'Windows' cannot be selected together"
        );
    }

    #[test]
    fn conflicts_are_not_symmetric() {
        let mut catalog_products = catalog().products().to_vec();
        catalog_products[0].options[1] =
            ProductOption::new("windows", "Windows", 25.0).conflicts_with(&["linux"]);
        let symmetric = Catalog::new(catalog_products);

        let one_sided = catalog();
        let one_sided_result = CatalogValidator::new(&one_sided)
            .validate(&ProductId::from("compute-standard"), &ids(&["windows", "linux"]));
        let two_sided_result = CatalogValidator::new(&symmetric)
            .validate(&ProductId::from("compute-standard"), &ids(&["windows", "linux"]));

        assert_eq!(one_sided_result.errors.len(), 1);
        assert_eq!(two_sided_result.errors.len(), 2);
    }

    #[test]
    fn errors_accumulate_in_check_order() {
        let catalog = catalog();
        let result = CatalogValidator::new(&catalog).validate(
            &ProductId::from("database-postgres"),
            &ids(&["automated-backup", "turbo"]),
        );
        let compute = CatalogValidator::new(&catalog).validate(
            &ProductId::from("compute-standard"),
            &ids(&["backup", "linux", "windows", "gpu"]),
        );

        assert_eq!(
            result.error_messages(),
            vec![
                "Required option 'Encryption at Rest' is missing",
                "Invalid option 'turbo' for product 'Managed Postgres'",
            ]
        );
        assert_eq!(
            compute.error_messages(),
            vec![
                "Invalid option 'gpu' for product 'Standard Compute'",
                "Options 'Linux' and 'Windows' cannot be selected together",
                "Option 'Backup' requires 'SSD Storage'",
            ]
        );
    }

    #[test]
    fn advisory_warnings_never_affect_validity() {
        let catalog = catalog();
        let validator = CatalogValidator::new(&catalog);

        let without_backup =
            validator.validate(&ProductId::from("database-postgres"), &ids(&["encryption"]));
        assert!(without_backup.is_valid);
        assert_eq!(without_backup.warnings().len(), 1);

        let with_backup = validator.validate(
            &ProductId::from("database-postgres"),
            &ids(&["encryption", "automated-backup"]),
        );
        assert!(with_backup.is_valid);
        assert!(with_backup.warnings.is_none());
    }

    #[test]
    fn duplicate_selections_are_checked_once() {
        let catalog = catalog();
        let result = CatalogValidator::new(&catalog)
            .validate(&ProductId::from("compute-standard"), &ids(&["gpu", "gpu"]));

        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn batch_is_valid_only_when_every_item_is_valid() {
        let catalog = catalog();
        let validator = CatalogValidator::new(&catalog);

        let valid = validator.validate_batch(&[
            ConfigurationItem::new("compute-standard", 1),
            ConfigurationItem::new("database-postgres", 2).with_options(&["encryption"]),
        ]);
        assert!(valid.is_valid);
        assert_eq!(valid.items.len(), 2);

        let invalid = validator.validate_batch(&[
            ConfigurationItem::new("compute-standard", 1),
            ConfigurationItem::new("database-postgres", 1),
        ]);
        assert!(!invalid.is_valid);
        assert_eq!(invalid.failures().count(), 1);
        assert_eq!(invalid.items[1].index, 1);
    }
}
