//! Compiled-in catalog and rule table used when no files are configured.

use crate::cpq::catalog::Advisory;
use crate::cpq::rule_table::{Adjustment, Condition, RuleDefinition, RuleTable};
use crate::cpq::rules::RuleEngine;
use crate::domain::{
    product::{OptionId, Product, ProductId, ProductOption},
    rule::{RuleCategory, RuleId},
};

pub fn products() -> Vec<Product> {
    vec![
        product(
            "compute-standard",
            "Standard Compute",
            "General purpose virtual machine",
            50.0,
            "compute",
            vec![
                ProductOption::new("linux", "Linux", 0.0)
                    .in_category("os")
                    .conflicts_with(&["windows"]),
                ProductOption::new("windows", "Windows Server", 25.0).in_category("os"),
                ProductOption::new("ssd-storage", "SSD Storage", 10.0).in_category("storage"),
                ProductOption::new("backup", "Daily Backup", 8.0)
                    .in_category("storage")
                    .depends_on(&["ssd-storage"]),
                ProductOption::new("priority-support", "Priority Support", 30.0)
                    .in_category("support"),
                ProductOption::new("spot-capacity", "Spot Capacity", -15.0)
                    .in_category("pricing")
                    .conflicts_with(&["priority-support"]),
            ],
        ),
        product(
            "compute-gpu",
            "GPU Compute",
            "Accelerated instance for training and inference",
            400.0,
            "compute",
            vec![
                ProductOption::new("gpu-driver", "Managed GPU Driver", 0.0)
                    .required()
                    .in_category("runtime"),
                ProductOption::new("nvlink", "NVLink Interconnect", 120.0)
                    .in_category("hardware"),
                ProductOption::new("multi-gpu", "Multi-GPU Node", 350.0)
                    .in_category("hardware")
                    .depends_on(&["nvlink"]),
                ProductOption::new("priority-support", "Priority Support", 60.0)
                    .in_category("support"),
            ],
        ),
        product(
            "database-postgres",
            "Managed PostgreSQL",
            "Relational database with automated maintenance",
            80.0,
            "database",
            vec![
                ProductOption::new("encryption-at-rest", "Encryption at Rest", 0.0)
                    .required()
                    .in_category("security"),
                ProductOption::new("automated-backup", "Automated Backup", 15.0)
                    .in_category("durability"),
                ProductOption::new("high-availability", "High Availability", 60.0)
                    .in_category("durability")
                    .depends_on(&["automated-backup"]),
                ProductOption::new("read-replica", "Read Replica", 40.0)
                    .in_category("scaling")
                    .depends_on(&["high-availability"]),
                ProductOption::new("priority-support", "Priority Support", 30.0)
                    .in_category("support"),
            ],
        ),
        product(
            "database-redis",
            "Managed Redis",
            "In-memory key value store",
            45.0,
            "database",
            vec![
                ProductOption::new("persistence", "Persistence", 10.0).in_category("durability"),
                ProductOption::new("cluster-mode", "Cluster Mode", 35.0)
                    .in_category("scaling")
                    .conflicts_with(&["single-node"]),
                ProductOption::new("single-node", "Single Node Discount", -5.0)
                    .in_category("pricing"),
            ],
        ),
        product(
            "storage-object",
            "Object Storage",
            "S3 compatible object storage",
            20.0,
            "storage",
            vec![
                ProductOption::new("versioning", "Versioning", 5.0),
                ProductOption::new("cdn", "CDN Distribution", 25.0),
                ProductOption::new("archive-tier", "Archive Tier", -4.0).conflicts_with(&["cdn"]),
            ],
        ),
        product(
            "support-business",
            "Business Support",
            "Guaranteed response times and a support portal",
            100.0,
            "support",
            vec![
                ProductOption::new("around-the-clock", "24x7 Coverage", 150.0),
                ProductOption::new("technical-account-manager", "Technical Account Manager", 500.0)
                    .depends_on(&["around-the-clock"]),
            ],
        ),
    ]
}

pub fn advisories() -> Vec<Advisory> {
    vec![
        Advisory {
            category: "database".to_owned(),
            unless_option: Some(OptionId::from("automated-backup")),
            field: "selectedOptions".to_owned(),
            message: "Automated Backup is recommended for production databases".to_owned(),
        },
        Advisory {
            category: "compute".to_owned(),
            unless_option: Some(OptionId::from("priority-support")),
            field: "selectedOptions".to_owned(),
            message: "Consider Priority Support or a Business Support plan for compute workloads"
                .to_owned(),
        },
    ]
}

pub fn rule_definitions() -> Vec<RuleDefinition> {
    vec![
        rule(
            "volume-discount-20",
            "Volume discount (20%)",
            "20% off line items with 10 or more units",
            RuleCategory::Volume,
            10,
            Condition::QuantityAtLeast { value: 10 },
            Adjustment::PercentOff { percent: 20.0 },
        ),
        rule(
            "volume-discount-10",
            "Volume discount (10%)",
            "10% off line items with 5 to 9 units",
            RuleCategory::Volume,
            11,
            Condition::All {
                conditions: vec![
                    Condition::QuantityAtLeast { value: 5 },
                    Condition::QuantityBelow { value: 10 },
                ],
            },
            Adjustment::PercentOff { percent: 10.0 },
        ),
        rule(
            "support-comp-enterprise",
            "Complimentary priority support",
            "Enterprise customers ordering 3 or more units get one unit of Priority Support free",
            RuleCategory::Promotional,
            15,
            Condition::All {
                conditions: vec![
                    Condition::CustomerTier { value: "enterprise".to_owned() },
                    Condition::QuantityAtLeast { value: 3 },
                    Condition::OptionSelected { option: OptionId::from("priority-support") },
                ],
            },
            Adjustment::CompOption { option: OptionId::from("priority-support") },
        ),
        rule(
            "tier-enterprise",
            "Enterprise discount",
            "15% off for enterprise customers",
            RuleCategory::CustomerTier,
            20,
            Condition::CustomerTier { value: "enterprise".to_owned() },
            Adjustment::PercentOff { percent: 15.0 },
        ),
        rule(
            "tier-startup",
            "Startup discount",
            "25% off for startup program members",
            RuleCategory::CustomerTier,
            21,
            Condition::CustomerTier { value: "startup".to_owned() },
            Adjustment::PercentOff { percent: 25.0 },
        ),
        rule(
            "bundle-compute-database",
            "Compute and database bundle",
            "5% off when compute and database products are quoted together",
            RuleCategory::Bundle,
            30,
            Condition::BundleCategories {
                categories: vec!["compute".to_owned(), "database".to_owned()],
            },
            Adjustment::PercentOff { percent: 5.0 },
        ),
        rule(
            "bundle-multi-product",
            "Multi-product bundle",
            "3% off when three or more distinct products are quoted together",
            RuleCategory::Bundle,
            31,
            Condition::MinDistinctProducts { value: 3 },
            Adjustment::PercentOff { percent: 3.0 },
        ),
        rule(
            "region-us-east",
            "US East baseline",
            "Baseline region; prices are unchanged",
            RuleCategory::Regional,
            40,
            Condition::Region { value: "us-east".to_owned() },
            Adjustment::None,
        ),
        rule(
            "region-eu-central",
            "EU Central premium",
            "8% premium for eu-central",
            RuleCategory::Regional,
            41,
            Condition::Region { value: "eu-central".to_owned() },
            Adjustment::PercentSurcharge { percent: 8.0 },
        ),
        rule(
            "region-ap-southeast",
            "AP Southeast premium",
            "12% premium for ap-southeast",
            RuleCategory::Regional,
            42,
            Condition::Region { value: "ap-southeast".to_owned() },
            Adjustment::PercentSurcharge { percent: 12.0 },
        ),
        rule(
            "region-sa-east",
            "SA East multiplier",
            "Prices in sa-east are multiplied by 1.15",
            RuleCategory::Regional,
            43,
            Condition::Region { value: "sa-east".to_owned() },
            Adjustment::Multiplier { factor: 1.15 },
        ),
    ]
}

impl RuleEngine {
    /// The canonical rule table.
    pub fn standard() -> Self {
        RuleTable { rules: rule_definitions() }.into_engine()
    }
}

fn product(
    id: &str,
    name: &str,
    description: &str,
    base_price: f64,
    category: &str,
    options: Vec<ProductOption>,
) -> Product {
    Product {
        id: ProductId::from(id),
        name: name.to_owned(),
        description: description.to_owned(),
        base_price,
        category: category.to_owned(),
        options,
        metadata: Default::default(),
    }
}

fn rule(
    id: &str,
    name: &str,
    description: &str,
    category: RuleCategory,
    priority: i32,
    when: Condition,
    adjust: Adjustment,
) -> RuleDefinition {
    RuleDefinition {
        id: RuleId::from(id),
        name: name.to_owned(),
        description: description.to_owned(),
        category,
        priority,
        when,
        adjust,
    }
}

#[cfg(test)]
mod tests {
    use super::rule_definitions;
    use crate::cpq::catalog::Catalog;
    use crate::cpq::rule_table::RuleTable;
    use crate::cpq::rules::{PricingContext, RuleEngine};
    use crate::domain::{product::ProductId, quote::ConfigurationItem};

    fn volume_rules_for(quantity: u32) -> Vec<String> {
        let catalog = Catalog::standard();
        let engine = RuleEngine::standard();
        let product =
            catalog.find(&ProductId::from("storage-object")).expect("storage-object").clone();
        let items = vec![ConfigurationItem::new("storage-object", quantity)];
        let context = PricingContext::new(&product, &items[0], &items, &catalog);
        let base = product.base_price * f64::from(quantity);

        engine
            .apply_rules(base, &context)
            .applied_rules
            .into_iter()
            .map(|rule| rule.rule_id.0)
            .filter(|id| id.starts_with("volume-"))
            .collect()
    }

    #[test]
    fn at_most_one_volume_rule_fires_for_any_quantity() {
        for quantity in 1..5 {
            assert!(volume_rules_for(quantity).is_empty(), "quantity {quantity}");
        }
        for quantity in 5..10 {
            assert_eq!(volume_rules_for(quantity), vec!["volume-discount-10"], "quantity {quantity}");
        }
        for quantity in [10, 11, 50, 1_000] {
            assert_eq!(volume_rules_for(quantity), vec!["volume-discount-20"], "quantity {quantity}");
        }
    }

    #[test]
    fn standard_table_is_ordered_by_priority_and_serializes() {
        let summaries = RuleEngine::standard().describe();
        let priorities = summaries.iter().map(|rule| rule.priority).collect::<Vec<_>>();
        let mut sorted = priorities.clone();
        sorted.sort();

        assert_eq!(priorities, sorted);
        assert_eq!(summaries[0].id.0, "volume-discount-20");

        let raw = toml::to_string(&RuleTable { rules: rule_definitions() })
            .expect("standard table should serialize to toml");
        let reparsed = RuleTable::from_toml_str(&raw).expect("serialized table should parse");
        assert_eq!(reparsed.rules, rule_definitions());
    }
}
