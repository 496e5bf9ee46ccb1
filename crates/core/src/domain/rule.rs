use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub String);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RuleId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Volume,
    CustomerTier,
    Bundle,
    Regional,
    Promotional,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::CustomerTier => "customer_tier",
            Self::Bundle => "bundle",
            Self::Regional => "regional",
            Self::Promotional => "promotional",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "volume" => Some(Self::Volume),
            "customer_tier" => Some(Self::CustomerTier),
            "bundle" => Some(Self::Bundle),
            "regional" => Some(Self::Regional),
            "promotional" => Some(Self::Promotional),
            _ => None,
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule that changed the price while it was applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedRule {
    pub rule_id: RuleId,
    pub rule_name: String,
    /// `price before - price after`; negative for surcharges.
    pub discount_amount: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOutcome {
    pub final_price: f64,
    pub applied_rules: Vec<AppliedRule>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSummary {
    pub id: RuleId,
    pub name: String,
    pub description: String,
    pub category: RuleCategory,
    pub priority: i32,
}

#[cfg(test)]
mod tests {
    use super::RuleCategory;

    #[test]
    fn category_round_trips_through_its_label() {
        for category in [
            RuleCategory::Volume,
            RuleCategory::CustomerTier,
            RuleCategory::Bundle,
            RuleCategory::Regional,
            RuleCategory::Promotional,
        ] {
            assert_eq!(RuleCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(RuleCategory::parse(" Customer_Tier "), Some(RuleCategory::CustomerTier));
        assert_eq!(RuleCategory::parse("seasonal"), None);
        assert_eq!(RuleCategory::Regional.to_string(), "regional");
    }
}
