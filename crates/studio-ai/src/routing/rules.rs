use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::TicketPriority;

/// Deterministic routing tables. Loadable configuration data; the bundled
/// standard set covers the chain's current department layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRules {
    /// Classifier confidence below this lets a category default take over.
    pub confidence_floor: f32,
    pub subcategory_overrides: BTreeMap<String, SubcategoryOverride>,
    pub category_departments: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcategoryOverride {
    pub department: String,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
}

#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("failed to read routing rules: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid routing rules: {0}")]
    Json(#[from] serde_json::Error),
}

impl RoutingRules {
    pub fn standard() -> Self {
        let subcategory_overrides = BTreeMap::from([
            (
                "Theft".to_string(),
                SubcategoryOverride {
                    department: "Security".to_string(),
                    priority: Some(TicketPriority::Critical),
                },
            ),
            (
                "Harassment".to_string(),
                SubcategoryOverride {
                    department: "Security".to_string(),
                    priority: Some(TicketPriority::High),
                },
            ),
            (
                "Injury".to_string(),
                SubcategoryOverride {
                    department: "Operations".to_string(),
                    priority: Some(TicketPriority::Critical),
                },
            ),
            (
                "Broken Equipment".to_string(),
                SubcategoryOverride {
                    department: "Facilities".to_string(),
                    priority: Some(TicketPriority::High),
                },
            ),
            (
                "Refund Request".to_string(),
                SubcategoryOverride {
                    department: "Billing".to_string(),
                    priority: None,
                },
            ),
            (
                "Membership Cancellation".to_string(),
                SubcategoryOverride {
                    department: "Membership Services".to_string(),
                    priority: None,
                },
            ),
        ]);

        let category_departments = BTreeMap::from([
            ("Billing & Payments".to_string(), "Billing".to_string()),
            ("Facilities".to_string(), "Facilities".to_string()),
            (
                "Membership".to_string(),
                "Membership Services".to_string(),
            ),
            ("Classes & Training".to_string(), "Training".to_string()),
            ("Safety & Security".to_string(), "Security".to_string()),
            ("General".to_string(), "Operations".to_string()),
        ]);

        Self {
            confidence_floor: 0.7,
            subcategory_overrides,
            category_departments,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RulesError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Default for RoutingRules {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tables_carry_theft_override() {
        let rules = RoutingRules::standard();
        let theft = rules
            .subcategory_overrides
            .get("Theft")
            .expect("theft override present");
        assert_eq!(theft.department, "Security");
        assert_eq!(theft.priority, Some(TicketPriority::Critical));
    }

    #[test]
    fn rules_round_trip_through_json() {
        let rules = RoutingRules::standard();
        let encoded = serde_json::to_string(&rules).expect("serializes");
        let decoded = RoutingRules::from_reader(encoded.as_bytes()).expect("parses");
        assert_eq!(decoded, rules);
    }

    #[test]
    fn override_priority_is_optional_in_loaded_rules() {
        let raw = r#"{
            "confidence_floor": 0.6,
            "subcategory_overrides": { "Lost Badge": { "department": "Security" } },
            "category_departments": {}
        }"#;
        let rules = RoutingRules::from_reader(raw.as_bytes()).expect("parses");
        let entry = rules
            .subcategory_overrides
            .get("Lost Badge")
            .expect("entry present");
        assert_eq!(entry.priority, None);
    }
}
