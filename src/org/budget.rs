use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::org::Resource;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BudgetSummary {
    pub total_cost: f64,
    pub total_units: u64,
    pub by_category: BTreeMap<String, f64>,
}

pub fn line_cost(resource: &Resource) -> f64 {
    resource.unit_cost.max(0.0) * f64::from(resource.quantity)
}

pub fn summarize_budget(resources: &[Resource]) -> BudgetSummary {
    let mut summary = BudgetSummary::default();
    for resource in resources {
        let cost = line_cost(resource);
        let category = if resource.category.trim().is_empty() {
            "uncategorized".to_string()
        } else {
            resource.category.trim().to_string()
        };
        *summary.by_category.entry(category).or_insert(0.0) += cost;
        summary.total_cost += cost;
        summary.total_units += u64::from(resource.quantity);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(category: &str, unit_cost: f64, quantity: u32) -> Resource {
        Resource {
            id: String::new(),
            name: "item".to_string(),
            category: category.to_string(),
            unit_cost,
            quantity,
        }
    }

    #[test]
    fn totals_by_category() {
        let summary = summarize_budget(&[
            resource("tooling", 120.0, 3),
            resource("tooling", 10.0, 1),
            resource("", 50.0, 2),
            resource("safety", -5.0, 4),
        ]);
        assert!((summary.total_cost - 470.0).abs() < 1e-9);
        assert_eq!(summary.total_units, 10);
        assert!((summary.by_category["tooling"] - 370.0).abs() < 1e-9);
        assert!((summary.by_category["uncategorized"] - 100.0).abs() < 1e-9);
        assert_eq!(summary.by_category["safety"], 0.0);
    }

    #[test]
    fn empty_budget_is_zero() {
        assert_eq!(summarize_budget(&[]), BudgetSummary::default());
    }
}
