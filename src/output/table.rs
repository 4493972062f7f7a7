use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use serde_json::Value;

use crate::org::budget::BudgetSummary;
use crate::output::format_gap;
use crate::scenario::{Scenario, ScenarioComparison, TierDelta, WhatIfResult};
use crate::staffing::actions::StaffingAction;
use crate::staffing::{classify_gap, GapStatus, StaffingGap, StaffingLevels, Tier};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn status_cell(delta: i64) -> Cell {
    let status = classify_gap(delta);
    let color = match status {
        GapStatus::Needed(_) => Color::Red,
        GapStatus::Surplus(_) => Color::Yellow,
        GapStatus::Balanced => Color::Green,
    };
    Cell::new(status.to_string()).fg(color)
}

pub fn render_recommendation_table(recommended: &StaffingLevels) -> String {
    let mut table = new_table();
    table.set_header(vec!["Tier", "Recommended", "Minimum"]);
    for tier in Tier::ALL {
        table.add_row(vec![
            tier.to_string(),
            recommended.get(tier).to_string(),
            tier.minimum().to_string(),
        ]);
    }
    table.add_row(vec![
        "Total".to_string(),
        recommended.total().to_string(),
        String::new(),
    ]);
    table.to_string()
}

pub fn render_gap_table(
    recommended: &StaffingLevels,
    current: &StaffingLevels,
    gap: &StaffingGap,
) -> String {
    let mut table = new_table();
    table.set_header(vec!["Tier", "Recommended", "Current", "Gap", "Status"]);
    for tier in Tier::ALL {
        table.add_row(Row::from(vec![
            Cell::new(tier.to_string()),
            Cell::new(recommended.get(tier)),
            Cell::new(current.get(tier)),
            Cell::new(format_gap(gap.get(tier))),
            status_cell(gap.get(tier)),
        ]));
    }
    table.add_row(Row::from(vec![
        Cell::new("Total"),
        Cell::new(recommended.total()),
        Cell::new(current.total()),
        Cell::new(format_gap(gap.total)),
        status_cell(gap.total),
    ]));
    table.to_string()
}

pub fn render_actions_table(actions: &[StaffingAction]) -> String {
    if actions.is_empty() {
        return "Staffing is balanced; no actions needed.".to_string();
    }
    let mut table = new_table();
    table.set_header(vec!["Priority", "Tier", "Action", "Headcount", "Rationale"]);
    for action in actions {
        table.add_row(vec![
            action.priority.to_string(),
            action.tier.to_string(),
            format!("{:?}", action.kind).to_uppercase(),
            action.headcount.to_string(),
            action.rationale.clone(),
        ]);
    }
    table.to_string()
}

fn delta_rows(table: &mut Table, deltas: &[TierDelta]) {
    for delta in deltas {
        table.add_row(vec![
            delta.tier.to_string(),
            delta.before.to_string(),
            delta.after.to_string(),
            format_gap(delta.change),
        ]);
    }
}

pub fn render_whatif_table(result: &WhatIfResult) -> String {
    let mut table = new_table();
    table.set_header(vec!["Tier", "Before", "After", "Change"]);
    delta_rows(&mut table, &result.deltas);

    let changes = result
        .changes_applied
        .iter()
        .map(|c| {
            let from = c
                .from
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            format!("{} {from} -> {}", c.input, c.to)
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = String::new();
    out.push_str(&table.to_string());
    out.push_str(&format!(
        "\nVariant: {}\nChanges: {changes}\nNet headcount change: {:+}\nGap before: {:+}  Gap after: {:+}",
        result.variant, result.net_headcount_change, result.gap_before.total, result.gap_after.total
    ));
    out
}

pub fn render_scenarios_table(scenarios: &[Scenario]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "ID",
        "Name",
        "Created",
        "Variant",
        "Recommended",
        "Current",
        "Gap",
    ]);
    for scenario in scenarios {
        table.add_row(Row::from(vec![
            Cell::new(&scenario.id),
            Cell::new(&scenario.name),
            Cell::new(scenario.created_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(scenario.variant.to_string()),
            Cell::new(scenario.recommended.total()),
            Cell::new(scenario.current.total()),
            status_cell(scenario.gap.total),
        ]));
    }
    table.to_string()
}

pub fn render_comparison_table(comparison: &ScenarioComparison) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Tier",
        comparison.base_name.as_str(),
        comparison.candidate_name.as_str(),
        "Change",
    ]);
    delta_rows(&mut table, &comparison.recommended_deltas);

    let gaps = comparison
        .gap_deltas
        .iter()
        .map(|d| format!("{} {} -> {}", d.tier, format_gap(d.before), format_gap(d.after)))
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = table.to_string();
    out.push_str(&format!(
        "\nNet headcount change: {:+}\nGaps: {gaps}",
        comparison.net_headcount_change
    ));
    if comparison.variants_differ {
        out.push_str("\nWarning: scenarios were computed with different formula variants.");
    }
    out
}

pub fn render_budget_table(summary: &BudgetSummary) -> String {
    let mut table = new_table();
    table.set_header(vec!["Category", "Cost"]);
    for (category, cost) in &summary.by_category {
        table.add_row(vec![category.clone(), format!("{cost:.2}")]);
    }
    table.add_row(vec![
        format!("Total ({} units)", summary.total_units),
        format!("{:.2}", summary.total_cost),
    ]);
    table.to_string()
}

/// Renders a JSON array of flat objects. Columns follow the first record's
/// keys; nested values are shown as compact JSON.
pub fn render_documents_table(documents: &Value) -> String {
    let Some(rows) = documents.as_array() else {
        return documents.to_string();
    };
    let Some(first) = rows.first().and_then(Value::as_object) else {
        return "No records.".to_string();
    };
    let columns = first.keys().cloned().collect::<Vec<_>>();

    let mut table = new_table();
    table.set_header(columns.clone());
    for row in rows {
        table.add_row(
            columns
                .iter()
                .map(|column| match row.get(column) {
                    None | Some(Value::Null) => "-".to_string(),
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                })
                .collect::<Vec<_>>(),
        );
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::staffing::compute_gap;

    #[test]
    fn gap_table_shows_status_labels() {
        let recommended = StaffingLevels::new(2, 4, 9);
        let current = StaffingLevels::new(1, 5, 9);
        let gap = compute_gap(&recommended, &current);
        let rendered = render_gap_table(&recommended, &current, &gap);
        assert!(rendered.contains("1 needed"));
        assert!(rendered.contains("1 surplus"));
        assert!(rendered.contains("balanced"));
    }

    #[test]
    fn documents_table_handles_empty_and_nested_values() {
        assert_eq!(render_documents_table(&json!([])), "No records.");
        let rendered = render_documents_table(&json!([
            { "id": "r-1", "title": "Lead", "department_id": null }
        ]));
        assert!(rendered.contains("r-1"));
        assert!(rendered.contains("Lead"));
    }
}
