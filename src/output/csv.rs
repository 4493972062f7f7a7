use anyhow::Result;

use crate::org::budget::BudgetSummary;
use crate::scenario::Scenario;
use crate::staffing::{classify_gap, StaffingGap, StaffingLevels, Tier};

pub fn gap_to_csv(
    recommended: &StaffingLevels,
    current: &StaffingLevels,
    gap: &StaffingGap,
) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["tier", "recommended", "current", "gap", "status"])?;
    for tier in Tier::ALL {
        writer.write_record([
            tier.as_slug().to_string(),
            recommended.get(tier).to_string(),
            current.get(tier).to_string(),
            gap.get(tier).to_string(),
            classify_gap(gap.get(tier)).to_string(),
        ])?;
    }
    writer.write_record([
        "total".to_string(),
        recommended.total().to_string(),
        current.total().to_string(),
        gap.total.to_string(),
        classify_gap(gap.total).to_string(),
    ])?;
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn scenarios_to_csv(scenarios: &[Scenario]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "id",
        "name",
        "created_at",
        "variant",
        "recommended_leadership",
        "recommended_specialist",
        "recommended_associate",
        "current_total",
        "gap_total",
    ])?;
    for scenario in scenarios {
        writer.write_record([
            scenario.id.clone(),
            scenario.name.clone(),
            scenario.created_at.to_rfc3339(),
            scenario.variant.to_string(),
            scenario.recommended.leadership.to_string(),
            scenario.recommended.specialist.to_string(),
            scenario.recommended.associate.to_string(),
            scenario.current.total().to_string(),
            scenario.gap.total.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn budget_to_csv(summary: &BudgetSummary) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["category", "cost"])?;
    for (category, cost) in &summary.by_category {
        writer.write_record([category.clone(), format!("{cost:.2}")])?;
    }
    writer.write_record(["total".to_string(), format!("{:.2}", summary.total_cost)])?;
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staffing::compute_gap;

    #[test]
    fn gap_csv_has_a_row_per_tier_plus_total() {
        let recommended = StaffingLevels::new(2, 4, 9);
        let current = StaffingLevels::new(1, 2, 3);
        let gap = compute_gap(&recommended, &current);
        let csv = gap_to_csv(&recommended, &current, &gap).unwrap();
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "associate,9,3,6,6 needed");
        assert_eq!(lines[4], "total,15,6,9,9 needed");
    }
}
