use crate::scenario::{tier_deltas, Scenario, ScenarioComparison, TierDelta};
use crate::staffing::Tier;

pub fn compare_scenarios(base: &Scenario, candidate: &Scenario) -> ScenarioComparison {
    let recommended_deltas = tier_deltas(&base.recommended, &candidate.recommended);
    let gap_deltas = Tier::ALL
        .iter()
        .map(|tier| {
            let before = base.gap.get(*tier);
            let after = candidate.gap.get(*tier);
            TierDelta {
                tier: *tier,
                before,
                after,
                change: after - before,
            }
        })
        .collect();
    let net_headcount_change =
        candidate.recommended.total() as i64 - base.recommended.total() as i64;

    ScenarioComparison {
        base_id: base.id.clone(),
        base_name: base.name.clone(),
        candidate_id: candidate.id.clone(),
        candidate_name: candidate.name.clone(),
        recommended_deltas,
        gap_deltas,
        net_headcount_change,
        variants_differ: base.variant != candidate.variant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staffing::{FormulaVariant, StaffingInputs, StaffingLevels};

    #[test]
    fn compares_recommendations_and_gaps() {
        let current = StaffingLevels::new(2, 4, 10);
        let base = Scenario::evaluate(
            "today",
            StaffingInputs::with_work_orders(2000),
            current,
            FormulaVariant::Simple,
        );
        let candidate = Scenario::evaluate(
            "peak season",
            StaffingInputs::with_work_orders(5000),
            current,
            FormulaVariant::Simple,
        );
        let comparison = compare_scenarios(&base, &candidate);
        assert_eq!(comparison.net_headcount_change, 24);
        assert!(!comparison.variants_differ);

        let associate = comparison
            .recommended_deltas
            .iter()
            .find(|d| d.tier == Tier::Associate)
            .expect("associate delta");
        assert_eq!((associate.before, associate.after), (10, 25));

        let leadership_gap = comparison
            .gap_deltas
            .iter()
            .find(|d| d.tier == Tier::Leadership)
            .expect("leadership gap delta");
        assert_eq!(leadership_gap.before, 0);
        assert_eq!(leadership_gap.after, 3);
    }

    #[test]
    fn flags_variant_mismatch() {
        let inputs = StaffingInputs::with_work_orders(1000);
        let a = Scenario::evaluate("a", inputs.clone(), StaffingLevels::default(), FormulaVariant::Simple);
        let b = Scenario::evaluate("b", inputs, StaffingLevels::default(), FormulaVariant::RatioAware);
        assert!(compare_scenarios(&a, &b).variants_differ);
    }
}
