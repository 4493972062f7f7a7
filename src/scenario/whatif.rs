use std::collections::BTreeMap;

use crate::scenario::{tier_deltas, InputChange, WhatIfResult};
use crate::staffing::{
    compute_gap, compute_recommended_staffing, FormulaVariant, InputKey, StaffingInputs,
    StaffingLevels,
};

/// Recomputes staffing after applying input changes. Later changes to the
/// same input win.
pub fn simulate_whatif(
    inputs: &StaffingInputs,
    current: &StaffingLevels,
    target_changes: &[(InputKey, i64)],
    variant: FormulaVariant,
) -> WhatIfResult {
    let before = compute_recommended_staffing(inputs, variant);

    let mut changed = inputs.clone();
    let mut changes_applied = Vec::new();
    for (input, to) in dedupe_changes(target_changes) {
        changes_applied.push(InputChange {
            input,
            from: changed.value(input),
            to,
        });
        changed.apply_change(input, to);
    }

    let after = compute_recommended_staffing(&changed, variant);
    let deltas = tier_deltas(&before, &after);
    let net_headcount_change = deltas.iter().map(|d| d.change).sum();

    WhatIfResult {
        variant,
        changes_applied,
        before,
        after,
        gap_before: compute_gap(&before, current),
        gap_after: compute_gap(&after, current),
        deltas,
        net_headcount_change,
    }
}

fn dedupe_changes(changes: &[(InputKey, i64)]) -> Vec<(InputKey, i64)> {
    let mut seen = BTreeMap::new();
    for (input, to) in changes {
        seen.insert(*input, *to);
    }
    seen.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staffing::Tier;

    #[test]
    fn doubling_volume_raises_recommendation() {
        let inputs = StaffingInputs::with_work_orders(1000);
        let current = StaffingLevels::new(1, 2, 5);
        let result = simulate_whatif(
            &inputs,
            &current,
            &[(InputKey::WorkOrderVolume, 2000)],
            FormulaVariant::Simple,
        );
        assert_eq!(result.before, StaffingLevels::new(1, 2, 5));
        assert_eq!(result.after, StaffingLevels::new(2, 4, 10));
        assert!(result.gap_before.is_balanced());
        assert_eq!(result.gap_after.total, 8);
        assert_eq!(result.net_headcount_change, 8);
        assert_eq!(result.changes_applied[0].from, Some(1000));
    }

    #[test]
    fn last_change_for_an_input_wins() {
        let result = simulate_whatif(
            &StaffingInputs::with_work_orders(0),
            &StaffingLevels::default(),
            &[
                (InputKey::Complexity, 2),
                (InputKey::WorkOrderVolume, 500),
                (InputKey::Complexity, 5),
            ],
            FormulaVariant::RatioAware,
        );
        assert_eq!(result.changes_applied.len(), 2);
        let complexity = result
            .changes_applied
            .iter()
            .find(|c| c.input == InputKey::Complexity)
            .expect("complexity change");
        assert_eq!(complexity.to, 5);
        let associate = result
            .deltas
            .iter()
            .find(|d| d.tier == Tier::Associate)
            .expect("associate delta");
        assert_eq!(associate.after, 4);
    }

    #[test]
    fn no_changes_means_no_delta() {
        let inputs = StaffingInputs::with_work_orders(4200).with_complexity(3);
        let result = simulate_whatif(
            &inputs,
            &StaffingLevels::new(3, 3, 3),
            &[],
            FormulaVariant::RatioAware,
        );
        assert_eq!(result.before, result.after);
        assert_eq!(result.net_headcount_change, 0);
    }
}
