use crate::staffing::normalize::{normalize_inputs, NormalizedInputs};
use crate::staffing::{FormulaVariant, StaffingInputs, StaffingLevels, Tier};

/// Multiplier for a 1-5 complexity rating: `complexity * 0.2 + 0.8`.
pub fn complexity_factor(complexity: u64) -> f64 {
    complexity.clamp(1, 5) as f64 * 0.2 + 0.8
}

pub fn compute_recommended_staffing(
    inputs: &StaffingInputs,
    variant: FormulaVariant,
) -> StaffingLevels {
    let normalized = normalize_inputs(inputs);
    match variant {
        FormulaVariant::Simple => simple_levels(&normalized),
        FormulaVariant::RatioAware => ratio_aware_levels(&normalized),
    }
}

fn simple_levels(inputs: &NormalizedInputs) -> StaffingLevels {
    let wov = inputs.work_order_volume;
    StaffingLevels {
        leadership: floor_at(Tier::Leadership, wov / 1000),
        specialist: floor_at(Tier::Specialist, wov / 500),
        associate: floor_at(Tier::Associate, wov / 200),
    }
}

// The complexity factor is (complexity + 4) / 5, so `floor(x / d * factor)`
// is evaluated as `x * (complexity + 4) / (d * 5)` to stay in integers.
fn ratio_aware_levels(inputs: &NormalizedInputs) -> StaffingLevels {
    let scale = inputs.complexity + 4;
    let wov = inputs.work_order_volume.saturating_mul(scale);
    let complaints = inputs.complaint_volume.saturating_mul(scale);

    let client_leads = inputs
        .client_count
        .div_ceil(inputs.manager_to_client_ratio.max(1));
    let volume_leads = wov / 5_000;

    StaffingLevels {
        leadership: floor_at(Tier::Leadership, client_leads.max(volume_leads)),
        specialist: floor_at(
            Tier::Specialist,
            (wov / 2_500).saturating_add(complaints / 500),
        ),
        associate: floor_at(Tier::Associate, wov / 1_000),
    }
}

fn floor_at(tier: Tier, headcount: u64) -> u32 {
    u32::try_from(headcount)
        .unwrap_or(u32::MAX)
        .max(tier.minimum())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(inputs: &StaffingInputs) -> StaffingLevels {
        compute_recommended_staffing(inputs, FormulaVariant::Simple)
    }

    fn ratio_aware(inputs: &StaffingInputs) -> StaffingLevels {
        compute_recommended_staffing(inputs, FormulaVariant::RatioAware)
    }

    #[test]
    fn simple_variant_thousand_work_orders() {
        let inputs = StaffingInputs::with_work_orders(1000)
            .with_complaints(0)
            .with_complexity(1);
        assert_eq!(simple(&inputs), StaffingLevels::new(1, 2, 5));
    }

    #[test]
    fn simple_variant_ignores_complexity() {
        let inputs = StaffingInputs::with_work_orders(2500).with_complexity(4);
        assert_eq!(simple(&inputs), StaffingLevels::new(2, 5, 12));
    }

    #[test]
    fn ratio_aware_scales_by_complexity_and_complaints() {
        let inputs = StaffingInputs::with_work_orders(2500)
            .with_complaints(300)
            .with_complexity(4)
            .with_clients(10, 3);
        assert_eq!(ratio_aware(&inputs), StaffingLevels::new(4, 12, 20));
    }

    #[test]
    fn ratio_aware_leadership_follows_client_ratio() {
        let inputs = StaffingInputs::with_work_orders(0).with_clients(7, 2);
        assert_eq!(ratio_aware(&inputs).leadership, 4);
    }

    #[test]
    fn complexity_one_matches_simple_variant_on_volume_tiers() {
        let inputs = StaffingInputs::with_work_orders(12_345).with_complexity(1);
        let a = simple(&inputs);
        let b = ratio_aware(&inputs);
        assert_eq!(a.specialist, b.specialist);
        assert_eq!(a.associate, b.associate);
    }

    #[test]
    fn minimums_hold_for_tiny_and_negative_volumes() {
        for wov in [-500, 0, 1, 199, 499, 999] {
            let inputs = StaffingInputs::with_work_orders(wov);
            for levels in [simple(&inputs), ratio_aware(&inputs)] {
                assert!(levels.leadership >= 1);
                assert!(levels.specialist >= 2);
                assert!(levels.associate >= 3);
            }
        }
    }

    #[test]
    fn recommendations_never_drop_as_volume_grows() {
        let mut previous_simple = StaffingLevels::default();
        let mut previous_ratio = StaffingLevels::default();
        for wov in (0..20_000).step_by(37) {
            let inputs = StaffingInputs::with_work_orders(wov)
                .with_complaints(250)
                .with_complexity(3)
                .with_clients(5, 3);
            let s = simple(&inputs);
            let r = ratio_aware(&inputs);
            for tier in Tier::ALL {
                assert!(s.get(tier) >= previous_simple.get(tier), "simple {tier} at {wov}");
                assert!(r.get(tier) >= previous_ratio.get(tier), "ratio {tier} at {wov}");
            }
            previous_simple = s;
            previous_ratio = r;
        }
    }

    #[test]
    fn zero_ratio_is_clamped_instead_of_dividing_by_zero() {
        let inputs = StaffingInputs::with_work_orders(100).with_clients(4, 0);
        assert_eq!(ratio_aware(&inputs).leadership, 4);
    }

    #[test]
    fn ratio_aware_matches_complexity_factor_formula() {
        // Exact values land on multiples of 1/(5 * divisor); the epsilon only
        // absorbs float rounding.
        let scaled = |x: i64, divisor: f64, complexity: u64| {
            ((x as f64 / divisor) * complexity_factor(complexity) + 1e-9).floor() as u32
        };
        for complexity in 1..=5i64 {
            let c = complexity as u64;
            for wov in [0, 137, 999, 1_000, 2_500, 3_125, 7_777, 12_345] {
                for complaints in [0, 99, 250, 1_001] {
                    let levels = ratio_aware(
                        &StaffingInputs::with_work_orders(wov)
                            .with_complaints(complaints)
                            .with_complexity(complexity),
                    );
                    assert_eq!(levels.leadership, scaled(wov, 1000.0, c).max(1));
                    assert_eq!(
                        levels.specialist,
                        (scaled(wov, 500.0, c) + scaled(complaints, 100.0, c)).max(2),
                        "wov {wov} complaints {complaints} complexity {complexity}"
                    );
                    assert_eq!(levels.associate, scaled(wov, 200.0, c).max(3));
                }
            }
        }
    }

    #[test]
    fn complexity_factor_range() {
        assert!((complexity_factor(1) - 1.0).abs() < 1e-9);
        assert!((complexity_factor(5) - 1.8).abs() < 1e-9);
        assert!((complexity_factor(0) - 1.0).abs() < 1e-9);
    }
}
