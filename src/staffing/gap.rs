use crate::staffing::{GapStatus, StaffingGap, StaffingLevels};

pub fn compute_gap(recommended: &StaffingLevels, current: &StaffingLevels) -> StaffingGap {
    let leadership = i64::from(recommended.leadership) - i64::from(current.leadership);
    let specialist = i64::from(recommended.specialist) - i64::from(current.specialist);
    let associate = i64::from(recommended.associate) - i64::from(current.associate);
    StaffingGap {
        leadership,
        specialist,
        associate,
        total: leadership + specialist + associate,
    }
}

pub fn classify_gap(delta: i64) -> GapStatus {
    match delta.signum() {
        1 => GapStatus::Needed(delta.unsigned_abs()),
        -1 => GapStatus::Surplus(delta.unsigned_abs()),
        _ => GapStatus::Balanced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staffing::Tier;

    #[test]
    fn gap_against_itself_is_balanced() {
        for levels in [
            StaffingLevels::default(),
            StaffingLevels::new(1, 2, 3),
            StaffingLevels::new(40, 0, 900),
        ] {
            let gap = compute_gap(&levels, &levels);
            assert_eq!(gap, StaffingGap::default());
            assert!(gap.is_balanced());
        }
    }

    #[test]
    fn understaffed_tiers_are_needed() {
        let recommended = StaffingLevels::new(2, 4, 9);
        let current = StaffingLevels::new(1, 2, 3);
        let gap = compute_gap(&recommended, &current);
        assert_eq!(
            gap,
            StaffingGap {
                leadership: 1,
                specialist: 2,
                associate: 6,
                total: 9,
            }
        );
        for tier in Tier::ALL {
            assert!(matches!(classify_gap(gap.get(tier)), GapStatus::Needed(_)));
        }
    }

    #[test]
    fn total_matches_difference_of_totals() {
        let pairs = [
            (StaffingLevels::new(1, 2, 3), StaffingLevels::new(5, 0, 1)),
            (StaffingLevels::new(9, 9, 9), StaffingLevels::new(0, 0, 0)),
            (StaffingLevels::new(0, 7, 2), StaffingLevels::new(3, 3, 30)),
        ];
        for (r, c) in pairs {
            let gap = compute_gap(&r, &c);
            assert_eq!(gap.total, r.total() as i64 - c.total() as i64);
        }
    }

    #[test]
    fn classification_follows_sign() {
        assert_eq!(classify_gap(3), GapStatus::Needed(3));
        assert_eq!(classify_gap(-2), GapStatus::Surplus(2));
        assert_eq!(classify_gap(0), GapStatus::Balanced);
    }
}
