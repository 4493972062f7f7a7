use serde::{Deserialize, Serialize};

use crate::staffing::gap::classify_gap;
use crate::staffing::{GapStatus, StaffingGap, Tier};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Hire,
    Reassign,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaffingAction {
    pub priority: usize,
    pub tier: Tier,
    pub kind: ActionKind,
    pub headcount: u64,
    pub rationale: String,
}

/// Turns a gap into actions, largest absolute gap first. Balanced tiers are
/// skipped; ties keep tier order.
pub fn build_staffing_actions(gap: &StaffingGap) -> Vec<StaffingAction> {
    let mut tiers = Tier::ALL
        .iter()
        .copied()
        .filter(|tier| gap.get(*tier) != 0)
        .collect::<Vec<_>>();
    tiers.sort_by_key(|tier| std::cmp::Reverse(gap.get(*tier).unsigned_abs()));

    let mut actions = Vec::new();
    for (idx, tier) in tiers.into_iter().enumerate() {
        let (kind, headcount, rationale) = match classify_gap(gap.get(tier)) {
            GapStatus::Needed(n) => (
                ActionKind::Hire,
                n,
                format!("{tier} is understaffed by {n}; hire or transfer in."),
            ),
            GapStatus::Surplus(n) => (
                ActionKind::Reassign,
                n,
                format!("{tier} exceeds the recommendation by {n}; reassign to other sites or roles."),
            ),
            GapStatus::Balanced => continue,
        };
        actions.push(StaffingAction {
            priority: idx + 1,
            tier,
            kind,
            headcount,
            rationale,
        });
    }
    actions
}
