pub mod compare;
pub mod whatif;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::staffing::{
    compute_gap, compute_recommended_staffing, FormulaVariant, InputKey, StaffingGap,
    StaffingInputs, StaffingLevels, Tier,
};

/// A named, persisted snapshot of staffing inputs and the results they
/// produced at the time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub factory_id: Option<String>,
    pub variant: FormulaVariant,
    pub inputs: StaffingInputs,
    pub current: StaffingLevels,
    pub recommended: StaffingLevels,
    pub gap: StaffingGap,
    pub created_at: DateTime<Utc>,
}

impl Scenario {
    pub fn evaluate(
        name: impl Into<String>,
        inputs: StaffingInputs,
        current: StaffingLevels,
        variant: FormulaVariant,
    ) -> Self {
        let recommended = compute_recommended_staffing(&inputs, variant);
        let gap = compute_gap(&recommended, &current);
        Self {
            id: String::new(),
            name: name.into(),
            description: String::new(),
            factory_id: None,
            variant,
            inputs,
            current,
            recommended,
            gap,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_factory(mut self, factory_id: impl Into<String>) -> Self {
        self.factory_id = Some(factory_id.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputChange {
    pub input: InputKey,
    pub from: Option<i64>,
    pub to: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierDelta {
    pub tier: Tier,
    pub before: i64,
    pub after: i64,
    pub change: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhatIfResult {
    pub variant: FormulaVariant,
    pub changes_applied: Vec<InputChange>,
    pub before: StaffingLevels,
    pub after: StaffingLevels,
    pub gap_before: StaffingGap,
    pub gap_after: StaffingGap,
    pub deltas: Vec<TierDelta>,
    pub net_headcount_change: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioComparison {
    pub base_id: String,
    pub base_name: String,
    pub candidate_id: String,
    pub candidate_name: String,
    pub recommended_deltas: Vec<TierDelta>,
    pub gap_deltas: Vec<TierDelta>,
    pub net_headcount_change: i64,
    pub variants_differ: bool,
}

pub(crate) fn tier_deltas(before: &StaffingLevels, after: &StaffingLevels) -> Vec<TierDelta> {
    Tier::ALL
        .iter()
        .map(|tier| {
            let before = i64::from(before.get(*tier));
            let after = i64::from(after.get(*tier));
            TierDelta {
                tier: *tier,
                before,
                after,
                change: after - before,
            }
        })
        .collect()
}
