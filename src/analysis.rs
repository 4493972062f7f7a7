//! Gap analysis over stored organization data.
//!
//! Inputs and current headcount can be supplied directly; whichever is
//! missing is derived from the store (client volumes for inputs, role
//! assignments for current headcount).

use serde::{Deserialize, Serialize};

use crate::config::StaffingConfig;
use crate::error::PlannerResult;
use crate::org::repository::Repository;
use crate::org::roster::{current_staffing, inputs_from_clients};
use crate::org::{Client, Personnel, Role};
use crate::staffing::actions::{build_staffing_actions, StaffingAction};
use crate::staffing::{
    classify_gap, compute_gap, compute_recommended_staffing, FormulaVariant, GapStatus,
    StaffingGap, StaffingInputs, StaffingLevels, Tier,
};
use crate::store::PlannerStore;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GapAnalysisRequest {
    #[serde(default)]
    pub inputs: Option<StaffingInputs>,
    #[serde(default)]
    pub current: Option<StaffingLevels>,
    #[serde(default)]
    pub factory_id: Option<String>,
    #[serde(default)]
    pub complexity: Option<i64>,
    #[serde(default)]
    pub manager_to_client_ratio: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierStatus {
    pub tier: Tier,
    pub gap: i64,
    pub status: GapStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GapAnalysis {
    pub variant: FormulaVariant,
    pub inputs: StaffingInputs,
    pub recommended: StaffingLevels,
    pub current: StaffingLevels,
    pub gap: StaffingGap,
    pub statuses: Vec<TierStatus>,
    pub overall: GapStatus,
    pub actions: Vec<StaffingAction>,
}

pub fn analyze(
    inputs: StaffingInputs,
    current: StaffingLevels,
    variant: FormulaVariant,
) -> GapAnalysis {
    let recommended = compute_recommended_staffing(&inputs, variant);
    let gap = compute_gap(&recommended, &current);
    let statuses = Tier::ALL
        .iter()
        .map(|tier| TierStatus {
            tier: *tier,
            gap: gap.get(*tier),
            status: classify_gap(gap.get(*tier)),
        })
        .collect();
    GapAnalysis {
        variant,
        inputs,
        recommended,
        current,
        overall: classify_gap(gap.total),
        actions: build_staffing_actions(&gap),
        statuses,
        gap,
    }
}

/// Uses the request's inputs when given, otherwise aggregates stored client
/// volumes with the request's (or configured) complexity and ratio.
pub fn resolve_inputs<S: PlannerStore>(
    store: &S,
    request: &GapAnalysisRequest,
    staffing: &StaffingConfig,
) -> PlannerResult<StaffingInputs> {
    if let Some(inputs) = &request.inputs {
        return Ok(inputs.clone());
    }
    let clients = Repository::<Client>::list(store)?;
    Ok(inputs_from_clients(
        &clients,
        request.complexity.unwrap_or(staffing.default_complexity),
        request
            .manager_to_client_ratio
            .unwrap_or(staffing.default_manager_to_client_ratio),
    ))
}

pub fn run_gap_analysis<S: PlannerStore>(
    store: &S,
    request: &GapAnalysisRequest,
    staffing: &StaffingConfig,
) -> PlannerResult<GapAnalysis> {
    let inputs = resolve_inputs(store, request, staffing)?;
    let current = match request.current {
        Some(current) => current,
        None => {
            let personnel = Repository::<Personnel>::list(store)?;
            let roles = Repository::<Role>::list(store)?;
            current_staffing(&personnel, &roles, request.factory_id.as_deref())
        }
    };
    Ok(analyze(inputs, current, staffing.variant))
}
