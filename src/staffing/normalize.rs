use serde::{Deserialize, Serialize};

use crate::staffing::{StaffingInputs, DEFAULT_COMPLEXITY, DEFAULT_MANAGER_TO_CLIENT_RATIO};

/// Inputs after clamping; every field is safe to divide and multiply with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedInputs {
    pub work_order_volume: u64,
    pub complaint_volume: u64,
    pub complexity: u64,
    pub client_count: u64,
    pub manager_to_client_ratio: u64,
}

pub fn normalize_count(value: Option<i64>) -> u64 {
    value.unwrap_or(0).max(0) as u64
}

pub fn normalize_complexity(value: Option<i64>) -> u64 {
    value.unwrap_or(DEFAULT_COMPLEXITY).clamp(1, 5) as u64
}

/// Ratio of zero or below is clamped to one.
pub fn normalize_ratio(value: Option<i64>) -> u64 {
    value.unwrap_or(DEFAULT_MANAGER_TO_CLIENT_RATIO).max(1) as u64
}

pub fn normalize_inputs(inputs: &StaffingInputs) -> NormalizedInputs {
    NormalizedInputs {
        work_order_volume: normalize_count(inputs.work_order_volume),
        complaint_volume: normalize_count(inputs.complaint_volume),
        complexity: normalize_complexity(inputs.complexity),
        client_count: normalize_count(inputs.client_count),
        manager_to_client_ratio: normalize_ratio(inputs.manager_to_client_ratio),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_negative_and_missing_values() {
        let normalized = normalize_inputs(&StaffingInputs {
            work_order_volume: Some(-40),
            complaint_volume: None,
            complexity: Some(9),
            client_count: Some(-1),
            manager_to_client_ratio: Some(0),
        });
        assert_eq!(normalized.work_order_volume, 0);
        assert_eq!(normalized.complaint_volume, 0);
        assert_eq!(normalized.complexity, 5);
        assert_eq!(normalized.client_count, 0);
        assert_eq!(normalized.manager_to_client_ratio, 1);
    }

    #[test]
    fn applies_defaults() {
        let normalized = normalize_inputs(&StaffingInputs::default());
        assert_eq!(normalized.complexity, 1);
        assert_eq!(normalized.manager_to_client_ratio, 3);
    }
}
