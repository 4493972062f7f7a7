pub mod actions;
pub mod engine;
pub mod gap;
pub mod normalize;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub use engine::{complexity_factor, compute_recommended_staffing};
pub use gap::{classify_gap, compute_gap};

pub const DEFAULT_COMPLEXITY: i64 = 1;
pub const DEFAULT_MANAGER_TO_CLIENT_RATIO: i64 = 3;

/// Raw calculation inputs as callers supply them.
///
/// Every field tolerates missing, null, negative or non-numeric values on the
/// wire. [`normalize::normalize_inputs`] turns them into the clamped form the
/// engine works with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingInputs {
    #[serde(default, deserialize_with = "lenient_count")]
    pub work_order_volume: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub complaint_volume: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub complexity: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub client_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub manager_to_client_ratio: Option<i64>,
}

impl StaffingInputs {
    pub fn with_work_orders(work_order_volume: i64) -> Self {
        Self {
            work_order_volume: Some(work_order_volume),
            ..Self::default()
        }
    }

    pub fn with_complaints(mut self, complaint_volume: i64) -> Self {
        self.complaint_volume = Some(complaint_volume);
        self
    }

    pub fn with_complexity(mut self, complexity: i64) -> Self {
        self.complexity = Some(complexity);
        self
    }

    pub fn with_clients(mut self, client_count: i64, manager_to_client_ratio: i64) -> Self {
        self.client_count = Some(client_count);
        self.manager_to_client_ratio = Some(manager_to_client_ratio);
        self
    }

    pub fn value(&self, key: InputKey) -> Option<i64> {
        match key {
            InputKey::WorkOrderVolume => self.work_order_volume,
            InputKey::ComplaintVolume => self.complaint_volume,
            InputKey::Complexity => self.complexity,
            InputKey::ClientCount => self.client_count,
            InputKey::ManagerToClientRatio => self.manager_to_client_ratio,
        }
    }

    pub fn apply_change(&mut self, key: InputKey, to: i64) {
        let slot = match key {
            InputKey::WorkOrderVolume => &mut self.work_order_volume,
            InputKey::ComplaintVolume => &mut self.complaint_volume,
            InputKey::Complexity => &mut self.complexity,
            InputKey::ClientCount => &mut self.client_count,
            InputKey::ManagerToClientRatio => &mut self.manager_to_client_ratio,
        };
        *slot = Some(to);
    }
}

/// Accepts integers, floats (floored), numeric strings and null. Anything
/// else deserializes as "missing" so that defaults apply.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64)),
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.floor() as i64)
            })
        }
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum InputKey {
    WorkOrderVolume,
    ComplaintVolume,
    Complexity,
    ClientCount,
    ManagerToClientRatio,
}

impl Display for InputKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::WorkOrderVolume => "work_order_volume",
            Self::ComplaintVolume => "complaint_volume",
            Self::Complexity => "complexity",
            Self::ClientCount => "client_count",
            Self::ManagerToClientRatio => "manager_to_client_ratio",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Error)]
#[error("unknown staffing input: {0}")]
pub struct InputKeyParseError(pub String);

impl FromStr for InputKey {
    type Err = InputKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "work_order_volume" | "work_orders" | "wov" => Ok(Self::WorkOrderVolume),
            "complaint_volume" | "complaints" => Ok(Self::ComplaintVolume),
            "complexity" => Ok(Self::Complexity),
            "client_count" | "clients" => Ok(Self::ClientCount),
            "manager_to_client_ratio" | "ratio" => Ok(Self::ManagerToClientRatio),
            _ => Err(InputKeyParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Leadership,
    Specialist,
    Associate,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Leadership, Tier::Specialist, Tier::Associate];

    /// Floor applied to every recommendation for this tier.
    pub fn minimum(self) -> u32 {
        match self {
            Self::Leadership => 1,
            Self::Specialist => 2,
            Self::Associate => 3,
        }
    }

    pub fn as_slug(self) -> &'static str {
        match self {
            Self::Leadership => "leadership",
            Self::Specialist => "specialist",
            Self::Associate => "associate",
        }
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Leadership => "Leadership",
            Self::Specialist => "Specialist",
            Self::Associate => "Associate",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown tier: {0}")]
pub struct TierParseError(pub String);

impl FromStr for Tier {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "leadership" | "lead" | "manager" => Ok(Self::Leadership),
            "specialist" | "spec" => Ok(Self::Specialist),
            "associate" | "assoc" => Ok(Self::Associate),
            _ => Err(TierParseError(s.to_string())),
        }
    }
}

/// Which recommendation rule set a deployment uses. Exactly one is active
/// at a time and every call site passes the configured value through.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormulaVariant {
    /// Volume-only thresholds; complexity, complaints and clients are ignored.
    #[default]
    Simple,
    /// Complexity-scaled volumes, complaint load for specialists and a
    /// client-ratio floor for leadership.
    RatioAware,
}

impl Display for FormulaVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::RatioAware => write!(f, "ratio_aware"),
        }
    }
}

impl FromStr for FormulaVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "simple" => Ok(Self::Simple),
            "ratio_aware" | "ratio" => Ok(Self::RatioAware),
            other => Err(anyhow::anyhow!("unknown formula variant: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaffingLevels {
    #[serde(default)]
    pub leadership: u32,
    #[serde(default)]
    pub specialist: u32,
    #[serde(default)]
    pub associate: u32,
}

impl StaffingLevels {
    pub fn new(leadership: u32, specialist: u32, associate: u32) -> Self {
        Self {
            leadership,
            specialist,
            associate,
        }
    }

    pub fn get(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Leadership => self.leadership,
            Tier::Specialist => self.specialist,
            Tier::Associate => self.associate,
        }
    }

    pub fn increment(&mut self, tier: Tier) {
        let slot = match tier {
            Tier::Leadership => &mut self.leadership,
            Tier::Specialist => &mut self.specialist,
            Tier::Associate => &mut self.associate,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u64 {
        u64::from(self.leadership) + u64::from(self.specialist) + u64::from(self.associate)
    }
}

/// Recommended minus current headcount. Positive means understaffed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaffingGap {
    pub leadership: i64,
    pub specialist: i64,
    pub associate: i64,
    pub total: i64,
}

impl StaffingGap {
    pub fn get(&self, tier: Tier) -> i64 {
        match tier {
            Tier::Leadership => self.leadership,
            Tier::Specialist => self.specialist,
            Tier::Associate => self.associate,
        }
    }

    pub fn is_balanced(&self) -> bool {
        Tier::ALL.iter().all(|tier| self.get(*tier) == 0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "count", rename_all = "snake_case")]
pub enum GapStatus {
    Needed(u64),
    Surplus(u64),
    Balanced,
}

impl Display for GapStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Needed(n) => write!(f, "{n} needed"),
            Self::Surplus(n) => write!(f, "{n} surplus"),
            Self::Balanced => write!(f, "balanced"),
        }
    }
}
