pub mod access;
pub mod analysis;
pub mod config;
pub mod error;
pub mod org;
pub mod output;
pub mod scenario;
pub mod server;
pub mod staffing;
pub mod store;

pub use error::{PlannerError, PlannerResult};
pub use staffing::{
    compute_gap, compute_recommended_staffing, FormulaVariant, StaffingGap, StaffingInputs,
    StaffingLevels, Tier,
};
