//! Who is acting, and whether they may change planning data.
//!
//! This only decides which actions are offered. Identities are taken at face
//! value from the CLI flag or request header.

use serde::{Deserialize, Serialize};

use crate::config::AccessConfig;
use crate::error::{PlannerError, PlannerResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub is_admin: bool,
}

pub trait IdentityProvider {
    fn current_user(&self, claimed_id: Option<&str>) -> Option<CurrentUser>;
}

/// Resolves users against the admin list in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIdentity {
    admins: Vec<String>,
    open_access: bool,
}

impl ConfigIdentity {
    pub fn new(config: &AccessConfig) -> Self {
        Self {
            admins: config
                .admins
                .iter()
                .map(|a| a.trim().to_ascii_lowercase())
                .filter(|a| !a.is_empty())
                .collect(),
            open_access: config.open_access,
        }
    }
}

impl IdentityProvider for ConfigIdentity {
    fn current_user(&self, claimed_id: Option<&str>) -> Option<CurrentUser> {
        let id = claimed_id.map(str::trim).filter(|id| !id.is_empty())?;
        let normalized = id.to_ascii_lowercase();
        Some(CurrentUser {
            id: id.to_string(),
            is_admin: self.open_access || self.admins.contains(&normalized),
        })
    }
}

pub fn require_admin(user: Option<&CurrentUser>, action: &str) -> PlannerResult<()> {
    match user {
        Some(user) if user.is_admin => Ok(()),
        Some(user) => Err(PlannerError::Forbidden {
            user: user.id.clone(),
            action: action.to_string(),
        }),
        None => Err(PlannerError::Forbidden {
            user: "anonymous".to_string(),
            action: action.to_string(),
        }),
    }
}
