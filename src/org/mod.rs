pub mod assignment;
pub mod budget;
pub mod repository;
pub mod roster;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::staffing::Tier;

/// A document stored in one named collection and addressed by a string id.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Factories,
    Departments,
    Roles,
    Personnel,
    Tasks,
    Clients,
    Scenarios,
    Phases,
    Activities,
    Resources,
}

impl Collection {
    pub const ALL: [Collection; 10] = [
        Collection::Factories,
        Collection::Departments,
        Collection::Roles,
        Collection::Personnel,
        Collection::Tasks,
        Collection::Clients,
        Collection::Scenarios,
        Collection::Phases,
        Collection::Activities,
        Collection::Resources,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Factories => "factories",
            Self::Departments => "departments",
            Self::Roles => "roles",
            Self::Personnel => "personnel",
            Self::Tasks => "tasks",
            Self::Clients => "clients",
            Self::Scenarios => "scenarios",
            Self::Phases => "phases",
            Self::Activities => "activities",
            Self::Resources => "resources",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown collection: {0}")]
pub struct CollectionParseError(pub String);

impl FromStr for Collection {
    type Err = CollectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "factories" | "factory" => Ok(Self::Factories),
            "departments" | "department" => Ok(Self::Departments),
            "roles" | "role" => Ok(Self::Roles),
            "personnel" | "people" => Ok(Self::Personnel),
            "tasks" | "task" => Ok(Self::Tasks),
            "clients" | "client" => Ok(Self::Clients),
            "scenarios" | "scenario" => Ok(Self::Scenarios),
            "phases" | "phase" => Ok(Self::Phases),
            "activities" | "activity" => Ok(Self::Activities),
            "resources" | "resource" => Ok(Self::Resources),
            _ => Err(CollectionParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Factory {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Department {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub factory_id: Option<String>,
}

/// One seat in a factory's org chart; at most one personnel occupies it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Role {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub tier: Tier,
    pub factory_id: String,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub position: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Personnel {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub factory_id: Option<String>,
}

impl Personnel {
    pub fn is_assigned(&self) -> bool {
        self.role_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub phase_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub work_order_volume: u64,
    #[serde(default)]
    pub complaint_volume: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Phase {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub start_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub end_date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    Planned,
    Active,
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    #[serde(default)]
    pub id: String,
    pub phase_id: String,
    pub name: String,
    #[serde(default)]
    pub status: ActivityStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(default)]
    pub quantity: u32,
}

macro_rules! impl_record {
    ($ty:ty, $collection:expr) => {
        impl Record for $ty {
            const COLLECTION: Collection = $collection;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

impl_record!(Factory, Collection::Factories);
impl_record!(Department, Collection::Departments);
impl_record!(Role, Collection::Roles);
impl_record!(Personnel, Collection::Personnel);
impl_record!(Task, Collection::Tasks);
impl_record!(Client, Collection::Clients);
impl_record!(Phase, Collection::Phases);
impl_record!(Activity, Collection::Activities);
impl_record!(Resource, Collection::Resources);
impl_record!(crate::scenario::Scenario, Collection::Scenarios);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_slugs_round_trip() {
        for collection in Collection::ALL {
            let parsed: Collection = collection.as_slug().parse().expect("slug should parse");
            assert_eq!(parsed, collection);
        }
        assert!("widgets".parse::<Collection>().is_err());
    }

    #[test]
    fn role_deserializes_with_defaults() {
        let role: Role = serde_json::from_value(serde_json::json!({
            "title": "Line Lead",
            "tier": "leadership",
            "factory_id": "f-1"
        }))
        .expect("role should deserialize");
        assert!(role.id.is_empty());
        assert_eq!(role.tier, Tier::Leadership);
        assert_eq!(role.department_id, None);
    }
}
