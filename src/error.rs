use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("{collection} record not found: {id}")]
    NotFound { collection: &'static str, id: String },

    #[error("role {role_id} is already occupied by personnel {occupant_id}")]
    RoleOccupied { role_id: String, occupant_id: String },

    #[error("role {role_id} belongs to factory {role_factory_id}, not {factory_id}")]
    FactoryMismatch {
        role_id: String,
        role_factory_id: String,
        factory_id: String,
    },

    #[error("user {user} is not allowed to {action}")]
    Forbidden { user: String, action: String },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlannerError {
    pub fn not_found(collection: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;
