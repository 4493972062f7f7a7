use crate::error::{PlannerError, PlannerResult};
use crate::org::Record;

/// Data access for one entity type. Callers receive the repositories they
/// need instead of a shared handle to every collection.
pub trait Repository<T: Record> {
    /// Records in insertion order.
    fn list(&self) -> PlannerResult<Vec<T>>;

    fn get(&self, id: &str) -> PlannerResult<Option<T>>;

    /// Stores a new record, generating an id when the record has none.
    /// Fails with a validation error if the id is already taken.
    fn create(&self, record: T) -> PlannerResult<T>;

    /// Replaces an existing record.
    fn update(&self, record: &T) -> PlannerResult<()>;

    fn delete(&self, id: &str) -> PlannerResult<()>;

    fn require(&self, id: &str) -> PlannerResult<T> {
        self.get(id)?
            .ok_or_else(|| PlannerError::not_found(T::COLLECTION.as_slug(), id))
    }
}

pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Fills in a generated id when the record arrives without one.
pub fn ensure_id<T: Record>(mut record: T) -> T {
    if record.id().trim().is_empty() {
        record.set_id(new_record_id());
    }
    record
}
