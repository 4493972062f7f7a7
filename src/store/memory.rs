use std::collections::BTreeMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::{PlannerError, PlannerResult};
use crate::org::repository::{ensure_id, Repository};
use crate::org::{Collection, Record};

/// In-process document store with the same semantics as the SQLite store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<Collection, Vec<(String, Value)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_collection<R>(
        &self,
        collection: Collection,
        f: impl FnOnce(&mut Vec<(String, Value)>) -> PlannerResult<R>,
    ) -> PlannerResult<R> {
        let mut guard = self.documents.lock().expect("memory store mutex poisoned");
        f(guard.entry(collection).or_default())
    }
}

impl<T: Record> Repository<T> for MemoryStore {
    fn list(&self) -> PlannerResult<Vec<T>> {
        self.with_collection(T::COLLECTION, |docs| {
            docs.iter()
                .map(|(_, value)| serde_json::from_value(value.clone()).map_err(Into::into))
                .collect()
        })
    }

    fn get(&self, id: &str) -> PlannerResult<Option<T>> {
        self.with_collection(T::COLLECTION, |docs| {
            docs.iter()
                .find(|(doc_id, _)| doc_id == id)
                .map(|(_, value)| serde_json::from_value(value.clone()))
                .transpose()
                .map_err(Into::into)
        })
    }

    fn create(&self, record: T) -> PlannerResult<T> {
        let record = ensure_id(record);
        let value = serde_json::to_value(&record)?;
        self.with_collection(T::COLLECTION, |docs| {
            if docs.iter().any(|(doc_id, _)| doc_id == record.id()) {
                return Err(PlannerError::Validation(format!(
                    "{} record {} already exists",
                    T::COLLECTION,
                    record.id()
                )));
            }
            docs.push((record.id().to_string(), value));
            Ok(())
        })?;
        Ok(record)
    }

    fn update(&self, record: &T) -> PlannerResult<()> {
        let value = serde_json::to_value(record)?;
        self.with_collection(T::COLLECTION, |docs| {
            let slot = docs
                .iter_mut()
                .find(|(doc_id, _)| doc_id == record.id())
                .ok_or_else(|| PlannerError::not_found(T::COLLECTION.as_slug(), record.id()))?;
            slot.1 = value;
            Ok(())
        })
    }

    fn delete(&self, id: &str) -> PlannerResult<()> {
        self.with_collection(T::COLLECTION, |docs| {
            let before = docs.len();
            docs.retain(|(doc_id, _)| doc_id != id);
            if docs.len() == before {
                return Err(PlannerError::not_found(T::COLLECTION.as_slug(), id));
            }
            Ok(())
        })
    }
}
