pub mod memory;
pub mod migrations;
pub mod sqlite;

use serde_json::Value;
use tracing::info;

use crate::error::{PlannerError, PlannerResult};
use crate::org::assignment::{check_placement, unassign};
use crate::org::repository::Repository;
use crate::org::{
    Activity, Client, Collection, Department, Factory, Personnel, Phase, Record, Resource, Role,
    Task,
};
use crate::scenario::Scenario;

/// Everything that can serve every entity collection.
pub trait PlannerStore:
    Repository<Factory>
    + Repository<Department>
    + Repository<Role>
    + Repository<Personnel>
    + Repository<Task>
    + Repository<Client>
    + Repository<Scenario>
    + Repository<Phase>
    + Repository<Activity>
    + Repository<Resource>
{
}

impl<S> PlannerStore for S where
    S: Repository<Factory>
        + Repository<Department>
        + Repository<Role>
        + Repository<Personnel>
        + Repository<Task>
        + Repository<Client>
        + Repository<Scenario>
        + Repository<Phase>
        + Repository<Activity>
        + Repository<Resource>
{
}

pub fn list_documents<S: PlannerStore>(store: &S, collection: Collection) -> PlannerResult<Value> {
    match collection {
        Collection::Factories => list_as::<Factory, _>(store),
        Collection::Departments => list_as::<Department, _>(store),
        Collection::Roles => list_as::<Role, _>(store),
        Collection::Personnel => list_as::<Personnel, _>(store),
        Collection::Tasks => list_as::<Task, _>(store),
        Collection::Clients => list_as::<Client, _>(store),
        Collection::Scenarios => list_as::<Scenario, _>(store),
        Collection::Phases => list_as::<Phase, _>(store),
        Collection::Activities => list_as::<Activity, _>(store),
        Collection::Resources => list_as::<Resource, _>(store),
    }
}

pub fn get_document<S: PlannerStore>(
    store: &S,
    collection: Collection,
    id: &str,
) -> PlannerResult<Value> {
    match collection {
        Collection::Factories => get_as::<Factory, _>(store, id),
        Collection::Departments => get_as::<Department, _>(store, id),
        Collection::Roles => get_as::<Role, _>(store, id),
        Collection::Personnel => get_as::<Personnel, _>(store, id),
        Collection::Tasks => get_as::<Task, _>(store, id),
        Collection::Clients => get_as::<Client, _>(store, id),
        Collection::Scenarios => get_as::<Scenario, _>(store, id),
        Collection::Phases => get_as::<Phase, _>(store, id),
        Collection::Activities => get_as::<Activity, _>(store, id),
        Collection::Resources => get_as::<Resource, _>(store, id),
    }
}

/// Validates `body` against the collection's record type and stores it.
pub fn create_document<S: PlannerStore>(
    store: &S,
    collection: Collection,
    body: Value,
) -> PlannerResult<Value> {
    match collection {
        Collection::Factories => create_as::<Factory, _>(store, body),
        Collection::Departments => create_as::<Department, _>(store, body),
        Collection::Roles => create_as::<Role, _>(store, body),
        Collection::Personnel => create_personnel(store, body),
        Collection::Tasks => create_as::<Task, _>(store, body),
        Collection::Clients => create_as::<Client, _>(store, body),
        Collection::Scenarios => create_as::<Scenario, _>(store, body),
        Collection::Phases => create_as::<Phase, _>(store, body),
        Collection::Activities => create_as::<Activity, _>(store, body),
        Collection::Resources => create_as::<Resource, _>(store, body),
    }
}

/// Replaces the record at `id`; the id in the path wins over any id in `body`.
pub fn update_document<S: PlannerStore>(
    store: &S,
    collection: Collection,
    id: &str,
    body: Value,
) -> PlannerResult<Value> {
    match collection {
        Collection::Factories => update_as::<Factory, _>(store, id, body),
        Collection::Departments => update_as::<Department, _>(store, id, body),
        Collection::Roles => update_role(store, id, body),
        Collection::Personnel => update_personnel(store, id, body),
        Collection::Tasks => update_as::<Task, _>(store, id, body),
        Collection::Clients => update_as::<Client, _>(store, id, body),
        Collection::Scenarios => update_as::<Scenario, _>(store, id, body),
        Collection::Phases => update_as::<Phase, _>(store, id, body),
        Collection::Activities => update_as::<Activity, _>(store, id, body),
        Collection::Resources => update_as::<Resource, _>(store, id, body),
    }
}

/// Deletes a record. Deleting a role first vacates it so no personnel keeps
/// pointing at a missing seat.
pub fn delete_document<S: PlannerStore>(
    store: &S,
    collection: Collection,
    id: &str,
) -> PlannerResult<()> {
    match collection {
        Collection::Factories => Repository::<Factory>::delete(store, id),
        Collection::Departments => Repository::<Department>::delete(store, id),
        Collection::Roles => {
            let role = Repository::<Role>::require(store, id)?;
            vacate_role(store, &role)?;
            Repository::<Role>::delete(store, id)?;
            info!(role = %id, "deleted role");
            Ok(())
        }
        Collection::Personnel => Repository::<Personnel>::delete(store, id),
        Collection::Tasks => Repository::<Task>::delete(store, id),
        Collection::Clients => Repository::<Client>::delete(store, id),
        Collection::Scenarios => Repository::<Scenario>::delete(store, id),
        Collection::Phases => Repository::<Phase>::delete(store, id),
        Collection::Activities => Repository::<Activity>::delete(store, id),
        Collection::Resources => Repository::<Resource>::delete(store, id),
    }
}

fn vacate_role<S: PlannerStore>(store: &S, role: &Role) -> PlannerResult<()> {
    let personnel = Repository::<Personnel>::list(store)?;
    for person in personnel
        .iter()
        .filter(|p| p.role_id.as_deref() == Some(role.id.as_str()))
    {
        unassign(store, &person.id)?;
    }
    Ok(())
}

fn create_personnel<S: PlannerStore>(store: &S, body: Value) -> PlannerResult<Value> {
    let mut person: Personnel = parse_body(Collection::Personnel, body)?;
    check_placement(store, store, &mut person)?;
    Ok(serde_json::to_value(Repository::<Personnel>::create(
        store, person,
    )?)?)
}

fn update_personnel<S: PlannerStore>(store: &S, id: &str, body: Value) -> PlannerResult<Value> {
    let mut person: Personnel = parse_body(Collection::Personnel, body)?;
    person.set_id(id.to_string());
    check_placement(store, store, &mut person)?;
    Repository::<Personnel>::update(store, &person)?;
    Ok(serde_json::to_value(person)?)
}

/// Moving a role to another factory vacates it first.
fn update_role<S: PlannerStore>(store: &S, id: &str, body: Value) -> PlannerResult<Value> {
    let mut role: Role = parse_body(Collection::Roles, body)?;
    role.set_id(id.to_string());
    let existing = Repository::<Role>::require(store, id)?;
    if existing.factory_id != role.factory_id {
        vacate_role(store, &existing)?;
        info!(role = %id, from = %existing.factory_id, to = %role.factory_id, "moved role");
    }
    Repository::<Role>::update(store, &role)?;
    Ok(serde_json::to_value(role)?)
}

fn list_as<T: Record, S: Repository<T> + ?Sized>(store: &S) -> PlannerResult<Value> {
    Ok(serde_json::to_value(store.list()?)?)
}

fn get_as<T: Record, S: Repository<T> + ?Sized>(store: &S, id: &str) -> PlannerResult<Value> {
    Ok(serde_json::to_value(store.require(id)?)?)
}

fn create_as<T: Record, S: Repository<T> + ?Sized>(store: &S, body: Value) -> PlannerResult<Value> {
    let record: T = parse_body(T::COLLECTION, body)?;
    Ok(serde_json::to_value(store.create(record)?)?)
}

fn update_as<T: Record, S: Repository<T> + ?Sized>(
    store: &S,
    id: &str,
    body: Value,
) -> PlannerResult<Value> {
    let mut record: T = parse_body(T::COLLECTION, body)?;
    record.set_id(id.to_string());
    store.update(&record)?;
    Ok(serde_json::to_value(record)?)
}

fn parse_body<T: Record>(collection: Collection, body: Value) -> PlannerResult<T> {
    serde_json::from_value(body)
        .map_err(|e| PlannerError::Validation(format!("invalid {collection} record: {e}")))
}
