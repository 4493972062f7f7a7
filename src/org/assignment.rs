use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PlannerError, PlannerResult};
use crate::org::repository::Repository;
use crate::org::{Personnel, Role};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignRequest {
    pub personnel_id: String,
    pub role_id: String,
    pub factory_id: String,
}

/// Places a person into a role seat.
///
/// The role must exist and belong to `factory_id`, and no other person may
/// already hold it. Assigning the current occupant again is a no-op. A person
/// moving from another role leaves that role vacant.
pub fn assign<P, R>(
    personnel: &P,
    roles: &R,
    request: &AssignRequest,
) -> PlannerResult<Personnel>
where
    P: Repository<Personnel> + ?Sized,
    R: Repository<Role> + ?Sized,
{
    let mut person = personnel.require(&request.personnel_id)?;
    let role = roles.require(&request.role_id)?;

    if role.factory_id != request.factory_id {
        return Err(PlannerError::FactoryMismatch {
            role_id: role.id,
            role_factory_id: role.factory_id,
            factory_id: request.factory_id.clone(),
        });
    }

    if let Some(occupant) = find_occupant(personnel, &role)? {
        if occupant.id == person.id {
            debug!(personnel = %person.id, role = %role.id, "already assigned");
            return Ok(person);
        }
        return Err(PlannerError::RoleOccupied {
            role_id: role.id,
            occupant_id: occupant.id,
        });
    }

    person.role_id = Some(role.id.clone());
    person.factory_id = Some(role.factory_id.clone());
    personnel.update(&person)?;
    info!(personnel = %person.id, role = %role.id, factory = %role.factory_id, "assigned");
    Ok(person)
}

/// Clears a person's role and factory. Unassigned people are left as-is.
pub fn unassign<P>(personnel: &P, personnel_id: &str) -> PlannerResult<Personnel>
where
    P: Repository<Personnel> + ?Sized,
{
    let mut person = personnel.require(personnel_id)?;
    if !person.is_assigned() && person.factory_id.is_none() {
        return Ok(person);
    }
    let previous_role = person.role_id.take();
    person.factory_id = None;
    personnel.update(&person)?;
    info!(personnel = %person.id, role = ?previous_role, "unassigned");
    Ok(person)
}

/// Whoever currently holds `role`, matched on role id alone.
pub fn find_occupant<P>(personnel: &P, role: &Role) -> PlannerResult<Option<Personnel>>
where
    P: Repository<Personnel> + ?Sized,
{
    Ok(personnel
        .list()?
        .into_iter()
        .find(|p| p.role_id.as_deref() == Some(role.id.as_str())))
}

/// Checks the seat of a personnel record written directly rather than
/// through [`assign`]. The role must exist, belong to the record's factory
/// (filled in when missing) and not be held by anyone else.
pub fn check_placement<P, R>(
    personnel: &P,
    roles: &R,
    person: &mut Personnel,
) -> PlannerResult<()>
where
    P: Repository<Personnel> + ?Sized,
    R: Repository<Role> + ?Sized,
{
    let Some(role_id) = person.role_id.as_deref() else {
        return Ok(());
    };
    let role = roles
        .get(role_id)?
        .ok_or_else(|| PlannerError::Validation(format!("unknown role: {role_id}")))?;

    match person.factory_id.as_deref() {
        None => person.factory_id = Some(role.factory_id.clone()),
        Some(factory_id) if factory_id != role.factory_id => {
            return Err(PlannerError::FactoryMismatch {
                role_id: role.id,
                role_factory_id: role.factory_id,
                factory_id: factory_id.to_string(),
            });
        }
        Some(_) => {}
    }

    if let Some(occupant) = find_occupant(personnel, &role)? {
        if occupant.id != person.id {
            return Err(PlannerError::RoleOccupied {
                role_id: role.id,
                occupant_id: occupant.id,
            });
        }
    }
    Ok(())
}
