use std::collections::BTreeMap;

use crate::org::{Client, Personnel, Role};
use crate::staffing::{StaffingInputs, StaffingLevels};

/// Counts assigned personnel by the tier of the role they hold. With a
/// factory id only that factory's roles count.
pub fn current_staffing(
    personnel: &[Personnel],
    roles: &[Role],
    factory_id: Option<&str>,
) -> StaffingLevels {
    let roles_by_id = roles
        .iter()
        .filter(|role| factory_id.map_or(true, |f| role.factory_id == f))
        .map(|role| (role.id.as_str(), role))
        .collect::<BTreeMap<_, _>>();

    let mut levels = StaffingLevels::default();
    for person in personnel {
        let Some(role_id) = person.role_id.as_deref() else {
            continue;
        };
        if let Some(role) = roles_by_id.get(role_id) {
            levels.increment(role.tier);
        }
    }
    levels
}

/// Aggregates client volumes into calculation inputs.
pub fn inputs_from_clients(
    clients: &[Client],
    complexity: i64,
    manager_to_client_ratio: i64,
) -> StaffingInputs {
    let work_orders = clients
        .iter()
        .map(|c| c.work_order_volume)
        .fold(0u64, u64::saturating_add);
    let complaints = clients
        .iter()
        .map(|c| c.complaint_volume)
        .fold(0u64, u64::saturating_add);
    StaffingInputs {
        work_order_volume: Some(i64::try_from(work_orders).unwrap_or(i64::MAX)),
        complaint_volume: Some(i64::try_from(complaints).unwrap_or(i64::MAX)),
        complexity: Some(complexity),
        client_count: Some(i64::try_from(clients.len()).unwrap_or(i64::MAX)),
        manager_to_client_ratio: Some(manager_to_client_ratio),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staffing::Tier;

    fn role(id: &str, tier: Tier, factory: &str) -> Role {
        Role {
            id: id.to_string(),
            title: id.to_string(),
            tier,
            factory_id: factory.to_string(),
            department_id: None,
            position: 0,
        }
    }

    fn person(id: &str, role_id: Option<&str>) -> Personnel {
        Personnel {
            id: id.to_string(),
            name: id.to_string(),
            email: String::new(),
            role_id: role_id.map(str::to_string),
            factory_id: None,
        }
    }

    #[test]
    fn counts_assigned_personnel_by_tier() {
        let roles = vec![
            role("lead", Tier::Leadership, "f-1"),
            role("spec", Tier::Specialist, "f-1"),
            role("assoc-a", Tier::Associate, "f-1"),
            role("assoc-b", Tier::Associate, "f-2"),
        ];
        let personnel = vec![
            person("p1", Some("lead")),
            person("p2", Some("assoc-a")),
            person("p3", Some("assoc-b")),
            person("p4", None),
        ];
        assert_eq!(
            current_staffing(&personnel, &roles, None),
            StaffingLevels::new(1, 0, 2)
        );
        assert_eq!(
            current_staffing(&personnel, &roles, Some("f-1")),
            StaffingLevels::new(1, 0, 1)
        );
    }

    #[test]
    fn sums_client_volumes() {
        let clients = vec![
            Client {
                id: "c1".to_string(),
                name: "Acme".to_string(),
                work_order_volume: 1200,
                complaint_volume: 40,
            },
            Client {
                id: "c2".to_string(),
                name: "Globex".to_string(),
                work_order_volume: 800,
                complaint_volume: 10,
            },
        ];
        let inputs = inputs_from_clients(&clients, 2, 3);
        assert_eq!(inputs.work_order_volume, Some(2000));
        assert_eq!(inputs.complaint_volume, Some(50));
        assert_eq!(inputs.client_count, Some(2));
        assert_eq!(inputs.complexity, Some(2));
    }
}
