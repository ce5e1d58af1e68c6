use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::OrganizationalUnitId;

/// Tenancy scoping node. Units form a forest through `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationalUnit {
    /// Unit identifier.
    pub id: OrganizationalUnitId,
    /// Parent unit, absent for roots.
    pub parent_id: Option<OrganizationalUnitId>,
    /// Human-readable name.
    pub display_name: String,
}

/// Expands directly assigned units with every unit below them.
///
/// Assigned identifiers that are not part of `units` are kept as-is. Parent
/// cycles terminate because each unit is visited once.
#[must_use]
pub fn expand_with_descendants(
    assigned: impl IntoIterator<Item = OrganizationalUnitId>,
    units: &[OrganizationalUnit],
) -> BTreeSet<OrganizationalUnitId> {
    let mut children: BTreeMap<OrganizationalUnitId, Vec<OrganizationalUnitId>> = BTreeMap::new();
    for unit in units {
        if let Some(parent_id) = unit.parent_id {
            children.entry(parent_id).or_default().push(unit.id);
        }
    }

    let mut reachable = BTreeSet::new();
    let mut pending: Vec<OrganizationalUnitId> = assigned.into_iter().collect();
    while let Some(unit_id) = pending.pop() {
        if !reachable.insert(unit_id) {
            continue;
        }

        if let Some(unit_children) = children.get(&unit_id) {
            pending.extend(unit_children.iter().copied());
        }
    }

    reachable
}
