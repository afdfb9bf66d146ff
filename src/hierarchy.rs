use crate::types::{RoleId, RoleName, RoleRecord};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Maximum parent-link hops accumulated per role walk.
///
/// The bound is a compatibility contract with existing deployments, not a
/// tunable; exceeding it keeps the partial ancestor set and logs a warning.
pub const MAX_HIERARCHY_DEPTH: usize = 10;

/// Transitively-closed ancestor sets, one per role, built once per cache
/// generation and never mutated afterwards.
///
/// Each role's set contains its own name, so an exact-role check and an
/// inherited-role check go through the same membership test.
#[derive(Debug, Clone, Default)]
pub struct FlattenedHierarchy {
    ancestors: HashMap<RoleId, HashSet<RoleName>>,
}

impl FlattenedHierarchy {
    /// Flattens a set of role rows into per-role ancestor sets.
    ///
    /// The hierarchy is expected to be a forest, but integrity is not
    /// assumed: cycles and excessive depth abort the affected walk with a
    /// warning and keep whatever ancestors were gathered, so a corrupt
    /// hierarchy under-grants rather than hangs or over-grants. A dangling
    /// `parent_id` (role deleted mid-session) simply ends the walk.
    pub fn from_records(records: &[RoleRecord]) -> Self {
        let by_id: HashMap<&RoleId, &RoleRecord> =
            records.iter().map(|record| (&record.id, record)).collect();

        let mut ancestors = HashMap::with_capacity(records.len());
        for record in records {
            ancestors.insert(record.id.clone(), Self::walk(record, &by_id));
        }

        Self { ancestors }
    }

    fn walk(record: &RoleRecord, by_id: &HashMap<&RoleId, &RoleRecord>) -> HashSet<RoleName> {
        let mut names = HashSet::new();
        names.insert(record.name.clone());

        let mut visited = HashSet::new();
        visited.insert(&record.id);

        let mut next = record.parent_id.as_ref();
        let mut depth = 0usize;

        while let Some(parent_id) = next {
            depth += 1;
            if depth > MAX_HIERARCHY_DEPTH {
                warn!(
                    role_id = %record.id,
                    role_name = %record.name,
                    max_depth = MAX_HIERARCHY_DEPTH,
                    "depth exceeded while flattening role hierarchy"
                );
                break;
            }
            if !visited.insert(parent_id) {
                warn!(
                    role_id = %record.id,
                    role_name = %record.name,
                    repeated_role_id = %parent_id,
                    "cycle detected in role hierarchy"
                );
                break;
            }

            let Some(parent) = by_id.get(parent_id) else {
                // Parent row no longer exists; keep what we have.
                break;
            };
            names.insert(parent.name.clone());
            next = parent.parent_id.as_ref();
        }

        names
    }

    /// Returns whether `role` inherits (or is) the role named `required`.
    ///
    /// A role id absent from the hierarchy (deleted mid-session) matches
    /// nothing.
    pub fn inherits(&self, role: &RoleId, required: &str) -> bool {
        self.ancestors
            .get(role)
            .is_some_and(|names| names.contains(required))
    }

    /// Ancestor names for one role, including its own name.
    pub fn ancestor_names(&self, role: &RoleId) -> Option<&HashSet<RoleName>> {
        self.ancestors.get(role)
    }

    /// Number of roles in this generation.
    pub fn len(&self) -> usize {
        self.ancestors.len()
    }

    /// Returns whether the hierarchy holds no roles.
    pub fn is_empty(&self) -> bool {
        self.ancestors.is_empty()
    }
}
