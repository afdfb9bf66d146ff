use crate::cache::{CacheMetrics, HierarchyCache};
use crate::error::Result;
use crate::store::RoleStore;
use crate::types::{LegacyRole, OrganizationId, User};
use crate::voter::{Subject, Voter, VoterRegistry};
use crate::voters::{OrganizationVoter, UserVoter};

const ROLE_ATTRIBUTE_PREFIX: &str = "ROLE_";

/// Authorization engine: role hierarchy resolution plus voter dispatch.
///
/// The engine owns the two process-wide caches (hierarchy, voter routing)
/// and is the composition root callers inject; it is read-only with respect
/// to role data. External mutation paths must call
/// [`Engine::clear_role_hierarchy_cache`] after changing role definitions.
pub struct Engine<S> {
    store: S,
    cache: HierarchyCache,
    voters: VoterRegistry,
}

/// Builder for [`Engine`].
pub struct EngineBuilder<S> {
    store: S,
    voters: VoterRegistry,
}

impl<S> EngineBuilder<S> {
    /// Creates a builder with no voters registered.
    pub fn new(store: S) -> Self {
        Self {
            store,
            voters: VoterRegistry::new(),
        }
    }

    /// Appends a voter; dispatch order is declaration order.
    pub fn voter(mut self, voter: impl Voter + 'static) -> Self {
        self.voters.register(voter);
        self
    }

    /// Registers the built-in organization and user voters.
    pub fn default_voters(self) -> Self {
        self.voter(OrganizationVoter).voter(UserVoter)
    }

    /// Builds the engine with an empty hierarchy cache.
    pub fn build(self) -> Engine<S> {
        Engine {
            store: self.store,
            cache: HierarchyCache::new(),
            voters: self.voters,
        }
    }
}

impl<S> Engine<S>
where
    S: RoleStore,
{
    /// Returns whether the user holds `required` directly or by inheritance.
    ///
    /// With an `organization` filter, platform-wide assignments always
    /// qualify and organization-scoped assignments qualify only when the
    /// scope matches; with no filter every assignment qualifies. The check
    /// is existential, so assignment order is irrelevant. An absent user,
    /// an empty assignment set and an unknown role name all deny; storage
    /// failures surface unchanged.
    pub async fn has_role(
        &self,
        user: Option<&User>,
        required: &str,
        organization: Option<&OrganizationId>,
    ) -> Result<bool> {
        let Some(user) = user else {
            return Ok(false);
        };
        if user.assignments.is_empty() {
            return Ok(false);
        }

        let hierarchy = self.cache.get(&self.store).await?;
        Ok(user.assignments.iter().any(|assignment| {
            let in_scope = organization.is_none()
                || assignment.organization_id.is_none()
                || assignment.organization_id.as_ref() == organization;
            in_scope && hierarchy.inherits(&assignment.role.id, required)
        }))
    }

    /// Reduces a user's assignments to a single flat display role.
    ///
    /// Highest recognized rank anywhere wins (`ADMIN` > `MODERATOR` >
    /// `USER`), ignoring organization scope; unknown role names never
    /// elevate. Absent user or no assignments resolve to [`LegacyRole::User`].
    /// This is a display projection only, not an authorization check.
    pub fn legacy_role(&self, user: Option<&User>) -> LegacyRole {
        user.and_then(User::highest_platform_rank)
            .unwrap_or(LegacyRole::User)
    }

    /// Decides an attribute for a user, optionally against a subject.
    ///
    /// `ROLE_*` attributes delegate entirely to [`Engine::has_role`] with no
    /// organization filter; anything else goes through voter dispatch, where
    /// a missing or unsupported (attribute, subject) combination denies.
    /// An absent user always denies before any dispatch happens.
    pub async fn is_granted(
        &self,
        user: Option<&User>,
        attribute: &str,
        subject: Option<&Subject>,
    ) -> Result<bool> {
        let Some(user) = user else {
            return Ok(false);
        };

        if attribute.starts_with(ROLE_ATTRIBUTE_PREFIX) {
            return self.has_role(Some(user), attribute, None).await;
        }

        Ok(self.voters.dispatch(user, attribute, subject))
    }

    /// Drops the cached hierarchy generation; the next check rebuilds.
    pub fn clear_role_hierarchy_cache(&self) {
        self.cache.clear();
    }

    /// Returns hierarchy cache counters and build samples.
    pub fn cache_metrics(&self) -> CacheMetrics {
        self.cache.metrics()
    }

    /// Zeroes hit/miss counters, keeping the cached hierarchy intact.
    pub fn reset_cache_metrics(&self) {
        self.cache.reset_metrics();
    }

    /// Drops the voter routing memoization; the hierarchy cache is untouched.
    pub fn clear_voter_cache(&self) {
        self.voters.clear_cache();
    }
}
