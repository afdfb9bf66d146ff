use crate::types::{OrganizationId, User, UserId};
use std::collections::HashMap;
use std::sync::Mutex;

/// Outcome of a single voter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    /// The voter grants the attribute.
    Grant,
    /// The voter denies the attribute.
    Deny,
    /// The voter cannot decide; treated as deny by dispatch.
    Abstain,
}

/// Organization-shaped subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationSubject {
    /// Organization identifier.
    pub id: OrganizationId,
    /// Optional display slug.
    pub slug: Option<String>,
}

/// User-shaped subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSubject {
    /// Target user identifier.
    pub id: UserId,
}

/// The subject shapes voters can evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// An organization as the target of the check.
    Organization(OrganizationSubject),
    /// A user as the target of the check.
    User(UserSubject),
}

impl Subject {
    /// Creates an organization subject.
    pub fn organization(id: OrganizationId) -> Self {
        Self::Organization(OrganizationSubject { id, slug: None })
    }

    /// Creates an organization subject with a slug.
    pub fn organization_with_slug(id: OrganizationId, slug: impl Into<String>) -> Self {
        Self::Organization(OrganizationSubject {
            id,
            slug: Some(slug.into()),
        })
    }

    /// Creates a user subject.
    pub fn user(id: UserId) -> Self {
        Self::User(UserSubject { id })
    }
}

/// A stateless authorization policy.
///
/// `supports` must return `false` for attributes or subject shapes the
/// voter cannot evaluate, including an absent subject it would need; by
/// construction only one registered voter supports any given
/// (attribute, subject-shape) pair.
pub trait Voter: Send + Sync {
    /// Returns whether this voter can decide the given combination.
    fn supports(&self, attribute: &str, subject: Option<&Subject>) -> bool;

    /// Decides the attribute for a user; only called when `supports` held
    /// for the same (attribute, subject-presence) combination.
    fn vote(&self, user: &User, attribute: &str, subject: Option<&Subject>) -> Vote;
}

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct RoutingKey {
    attribute: String,
    has_subject: bool,
}

/// Ordered voter list with first-match routing memoization.
///
/// The routing cache maps `(attribute, subject-presence)` to the index of
/// the first supporting voter, or to a memoized "no voter" sentinel, so the
/// voter list is scanned at most once per combination. This cache is
/// independent of the role hierarchy cache; clearing one never clears the
/// other.
#[derive(Default)]
pub struct VoterRegistry {
    voters: Vec<Box<dyn Voter>>,
    routing: Mutex<HashMap<RoutingKey, Option<usize>>>,
}

impl VoterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a voter; dispatch order is declaration order.
    pub fn register(&mut self, voter: impl Voter + 'static) {
        self.voters.push(Box::new(voter));
    }

    /// Number of registered voters.
    pub fn len(&self) -> usize {
        self.voters.len()
    }

    /// Returns whether no voters are registered.
    pub fn is_empty(&self) -> bool {
        self.voters.is_empty()
    }

    /// Routes to the first supporting voter and returns whether it granted.
    ///
    /// No supporting voter, `Deny` and `Abstain` all resolve to `false`.
    pub fn dispatch(&self, user: &User, attribute: &str, subject: Option<&Subject>) -> bool {
        let key = RoutingKey {
            attribute: attribute.to_string(),
            has_subject: subject.is_some(),
        };

        let cached = {
            let routing = self.routing.lock().expect("poisoned lock");
            routing.get(&key).copied()
        };
        let index = match cached {
            Some(index) => index,
            None => {
                let found = self
                    .voters
                    .iter()
                    .position(|voter| voter.supports(attribute, subject));
                let mut routing = self.routing.lock().expect("poisoned lock");
                routing.insert(key, found);
                found
            }
        };

        match index {
            Some(index) => matches!(
                self.voters[index].vote(user, attribute, subject),
                Vote::Grant
            ),
            None => false,
        }
    }

    /// Drops the routing memoization; required after the voter list changes.
    pub fn clear_cache(&self) {
        let mut routing = self.routing.lock().expect("poisoned lock");
        routing.clear();
    }
}
