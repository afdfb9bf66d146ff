//! Organization-scoped RBAC authorization core.
//!
//! This crate resolves role checks against a single-parent role hierarchy
//! (flattened once per cache generation, with cycle and depth guards) and
//! dispatches fine-grained permission checks to pluggable [`Voter`]s. The
//! default behavior is deny-by-default: absent users, unknown role names
//! and unsupported attributes all resolve to `false`.
//!
//! # Examples
//!
//! Role check backed by the in-memory store (enable `memory-store`):
//! ```no_run
//! use org_authz::{EngineBuilder, RoleAssignment, RoleId, RoleName, RoleRecord, User, UserId};
//! # #[cfg(feature = "memory-store")]
//! # {
//! use org_authz::MemoryStore;
//! let store = MemoryStore::new();
//! let admin = RoleRecord::new(
//!     RoleId::try_from("r_admin").unwrap(),
//!     RoleName::try_from("ROLE_ADMIN").unwrap(),
//! );
//! store.add_role(admin.clone());
//! let engine = EngineBuilder::new(store).default_voters().build();
//! let user = User::new(UserId::try_from("user_1").unwrap())
//!     .with_assignment(RoleAssignment::platform(admin));
//! let _ = engine.has_role(Some(&user), "ROLE_ADMIN", None);
//! # }
//! ```
//!
//! Voter-backed permission check:
//! ```no_run
//! # #[cfg(feature = "memory-store")]
//! # {
//! use org_authz::{EngineBuilder, MemoryStore, Subject, User, UserId};
//! let engine = EngineBuilder::new(MemoryStore::new()).default_voters().build();
//! let user = User::new(UserId::try_from("user_1").unwrap());
//! let subject = Subject::user(user.id.clone());
//! let _ = engine.is_granted(Some(&user), "user.view", Some(&subject));
//! # }
//! ```
#![forbid(unsafe_code)]

mod cache;
mod engine;
mod error;
mod hierarchy;
pub mod permission;
mod store;
mod types;
mod voter;
mod voters;

#[cfg(feature = "memory-store")]
mod memory_store;

pub use crate::cache::{CacheMetrics, HierarchyCache};
pub use crate::engine::{Engine, EngineBuilder};
pub use crate::error::{Error, Result, StoreError};
pub use crate::hierarchy::{FlattenedHierarchy, MAX_HIERARCHY_DEPTH};
pub use crate::permission::{
    ORGANIZATION_PERMISSIONS, USER_PERMISSIONS, is_organization_permission, is_permission,
    is_user_permission,
};
pub use crate::store::RoleStore;
pub use crate::types::{
    LegacyRole, OrganizationId, OrganizationRank, ROLE_ADMIN, ROLE_MEMBER, ROLE_MODERATOR,
    ROLE_OWNER, ROLE_USER, RoleAssignment, RoleId, RoleName, RoleRecord, User, UserId,
};
pub use crate::voter::{OrganizationSubject, Subject, UserSubject, Vote, Voter, VoterRegistry};
pub use crate::voters::{OrganizationVoter, UserVoter};

#[cfg(feature = "memory-store")]
pub use crate::memory_store::MemoryStore;
