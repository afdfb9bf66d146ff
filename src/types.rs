use crate::error::{Error, Result};
use std::borrow::Borrow;
use std::fmt;

const MAX_NAME_LEN: usize = 128;

/// Platform-wide administrator role name.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
/// Platform-wide moderator role name.
pub const ROLE_MODERATOR: &str = "ROLE_MODERATOR";
/// Base platform role name.
pub const ROLE_USER: &str = "ROLE_USER";
/// Organization owner role name.
pub const ROLE_OWNER: &str = "ROLE_OWNER";
/// Organization member role name.
pub const ROLE_MEMBER: &str = "ROLE_MEMBER";

fn validate_simple_name(value: &str, kind: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidId(format!("{kind} must not be empty")));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(Error::InvalidId(format!(
            "{kind} length must be <= {MAX_NAME_LEN}"
        )));
    }
    if !trimmed.chars().all(is_allowed_name_char) {
        return Err(Error::InvalidId(format!(
            "{kind} contains invalid characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn is_allowed_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, ':' | '_' | '-')
}

macro_rules! define_id_type {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Clone, Debug, Eq, PartialEq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            /// Creates a validated identifier.
            pub fn new(value: impl AsRef<str>) -> Result<Self> {
                validate_simple_name(value.as_ref(), $kind).map(Self)
            }

            /// Creates an identifier from a trusted string without validation.
            pub fn from_string(value: String) -> Self {
                Self(value)
            }

            /// Returns the underlying string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;

            fn try_from(value: &str) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::from_string(value)
            }
        }
    };
}

define_id_type!(
    /// User identifier.
    UserId,
    "user id"
);
define_id_type!(
    /// Organization identifier.
    OrganizationId,
    "organization id"
);
define_id_type!(
    /// Role identifier.
    RoleId,
    "role id"
);
define_id_type!(
    /// Role name (`ROLE_<UPPER_SNAKE>` by convention).
    RoleName,
    "role name"
);

/// A role row as loaded from the store and as carried on assignments.
///
/// `parent_id` is a single-parent inheritance link; `None` marks a root.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoleRecord {
    /// Stable role identifier.
    pub id: RoleId,
    /// Unique role name.
    pub name: RoleName,
    /// Optional parent role for inheritance.
    pub parent_id: Option<RoleId>,
}

impl RoleRecord {
    /// Creates a root role record.
    pub fn new(id: RoleId, name: RoleName) -> Self {
        Self {
            id,
            name,
            parent_id: None,
        }
    }

    /// Sets the parent role.
    pub fn with_parent(mut self, parent: RoleId) -> Self {
        self.parent_id = Some(parent);
        self
    }
}

/// A role grant held by a user, optionally scoped to one organization.
///
/// `organization_id` of `None` denotes a platform-wide grant valid across
/// all organizations.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoleAssignment {
    /// Scope of the grant; `None` is platform-wide.
    pub organization_id: Option<OrganizationId>,
    /// The granted role.
    pub role: RoleRecord,
}

impl RoleAssignment {
    /// Creates a platform-wide assignment.
    pub fn platform(role: RoleRecord) -> Self {
        Self {
            organization_id: None,
            role,
        }
    }

    /// Creates an organization-scoped assignment.
    pub fn scoped(organization: OrganizationId, role: RoleRecord) -> Self {
        Self {
            organization_id: Some(organization),
            role,
        }
    }
}

/// The user shape this core consumes from request-handling callers.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Ordered role assignments, across platform and organization scope.
    pub assignments: Vec<RoleAssignment>,
}

impl User {
    /// Creates a user with no assignments.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            assignments: Vec::new(),
        }
    }

    /// Adds an assignment.
    pub fn with_assignment(mut self, assignment: RoleAssignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    /// Highest recognized platform rank held anywhere, ignoring scope.
    ///
    /// Unknown role names never contribute a rank.
    pub fn highest_platform_rank(&self) -> Option<LegacyRole> {
        self.assignments
            .iter()
            .filter_map(|assignment| LegacyRole::from_role_name(assignment.role.name.as_str()))
            .max()
    }

    /// Highest recognized rank held within exactly the given organization.
    ///
    /// Platform-wide assignments do not count toward organization rank.
    pub fn organization_rank(&self, organization: &OrganizationId) -> Option<OrganizationRank> {
        self.assignments
            .iter()
            .filter(|assignment| assignment.organization_id.as_ref() == Some(organization))
            .filter_map(|assignment| {
                OrganizationRank::from_role_name(assignment.role.name.as_str())
            })
            .max()
    }
}

/// Single flat display role for legacy call sites.
///
/// This is a convenience projection, not an authorization primitive; use
/// [`Engine::has_role`](crate::Engine::has_role) for access decisions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LegacyRole {
    /// Base rank.
    User,
    /// Moderation rank.
    Moderator,
    /// Administrative rank.
    Admin,
}

impl LegacyRole {
    /// Maps a role name to its platform rank, `None` for unrecognized names.
    pub fn from_role_name(name: &str) -> Option<Self> {
        match name {
            ROLE_ADMIN => Some(Self::Admin),
            ROLE_MODERATOR => Some(Self::Moderator),
            ROLE_USER => Some(Self::User),
            _ => None,
        }
    }

    /// Returns the legacy display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Moderator => "MODERATOR",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for LegacyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rank of a user within one organization.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum OrganizationRank {
    /// Plain membership.
    Member,
    /// Organization administrator.
    Admin,
    /// Organization owner.
    Owner,
}

impl OrganizationRank {
    /// Maps a role name to its organization rank, `None` for unrecognized names.
    pub fn from_role_name(name: &str) -> Option<Self> {
        match name {
            ROLE_OWNER => Some(Self::Owner),
            ROLE_ADMIN => Some(Self::Admin),
            ROLE_MEMBER => Some(Self::Member),
            _ => None,
        }
    }
}
