//! Static catalog of fine-grained permission attributes.
//!
//! Permissions are opaque dotted strings, partitioned into two disjoint
//! families (organization, user). Unlike roles they carry no hierarchy and
//! no inheritance; membership tests are exact string comparisons against
//! the flat arrays, with no prefix matching and no wildcards.

/// Organization-scoped permission attributes.
pub mod organization {
    /// View the organization.
    pub const VIEW: &str = "organization.view";
    /// Edit organization settings.
    pub const EDIT: &str = "organization.edit";
    /// Manage the organization.
    pub const MANAGE: &str = "organization.manage";
    /// Delete the organization.
    pub const DELETE: &str = "organization.delete";
    /// View the member list.
    pub const MEMBERS_VIEW: &str = "organization.members.view";
    /// Manage members.
    pub const MEMBERS_MANAGE: &str = "organization.members.manage";
    /// Manage invites.
    pub const INVITES_MANAGE: &str = "organization.invites.manage";
}

/// User-scoped permission attributes.
pub mod user {
    /// View a user profile.
    pub const VIEW: &str = "user.view";
    /// Edit a user profile.
    pub const EDIT: &str = "user.edit";
    /// Delete a user.
    pub const DELETE: &str = "user.delete";
    /// Manage a user's role assignments.
    pub const ROLES_MANAGE: &str = "user.roles.manage";
}

/// Every organization permission, for membership tests.
pub const ORGANIZATION_PERMISSIONS: [&str; 7] = [
    organization::VIEW,
    organization::EDIT,
    organization::MANAGE,
    organization::DELETE,
    organization::MEMBERS_VIEW,
    organization::MEMBERS_MANAGE,
    organization::INVITES_MANAGE,
];

/// Every user permission, for membership tests.
pub const USER_PERMISSIONS: [&str; 4] = [
    user::VIEW,
    user::EDIT,
    user::DELETE,
    user::ROLES_MANAGE,
];

/// Returns whether `value` is exactly one of the organization permissions.
pub fn is_organization_permission(value: &str) -> bool {
    ORGANIZATION_PERMISSIONS.contains(&value)
}

/// Returns whether `value` is exactly one of the user permissions.
pub fn is_user_permission(value: &str) -> bool {
    USER_PERMISSIONS.contains(&value)
}

/// Returns whether `value` belongs to either permission family.
pub fn is_permission(value: &str) -> bool {
    is_organization_permission(value) || is_user_permission(value)
}
