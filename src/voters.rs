//! Built-in voters for the organization and user permission families.

use crate::permission::{is_organization_permission, is_user_permission, organization, user};
use crate::types::{LegacyRole, OrganizationRank, User};
use crate::voter::{Subject, Vote, Voter};
use tracing::debug;

/// Decides `organization.*` attributes from the acting user's membership in
/// the subject organization.
///
/// Rank is computed only from assignments scoped to that exact organization
/// id; roles held elsewhere (including platform-wide grants) never satisfy
/// an organization check.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrganizationVoter;

impl Voter for OrganizationVoter {
    fn supports(&self, attribute: &str, subject: Option<&Subject>) -> bool {
        is_organization_permission(attribute)
            && matches!(subject, Some(Subject::Organization(_)))
    }

    fn vote(&self, user: &User, attribute: &str, subject: Option<&Subject>) -> Vote {
        let Some(Subject::Organization(target)) = subject else {
            return Vote::Abstain;
        };
        let Some(rank) = user.organization_rank(&target.id) else {
            debug!(
                user_id = %user.id,
                organization_id = %target.id,
                organization_slug = target.slug.as_deref(),
                attribute,
                "organization access denied: no membership"
            );
            return Vote::Deny;
        };

        let required = match attribute {
            organization::VIEW | organization::MEMBERS_VIEW => OrganizationRank::Member,
            organization::EDIT
            | organization::MANAGE
            | organization::MEMBERS_MANAGE
            | organization::INVITES_MANAGE => OrganizationRank::Admin,
            organization::DELETE => {
                // Owner exactly; an organization admin is insufficient.
                return if rank == OrganizationRank::Owner {
                    Vote::Grant
                } else {
                    Vote::Deny
                };
            }
            _ => return Vote::Abstain,
        };

        if rank >= required {
            Vote::Grant
        } else {
            Vote::Deny
        }
    }
}

/// Decides `user.*` attributes.
///
/// Self-access is asymmetric: a user may always view and edit themselves,
/// and may never delete themselves or manage their own roles at this layer,
/// regardless of any admin rank they hold. The last-admin safety net lives
/// in the external mutation path, not here.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserVoter;

impl Voter for UserVoter {
    fn supports(&self, attribute: &str, subject: Option<&Subject>) -> bool {
        is_user_permission(attribute) && matches!(subject, Some(Subject::User(_)))
    }

    fn vote(&self, acting: &User, attribute: &str, subject: Option<&Subject>) -> Vote {
        let Some(Subject::User(target)) = subject else {
            return Vote::Abstain;
        };

        if target.id == acting.id {
            return match attribute {
                user::VIEW | user::EDIT => Vote::Grant,
                user::DELETE | user::ROLES_MANAGE => Vote::Deny,
                _ => Vote::Abstain,
            };
        }

        let rank = acting.highest_platform_rank().unwrap_or(LegacyRole::User);
        let required = match attribute {
            user::VIEW | user::EDIT => LegacyRole::Moderator,
            user::DELETE | user::ROLES_MANAGE => LegacyRole::Admin,
            _ => return Vote::Abstain,
        };

        if rank >= required {
            Vote::Grant
        } else {
            Vote::Deny
        }
    }
}
