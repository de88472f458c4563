use std::cmp::Ordering;
use std::fmt;

use super::GuildRef;
use crate::model::id::RoleId;
use crate::model::Permissions;

/// Information about a role within a guild. A role represents a set of permissions, and can be
/// attached to one or multiple users. Roles are unique per guild and do not cross over to other
/// guilds in any way, and can have channel-specific permission overrides in addition to
/// guild-level permissions.
///
/// [Discord docs](https://discord.com/developers/docs/topics/permissions#role-object).
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Role {
    /// The Id of the role. Can be used to calculate the role's creation date.
    pub id: RoleId,
    /// The guild the role belongs to.
    pub guild: GuildRef,
    /// The name of the role.
    pub name: String,
    /// The colour of the role, as an RGB integer.
    pub colour: u32,
    /// Indicator of whether the role is pinned above lesser roles.
    pub hoist: bool,
    /// Indicator of whether the role is managed by an integration service.
    pub managed: bool,
    /// Indicator of whether the role can be mentioned, similar to mentioning a specific member or
    /// `@everyone`.
    pub mentionable: bool,
    /// The role's position in the position list. Roles are considered higher in hierarchy if
    /// their position is higher.
    ///
    /// The `@everyone` role is usually `0`.
    pub position: i32,
    /// A set of permissions that the role has been assigned.
    pub permissions: Permissions,
    /// The role's icon hash, if it has one.
    pub icon: Option<String>,
    /// The role's unicode emoji, if it has one.
    pub unicode_emoji: Option<String>,
}

impl Role {
    /// Whether this is the guild's `@everyone` role.
    #[must_use]
    pub fn is_everyone(&self) -> bool {
        self.guild.id().everyone_role() == self.id
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.guild.is_detached()
    }

    /// Whether the role has a given permission, accounting for [Administrator].
    ///
    /// [Administrator]: Permissions::ADMINISTRATOR
    #[must_use]
    pub fn has_permission(&self, permission: Permissions) -> bool {
        self.permissions.contains(Permissions::ADMINISTRATOR)
            || self.permissions.contains(permission)
    }

    /// Orders roles from the top of the hierarchy down. Roles sharing a position are ordered by
    /// Id, older roles first.
    pub(crate) fn hierarchy(a: &Role, b: &Role) -> Ordering {
        b.position.cmp(&a.position).then(a.id.cmp(&b.id))
    }
}

impl fmt::Display for Role {
    /// Formats a string which will mention the role.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<@&{}>", self.id)
    }
}
