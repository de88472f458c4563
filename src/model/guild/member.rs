use std::fmt;

use super::{GuildRef, Role};
use crate::internal::prelude::*;
use crate::model::channel::GuildChannel;
use crate::model::id::RoleId;
use crate::model::overlay::MemberInteractionPermissions;
use crate::model::user::User;
use crate::model::{Permissions, Shared, Timestamp};

/// Information about a member of a guild.
///
/// [Discord docs](https://discord.com/developers/docs/resources/guild#guild-member-object).
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Member {
    /// Attached User struct.
    pub user: User,
    /// The guild the member belongs to.
    pub guild: GuildRef,
    /// The member's nickname, if present.
    ///
    /// Can't be longer than 32 characters.
    pub nick: Option<String>,
    /// The guild avatar hash.
    pub avatar: Option<String>,
    /// Vector of Ids of [`Role`]s given to the member.
    pub roles: Vec<RoleId>,
    /// Timestamp representing the date when the member joined.
    pub joined_at: Option<Timestamp>,
    /// Timestamp representing the date since the member is boosting the guild.
    pub premium_since: Option<Timestamp>,
    /// Indicator of whether the member can hear in voice channels.
    pub deaf: bool,
    /// Indicator of whether the member can speak in voice channels.
    pub mute: bool,
    /// Indicator that the member hasn't accepted the rules of the guild yet.
    pub pending: bool,
    /// When the user's timeout will expire and the user will be able to communicate in the guild
    /// again.
    pub communication_disabled_until: Option<Timestamp>,
    pub(crate) overlay: Option<MemberInteractionPermissions>,
}

impl Member {
    /// Returns the nickname of the member if one exists, otherwise the display name of the user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or_else(|| self.user.display_name())
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.guild.is_detached()
    }

    /// The interaction permissions attached to this member, if it was built for an interaction.
    #[must_use]
    pub fn interaction_permissions(&self) -> Option<&MemberInteractionPermissions> {
        self.overlay.as_ref()
    }

    /// Retrieves the member's roles from the guild's role cache, from the top of the hierarchy
    /// down. Roles missing from the cache are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DetachedEntity`] if the member was built outside a live guild.
    ///
    /// [`ModelError::DetachedEntity`]: crate::model::ModelError::DetachedEntity
    pub fn roles(&self) -> Result<Vec<Shared<Role>>> {
        let guild = self.guild.live()?;
        let mut roles: Vec<Shared<Role>> =
            self.roles.iter().filter_map(|id| guild.roles().get(id)).collect();
        roles.sort_by(|a, b| Role::hierarchy(&a.read_recursive(), &b.read_recursive()));
        Ok(roles)
    }

    /// The member's permissions in a channel.
    ///
    /// Uses the interaction overlay when it was granted for this channel, and computes the
    /// permissions from the live guild otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DetachedEntity`] if no matching overlay is present and the member was
    /// built outside a live guild.
    ///
    /// [`ModelError::DetachedEntity`]: crate::model::ModelError::DetachedEntity
    pub fn permissions_in(&self, channel: &GuildChannel) -> Result<Permissions> {
        crate::model::overlay::effective_member_permissions(self, channel)
    }
}

impl fmt::Display for Member {
    /// Formats a string which will mention the member.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<@{}>", self.user.id)
    }
}
