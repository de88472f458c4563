//! Permissions granted for the duration of a single interaction.
//!
//! Interaction payloads carry the permissions of the invoking user in the channel the
//! interaction happened in, already resolved by Discord. They are attached to the channel and
//! member built for that interaction as an _overlay_, which takes precedence over permissions
//! computed from the guild's roles and overwrites.
//!
//! Overlays are only ever attached to objects owned by the interaction. When the entity comes
//! from a guild's cache, the [`InteractionEntityBuilder`] attaches the overlay to a private
//! clone, so one interaction's permissions never leak into another through the cache.
//!
//! [`InteractionEntityBuilder`]: crate::builder::InteractionEntityBuilder

use crate::internal::prelude::*;
use crate::model::channel::GuildChannel;
use crate::model::guild::Member;
use crate::model::id::{ChannelId, UserId};
use crate::model::Permissions;

/// The permissions a user has in a channel, as resolved by Discord for an interaction.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ChannelInteractionPermissions {
    /// The user the permissions were resolved for.
    pub user_id: UserId,
    pub permissions: Permissions,
}

/// The permissions a member has in the interaction's channel, as resolved by Discord.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MemberInteractionPermissions {
    /// The channel the permissions were resolved in.
    pub channel_id: ChannelId,
    pub permissions: Permissions,
}

/// Attaches an overlay to a channel, replacing any previous one.
pub(crate) fn attach_channel_overlay(
    channel: &mut GuildChannel,
    user_id: UserId,
    permissions: Permissions,
) {
    channel.overlay = Some(ChannelInteractionPermissions {
        user_id,
        permissions,
    });
}

/// Attaches an overlay to a member, replacing any previous one.
pub(crate) fn attach_member_overlay(
    member: &mut Member,
    channel_id: ChannelId,
    permissions: Permissions,
) {
    member.overlay = Some(MemberInteractionPermissions {
        channel_id,
        permissions,
    });
}

/// A user's permissions in a channel.
///
/// Returns the overlay's permissions when the channel carries one for `user_id`. Otherwise the
/// permissions are computed from the live guild, see [`Guild::user_permissions_in`].
///
/// # Errors
///
/// Returns [`ModelError::DetachedEntity`] if there is no matching overlay and the channel is
/// detached.
///
/// [`Guild::user_permissions_in`]: crate::model::guild::Guild::user_permissions_in
/// [`ModelError::DetachedEntity`]: crate::model::ModelError::DetachedEntity
pub fn effective_channel_permissions(
    channel: &GuildChannel,
    user_id: UserId,
) -> Result<Permissions> {
    if let Some(overlay) = channel.overlay.filter(|o| o.user_id == user_id) {
        return Ok(overlay.permissions);
    }

    let guild = channel.guild.live()?;
    Ok(guild.user_permissions_in(channel, user_id))
}

/// A member's permissions in a channel.
///
/// Returns the overlay's permissions when the member carries one for `channel`. Otherwise the
/// permissions are computed from the live guild.
///
/// # Errors
///
/// Returns [`ModelError::DetachedEntity`] if there is no matching overlay and the member is
/// detached.
///
/// [`ModelError::DetachedEntity`]: crate::model::ModelError::DetachedEntity
pub fn effective_member_permissions(
    member: &Member,
    channel: &GuildChannel,
) -> Result<Permissions> {
    if let Some(overlay) = member.overlay.filter(|o| o.channel_id == channel.id) {
        return Ok(overlay.permissions);
    }

    let guild = member.guild.live()?;
    Ok(guild.permissions_with_roles(channel, member.user.id, &member.roles))
}
