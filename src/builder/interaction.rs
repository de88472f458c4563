use super::EntityBuilder;
use crate::internal::prelude::*;
use crate::json::Payload;
use crate::model::channel::GuildChannel;
use crate::model::guild::{Member, Role};
use crate::model::id::{ChannelId, GuildId, UserId};
use crate::model::overlay::{attach_channel_overlay, attach_member_overlay};
use crate::model::{shared, Permissions, Shared};

/// Builds the entities resolved in an interaction payload.
///
/// Interaction payloads carry, next to each resolved channel and member, the permissions Discord
/// computed for the invoking user. Those are attached to the built entity as an overlay, see
/// [`crate::model::overlay`].
///
/// Overlays are request-scoped: when the guild is cached, the entity is built through the
/// guild's cache as usual and then copied, and the overlay is attached to the copy only. The
/// cached entity never carries it.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use discord_entities::builder::{EntityBuilder, InteractionEntityBuilder};
/// use discord_entities::cache::Cache;
/// use discord_entities::model::prelude::*;
/// use serde_json::json;
///
/// # fn run() -> discord_entities::Result<()> {
/// let builder = EntityBuilder::new(Arc::new(Cache::new()));
/// let interaction = InteractionEntityBuilder::new(builder, ChannelId::new(10), UserId::new(5));
///
/// let channel = interaction.build_text_channel(GuildId::new(1), &json!({
///     "id": "10",
///     "name": "general",
///     "permissions": "3072",
/// }))?;
///
/// let permissions = channel.read().permissions_for_user(UserId::new(5))?;
/// assert!(permissions.view_channel() && permissions.send_messages());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct InteractionEntityBuilder {
    builder: EntityBuilder,
    channel_id: ChannelId,
    user_id: UserId,
}

impl InteractionEntityBuilder {
    /// Creates a builder for the interaction invoked by `user_id` in `channel_id`.
    #[must_use]
    pub fn new(builder: EntityBuilder, channel_id: ChannelId, user_id: UserId) -> Self {
        Self {
            builder,
            channel_id,
            user_id,
        }
    }

    #[must_use]
    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Builds a text channel carrying the invoking user's permissions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field, including `permissions`, is missing or malformed.
    pub fn build_text_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        let permissions = channel_permissions(payload)?;
        let channel = self.builder.build_text_channel(guild_id, payload)?;
        Ok(self.with_channel_overlay(&channel, permissions))
    }

    /// Builds a news channel carrying the invoking user's permissions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field, including `permissions`, is missing or malformed.
    pub fn build_news_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        let permissions = channel_permissions(payload)?;
        let channel = self.builder.build_news_channel(guild_id, payload)?;
        Ok(self.with_channel_overlay(&channel, permissions))
    }

    /// Builds a voice channel carrying the invoking user's permissions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field, including `permissions`, is missing or malformed.
    pub fn build_voice_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        let permissions = channel_permissions(payload)?;
        let channel = self.builder.build_voice_channel(guild_id, payload)?;
        Ok(self.with_channel_overlay(&channel, permissions))
    }

    /// Builds a stage channel carrying the invoking user's permissions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field, including `permissions`, is missing or malformed.
    pub fn build_stage_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        let permissions = channel_permissions(payload)?;
        let channel = self.builder.build_stage_channel(guild_id, payload)?;
        Ok(self.with_channel_overlay(&channel, permissions))
    }

    /// Builds a category carrying the invoking user's permissions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field, including `permissions`, is missing or malformed.
    pub fn build_category(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        let permissions = channel_permissions(payload)?;
        let channel = self.builder.build_category(guild_id, payload)?;
        Ok(self.with_channel_overlay(&channel, permissions))
    }

    /// Builds a forum channel carrying the invoking user's permissions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field, including `permissions`, is missing or malformed.
    pub fn build_forum_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        let permissions = channel_permissions(payload)?;
        let channel = self.builder.build_forum_channel(guild_id, payload)?;
        Ok(self.with_channel_overlay(&channel, permissions))
    }

    /// Builds a media channel carrying the invoking user's permissions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field, including `permissions`, is missing or malformed.
    pub fn build_media_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        let permissions = channel_permissions(payload)?;
        let channel = self.builder.build_media_channel(guild_id, payload)?;
        Ok(self.with_channel_overlay(&channel, permissions))
    }

    /// Builds a thread carrying the invoking user's permissions.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidChannelType`] if the payload is not a thread, and
    /// [`Error::Decode`] if a field, including `permissions`, is missing or malformed.
    ///
    /// [`ModelError::InvalidChannelType`]: crate::model::ModelError::InvalidChannelType
    pub fn build_thread_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        let permissions = channel_permissions(payload)?;
        let channel = self.builder.build_thread_channel(guild_id, payload)?;
        Ok(self.with_channel_overlay(&channel, permissions))
    }

    /// Builds a guild channel of the kind given by the payload's `type`, carrying the invoking
    /// user's permissions. Returns `Ok(None)` for kinds this library cannot build.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field, including `permissions`, is missing or malformed.
    #[cfg_attr(feature = "tracing_instrument", tracing::instrument(skip(self, payload)))]
    pub fn build_guild_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Option<Shared<GuildChannel>>> {
        let permissions = channel_permissions(payload)?;
        let Some(channel) = self.builder.build_guild_channel(guild_id, payload)? else {
            return Ok(None);
        };

        Ok(Some(self.with_channel_overlay(&channel, permissions)))
    }

    /// Builds a member. The overlay is only attached when the payload carries `permissions`,
    /// which Discord leaves out of members that are merely mentioned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field is missing or malformed.
    #[cfg_attr(feature = "tracing_instrument", tracing::instrument(skip(self, payload)))]
    pub fn build_member(&self, guild_id: GuildId, payload: &Value) -> Result<Shared<Member>> {
        let permissions = Payload::new(payload)?.opt_decode::<Permissions>("permissions")?;

        let member = self.builder.build_member(guild_id, payload)?;
        let Some(permissions) = permissions else {
            return Ok(member);
        };

        let mut private = member.read().clone();
        attach_member_overlay(&mut private, self.channel_id, permissions);
        Ok(shared(private))
    }

    /// Builds a role. Roles carry no interaction permissions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field is missing or malformed.
    pub fn build_role(&self, guild_id: GuildId, payload: &Value) -> Result<Shared<Role>> {
        self.builder.build_role(guild_id, payload)
    }

    /// Attaches the overlay to a private copy of the channel.
    fn with_channel_overlay(
        &self,
        channel: &Shared<GuildChannel>,
        permissions: Permissions,
    ) -> Shared<GuildChannel> {
        let mut private = channel.read().clone();
        attach_channel_overlay(&mut private, self.user_id, permissions);
        shared(private)
    }
}

fn channel_permissions(payload: &Value) -> Result<Permissions> {
    Payload::new(payload)?.decode("permissions")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cache::Cache;
    use crate::model::guild::Guild;

    #[test]
    fn detached_member_without_permissions_has_no_overlay() {
        let builder = EntityBuilder::new(Arc::new(Cache::new()));
        let interaction =
            InteractionEntityBuilder::new(builder, ChannelId::new(10), UserId::new(5));

        let payload = json!({"user": {"id": "5", "username": "ferris"}});
        let member = interaction.build_member(GuildId::new(1), &payload).unwrap();
        assert!(member.read().interaction_permissions().is_none());
        assert!(member.read().is_detached());
    }

    #[test]
    fn cached_channel_is_not_touched() {
        let cache = Arc::new(Cache::new());
        let guild = cache.insert_guild(Guild::new(GuildId::new(1), "crabs", UserId::new(2)));
        let builder = EntityBuilder::new(cache);
        let interaction =
            InteractionEntityBuilder::new(builder, ChannelId::new(10), UserId::new(5));

        let payload = json!({"id": "10", "name": "a", "permissions": "8"});
        let channel = interaction.build_text_channel(GuildId::new(1), &payload).unwrap();

        let cached = guild.channel(ChannelId::new(10)).unwrap();
        assert!(!Arc::ptr_eq(&channel, &cached));
        assert!(cached.read().interaction_permissions().is_none());
        assert_eq!(
            channel.read().interaction_permissions().map(|o| o.permissions),
            Some(Permissions::ADMINISTRATOR)
        );
    }

    #[test]
    fn missing_permissions_leave_the_cache_untouched() {
        let cache = Arc::new(Cache::new());
        let guild = cache.insert_guild(Guild::new(GuildId::new(1), "crabs", UserId::new(2)));
        let builder = EntityBuilder::new(cache);
        let interaction =
            InteractionEntityBuilder::new(builder, ChannelId::new(10), UserId::new(5));

        let payload = json!({"id": "10", "type": 0, "name": "a"});
        let err = interaction.build_guild_channel(GuildId::new(1), &payload);
        assert!(matches!(err, Err(Error::Decode("permissions", _))));
        assert!(guild.channels().is_empty());
    }

    #[test]
    fn channel_permissions_are_required() {
        let builder = EntityBuilder::new(Arc::new(Cache::new()));
        let interaction =
            InteractionEntityBuilder::new(builder, ChannelId::new(10), UserId::new(5));

        let payload = json!({"id": "10", "name": "a"});
        let err = interaction.build_text_channel(GuildId::new(1), &payload);
        assert!(matches!(err, Err(Error::Decode("permissions", _))));
    }
}
