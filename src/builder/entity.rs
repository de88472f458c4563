use tracing::debug;

use super::fields::fields_of;
use crate::cache::{Cache, GuildResolver};
use crate::internal::prelude::*;
use crate::json::{from_value, Payload};
use crate::model::channel::{
    ChannelType,
    GuildChannel,
    Message,
    PermissionOverwrite,
    PrivateChannel,
};
use crate::model::guild::{Guild, GuildRef, Member, Role};
use crate::model::id::{ChannelId, GuildId, RoleId, UserId};
use crate::model::user::User;
use crate::model::{shared, ModelError, Permissions, Shared};

/// Turns raw JSON payloads into entities.
///
/// Each `build_*` method for a guild entity first resolves the owning guild through the
/// [`Cache`]:
///
/// - When the guild is cached, the entity is _attached_: it is looked up in the guild's cache by
///   Id and updated in place, or created and cached if it is new. Repeated builds for the same Id
///   return the same [`Shared`] handle.
/// - When the guild is not cached, the entity is _detached_: a standalone object that is never
///   cached, and whose operations needing the live guild fail with
///   [`ModelError::DetachedEntity`].
///
/// Payloads are fully decoded before any cache is touched, so a malformed payload leaves the
/// cache as it was.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use discord_entities::builder::EntityBuilder;
/// use discord_entities::cache::Cache;
/// use discord_entities::model::id::GuildId;
/// use serde_json::json;
///
/// # fn run() -> discord_entities::Result<()> {
/// let builder = EntityBuilder::new(Arc::new(Cache::new()));
///
/// // The guild is not cached, so the role is detached.
/// let role = builder.build_role(GuildId::new(1), &json!({
///     "id": "2",
///     "name": "mods",
///     "position": 3,
///     "permissions": "8",
/// }))?;
///
/// assert!(role.read().is_detached());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct EntityBuilder {
    cache: Arc<Cache>,
}

impl EntityBuilder {
    #[must_use]
    pub fn new(cache: Arc<Cache>) -> Self {
        Self {
            cache,
        }
    }

    /// The cache entities are resolved against and stored in.
    #[must_use]
    pub fn cache(&self) -> &Arc<Cache> {
        &self.cache
    }

    /// Builds a text channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field is missing or malformed.
    pub fn build_text_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        self.build_channel(guild_id, payload, ChannelType::Text.into())
    }

    /// Builds a news (announcement) channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field is missing or malformed.
    pub fn build_news_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        self.build_channel(guild_id, payload, ChannelType::News.into())
    }

    /// Builds a voice channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field is missing or malformed.
    pub fn build_voice_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        self.build_channel(guild_id, payload, ChannelType::Voice.into())
    }

    /// Builds a stage channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field is missing or malformed.
    pub fn build_stage_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        self.build_channel(guild_id, payload, ChannelType::Stage.into())
    }

    /// Builds a channel category.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field is missing or malformed.
    pub fn build_category(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        self.build_channel(guild_id, payload, ChannelType::Category.into())
    }

    /// Builds a forum channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field is missing or malformed.
    pub fn build_forum_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        self.build_channel(guild_id, payload, ChannelType::Forum.into())
    }

    /// Builds a media channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field is missing or malformed.
    pub fn build_media_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        self.build_channel(guild_id, payload, ChannelType::Media.into())
    }

    /// Builds a thread of any of the three thread kinds, taken from the payload's `type`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidChannelType`] if the payload is not a thread, and
    /// [`Error::Decode`] if a field is missing or malformed.
    pub fn build_thread_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Shared<GuildChannel>> {
        let kind = channel_kind(&Payload::new(payload)?)?
            .filter(|kind| ChannelType::from(*kind).is_thread())
            .ok_or(Error::Model(ModelError::InvalidChannelType))?;

        self.build_channel(guild_id, payload, kind)
    }

    /// Builds a guild channel of the kind given by the payload's `type`.
    ///
    /// Returns `Ok(None)` for kinds this library cannot build, such as channel types introduced
    /// after it was written. Those are expected and only logged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field is missing or malformed.
    #[cfg_attr(feature = "tracing_instrument", tracing::instrument(skip(self, payload)))]
    pub fn build_guild_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
    ) -> Result<Option<Shared<GuildChannel>>> {
        let data = Payload::new(payload)?;
        let kind = channel_kind(&data)?.filter(|kind| ChannelType::from(*kind).is_guild_kind());
        let Some(kind) = kind else {
            debug!("Cannot build a channel of type {:?}", data.get("type"));
            return Ok(None);
        };

        self.build_channel(guild_id, payload, kind).map(Some)
    }

    #[cfg_attr(feature = "tracing_instrument", tracing::instrument(skip(self, payload)))]
    fn build_channel(
        &self,
        guild_id: GuildId,
        payload: &Value,
        kind: u8,
    ) -> Result<Shared<GuildChannel>> {
        let payload = Payload::new(payload)?;
        let id = ChannelId::from(nonzero(&payload, "id")?);

        let Some(guild) = self.cache.resolve_guild(guild_id) else {
            debug!("Building detached channel {} of uncached guild {}", id, guild_id);

            let mut channel = GuildChannel::new(id, GuildRef::Unresolved(guild_id), kind);
            configure_channel(&mut channel, &payload)?;
            return Ok(shared(channel));
        };

        let mut channel = GuildChannel::new(id, GuildRef::resolved(&guild), kind);
        configure_channel(&mut channel, &payload)?;

        let _writer = guild.lock_writer();
        Ok(guild.channels().insert_or_update(id, channel))
    }

    /// Builds a member of a guild. The member's user is stored in the user cache as well.
    ///
    /// For a cached guild with [`Settings::cache_members`] disabled, the member is attached to
    /// the guild but not stored in its member cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field is missing or malformed.
    ///
    /// [`Settings::cache_members`]: crate::cache::Settings::cache_members
    #[cfg_attr(feature = "tracing_instrument", tracing::instrument(skip(self, payload)))]
    pub fn build_member(&self, guild_id: GuildId, payload: &Value) -> Result<Shared<Member>> {
        let payload = Payload::new(payload)?;
        let user = payload.get("user").ok_or(Error::Decode("user", Value::Null))?;
        let user = self.decode_user(user)?;

        let Some(guild) = self.cache.resolve_guild(guild_id) else {
            debug!("Building detached member {} of uncached guild {}", user.id, guild_id);
            return Ok(shared(decode_member(user, GuildRef::Unresolved(guild_id), &payload)?));
        };

        let user_id = user.id;
        let member = decode_member(user, GuildRef::resolved(&guild), &payload)?;

        if !self.cache.settings().cache_members {
            return Ok(shared(member));
        }

        let _writer = guild.lock_writer();
        Ok(guild.members().insert_or_update(user_id, member))
    }

    /// Builds a role of a guild.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field is missing or malformed.
    #[cfg_attr(feature = "tracing_instrument", tracing::instrument(skip(self, payload)))]
    pub fn build_role(&self, guild_id: GuildId, payload: &Value) -> Result<Shared<Role>> {
        let payload = Payload::new(payload)?;
        let id = RoleId::from(nonzero(&payload, "id")?);

        let Some(guild) = self.cache.resolve_guild(guild_id) else {
            debug!("Building detached role {} of uncached guild {}", id, guild_id);
            return Ok(shared(decode_role(id, GuildRef::Unresolved(guild_id), &payload)?));
        };

        let role = decode_role(id, GuildRef::resolved(&guild), &payload)?;

        let _writer = guild.lock_writer();
        Ok(guild.roles().insert_or_update(id, role))
    }

    /// Builds a user, storing it in the user cache when [`Settings::cache_users`] is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the payload is not a valid user.
    ///
    /// [`Settings::cache_users`]: crate::cache::Settings::cache_users
    pub fn build_user(&self, payload: &Value) -> Result<User> {
        self.decode_user(payload)
    }

    fn decode_user(&self, payload: &Value) -> Result<User> {
        let user: User = from_value(payload.clone())?;
        self.cache.update_user(&user);
        Ok(user)
    }

    /// Builds a message. Messages are never cached, but their author is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the payload is not a valid message.
    pub fn build_message(&self, payload: &Value) -> Result<Message> {
        let message: Message = from_value(payload.clone())?;
        self.cache.update_user(&message.author);
        Ok(message)
    }

    /// Builds a private channel and stores it in the cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the payload is not a valid private channel, and
    /// [`ModelError::InvalidChannelType`] if it is another kind of channel.
    pub fn build_private_channel(&self, payload: &Value) -> Result<Shared<PrivateChannel>> {
        let channel: PrivateChannel = from_value(payload.clone())?;

        if channel.kind != ChannelType::Private {
            return Err(Error::Model(ModelError::InvalidChannelType));
        }

        self.cache.update_user(&channel.recipient);
        Ok(self.cache.private_channels().insert_or_update(channel.id, channel))
    }

    /// Builds a whole guild with its roles, channels, threads and members, and stores it in the
    /// cache.
    ///
    /// A guild that is already cached is updated in place, keeping every handle to it and to its
    /// entities valid. Channels of kinds this library cannot build are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field is missing or malformed. Entities built before the
    /// malformed one remain cached.
    #[cfg_attr(feature = "tracing_instrument", tracing::instrument(skip(self, payload)))]
    pub fn build_guild(&self, payload: &Value) -> Result<Arc<Guild>> {
        let data = Payload::new(payload)?;
        let id = GuildId::from(nonzero(&data, "id")?);
        let name = data.str("name")?.to_string();
        let owner_id = UserId::from(nonzero(&data, "owner_id")?);
        let icon = data.opt_str("icon")?.map(str::to_string);

        let guild = self.cache.get_or_insert_guild(id, || Guild::new(id, name.clone(), owner_id));
        guild.update_info(name, owner_id, icon);

        for role in data.array("roles")? {
            self.build_role(id, role)?;
        }
        for channel in data.array("channels")? {
            self.build_guild_channel(id, channel)?;
        }
        for thread in data.array("threads")? {
            self.build_guild_channel(id, thread)?;
        }
        for member in data.array("members")? {
            self.build_member(id, member)?;
        }

        Ok(guild)
    }
}

/// Reads a non-zero snowflake.
fn nonzero(payload: &Payload<'_>, key: &'static str) -> Result<std::num::NonZeroU64> {
    let id = payload.snowflake(key)?;
    std::num::NonZeroU64::new(id).ok_or(Error::Decode(key, Value::from(id)))
}

/// Reads a channel's `type`. Kinds too large to be known to this library read as `None`.
fn channel_kind(payload: &Payload<'_>) -> Result<Option<u8>> {
    let kind: u64 = payload.uint_or("type", u64::MAX)?;
    Ok(u8::try_from(kind).ok())
}

/// Decodes the fields shared by all guild channels, then the fields of the channel's kind.
fn configure_channel(channel: &mut GuildChannel, payload: &Payload<'_>) -> Result<()> {
    channel.name = payload.str("name")?.to_string();
    channel.position = payload.int_or("position", 0)?;
    channel.parent_id = payload.opt_snowflake("parent_id")?.and_then(ChannelId::try_new);
    channel.flags = payload.uint_or("flags", 0)?;
    channel.permission_overwrites = payload
        .opt_decode::<Vec<PermissionOverwrite>>("permission_overwrites")?
        .unwrap_or_default();

    for field in fields_of(channel.kind()) {
        field.apply(channel, payload)?;
    }

    Ok(())
}

fn decode_member(user: User, guild: GuildRef, payload: &Payload<'_>) -> Result<Member> {
    let roles = payload
        .array("roles")?
        .iter()
        .map(|role| from_value::<RoleId>(role.clone()))
        .collect::<Result<Vec<_>>>()?;

    Ok(Member {
        user,
        guild,
        nick: payload.opt_str("nick")?.map(str::to_string),
        avatar: payload.opt_str("avatar")?.map(str::to_string),
        roles,
        joined_at: payload.opt_decode("joined_at")?,
        premium_since: payload.opt_decode("premium_since")?,
        deaf: payload.bool_or("deaf", false)?,
        mute: payload.bool_or("mute", false)?,
        pending: payload.bool_or("pending", false)?,
        communication_disabled_until: payload.opt_decode("communication_disabled_until")?,
        overlay: None,
    })
}

fn decode_role(id: RoleId, guild: GuildRef, payload: &Payload<'_>) -> Result<Role> {
    Ok(Role {
        id,
        guild,
        name: payload.str("name")?.to_string(),
        colour: payload.uint_or("color", 0)?,
        hoist: payload.bool_or("hoist", false)?,
        managed: payload.bool_or("managed", false)?,
        mentionable: payload.bool_or("mentionable", false)?,
        position: payload.int_or("position", 0)?,
        permissions: payload.opt_decode("permissions")?.unwrap_or_else(Permissions::empty),
        icon: payload.opt_str("icon")?.map(str::to_string),
        unicode_emoji: payload.opt_str("unicode_emoji")?.map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn builder_with_guild() -> (EntityBuilder, Arc<Guild>) {
        let cache = Arc::new(Cache::new());
        let guild = cache.insert_guild(Guild::new(GuildId::new(1), "crabs", UserId::new(2)));
        (EntityBuilder::new(cache), guild)
    }

    #[test]
    fn unknown_kinds_are_skipped() {
        let (builder, guild) = builder_with_guild();

        let payload = json!({"id": "3", "type": 99, "name": "?"});
        assert!(builder.build_guild_channel(GuildId::new(1), &payload).unwrap().is_none());

        let dm = builder.build_guild_channel(GuildId::new(1), &json!({"id": "3", "type": 1}));
        assert!(dm.unwrap().is_none());
        assert!(guild.channels().is_empty());
    }

    #[test]
    fn kinds_wider_than_a_byte_are_skipped() {
        let (builder, guild) = builder_with_guild();

        let payload = json!({"id": "3", "type": 300, "name": "?"});
        assert!(builder.build_guild_channel(GuildId::new(1), &payload).unwrap().is_none());

        let err = builder.build_thread_channel(GuildId::new(1), &payload).unwrap_err();
        assert!(matches!(err, Error::Model(ModelError::InvalidChannelType)));
        assert!(guild.channels().is_empty());
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        let (builder, guild) = builder_with_guild();

        let payload = json!({"id": "3", "name": "general", "position": 4_294_967_296_i64});
        let err = builder.build_text_channel(GuildId::new(1), &payload);
        assert!(matches!(err, Err(Error::Decode("position", _))));

        let payload = json!({"id": "4", "name": "mods", "position": -4_294_967_296_i64});
        let err = builder.build_role(GuildId::new(1), &payload);
        assert!(matches!(err, Err(Error::Decode("position", _))));
        assert!(guild.channels().is_empty());
        assert!(guild.roles().is_empty());
    }

    #[test]
    fn thread_kind_is_checked() {
        let (builder, _guild) = builder_with_guild();

        let err = builder
            .build_thread_channel(GuildId::new(1), &json!({"id": "3", "type": 0, "name": "t"}))
            .unwrap_err();
        assert!(matches!(err, Error::Model(ModelError::InvalidChannelType)));

        let thread = builder
            .build_thread_channel(
                GuildId::new(1),
                &json!({"id": "18446744073709551615", "type": 12, "name": "t", "owner_id": "4"}),
            )
            .unwrap();
        assert_eq!(thread.read().id.get(), u64::MAX);
        assert_eq!(thread.read().kind(), ChannelType::PrivateThread);
        assert_eq!(thread.read().owner_id, Some(UserId::new(4)));
    }

    #[test]
    fn malformed_payload_leaves_cache_untouched() {
        let (builder, guild) = builder_with_guild();
        let first = builder
            .build_text_channel(GuildId::new(1), &json!({"id": "3", "name": "general"}))
            .unwrap();

        let err = builder.build_text_channel(GuildId::new(1), &json!({"id": "3", "name": 5}));
        assert!(matches!(err, Err(Error::Decode("name", _))));
        assert_eq!(first.read().name, "general");
        assert_eq!(guild.channels().len(), 1);
    }

    #[test]
    fn zero_ids_are_rejected() {
        let (builder, _guild) = builder_with_guild();
        let err = builder.build_role(GuildId::new(1), &json!({"id": "0", "name": "x"}));
        assert!(matches!(err, Err(Error::Decode("id", _))));
    }
}
