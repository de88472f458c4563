use std::cmp::Ordering;
use std::fmt;

use super::{
    ChannelCapabilities,
    ChannelFlags,
    ChannelType,
    EmojiRef,
    ForumLayout,
    ForumTag,
    PermissionOverwrite,
    SortOrder,
};
use crate::builder::CreateChannel;
use crate::cache::SnowflakeCache;
use crate::internal::prelude::*;
use crate::model::guild::{Guild, GuildRef, Member};
use crate::model::id::{ChannelId, ForumTagId, MessageId, UserId};
use crate::model::overlay::ChannelInteractionPermissions;
use crate::model::{ModelError, Permissions, Shared, Timestamp};

/// The metadata of a thread channel.
///
/// [Discord docs](https://discord.com/developers/docs/resources/channel#thread-metadata-object).
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[non_exhaustive]
pub struct ThreadMetadata {
    /// Whether the thread is archived.
    #[serde(default)]
    pub archived: bool,
    /// Duration in minutes to automatically archive the thread after recent activity.
    #[serde(default)]
    pub auto_archive_duration: u16,
    /// The last time the thread's archive status was last changed.
    pub archive_timestamp: Option<Timestamp>,
    /// When a thread is locked, only users with `MANAGE_THREADS` can unarchive it.
    #[serde(default)]
    pub locked: bool,
    /// Whether non-moderators can add other non-moderators to a thread.
    #[serde(default)]
    pub invitable: bool,
    /// When the thread was created. Only present for threads created after 2022-01-09.
    pub create_timestamp: Option<Timestamp>,
}

/// A channel of a guild, of any kind.
///
/// A single record covers every kind: fields that only some kinds have are `Option`s, set for
/// the kinds that declare them. [`Self::capabilities`] tells what the channel's kind supports.
///
/// Enumerated values (the kind, sort order, layout and flags) are kept as Discord sent them and
/// decoded when read, so values introduced after this library was written are preserved.
///
/// [Discord docs](https://discord.com/developers/docs/resources/channel#channel-object).
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct GuildChannel {
    /// The unique Id of the channel.
    pub id: ChannelId,
    /// The guild the channel belongs to.
    pub guild: GuildRef,
    pub(crate) kind: u8,
    /// The name of the channel.
    pub name: String,
    /// The position of the channel.
    ///
    /// The default text channel will _almost always_ have a position of `0`.
    pub position: i32,
    /// Indicator of whether the channel is age-restricted.
    pub nsfw: bool,
    /// The Id of the parent category for a channel, or of the parent text channel for a thread.
    pub parent_id: Option<ChannelId>,
    pub(crate) permission_overwrites: Vec<PermissionOverwrite>,
    pub(crate) flags: u32,
    /// The topic of the channel.
    pub topic: Option<String>,
    /// Amount of seconds a user has to wait before sending another message.
    pub rate_limit_per_user: Option<u16>,
    /// The bitrate of the channel, in bits.
    pub bitrate: Option<u32>,
    /// The maximum number of members allowed in the channel. `0` means unlimited.
    pub user_limit: Option<u32>,
    /// The region override of the channel. `None` means automatic.
    pub rtc_region: Option<String>,
    /// The emoji shown in the add reaction button on posts of a forum or media channel.
    pub default_reaction_emoji: Option<EmojiRef>,
    /// The initial `rate_limit_per_user` set on newly created posts.
    pub default_thread_rate_limit_per_user: Option<u16>,
    pub(crate) default_sort_order: Option<u8>,
    pub(crate) default_forum_layout: Option<u8>,
    pub(crate) available_tags: SnowflakeCache<ForumTagId, ForumTag>,
    /// The Id of the last message sent in the channel.
    pub last_message_id: Option<MessageId>,
    /// The Id of the user who created a thread.
    pub owner_id: Option<UserId>,
    /// Thread-specific fields not needed by other channels.
    pub thread_metadata: Option<ThreadMetadata>,
    /// An approximate count of messages in a thread, stops counting at 50.
    pub message_count: Option<u32>,
    /// An approximate count of users in a thread, stops counting at 50.
    pub member_count: Option<u32>,
    pub(crate) overlay: Option<ChannelInteractionPermissions>,
}

impl GuildChannel {
    /// Creates a channel of the given kind with every optional field unset.
    pub(crate) fn new(id: ChannelId, guild: GuildRef, kind: u8) -> Self {
        Self {
            id,
            guild,
            kind,
            name: String::new(),
            position: 0,
            nsfw: false,
            parent_id: None,
            permission_overwrites: Vec::new(),
            flags: 0,
            topic: None,
            rate_limit_per_user: None,
            bitrate: None,
            user_limit: None,
            rtc_region: None,
            default_reaction_emoji: None,
            default_thread_rate_limit_per_user: None,
            default_sort_order: None,
            default_forum_layout: None,
            available_tags: SnowflakeCache::sorted(|a: &ForumTag, b: &ForumTag| {
                a.name.cmp(&b.name)
            }),
            last_message_id: None,
            owner_id: None,
            thread_metadata: None,
            message_count: None,
            member_count: None,
            overlay: None,
        }
    }

    /// The kind of the channel.
    #[must_use]
    pub fn kind(&self) -> ChannelType {
        ChannelType::from(self.kind)
    }

    /// The kind of the channel, as sent by Discord.
    #[must_use]
    pub fn raw_kind(&self) -> u8 {
        self.kind
    }

    #[must_use]
    pub fn capabilities(&self) -> ChannelCapabilities {
        self.kind().capabilities()
    }

    #[must_use]
    pub fn flags(&self) -> ChannelFlags {
        ChannelFlags::from_bits_retain(self.flags)
    }

    #[must_use]
    pub fn raw_flags(&self) -> u32 {
        self.flags
    }

    /// The default sort order of posts, for forum and media channels.
    #[must_use]
    pub fn default_sort_order(&self) -> Option<SortOrder> {
        self.default_sort_order.map(SortOrder::from)
    }

    #[must_use]
    pub fn raw_default_sort_order(&self) -> Option<u8> {
        self.default_sort_order
    }

    /// The default layout of posts, for forum channels.
    #[must_use]
    pub fn default_forum_layout(&self) -> Option<ForumLayout> {
        self.default_forum_layout.map(ForumLayout::from)
    }

    #[must_use]
    pub fn raw_default_forum_layout(&self) -> Option<u8> {
        self.default_forum_layout
    }

    /// The tags that can be applied to posts, sorted by name.
    #[must_use]
    pub fn available_tags(&self) -> Vec<ForumTag> {
        self.available_tags.values().iter().map(|tag| tag.read().clone()).collect()
    }

    #[must_use]
    pub fn available_tag(&self, id: ForumTagId) -> Option<ForumTag> {
        self.available_tags.get(&id).map(|tag| tag.read().clone())
    }

    /// Whether the channel was built while its guild was not cached.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.guild.is_detached()
    }

    /// The interaction permissions attached to this channel, if it was built for an interaction.
    #[must_use]
    pub fn interaction_permissions(&self) -> Option<&ChannelInteractionPermissions> {
        self.overlay.as_ref()
    }

    /// The permission overwrites of the channel.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DetachedEntity`] if the channel was built outside a live guild, as
    /// the overwrites of such channels are not kept up to date.
    pub fn permission_overwrites(&self) -> Result<&[PermissionOverwrite]> {
        if self.is_detached() {
            return Err(Error::Model(ModelError::DetachedEntity));
        }

        Ok(&self.permission_overwrites)
    }

    /// The parent category of the channel, looked up in the guild's channel cache.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DetachedEntity`] if the channel was built outside a live guild.
    pub fn parent_category(&self) -> Result<Option<Shared<GuildChannel>>> {
        let guild = self.guild.live()?;
        Ok(self.parent_id.and_then(|id| guild.channel(id)))
    }

    /// The cached members able to view the channel.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DetachedEntity`] if the channel was built outside a live guild.
    pub fn members(&self) -> Result<Vec<Shared<Member>>> {
        let guild = self.guild.live()?;

        Ok(guild
            .members()
            .values()
            .into_iter()
            .filter(|member| {
                let user_id = member.read().user.id;
                guild.user_permissions_in(self, user_id).view_channel()
            })
            .collect())
    }

    /// A user's permissions in the channel.
    ///
    /// Uses the interaction overlay when it was granted to this user, and computes the
    /// permissions from the live guild otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DetachedEntity`] if no matching overlay is present and the channel
    /// was built outside a live guild.
    pub fn permissions_for_user(&self, user_id: UserId) -> Result<Permissions> {
        crate::model::overlay::effective_channel_permissions(self, user_id)
    }

    /// Produces a request creating a copy of this channel in `target`.
    ///
    /// The copy carries the channel's name and the settings its kind supports:
    ///
    /// | Kind | Copied settings |
    /// |---|---|
    /// | Text | topic, NSFW, slowmode |
    /// | News | topic, NSFW |
    /// | Voice | bitrate, user limit, region, NSFW, slowmode |
    /// | Stage | bitrate, region |
    /// | Category | none |
    /// | Forum | topic, NSFW, slowmode, default reaction, default thread slowmode, sort order, tags, layout |
    /// | Media | as Forum, without layout |
    ///
    /// When `target` is the channel's own guild, the parent category (if it still exists) and
    /// every permission overwrite are copied as well. Across guilds both are left out.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DetachedEntity`] if the channel was built outside a live guild, and
    /// [`ModelError::InvalidChannelType`] for threads and kinds unknown to this library.
    pub fn create_copy(&self, target: &Guild) -> Result<CreateChannel> {
        let source = self.guild.live()?;
        let kind = self.kind();

        if kind.is_thread() || !kind.is_guild_kind() {
            return Err(Error::Model(ModelError::InvalidChannelType));
        }

        let mut builder = CreateChannel::new(self.name.clone()).kind(kind).guild(target.id);

        match kind {
            ChannelType::Text => {
                builder = self.copy_topic(builder).nsfw(self.nsfw);
                builder = self.copy_slowmode(builder);
            },
            ChannelType::News => {
                builder = self.copy_topic(builder).nsfw(self.nsfw);
            },
            ChannelType::Voice => {
                builder = self.copy_audio(builder);
                if let Some(user_limit) = self.user_limit {
                    builder = builder.user_limit(user_limit);
                }
                builder = self.copy_slowmode(builder.nsfw(self.nsfw));
            },
            ChannelType::Stage => {
                builder = self.copy_audio(builder);
            },
            ChannelType::Forum | ChannelType::Media => {
                builder = self.copy_topic(builder).nsfw(self.nsfw);
                builder = self.copy_slowmode(builder);
                builder = self.copy_post_settings(builder);
                if kind == ChannelType::Forum {
                    if let Some(layout) = self.default_forum_layout() {
                        builder = builder.default_forum_layout(layout);
                    }
                }
            },
            _ => {},
        }

        if source.id == target.id {
            if let Some(parent) = self.parent_id.filter(|id| target.channels().contains(id)) {
                builder = builder.category(parent);
            }

            builder = builder.permissions(self.permission_overwrites.iter().cloned());
        }

        Ok(builder)
    }

    fn copy_topic(&self, builder: CreateChannel) -> CreateChannel {
        match &self.topic {
            Some(topic) => builder.topic(topic.clone()),
            None => builder,
        }
    }

    fn copy_slowmode(&self, builder: CreateChannel) -> CreateChannel {
        match self.rate_limit_per_user {
            Some(seconds) => builder.rate_limit_per_user(seconds),
            None => builder,
        }
    }

    fn copy_audio(&self, mut builder: CreateChannel) -> CreateChannel {
        if let Some(bitrate) = self.bitrate {
            builder = builder.bitrate(bitrate);
        }
        if let Some(region) = &self.rtc_region {
            builder = builder.rtc_region(region.clone());
        }
        builder
    }

    fn copy_post_settings(&self, mut builder: CreateChannel) -> CreateChannel {
        if let Some(emoji) = &self.default_reaction_emoji {
            builder = builder.default_reaction_emoji(emoji.clone());
        }
        if let Some(seconds) = self.default_thread_rate_limit_per_user {
            builder = builder.default_thread_rate_limit_per_user(seconds);
        }
        if let Some(order) = self.default_sort_order() {
            builder = builder.default_sort_order(order);
        }
        builder.available_tags(self.available_tags())
    }

    /// Orders channels by position, then by Id.
    pub(crate) fn positional(a: &GuildChannel, b: &GuildChannel) -> Ordering {
        a.position.cmp(&b.position).then(a.id.cmp(&b.id))
    }
}

impl fmt::Display for GuildChannel {
    /// Formats the channel, creating a mention of it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<#{}>", self.id)
    }
}
