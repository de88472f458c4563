use crate::model::channel::{
    ChannelType,
    EmojiRef,
    ForumLayout,
    ForumTag,
    PermissionOverwrite,
    SortOrder,
};
use crate::model::id::{ChannelId, GuildId};

/// A builder for creating a new [`GuildChannel`] in a [`Guild`].
///
/// Except [`Self::name`], all fields are optional. The builder serialises to the body of
/// Discord's [Create Guild Channel] request; the guild the request targets is carried alongside
/// and left out of the body.
///
/// [`GuildChannel`]: crate::model::channel::GuildChannel
/// [`Guild`]: crate::model::guild::Guild
/// [Create Guild Channel]: https://discord.com/developers/docs/resources/guild#create-guild-channel
#[derive(Clone, Debug, Serialize)]
#[must_use]
pub struct CreateChannel {
    #[serde(skip)]
    guild_id: Option<GuildId>,

    #[serde(rename = "type")]
    kind: ChannelType,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<ChannelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nsfw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bitrate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rate_limit_per_user: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    permission_overwrites: Vec<PermissionOverwrite>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rtc_region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_reaction_emoji: Option<EmojiRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_thread_rate_limit_per_user: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_forum_layout: Option<ForumLayout>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    available_tags: Vec<ForumTag>,
}

impl CreateChannel {
    /// Creates a builder with the given name, setting [`Self::kind`] to [`ChannelType::Text`] and
    /// leaving all other fields empty.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            guild_id: None,
            kind: ChannelType::Text,
            name: name.into(),
            parent_id: None,
            topic: None,
            nsfw: None,
            bitrate: None,
            user_limit: None,
            rate_limit_per_user: None,
            position: None,
            permission_overwrites: Vec::new(),
            rtc_region: None,
            default_reaction_emoji: None,
            default_thread_rate_limit_per_user: None,
            default_sort_order: None,
            default_forum_layout: None,
            available_tags: Vec::new(),
        }
    }

    /// Specify how to call this new channel, replacing the current value as set in [`Self::new`].
    ///
    /// **Note**: Must be between 2 and 100 characters long.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Specify what type the channel is, whether it's a text, voice, category or news channel.
    pub fn kind(mut self, kind: ChannelType) -> Self {
        self.kind = kind;
        self
    }

    /// The guild the channel is to be created in.
    pub fn guild(mut self, id: impl Into<GuildId>) -> Self {
        self.guild_id = Some(id.into());
        self
    }

    /// Specify the category, the "parent" of this channel.
    pub fn category(mut self, id: impl Into<ChannelId>) -> Self {
        self.parent_id = Some(id.into());
        self
    }

    /// Set an interesting topic.
    ///
    /// **Note**: Must be between 0 and 1000 characters long.
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Specify if this channel will be inappropriate to browse while at work.
    pub fn nsfw(mut self, b: bool) -> Self {
        self.nsfw = Some(b);
        self
    }

    /// [Voice-only] Specify the bitrate at which sound plays in the voice channel.
    pub fn bitrate(mut self, rate: u32) -> Self {
        self.bitrate = Some(rate);
        self
    }

    /// [Voice-only] Set how many users may occupy this voice channel.
    pub fn user_limit(mut self, limit: u32) -> Self {
        self.user_limit = Some(limit);
        self
    }

    /// How many seconds must a user wait before sending another message.
    ///
    /// Bots, or users with the [`MANAGE_MESSAGES`] and/or [`MANAGE_CHANNELS`] permissions are exempt
    /// from this restriction.
    ///
    /// **Note**: Must be between 0 and 21600 seconds (360 minutes or 6 hours).
    ///
    /// [`MANAGE_MESSAGES`]: crate::model::Permissions::MANAGE_MESSAGES
    /// [`MANAGE_CHANNELS`]: crate::model::Permissions::MANAGE_CHANNELS
    #[doc(alias = "slowmode")]
    pub fn rate_limit_per_user(mut self, seconds: u16) -> Self {
        self.rate_limit_per_user = Some(seconds);
        self
    }

    /// Specify where the channel should be located.
    pub fn position(mut self, pos: u32) -> Self {
        self.position = Some(pos);
        self
    }

    /// A set of overwrites defining what a user or a user carrying a certain role can and cannot
    /// do. Replaces any overwrites set before.
    ///
    /// # Example
    ///
    /// ```rust
    /// use discord_entities::builder::CreateChannel;
    /// use discord_entities::model::channel::{PermissionOverwrite, PermissionOverwriteType};
    /// use discord_entities::model::id::UserId;
    /// use discord_entities::model::Permissions;
    ///
    /// let permissions = vec![PermissionOverwrite {
    ///     allow: Permissions::VIEW_CHANNEL,
    ///     deny: Permissions::SEND_TTS_MESSAGES,
    ///     kind: PermissionOverwriteType::Member(UserId::new(1234)),
    /// }];
    ///
    /// let builder = CreateChannel::new("my_new_cool_channel").permissions(permissions);
    /// assert_eq!(builder.permission_overwrites().len(), 1);
    /// ```
    pub fn permissions(mut self, perms: impl IntoIterator<Item = PermissionOverwrite>) -> Self {
        self.permission_overwrites = perms.into_iter().collect();
        self
    }

    /// [Voice-only] The region of the voice channel. Automatic when not set.
    pub fn rtc_region(mut self, region: impl Into<String>) -> Self {
        self.rtc_region = Some(region.into());
        self
    }

    /// [Forum-only] The emoji shown in the add reaction button on posts.
    pub fn default_reaction_emoji(mut self, emoji: EmojiRef) -> Self {
        self.default_reaction_emoji = Some(emoji);
        self
    }

    /// [Forum-only] The initial slowmode of posts created in the channel.
    pub fn default_thread_rate_limit_per_user(mut self, seconds: u16) -> Self {
        self.default_thread_rate_limit_per_user = Some(seconds);
        self
    }

    /// [Forum-only] The default order posts are sorted in.
    pub fn default_sort_order(mut self, order: SortOrder) -> Self {
        self.default_sort_order = Some(order);
        self
    }

    /// [Forum-only] The default layout of posts.
    pub fn default_forum_layout(mut self, layout: ForumLayout) -> Self {
        self.default_forum_layout = Some(layout);
        self
    }

    /// [Forum-only] The tags that can be applied to posts.
    pub fn available_tags(mut self, tags: impl IntoIterator<Item = ForumTag>) -> Self {
        self.available_tags = tags.into_iter().collect();
        self
    }

    #[must_use]
    pub fn guild_id(&self) -> Option<GuildId> {
        self.guild_id
    }

    #[must_use]
    pub fn get_kind(&self) -> ChannelType {
        self.kind
    }

    #[must_use]
    pub fn get_name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parent_id(&self) -> Option<ChannelId> {
        self.parent_id
    }

    #[must_use]
    pub fn permission_overwrites(&self) -> &[PermissionOverwrite] {
        &self.permission_overwrites
    }
}
