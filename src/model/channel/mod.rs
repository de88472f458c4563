//! Models relating to channels and types within channels.

mod forum;
mod guild_channel;
mod message;
mod message_history;
mod private_channel;

use std::fmt;

use serde::de::{Deserialize, Deserializer, Error as DeError};
use serde::ser::{Serialize, SerializeStruct, Serializer};

pub use self::forum::*;
pub use self::guild_channel::*;
pub use self::message::*;
pub use self::message_history::*;
pub use self::private_channel::*;
use crate::internal::prelude::*;
use crate::model::id::{RoleId, UserId};
use crate::model::Permissions;

enum_number! {
    /// A representation of a type of channel.
    ///
    /// [Discord docs](https://discord.com/developers/docs/resources/channel#channel-object-channel-types).
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
    #[serde(from = "u8", into = "u8")]
    #[non_exhaustive]
    pub enum ChannelType {
        /// An indicator that the channel is a text [`GuildChannel`].
        Text = 0,
        /// An indicator that the channel is a [`PrivateChannel`].
        Private = 1,
        /// An indicator that the channel is a voice [`GuildChannel`].
        Voice = 2,
        /// An indicator that the channel is a group DM.
        GroupDm = 3,
        /// An indicator that the channel is a channel category.
        Category = 4,
        /// An indicator that the channel is a `NewsChannel`.
        ///
        /// Note: `NewsChannel` is serialized into a [`GuildChannel`]
        News = 5,
        /// An indicator that the channel is a news thread [`GuildChannel`].
        NewsThread = 10,
        /// An indicator that the channel is a public thread [`GuildChannel`].
        PublicThread = 11,
        /// An indicator that the channel is a private thread [`GuildChannel`].
        PrivateThread = 12,
        /// An indicator that the channel is a stage [`GuildChannel`].
        Stage = 13,
        /// An indicator that the channel is a directory [`GuildChannel`] in a [hub].
        ///
        /// [hub]: https://support.discord.com/hc/en-us/articles/4406046651927-Discord-Student-Hubs-FAQ
        Directory = 14,
        /// An indicator that the channel is a forum [`GuildChannel`].
        Forum = 15,
        /// An indicator that the channel is a media [`GuildChannel`].
        Media = 16,
        _ => Unknown(u8),
    }
}

impl ChannelType {
    #[must_use]
    pub const fn name(&self) -> &str {
        match *self {
            Self::Private => "private",
            Self::Text => "text",
            Self::Voice => "voice",
            Self::GroupDm => "group_dm",
            Self::Category => "category",
            Self::News => "news",
            Self::NewsThread => "news_thread",
            Self::PublicThread => "public_thread",
            Self::PrivateThread => "private_thread",
            Self::Stage => "stage",
            Self::Directory => "directory",
            Self::Forum => "forum",
            Self::Media => "media",
            Self::Unknown(_) => "unknown",
        }
    }

    /// The capabilities shared by every channel of this kind. Unknown kinds have none.
    #[must_use]
    pub const fn capabilities(self) -> ChannelCapabilities {
        use ChannelCapabilities as C;

        match self {
            Self::Text => C::MESSAGES.union(C::TOPIC).union(C::NSFW).union(C::SLOWMODE),
            Self::News => C::MESSAGES.union(C::TOPIC).union(C::NSFW),
            Self::Voice => C::MESSAGES.union(C::NSFW).union(C::SLOWMODE).union(C::AUDIO),
            Self::Stage => C::MESSAGES.union(C::NSFW).union(C::SLOWMODE).union(C::AUDIO),
            Self::Category => C::empty(),
            Self::Forum => C::TOPIC
                .union(C::NSFW)
                .union(C::SLOWMODE)
                .union(C::POST_CONTAINER)
                .union(C::LAYOUT),
            Self::Media => C::TOPIC.union(C::NSFW).union(C::SLOWMODE).union(C::POST_CONTAINER),
            Self::NewsThread | Self::PublicThread | Self::PrivateThread => {
                C::MESSAGES.union(C::SLOWMODE).union(C::THREAD)
            },
            Self::Private | Self::GroupDm => C::MESSAGES,
            Self::Directory | Self::Unknown(_) => C::empty(),
        }
    }

    #[must_use]
    pub const fn is_thread(self) -> bool {
        self.capabilities().contains(ChannelCapabilities::THREAD)
    }

    /// Whether members can connect to channels of this kind.
    #[must_use]
    pub const fn is_voice(self) -> bool {
        self.capabilities().contains(ChannelCapabilities::AUDIO)
    }

    /// Whether this kind is one of the guild channel kinds entities are built for.
    #[must_use]
    pub const fn is_guild_kind(self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::News
                | Self::Voice
                | Self::Stage
                | Self::Category
                | Self::Forum
                | Self::Media
                | Self::NewsThread
                | Self::PublicThread
                | Self::PrivateThread
        )
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags::bitflags! {
    /// What a channel kind supports. Operations that only apply to some kinds check these
    /// instead of matching on [`ChannelType`].
    #[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
    pub struct ChannelCapabilities: u16 {
        /// Messages can be sent to and read from the channel.
        const MESSAGES = 1 << 0;
        /// The channel has a topic.
        const TOPIC = 1 << 1;
        /// The channel can be age-restricted.
        const NSFW = 1 << 2;
        /// The channel has a per-user rate limit.
        const SLOWMODE = 1 << 3;
        /// The channel carries audio, with a bitrate, a user limit and an RTC region.
        const AUDIO = 1 << 4;
        /// The channel only holds threads (posts): it has tags, a default reaction, a default
        /// sort order and a default thread rate limit.
        const POST_CONTAINER = 1 << 5;
        /// The channel has a default layout for its posts.
        const LAYOUT = 1 << 6;
        /// The channel is a thread inside another channel.
        const THREAD = 1 << 7;
    }
}

enum_number! {
    /// The default sort order of posts in a forum or media channel.
    ///
    /// [Discord docs](https://discord.com/developers/docs/resources/channel#channel-object-sort-order-types).
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
    #[serde(from = "u8", into = "u8")]
    #[non_exhaustive]
    pub enum SortOrder {
        /// Sort forum posts by activity.
        LatestActivity = 0,
        /// Sort forum posts by creation time (from most recent to oldest).
        CreationDate = 1,
        _ => Unknown(u8),
    }
}

enum_number! {
    /// The default layout of posts in a forum channel.
    ///
    /// [Discord docs](https://discord.com/developers/docs/resources/channel#channel-object-forum-layout-types).
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
    #[serde(from = "u8", into = "u8")]
    #[non_exhaustive]
    pub enum ForumLayout {
        /// No default has been set for the forum channel.
        NotSet = 0,
        /// Display posts as a list.
        ListView = 1,
        /// Display posts as a collection of tiles.
        GalleryView = 2,
        _ => Unknown(u8),
    }
}

bitflags::bitflags! {
    /// Describes extra features of the channel.
    ///
    /// [Discord docs](https://discord.com/developers/docs/resources/channel#channel-object-channel-flags).
    #[derive(Copy, Clone, Default, Debug, Eq, Hash, PartialEq)]
    pub struct ChannelFlags: u32 {
        /// This thread is pinned to the top of its parent GUILD_FORUM channel
        const PINNED = 1 << 1;
        /// Whether a tag is required to be specified when creating a thread in a GUILD_FORUM or
        /// GUILD_MEDIA channel.
        const REQUIRE_TAG = 1 << 4;
        /// When set hides the embedded media download options.
        const HIDE_MEDIA_DOWNLOAD_OPTIONS = 1 << 15;
    }
}

/// A channel-specific permission overwrite for a member or role.
///
/// [Discord docs](https://discord.com/developers/docs/resources/channel#overwrite-object).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PermissionOverwrite {
    pub allow: Permissions,
    pub deny: Permissions,
    pub kind: PermissionOverwriteType,
}

/// The type of edit being made to a Channel's permissions.
///
/// This is for use with methods such as [`CreateChannel::permissions`].
///
/// [`CreateChannel::permissions`]: crate::builder::CreateChannel::permissions
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum PermissionOverwriteType {
    /// A member which is having its permission overwrites edited.
    Member(UserId),
    /// A role which is having its permission overwrites edited.
    Role(RoleId),
}

#[derive(Deserialize)]
struct PermissionOverwriteData {
    allow: Permissions,
    deny: Permissions,
    id: UserId,
    #[serde(rename = "type")]
    kind: Value,
}

impl<'de> Deserialize<'de> for PermissionOverwrite {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> StdResult<Self, D::Error> {
        let data = PermissionOverwriteData::deserialize(deserializer)?;

        let id = data.id.get();

        // Current API versions send 0/1, older ones "role"/"member".
        let kind = match &data.kind {
            Value::Number(n) if n.as_u64() == Some(0) => PermissionOverwriteType::Role(id.into()),
            Value::Number(n) if n.as_u64() == Some(1) => {
                PermissionOverwriteType::Member(id.into())
            },
            Value::String(s) if s == "role" => PermissionOverwriteType::Role(id.into()),
            Value::String(s) if s == "member" => PermissionOverwriteType::Member(id.into()),
            _ => return Err(DeError::custom("Unknown PermissionOverwriteType")),
        };

        Ok(PermissionOverwrite {
            allow: data.allow,
            deny: data.deny,
            kind,
        })
    }
}

impl Serialize for PermissionOverwrite {
    fn serialize<S: Serializer>(&self, serializer: S) -> StdResult<S::Ok, S::Error> {
        let (id, kind) = match self.kind {
            PermissionOverwriteType::Member(id) => (id.get(), 1),
            PermissionOverwriteType::Role(id) => (id.get(), 0),
        };

        let mut state = serializer.serialize_struct("PermissionOverwrite", 4)?;
        state.serialize_field("allow", &self.allow)?;
        state.serialize_field("deny", &self.deny)?;
        state.serialize_field("id", &id.to_string())?;
        state.serialize_field("type", &kind)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unknown_kinds_round_trip() {
        let kind = ChannelType::from(99);
        assert_eq!(kind, ChannelType::Unknown(99));
        assert_eq!(u8::from(kind), 99);
        assert!(kind.capabilities().is_empty());
        assert!(!kind.is_guild_kind());
    }

    #[test]
    fn capabilities_by_kind() {
        assert!(ChannelType::Voice.is_voice());
        assert!(!ChannelType::Text.is_voice());
        assert!(ChannelType::PrivateThread.is_thread());
        assert!(ChannelType::Forum.capabilities().contains(ChannelCapabilities::LAYOUT));
        assert!(!ChannelType::Media.capabilities().contains(ChannelCapabilities::LAYOUT));
    }

    #[test]
    fn overwrite_serde() {
        let overwrite: PermissionOverwrite = serde_json::from_value(json!({
            "id": "80351110224678912",
            "type": 1,
            "allow": "1024",
            "deny": "2048",
        }))
        .unwrap();

        assert_eq!(
            overwrite.kind,
            PermissionOverwriteType::Member(UserId::new(80351110224678912))
        );
        assert_eq!(overwrite.allow, Permissions::VIEW_CHANNEL);
        assert_eq!(overwrite.deny, Permissions::SEND_MESSAGES);

        let value = serde_json::to_value(&overwrite).unwrap();
        assert_eq!(value["type"], 1);
        assert_eq!(value["allow"], "1024");
        assert_eq!(value["id"], "80351110224678912");
    }
}
