use std::fmt;

use crate::model::id::{ChannelId, GuildId, MessageId};
use crate::model::user::User;
use crate::model::Timestamp;

/// A representation of a message over a guild's text channel, a group, or a private channel.
///
/// Messages are never updated once built: an edit produces a new `Message`.
///
/// [Discord docs](https://discord.com/developers/docs/resources/channel#message-object).
#[derive(Clone, Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct Message {
    /// The unique Id of the message. Can be used to calculate the creation date of the message.
    pub id: MessageId,
    /// The Id of the [`Channel`] that the message was sent to.
    ///
    /// [`Channel`]: super::GuildChannel
    pub channel_id: ChannelId,
    /// The Id of the guild the message was sent in, if any.
    ///
    /// Messages fetched over REST do not carry it.
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    /// The user that sent the message.
    pub author: User,
    /// The content of the message.
    pub content: String,
    /// Initial message creation timestamp, calculated from its Id.
    pub timestamp: Timestamp,
    /// The timestamp of the last time the message was updated, if it was.
    #[serde(default)]
    pub edited_timestamp: Option<Timestamp>,
    /// Indicator of whether the message is pinned.
    #[serde(default)]
    pub pinned: bool,
    /// Indicator of whether the message was a text-to-speech message.
    #[serde(default)]
    pub tts: bool,
}

impl Message {
    /// Whether the message was edited after being sent.
    #[must_use]
    pub fn is_edited(&self) -> bool {
        self.edited_timestamp.is_some()
    }

    /// A link to the message in the Discord client.
    #[must_use]
    pub fn link(&self) -> String {
        match self.guild_id {
            Some(guild_id) => {
                format!("https://discord.com/channels/{}/{}/{}", guild_id, self.channel_id, self.id)
            },
            None => format!("https://discord.com/channels/@me/{}/{}", self.channel_id, self.id),
        }
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Message {}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}
