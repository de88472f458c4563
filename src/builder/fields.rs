//! The per-kind fields of guild channels.
//!
//! Every [`ChannelType`] declares the fields it reads from a channel payload on top of the
//! fields all guild channels share. A field names its JSON key and a rule that decodes the value
//! into the channel, falling back to the field's default when the key is absent or `null`.
//!
//! Enumerated values are decoded as raw integers and only mapped to their enums when read, so
//! values this library does not know about survive a rebuild unchanged.

use std::fmt;

use crate::internal::prelude::*;
use crate::json::Payload;
use crate::model::channel::{ChannelType, EmojiRef, ForumTag, GuildChannel};
use crate::model::id::{MessageId, UserId};

type Decode = fn(&mut GuildChannel, &Payload<'_>, &'static str) -> Result<()>;

/// A kind-specific field of a guild channel.
#[derive(Clone, Copy)]
pub(crate) struct ChannelField {
    pub key: &'static str,
    decode: Decode,
}

impl ChannelField {
    const fn new(key: &'static str, decode: Decode) -> Self {
        Self {
            key,
            decode,
        }
    }

    /// Decodes the field from `payload` into `channel`.
    pub fn apply(&self, channel: &mut GuildChannel, payload: &Payload<'_>) -> Result<()> {
        (self.decode)(channel, payload, self.key)
    }
}

impl fmt::Debug for ChannelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChannelField").field(&self.key).finish()
    }
}

/// Discord's default bitrate for voice channels.
const DEFAULT_BITRATE: u32 = 64_000;

const TOPIC: ChannelField = ChannelField::new("topic", |channel, payload, key| {
    channel.topic = payload.opt_str(key)?.map(str::to_string);
    Ok(())
});

const NSFW: ChannelField = ChannelField::new("nsfw", |channel, payload, key| {
    channel.nsfw = payload.bool_or(key, false)?;
    Ok(())
});

const RATE_LIMIT_PER_USER: ChannelField =
    ChannelField::new("rate_limit_per_user", |channel, payload, key| {
        channel.rate_limit_per_user = Some(payload.uint_or(key, 0)?);
        Ok(())
    });

const LAST_MESSAGE_ID: ChannelField =
    ChannelField::new("last_message_id", |channel, payload, key| {
        channel.last_message_id = payload.opt_snowflake(key)?.and_then(MessageId::try_new);
        Ok(())
    });

const BITRATE: ChannelField = ChannelField::new("bitrate", |channel, payload, key| {
    channel.bitrate = Some(payload.uint_or(key, DEFAULT_BITRATE)?);
    Ok(())
});

const USER_LIMIT: ChannelField = ChannelField::new("user_limit", |channel, payload, key| {
    channel.user_limit = Some(payload.uint_or(key, 0)?);
    Ok(())
});

const RTC_REGION: ChannelField = ChannelField::new("rtc_region", |channel, payload, key| {
    channel.rtc_region = payload.opt_str(key)?.map(str::to_string);
    Ok(())
});

const DEFAULT_REACTION_EMOJI: ChannelField =
    ChannelField::new("default_reaction_emoji", |channel, payload, key| {
        channel.default_reaction_emoji = match payload.opt_object(key)? {
            Some(emoji) => EmojiRef::from_payload(&emoji)?,
            None => None,
        };
        Ok(())
    });

const DEFAULT_THREAD_RATE_LIMIT_PER_USER: ChannelField =
    ChannelField::new("default_thread_rate_limit_per_user", |channel, payload, key| {
        channel.default_thread_rate_limit_per_user = Some(payload.uint_or(key, 0)?);
        Ok(())
    });

const DEFAULT_SORT_ORDER: ChannelField =
    ChannelField::new("default_sort_order", |channel, payload, key| {
        channel.default_sort_order = match payload.get(key) {
            Some(_) => Some(payload.uint_or(key, 0)?),
            None => None,
        };
        Ok(())
    });

const DEFAULT_FORUM_LAYOUT: ChannelField =
    ChannelField::new("default_forum_layout", |channel, payload, key| {
        channel.default_forum_layout = Some(payload.uint_or(key, 0)?);
        Ok(())
    });

const AVAILABLE_TAGS: ChannelField = ChannelField::new("available_tags", |channel, payload, key| {
    for value in payload.array(key)? {
        let tag = ForumTag::from_payload(&Payload::new(value)?)?;
        channel.available_tags.insert_or_update(tag.id, tag);
    }
    Ok(())
});

const OWNER_ID: ChannelField = ChannelField::new("owner_id", |channel, payload, key| {
    channel.owner_id = payload.opt_snowflake(key)?.and_then(UserId::try_new);
    Ok(())
});

const THREAD_METADATA: ChannelField =
    ChannelField::new("thread_metadata", |channel, payload, key| {
        channel.thread_metadata = payload.opt_decode(key)?;
        Ok(())
    });

const MESSAGE_COUNT: ChannelField = ChannelField::new("message_count", |channel, payload, key| {
    channel.message_count = Some(payload.uint_or(key, 0)?);
    Ok(())
});

const MEMBER_COUNT: ChannelField = ChannelField::new("member_count", |channel, payload, key| {
    channel.member_count = Some(payload.uint_or(key, 0)?);
    Ok(())
});

const TEXT: &[ChannelField] = &[TOPIC, NSFW, RATE_LIMIT_PER_USER, LAST_MESSAGE_ID];
const NEWS: &[ChannelField] = &[TOPIC, NSFW, LAST_MESSAGE_ID];
const AUDIO: &[ChannelField] =
    &[BITRATE, USER_LIMIT, RTC_REGION, NSFW, RATE_LIMIT_PER_USER, LAST_MESSAGE_ID];
const FORUM: &[ChannelField] = &[
    TOPIC,
    NSFW,
    RATE_LIMIT_PER_USER,
    LAST_MESSAGE_ID,
    DEFAULT_REACTION_EMOJI,
    DEFAULT_THREAD_RATE_LIMIT_PER_USER,
    DEFAULT_SORT_ORDER,
    DEFAULT_FORUM_LAYOUT,
    AVAILABLE_TAGS,
];
const MEDIA: &[ChannelField] = &[
    TOPIC,
    NSFW,
    RATE_LIMIT_PER_USER,
    LAST_MESSAGE_ID,
    DEFAULT_REACTION_EMOJI,
    DEFAULT_THREAD_RATE_LIMIT_PER_USER,
    DEFAULT_SORT_ORDER,
    AVAILABLE_TAGS,
];
const THREAD: &[ChannelField] = &[
    RATE_LIMIT_PER_USER,
    LAST_MESSAGE_ID,
    OWNER_ID,
    THREAD_METADATA,
    MESSAGE_COUNT,
    MEMBER_COUNT,
];

/// The kind-specific fields of a channel kind. Categories, and kinds that are not guild
/// channels, have none.
pub(crate) fn fields_of(kind: ChannelType) -> &'static [ChannelField] {
    match kind {
        ChannelType::Text => TEXT,
        ChannelType::News => NEWS,
        ChannelType::Voice | ChannelType::Stage => AUDIO,
        ChannelType::Forum => FORUM,
        ChannelType::Media => MEDIA,
        ChannelType::NewsThread | ChannelType::PublicThread | ChannelType::PrivateThread => THREAD,
        _ => &[],
    }
}
