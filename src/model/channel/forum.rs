use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::internal::prelude::*;
use crate::json::Payload;
use crate::model::id::{EmojiId, ForumTagId};

/// An emoji referenced by a forum channel, either as its default reaction or on a tag.
///
/// Discord sends these as a pair of `emoji_id` and `emoji_name` fields. A non-null `emoji_id`
/// refers to a guild's custom emoji; otherwise a non-null `emoji_name` holds a unicode emoji.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum EmojiRef {
    /// A custom emoji of the guild.
    Custom {
        id: EmojiId,
        /// Discord only sends the name of custom emojis in some payloads.
        name: Option<String>,
    },
    /// A unicode emoji, such as `"\u{1f980}"`.
    Unicode(String),
}

impl EmojiRef {
    /// Decodes the `emoji_id`/`emoji_name` pair of an object.
    ///
    /// Returns `Ok(None)` when both are absent or `null`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if either field is present but malformed.
    pub fn from_payload(payload: &Payload<'_>) -> Result<Option<Self>> {
        let name = payload.opt_str("emoji_name")?;

        if let Some(id) = payload.opt_snowflake("emoji_id")? {
            let id = EmojiId::try_new(id)
                .ok_or_else(|| Error::Decode("emoji_id", Value::from(id)))?;
            return Ok(Some(Self::Custom {
                id,
                name: name.map(str::to_string),
            }));
        }

        Ok(name.map(|name| Self::Unicode(name.to_string())))
    }

    /// The `(emoji_id, emoji_name)` pair sent back to Discord.
    fn wire(&self) -> (Option<String>, Option<&str>) {
        match self {
            Self::Custom {
                id, ..
            } => (Some(id.to_string()), None),
            Self::Unicode(name) => (None, Some(name)),
        }
    }
}

impl Serialize for EmojiRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> StdResult<S::Ok, S::Error> {
        let (id, name) = self.wire();

        let mut state = serializer.serialize_struct("DefaultReaction", 2)?;
        state.serialize_field("emoji_id", &id)?;
        state.serialize_field("emoji_name", &name)?;
        state.end()
    }
}

/// A tag that can be applied to posts of a forum or media channel.
///
/// [Discord docs](https://discord.com/developers/docs/resources/channel#forum-tag-object).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct ForumTag {
    pub id: ForumTagId,
    pub name: String,
    /// Whether only members with the Manage Threads permission can apply the tag.
    pub moderated: bool,
    pub emoji: Option<EmojiRef>,
}

impl ForumTag {
    #[must_use]
    pub fn new(id: ForumTagId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            moderated: false,
            emoji: None,
        }
    }

    /// Decodes a tag object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if a field is missing or malformed.
    pub fn from_payload(payload: &Payload<'_>) -> Result<Self> {
        let id = payload.snowflake("id")?;

        Ok(Self {
            id: ForumTagId::try_new(id).ok_or_else(|| Error::Decode("id", Value::from(id)))?,
            name: payload.str("name")?.to_string(),
            moderated: payload.bool_or("moderated", false)?,
            emoji: EmojiRef::from_payload(payload)?,
        })
    }
}

/// Tags are sent flattened, with the emoji pair next to the tag's own fields. The Id is left
/// out, as tags only get serialised for creating new channels.
impl Serialize for ForumTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> StdResult<S::Ok, S::Error> {
        let (emoji_id, emoji_name) = self.emoji.as_ref().map_or((None, None), EmojiRef::wire);

        let mut state = serializer.serialize_struct("ForumTag", 4)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("moderated", &self.moderated)?;
        state.serialize_field("emoji_id", &emoji_id)?;
        state.serialize_field("emoji_name", &emoji_name)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode(value: &Value) -> Option<EmojiRef> {
        EmojiRef::from_payload(&Payload::new(value).unwrap()).unwrap()
    }

    #[test]
    fn emoji_decoding() {
        assert_eq!(
            decode(&json!({"emoji_id": "41771983429993937", "emoji_name": "crab"})),
            Some(EmojiRef::Custom {
                id: EmojiId::new(41771983429993937),
                name: Some("crab".to_string()),
            })
        );
        assert_eq!(
            decode(&json!({"emoji_id": null, "emoji_name": "\u{1f980}"})),
            Some(EmojiRef::Unicode("\u{1f980}".to_string()))
        );
        assert_eq!(decode(&json!({"emoji_id": null, "emoji_name": null})), None);
        assert_eq!(decode(&json!({})), None);
    }

    #[test]
    fn tag_serialisation_flattens_emoji() {
        let tag = ForumTag::from_payload(
            &Payload::new(&json!({
                "id": "5",
                "name": "bug",
                "moderated": true,
                "emoji_id": null,
                "emoji_name": "\u{1f41b}",
            }))
            .unwrap(),
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&tag).unwrap(),
            json!({
                "name": "bug",
                "moderated": true,
                "emoji_id": null,
                "emoji_name": "\u{1f41b}",
            })
        );
    }
}
