//! User information-related models.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::NonZeroU16;

use super::id::UserId;
use super::Timestamp;

/// Information about a user.
///
/// [Discord docs](https://discord.com/developers/docs/resources/user#user-object).
#[derive(Clone, Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct User {
    /// The unique Id of the user. Can be used to calculate the account's creation date.
    pub id: UserId,
    /// The account's username.
    #[serde(rename = "username")]
    pub name: String,
    /// The account's discriminator to differentiate the user from others with the same
    /// [`Self::name`]. Users migrated to unique usernames have none.
    #[serde(default, with = "discriminator")]
    pub discriminator: Option<NonZeroU16>,
    /// The account's display name, if it is set.
    #[serde(default)]
    pub global_name: Option<String>,
    /// Optional avatar hash.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Indicator of whether the user is a bot.
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// Creates a user with only the required fields set.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            discriminator: None,
            global_name: None,
            avatar: None,
            bot: false,
        }
    }

    /// Returns the formatted URL of the user's icon, if one exists.
    ///
    /// This will produce a WEBP image URL, or GIF if the user has a GIF avatar.
    #[must_use]
    pub fn avatar_url(&self) -> Option<String> {
        self.avatar.as_ref().map(|hash| {
            let ext = if hash.starts_with("a_") { "gif" } else { "webp" };
            cdn!("/avatars/{}/{}.{}?size=1024", self.id, hash, ext)
        })
    }

    /// Returns the formatted URL to the user's default avatar URL.
    ///
    /// This will produce a PNG URL.
    #[must_use]
    pub fn default_avatar_url(&self) -> String {
        let index = match self.discriminator {
            Some(discriminator) => u64::from(discriminator.get() % 5),
            None => (self.id.get() >> 22) % 6,
        };
        cdn!("/embed/avatars/{}.png", index)
    }

    /// Retrieves the URL to the user's avatar, falling back to the default avatar if needed.
    #[must_use]
    pub fn face(&self) -> String {
        self.avatar_url().unwrap_or_else(|| self.default_avatar_url())
    }

    /// The name shown for the user: the global display name if set, else the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.name)
    }

    /// Returns the "tag" for the user, `name#discriminator` for users that still have a
    /// discriminator and the plain username otherwise.
    #[must_use]
    pub fn tag(&self) -> String {
        match self.discriminator {
            Some(discriminator) => format!("{}#{:04}", self.name, discriminator),
            None => self.name.clone(),
        }
    }

    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.id.created_at()
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        self.id.hash(hasher);
    }
}

impl fmt::Display for User {
    /// Formats a string which will mention the user.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<@{}>", self.id)
    }
}

/// Discriminators are sent as strings, with `"0"` for users without one.
mod discriminator {
    use std::num::NonZeroU16;

    use serde::de::{Deserialize, Deserializer, Error as DeError};
    use serde::ser::Serializer;

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NonZeroU16>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(raw) => raw.parse::<u16>().map(NonZeroU16::new).map_err(DeError::custom),
            None => Ok(None),
        }
    }

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<NonZeroU16>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.collect_str(&format_args!("{:04}", value.get())),
            None => serializer.serialize_str("0"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn discriminators() {
        let legacy: User = serde_json::from_value(json!({
            "id": "1",
            "username": "crab",
            "discriminator": "0042",
        }))
        .unwrap();
        assert_eq!(legacy.tag(), "crab#0042");

        let migrated: User = serde_json::from_value(json!({
            "id": "2",
            "username": "ferris",
            "discriminator": "0",
            "global_name": "Ferris",
        }))
        .unwrap();
        assert_eq!(migrated.discriminator, None);
        assert_eq!(migrated.tag(), "ferris");
        assert_eq!(migrated.display_name(), "Ferris");
        assert_eq!(serde_json::to_value(&migrated).unwrap()["discriminator"], "0");
    }

    #[test]
    fn avatar_urls() {
        let mut user = User::new(UserId::new(210), "crab");
        assert!(user.avatar_url().is_none());

        user.avatar = Some("a_abc".to_string());
        assert_eq!(
            user.face(),
            "https://cdn.discordapp.com/avatars/210/a_abc.gif?size=1024".to_string()
        );
    }
}
