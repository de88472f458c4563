//! A collection of newtypes defining type-strong IDs.

use std::fmt;
use std::num::NonZeroU64;

use serde::de::{Error as DeError, Visitor};
use serde::{Deserializer, Serializer};

use super::Timestamp;

macro_rules! id_u64 {
    ($($name:ident;)*) => {
        $(
            impl $name {
                /// Creates a new Id from a u64
                ///
                /// # Panics
                /// Panics if `id` is zero.
                #[inline]
                #[must_use]
                #[track_caller]
                pub const fn new(id: u64) -> Self {
                    match NonZeroU64::new(id) {
                        Some(inner) => Self(inner),
                        None => panic!(concat!("Attempted to call ", stringify!($name), "::new with invalid (0) value")),
                    }
                }

                /// Creates a new Id, returning `None` for the invalid value zero.
                #[inline]
                #[must_use]
                pub const fn try_new(id: u64) -> Option<Self> {
                    match NonZeroU64::new(id) {
                        Some(inner) => Some(Self(inner)),
                        None => None,
                    }
                }

                /// Retrieves the inner `id` as a [`u64`].
                #[inline]
                #[must_use]
                pub const fn get(self) -> u64 {
                    self.0.get()
                }

                #[doc = concat!("Retrieves the time that the ", stringify!($name), " was created.")]
                #[must_use]
                pub fn created_at(&self) -> Timestamp {
                    Timestamp::from_discord_id(self.get())
                }
            }

            impl From<u64> for $name {
                fn from(id: u64) -> $name {
                    $name::new(id)
                }
            }

            impl From<NonZeroU64> for $name {
                fn from(id: NonZeroU64) -> $name {
                    $name(id)
                }
            }

            impl PartialEq<u64> for $name {
                fn eq(&self, u: &u64) -> bool {
                    self.get() == *u
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Display::fmt(&self.0, f)
                }
            }

            impl From<$name> for NonZeroU64 {
                fn from(id: $name) -> NonZeroU64 {
                    id.0
                }
            }

            impl From<$name> for u64 {
                fn from(id: $name) -> u64 {
                    id.get()
                }
            }

            impl serde::Serialize for $name {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(&self.0)
                }
            }

            impl<'de> serde::Deserialize<'de> for $name {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    deserializer.deserialize_any(SnowflakeVisitor).map(Self)
                }
            }
        )*
    }
}

/// An identifier for a Channel
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ChannelId(NonZeroU64);

/// An identifier for an Emoji
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct EmojiId(NonZeroU64);

/// An identifier for a forum tag.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ForumTagId(NonZeroU64);

/// An identifier for a Guild
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct GuildId(NonZeroU64);

/// An identifier for a Message
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct MessageId(NonZeroU64);

/// An identifier for a Role
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct RoleId(NonZeroU64);

/// An identifier for a User
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct UserId(NonZeroU64);

id_u64! {
    ChannelId;
    EmojiId;
    ForumTagId;
    GuildId;
    MessageId;
    RoleId;
    UserId;
}

impl GuildId {
    /// The Id of the guild's `@everyone` role, which shares the guild's Id.
    #[must_use]
    pub fn everyone_role(self) -> RoleId {
        RoleId(self.0)
    }
}

/// Accepts snowflakes sent either as strings (as Discord does) or as integers.
struct SnowflakeVisitor;

impl<'de> Visitor<'de> for SnowflakeVisitor {
    type Value = NonZeroU64;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a non-zero snowflake, as a string or integer")
    }

    fn visit_u64<E: DeError>(self, value: u64) -> Result<Self::Value, E> {
        NonZeroU64::new(value).ok_or_else(|| E::custom("invalid value, expected non-zero"))
    }

    fn visit_i64<E: DeError>(self, value: i64) -> Result<Self::Value, E> {
        let value = u64::try_from(value).map_err(|_| E::custom("snowflake is negative"))?;
        self.visit_u64(value)
    }

    fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
        value.parse().map_err(E::custom)
    }
}
