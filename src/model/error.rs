//! Error enum definition wrapping potential model implementation errors.

use std::error::Error as StdError;
use std::fmt;

use super::Permissions;

/// An error returned from the [`model`] module.
///
/// This is always wrapped within the library's [`Error::Model`] variant.
///
/// # Examples
///
/// Telling a detached entity apart from a missing permission, so that the caller can fetch a
/// live entity and retry in the first case only:
///
/// ```rust
/// use discord_entities::model::ModelError;
/// use discord_entities::Error;
///
/// fn should_refetch(why: &Error) -> bool {
///     matches!(why, Error::Model(ModelError::DetachedEntity))
/// }
///
/// assert!(should_refetch(&Error::Model(ModelError::DetachedEntity)));
/// assert!(!should_refetch(&Error::Model(ModelError::GuildNotFound)));
/// ```
///
/// [`Error`]: crate::Error
/// [`Error::Model`]: crate::Error::Model
/// [`model`]: crate::model
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// An indication that a [`Guild`] could not be found by [Id][`GuildId`] in the [`Cache`].
    ///
    /// [`Guild`]: super::guild::Guild
    /// [`GuildId`]: super::id::GuildId
    /// [`Cache`]: crate::cache::Cache
    GuildNotFound,
    /// Indicates that you do not have the required permissions to perform an operation.
    InvalidPermissions {
        /// Which permissions were required for the operation
        required: Permissions,
        /// Which permissions the bot had
        present: Permissions,
    },
    /// An indicator that the [`ChannelType`] cannot perform an action.
    ///
    /// [`ChannelType`]: super::channel::ChannelType
    InvalidChannelType,
    /// The entity was built while its guild was not cached, so operations requiring the live
    /// guild are unavailable on it. Fetching a live entity and retrying may succeed.
    DetachedEntity,
    /// The current user has not been stored in the [`Cache`] yet.
    ///
    /// [`Cache`]: crate::cache::Cache
    CurrentUserMissing,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GuildNotFound => f.write_str("Guild not found in the cache."),
            Self::InvalidPermissions {
                required,
                present,
            } => write!(f, "Insufficient permissions: required {required}, present {present}."),
            Self::InvalidChannelType => f.write_str("The channel cannot perform the action."),
            Self::DetachedEntity => {
                f.write_str("The operation is unavailable outside a live guild context.")
            },
            Self::CurrentUserMissing => f.write_str("The current user is not cached."),
        }
    }
}

impl StdError for Error {}
