//! Mappings of objects received from the API, and the caches that own them.
//!
//! Entities that belong to a guild carry a [`GuildRef`] telling whether that guild was live in
//! the [`Cache`] when the entity was built. Operations that need the live guild (listing the
//! members able to see a channel, reading permission overwrites, copying a channel) return
//! [`ModelError::DetachedEntity`] for entities built without one.
//!
//! [`Cache`]: crate::cache::Cache

pub mod channel;
pub mod guild;
pub mod id;
pub mod overlay;
pub mod permissions;
pub mod prelude;
pub mod user;

mod error;
mod timestamp;

pub use self::error::Error as ModelError;
pub use self::permissions::Permissions;
pub use self::timestamp::{InvalidTimestamp, Timestamp};

/// A shared, lock-protected handle to an entity.
///
/// Cached entities are handed out as `Shared` so that every holder observes updates made when
/// fresher data for the same id arrives. Writers replace all fields under a single write lock.
pub type Shared<T> = std::sync::Arc<parking_lot::RwLock<T>>;

/// Wraps a value into a fresh [`Shared`] handle.
pub(crate) fn shared<T>(value: T) -> Shared<T> {
    std::sync::Arc::new(parking_lot::RwLock::new(value))
}
