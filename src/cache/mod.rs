//! A cache of the guilds, users and private channels the current user knows about.
//!
//! Guilds own the caches of their channels, members and roles, see [`Guild`]. The [`Cache`]
//! itself only maps guild Ids to guilds, which is what decides whether an entity is built
//! _attached_ to a live guild or _detached_ from it.
//!
//! Unlike most caches, lookups hand out [`Shared`] handles rather than clones: an entity keeps
//! its identity for as long as it stays cached, and every holder of a handle observes the
//! updates made when fresher data arrives.

mod settings;
mod snowflake;

use std::fmt;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use fxhash::FxBuildHasher;
use tracing::debug;

pub use self::settings::Settings;
pub use self::snowflake::{Comparator, SnowflakeCache};
use crate::internal::prelude::*;
use crate::model::channel::PrivateChannel;
use crate::model::guild::Guild;
use crate::model::id::{ChannelId, GuildId, UserId};
use crate::model::user::User;
use crate::model::Shared;

/// Looks up live guilds by Id.
///
/// The [`EntityBuilder`] asks its resolver for the guild of every entity it builds: a resolved
/// guild gets the entity attached to its caches, an unresolved one gets a detached entity.
///
/// [`EntityBuilder`]: crate::builder::EntityBuilder
pub trait GuildResolver: Send + Sync {
    fn resolve_guild(&self, id: GuildId) -> Option<Arc<Guild>>;
}

/// The process-wide cache.
#[non_exhaustive]
pub struct Cache {
    guilds: DashMap<GuildId, Arc<Guild>, FxBuildHasher>,
    users: DashMap<UserId, Shared<User>, FxBuildHasher>,
    private_channels: SnowflakeCache<ChannelId, PrivateChannel>,
    current_user: RwLock<Option<User>>,
    settings: RwLock<Settings>,
}

impl Cache {
    /// Creates a new cache.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new cache instance with settings applied.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use discord_entities::cache::{Cache, Settings};
    ///
    /// let mut settings = Settings::default();
    /// settings.cache_members = false;
    ///
    /// let cache = Cache::new_with_settings(settings);
    /// assert!(!cache.settings().cache_members);
    /// ```
    #[must_use]
    pub fn new_with_settings(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
            ..Default::default()
        }
    }

    /// Returns a copy of the settings of the cache.
    #[must_use]
    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    /// Replaces the settings of the cache. Entities built before the change are not affected.
    pub fn set_settings(&self, settings: Settings) {
        *self.settings.write() = settings;
    }

    /// Stores a guild, making it live: entities built for it from now on are attached to it.
    ///
    /// A guild already stored under the same Id is replaced, and entities attached to it become
    /// unable to reach a live guild.
    pub fn insert_guild(&self, guild: Guild) -> Arc<Guild> {
        let guild = Arc::new(guild);
        if self.guilds.insert(guild.id, Arc::clone(&guild)).is_some() {
            debug!("Replaced cached guild {}", guild.id);
        }
        guild
    }

    /// Returns the guild stored under `id`, storing the one made by `create` if there is none.
    ///
    /// The lookup and the insertion are atomic, so concurrent callers for one Id all receive the
    /// same guild.
    pub fn get_or_insert_guild(&self, id: GuildId, create: impl FnOnce() -> Guild) -> Arc<Guild> {
        let entry = self.guilds.entry(id).or_insert_with(|| Arc::new(create()));
        Arc::clone(entry.value())
    }

    /// Removes a guild. Entities attached to it fail with [`ModelError::GuildNotFound`] once
    /// the last handle to the guild is dropped.
    ///
    /// [`ModelError::GuildNotFound`]: crate::model::ModelError::GuildNotFound
    pub fn remove_guild(&self, id: GuildId) -> Option<Arc<Guild>> {
        self.guilds.remove(&id).map(|(_, guild)| guild)
    }

    #[must_use]
    pub fn guild(&self, id: GuildId) -> Option<Arc<Guild>> {
        self.guilds.get(&id).map(|guild| Arc::clone(guild.value()))
    }

    /// The Ids of all cached guilds.
    #[must_use]
    pub fn guilds(&self) -> Vec<GuildId> {
        self.guilds.iter().map(|entry| *entry.key()).collect()
    }

    #[must_use]
    pub fn guild_count(&self) -> usize {
        self.guilds.len()
    }

    /// Retrieves a user from the cache's users map.
    #[must_use]
    pub fn user(&self, id: UserId) -> Option<Shared<User>> {
        self.users.get(&id).map(|user| Shared::clone(user.value()))
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Stores a user, updating the cached user with the same Id in place. Does nothing when
    /// [`Settings::cache_users`] is disabled.
    pub(crate) fn update_user(&self, user: &User) {
        if !self.settings.read().cache_users {
            return;
        }

        let existing = match self.users.entry(user.id) {
            Entry::Occupied(entry) => Shared::clone(entry.get()),
            Entry::Vacant(entry) => {
                entry.insert(crate::model::shared(user.clone()));
                return;
            },
        };

        // The map's shard lock is released before the user is written.
        *existing.write() = user.clone();
    }

    /// The private channels the current user has open.
    #[must_use]
    pub fn private_channels(&self) -> &SnowflakeCache<ChannelId, PrivateChannel> {
        &self.private_channels
    }

    #[must_use]
    pub fn private_channel(&self, id: ChannelId) -> Option<Shared<PrivateChannel>> {
        self.private_channels.get(&id)
    }

    /// The user the library is acting as, if it has been set.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.current_user.read().clone()
    }

    pub fn set_current_user(&self, user: User) {
        *self.current_user.write() = Some(user);
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            guilds: DashMap::default(),
            users: DashMap::default(),
            private_channels: SnowflakeCache::new(),
            current_user: RwLock::new(None),
            settings: RwLock::new(Settings::default()),
        }
    }
}

impl GuildResolver for Cache {
    fn resolve_guild(&self, id: GuildId) -> Option<Arc<Guild>> {
        self.guild(id)
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("guilds", &self.guilds.len())
            .field("users", &self.users.len())
            .field("private_channels", &self.private_channels.len())
            .field("settings", &*self.settings.read())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guild_lifecycle() {
        let cache = Cache::new();
        let guild = cache.insert_guild(Guild::new(GuildId::new(1), "crabs", UserId::new(2)));

        let resolved = cache.resolve_guild(GuildId::new(1)).unwrap();
        assert!(Arc::ptr_eq(&guild, &resolved));
        assert_eq!(cache.guilds(), vec![GuildId::new(1)]);

        assert!(cache.remove_guild(GuildId::new(1)).is_some());
        assert!(cache.resolve_guild(GuildId::new(1)).is_none());
    }

    #[test]
    fn get_or_insert_guild_keeps_the_first_guild() {
        let cache = Cache::new();
        let first = cache.get_or_insert_guild(GuildId::new(1), || {
            Guild::new(GuildId::new(1), "crabs", UserId::new(2))
        });
        let second = cache.get_or_insert_guild(GuildId::new(1), || {
            Guild::new(GuildId::new(1), "lobsters", UserId::new(2))
        });

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.name(), "crabs");
        assert_eq!(cache.guild_count(), 1);
    }

    #[test]
    fn users_update_in_place() {
        let cache = Cache::new();
        cache.update_user(&User::new(UserId::new(5), "old"));
        let handle = cache.user(UserId::new(5)).unwrap();

        cache.update_user(&User::new(UserId::new(5), "new"));
        assert_eq!(handle.read().name, "new");
        assert_eq!(cache.user_count(), 1);
    }

    #[test]
    fn users_are_not_cached_when_disabled() {
        let mut settings = Settings::default();
        settings.cache_users = false;

        let cache = Cache::new_with_settings(settings);
        cache.update_user(&User::new(UserId::new(5), "crab"));
        assert!(cache.user(UserId::new(5)).is_none());
    }
}
