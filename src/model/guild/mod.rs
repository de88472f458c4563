//! Models relating to guilds and types that it owns.

mod member;
mod role;

use std::fmt;

use parking_lot::MutexGuard;
use tracing::warn;

pub use self::member::Member;
pub use self::role::Role;
use crate::cache::SnowflakeCache;
use crate::internal::prelude::*;
use crate::model::channel::{GuildChannel, PermissionOverwriteType};
use crate::model::id::{ChannelId, GuildId, RoleId, UserId};
use crate::model::permissions::{PRESET_GUILD_LEVEL, PRESET_SEND_DEPENDENT, PRESET_VOICE_ONLY};
use crate::model::{ModelError, Permissions, Shared};

/// A reference from an entity to the guild that owns it.
///
/// Entities built while their guild was cached hold a [`Self::Resolved`] reference and can reach
/// the guild's caches. Entities built before that hold [`Self::Unresolved`] and are _detached_:
/// every operation that needs the live guild fails with [`ModelError::DetachedEntity`] on them.
#[derive(Clone)]
pub enum GuildRef {
    /// The guild was cached when the entity was built.
    Resolved {
        id: GuildId,
        /// The guild is owned by the [`Cache`], so entities only keep a weak reference.
        ///
        /// [`Cache`]: crate::cache::Cache
        guild: Weak<Guild>,
    },
    /// Only the Id of the guild is known.
    Unresolved(GuildId),
}

impl GuildRef {
    pub(crate) fn resolved(guild: &Arc<Guild>) -> Self {
        Self::Resolved {
            id: guild.id,
            guild: Arc::downgrade(guild),
        }
    }

    #[must_use]
    pub fn id(&self) -> GuildId {
        match self {
            Self::Resolved {
                id, ..
            }
            | Self::Unresolved(id) => *id,
        }
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        matches!(self, Self::Unresolved(_))
    }

    /// Returns the live guild.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DetachedEntity`] for an unresolved reference, and
    /// [`ModelError::GuildNotFound`] if the guild has since been dropped from the cache.
    pub fn live(&self) -> Result<Arc<Guild>> {
        match self {
            Self::Resolved {
                guild, ..
            } => guild.upgrade().ok_or(Error::Model(ModelError::GuildNotFound)),
            Self::Unresolved(_) => Err(Error::Model(ModelError::DetachedEntity)),
        }
    }
}

impl fmt::Debug for GuildRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved {
                id, ..
            } => f.debug_tuple("Resolved").field(id).finish(),
            Self::Unresolved(id) => f.debug_tuple("Unresolved").field(id).finish(),
        }
    }
}

impl PartialEq for GuildRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id() && self.is_detached() == other.is_detached()
    }
}

#[derive(Clone, Debug)]
struct GuildInfo {
    name: String,
    owner_id: UserId,
    icon: Option<String>,
}

/// A guild, owning the caches of its channels, members and roles.
///
/// Guilds are shared through the [`Cache`] as `Arc<Guild>`. Builds for one guild are serialised
/// by a writer lock the guild owns, so two payloads for the same entity racing each other cannot
/// create two objects. Builds for different guilds do not contend.
///
/// [`Cache`]: crate::cache::Cache
pub struct Guild {
    /// The unique Id identifying the guild.
    ///
    /// This is equivalent to the Id of the default role (`@everyone`).
    pub id: GuildId,
    info: RwLock<GuildInfo>,
    channels: SnowflakeCache<ChannelId, GuildChannel>,
    members: SnowflakeCache<UserId, Member>,
    roles: SnowflakeCache<RoleId, Role>,
    writer: Mutex<()>,
}

impl Guild {
    #[must_use]
    pub fn new(id: GuildId, name: impl Into<String>, owner_id: UserId) -> Self {
        Self {
            id,
            info: RwLock::new(GuildInfo {
                name: name.into(),
                owner_id,
                icon: None,
            }),
            channels: SnowflakeCache::sorted(GuildChannel::positional),
            members: SnowflakeCache::new(),
            roles: SnowflakeCache::sorted(Role::hierarchy),
            writer: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.info.read().name.clone()
    }

    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.info.read().owner_id
    }

    #[must_use]
    pub fn icon(&self) -> Option<String> {
        self.info.read().icon.clone()
    }

    pub(crate) fn update_info(&self, name: String, owner_id: UserId, icon: Option<String>) {
        *self.info.write() = GuildInfo {
            name,
            owner_id,
            icon,
        };
    }

    /// The guild's channels, ordered by position.
    #[must_use]
    pub fn channels(&self) -> &SnowflakeCache<ChannelId, GuildChannel> {
        &self.channels
    }

    /// The guild's members, keyed by user Id.
    #[must_use]
    pub fn members(&self) -> &SnowflakeCache<UserId, Member> {
        &self.members
    }

    /// The guild's roles, from the top of the hierarchy down.
    #[must_use]
    pub fn roles(&self) -> &SnowflakeCache<RoleId, Role> {
        &self.roles
    }

    #[must_use]
    pub fn channel(&self, id: ChannelId) -> Option<Shared<GuildChannel>> {
        self.channels.get(&id)
    }

    #[must_use]
    pub fn member(&self, user_id: UserId) -> Option<Shared<Member>> {
        self.members.get(&user_id)
    }

    #[must_use]
    pub fn role(&self, id: RoleId) -> Option<Shared<Role>> {
        self.roles.get(&id)
    }

    /// The `@everyone` role, if it has been cached.
    #[must_use]
    pub fn everyone_role(&self) -> Option<Shared<Role>> {
        self.roles.get(&self.id.everyone_role())
    }

    /// Acquires the guild's writer lock. Every build touching this guild's caches holds it.
    pub(crate) fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock()
    }

    /// Calculates a user's guild-level permissions, ignoring channel overwrites.
    ///
    /// The owner has every permission. Everyone else starts from the `@everyone` role and gains
    /// the permissions of each of their roles; [Administrator] grants every permission.
    ///
    /// [Administrator]: Permissions::ADMINISTRATOR
    #[must_use]
    pub fn member_permissions(&self, user_id: UserId) -> Permissions {
        if user_id == self.owner_id() {
            return Permissions::all();
        }

        let roles = self.member_roles(user_id);
        self.base_permissions(user_id, &roles)
    }

    /// Calculates a user's permissions in a channel of this guild.
    ///
    /// Channel overwrites are applied on top of the guild-level permissions: first the
    /// `@everyone` overwrite, then the overwrites of the user's roles combined, then the user's
    /// own overwrite, each removing its denied bits before adding its allowed bits.
    ///
    /// Afterwards, text-only channels drop voice permissions, lacking [Send Messages] drops the
    /// permissions that depend on it, and lacking [View Channel] drops everything but
    /// guild-level permissions.
    ///
    /// [Send Messages]: Permissions::SEND_MESSAGES
    /// [View Channel]: Permissions::VIEW_CHANNEL
    #[must_use]
    pub fn user_permissions_in(&self, channel: &GuildChannel, user_id: UserId) -> Permissions {
        let roles = self.member_roles(user_id);
        self.permissions_with_roles(channel, user_id, &roles)
    }

    /// Like [`Self::user_permissions_in`], with the user's roles given by the caller rather than
    /// read from the member cache.
    pub(crate) fn permissions_with_roles(
        &self,
        channel: &GuildChannel,
        user_id: UserId,
        roles: &[RoleId],
    ) -> Permissions {
        if user_id == self.owner_id() {
            return Permissions::all();
        }

        let mut permissions = self.base_permissions(user_id, roles);

        if permissions.contains(Permissions::ADMINISTRATOR) {
            return Permissions::all();
        }

        let everyone = self.id.everyone_role();
        let mut role_allow = Permissions::empty();
        let mut role_deny = Permissions::empty();
        let mut member_overwrite = None;

        for overwrite in &channel.permission_overwrites {
            match overwrite.kind {
                PermissionOverwriteType::Role(id) if id == everyone => {
                    permissions = (permissions & !overwrite.deny) | overwrite.allow;
                },
                PermissionOverwriteType::Role(id) if roles.contains(&id) => {
                    role_allow |= overwrite.allow;
                    role_deny |= overwrite.deny;
                },
                PermissionOverwriteType::Member(id) if id == user_id => {
                    member_overwrite = Some((overwrite.allow, overwrite.deny));
                },
                _ => {},
            }
        }

        permissions = (permissions & !role_deny) | role_allow;
        if let Some((allow, deny)) = member_overwrite {
            permissions = (permissions & !deny) | allow;
        }

        if !channel.kind().is_voice() {
            permissions &= !PRESET_VOICE_ONLY;
        }

        if !permissions.contains(Permissions::SEND_MESSAGES) {
            permissions &= !PRESET_SEND_DEPENDENT;
        }

        if !permissions.contains(Permissions::VIEW_CHANNEL) {
            permissions &= PRESET_GUILD_LEVEL;
        }

        permissions
    }

    fn member_roles(&self, user_id: UserId) -> Vec<RoleId> {
        self.members.get(&user_id).map(|m| m.read_recursive().roles.clone()).unwrap_or_default()
    }

    fn base_permissions(&self, user_id: UserId, roles: &[RoleId]) -> Permissions {
        let Some(everyone) = self.everyone_role() else {
            warn!("@everyone role missing in guild {}", self.id);
            return Permissions::empty();
        };

        let mut permissions = everyone.read_recursive().permissions;

        for id in roles {
            if let Some(role) = self.roles.get(id) {
                permissions |= role.read_recursive().permissions;
            } else {
                warn!("{} on {} has non-existent role {}", user_id, self.id, id);
            }
        }

        if permissions.contains(Permissions::ADMINISTRATOR) {
            return Permissions::all();
        }

        permissions
    }
}

impl fmt::Debug for Guild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guild")
            .field("id", &self.id)
            .field("name", &self.info.read().name)
            .field("channels", &self.channels.len())
            .field("members", &self.members.len())
            .field("roles", &self.roles.len())
            .finish_non_exhaustive()
    }
}
