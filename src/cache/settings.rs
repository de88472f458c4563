/// Settings for the cache.
///
/// # Examples
///
/// Create new settings, disabling the member cache:
///
/// ```rust
/// use discord_entities::cache::Settings as CacheSettings;
///
/// let mut settings = CacheSettings::default();
/// settings.cache_members = false;
/// ```
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Settings {
    /// Whether to keep the users seen in payloads in the process-wide user map.
    ///
    /// Defaults to true.
    pub cache_users: bool,
    /// Whether members built for a cached guild are stored in that guild's member cache. When
    /// disabled, attached member builds return fresh objects that are never cached.
    ///
    /// Defaults to true.
    pub cache_members: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_users: true,
            cache_members: true,
        }
    }
}
