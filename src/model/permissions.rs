//! A set of permissions for a role or user. These can be assigned directly to a role or as a
//! channel's permission overrides.
//!
//! For convenience, methods for each permission are available, which can be used to test if the
//! set of permissions contains a single permission. This can simplify code and reduce a potential
//! import.
//!
//! Permissions follow a hierarchy:
//! - An account can grant roles to users that are of a lower position than its highest role;
//! - An account can edit roles lesser than its highest role, but can only grant permissions they
//!   have;
//! - An account can move only roles lesser than its highest role;
//! - An account can only kick/ban accounts with a lesser role than its top role.

use std::fmt;

use serde::de::{Deserialize, Deserializer, Error as DeError, Visitor};
use serde::ser::{Serialize, Serializer};

/// This macro generates the `Permissions::get_permission_names` method and the single-flag
/// shorthand checks.
///
/// It is invoked by passing the names of all methods used to check for permissions along with
/// their flag and their names displayed inside Discord.
macro_rules! generate_permission_names {
    {$ ($perm:ident, $flag:ident: $name:expr),* $(,)?} => {
        impl Permissions {
            /// Returns a list of names of all contained permissions.
            #[must_use]
            pub fn get_permission_names(self) -> Vec<&'static str> {
                let mut names = Vec::new();

                $(
                    if self.$perm() {
                        names.push($name);
                    }
                )*

                names
            }

            $(
                #[doc = concat!("Shorthand for checking that the set of permissions contains the [", $name, "] permission.")]
                #[doc = ""]
                #[doc = concat!("[", $name, "]: Self::", stringify!($flag))]
                #[must_use]
                pub fn $perm(self) -> bool {
                    self.contains(Self::$flag)
                }
            )*
        }
    }
}

/// Permissions which apply only to voice channels and are dropped for text-only channels when
/// computing effective permissions.
pub const PRESET_VOICE_ONLY: Permissions = Permissions::from_bits_truncate(
    Permissions::CONNECT.bits()
        | Permissions::SPEAK.bits()
        | Permissions::MUTE_MEMBERS.bits()
        | Permissions::DEAFEN_MEMBERS.bits()
        | Permissions::MOVE_MEMBERS.bits()
        | Permissions::USE_VAD.bits()
        | Permissions::PRIORITY_SPEAKER.bits()
        | Permissions::STREAM.bits()
        | Permissions::REQUEST_TO_SPEAK.bits(),
);

/// Permissions which only make sense together with [Send Messages].
///
/// [Send Messages]: Permissions::SEND_MESSAGES
pub const PRESET_SEND_DEPENDENT: Permissions = Permissions::from_bits_truncate(
    Permissions::SEND_TTS_MESSAGES.bits()
        | Permissions::MENTION_EVERYONE.bits()
        | Permissions::EMBED_LINKS.bits()
        | Permissions::ATTACH_FILES.bits(),
);

/// Permissions which are granted at guild level and survive losing [View Channel].
///
/// [View Channel]: Permissions::VIEW_CHANNEL
pub const PRESET_GUILD_LEVEL: Permissions = Permissions::from_bits_truncate(
    Permissions::KICK_MEMBERS.bits()
        | Permissions::BAN_MEMBERS.bits()
        | Permissions::ADMINISTRATOR.bits()
        | Permissions::MANAGE_GUILD.bits()
        | Permissions::CHANGE_NICKNAME.bits()
        | Permissions::MANAGE_NICKNAMES.bits(),
);

bitflags::bitflags! {
    /// A set of permissions that can be assigned to [`User`]s and [`Role`]s via
    /// [`PermissionOverwrite`]s, roles globally in a [`Guild`], and to [`GuildChannel`]s.
    ///
    /// [Discord docs](https://discord.com/developers/docs/topics/permissions#permissions-bitwise-permission-flags).
    ///
    /// [`Guild`]: super::guild::Guild
    /// [`GuildChannel`]: super::channel::GuildChannel
    /// [`PermissionOverwrite`]: super::channel::PermissionOverwrite
    /// [`Role`]: super::guild::Role
    /// [`User`]: super::user::User
    #[derive(Copy, PartialEq, Eq, Clone, PartialOrd, Ord, Hash, Debug, Default)]
    pub struct Permissions: u64 {
        /// Allows for the creation of invites.
        const CREATE_INSTANT_INVITE = 1 << 0;
        /// Allows for the kicking of guild members.
        const KICK_MEMBERS = 1 << 1;
        /// Allows the banning of guild members.
        const BAN_MEMBERS = 1 << 2;
        /// Allows all permissions, bypassing channel permission overwrites.
        const ADMINISTRATOR = 1 << 3;
        /// Allows management and editing of guild channels.
        const MANAGE_CHANNELS = 1 << 4;
        /// Allows management and editing of the guild.
        const MANAGE_GUILD = 1 << 5;
        /// Members with this permission can add new reactions to a message.
        const ADD_REACTIONS = 1 << 6;
        /// Allows viewing a guild's audit logs.
        const VIEW_AUDIT_LOG = 1 << 7;
        /// Allows the use of priority speaking in voice channels.
        const PRIORITY_SPEAKER = 1 << 8;
        /// Allows the user to go live.
        const STREAM = 1 << 9;
        /// Allows guild members to view a channel, which includes reading messages in text
        /// channels and joining voice channels.
        const VIEW_CHANNEL = 1 << 10;
        /// Allows sending messages in a guild channel.
        const SEND_MESSAGES = 1 << 11;
        /// Allows the sending of text-to-speech messages in a channel.
        const SEND_TTS_MESSAGES = 1 << 12;
        /// Allows the deleting of other messages in a guild channel.
        const MANAGE_MESSAGES = 1 << 13;
        /// Allows links from this user - or users of this role - to be embedded.
        const EMBED_LINKS = 1 << 14;
        /// Allows uploading of files.
        const ATTACH_FILES = 1 << 15;
        /// Allows the reading of a channel's message history.
        const READ_MESSAGE_HISTORY = 1 << 16;
        /// Allows the usage of the `@everyone` and `@here` mentions.
        const MENTION_EVERYONE = 1 << 17;
        /// Allows the usage of custom emojis from other guilds.
        const USE_EXTERNAL_EMOJIS = 1 << 18;
        /// Allows for viewing guild insights.
        const VIEW_GUILD_INSIGHTS = 1 << 19;
        /// Allows the joining of a voice channel.
        const CONNECT = 1 << 20;
        /// Allows the user to speak in a voice channel.
        const SPEAK = 1 << 21;
        /// Allows the muting of members in a voice channel.
        const MUTE_MEMBERS = 1 << 22;
        /// Allows the deafening of members in a voice channel.
        const DEAFEN_MEMBERS = 1 << 23;
        /// Allows the moving of members from one voice channel to another.
        const MOVE_MEMBERS = 1 << 24;
        /// Allows the usage of voice-activity-detection in a voice channel.
        const USE_VAD = 1 << 25;
        /// Allows members to change their own nickname in the guild.
        const CHANGE_NICKNAME = 1 << 26;
        /// Allows members to change other members' nicknames.
        const MANAGE_NICKNAMES = 1 << 27;
        /// Allows management and editing of roles below their own.
        const MANAGE_ROLES = 1 << 28;
        /// Allows management of webhooks.
        const MANAGE_WEBHOOKS = 1 << 29;
        /// Allows management of emojis and stickers.
        const MANAGE_GUILD_EXPRESSIONS = 1 << 30;
        /// Allows using slash commands.
        const USE_APPLICATION_COMMANDS = 1 << 31;
        /// Allows for requesting to speak in stage channels.
        const REQUEST_TO_SPEAK = 1 << 32;
        /// Allows for creating, editing, and deleting scheduled events.
        const MANAGE_EVENTS = 1 << 33;
        /// Allows for deleting and archiving threads, and viewing all private threads.
        const MANAGE_THREADS = 1 << 34;
        /// Allows for creating public and announcement threads.
        const CREATE_PUBLIC_THREADS = 1 << 35;
        /// Allows for creating private threads.
        const CREATE_PRIVATE_THREADS = 1 << 36;
        /// Allows the usage of custom stickers from other servers.
        const USE_EXTERNAL_STICKERS = 1 << 37;
        /// Allows for sending messages in threads.
        const SEND_MESSAGES_IN_THREADS = 1 << 38;
        /// Allows for using Activities (applications with the EMBEDDED flag) in a voice channel.
        const USE_EMBEDDED_ACTIVITIES = 1 << 39;
        /// Allows for timing out users to prevent them from sending or reacting to messages in
        /// chat and threads, and from speaking in voice and stage channels.
        const MODERATE_MEMBERS = 1 << 40;
    }
}

generate_permission_names! {
    add_reactions, ADD_REACTIONS: "Add Reactions",
    administrator, ADMINISTRATOR: "Administrator",
    attach_files, ATTACH_FILES: "Attach Files",
    ban_members, BAN_MEMBERS: "Ban Members",
    change_nickname, CHANGE_NICKNAME: "Change Nickname",
    connect, CONNECT: "Connect",
    create_instant_invite, CREATE_INSTANT_INVITE: "Create Invites",
    create_private_threads, CREATE_PRIVATE_THREADS: "Create Private Threads",
    create_public_threads, CREATE_PUBLIC_THREADS: "Create Public Threads",
    deafen_members, DEAFEN_MEMBERS: "Deafen Members",
    embed_links, EMBED_LINKS: "Embed Links",
    kick_members, KICK_MEMBERS: "Kick Members",
    manage_channels, MANAGE_CHANNELS: "Manage Channels",
    manage_events, MANAGE_EVENTS: "Manage Events",
    manage_guild, MANAGE_GUILD: "Manage Guilds",
    manage_guild_expressions, MANAGE_GUILD_EXPRESSIONS: "Manage Guild Expressions",
    manage_messages, MANAGE_MESSAGES: "Manage Messages",
    manage_nicknames, MANAGE_NICKNAMES: "Manage Nicknames",
    manage_roles, MANAGE_ROLES: "Manage Roles",
    manage_threads, MANAGE_THREADS: "Manage Threads",
    manage_webhooks, MANAGE_WEBHOOKS: "Manage Webhooks",
    mention_everyone, MENTION_EVERYONE: "Mention Everyone",
    moderate_members, MODERATE_MEMBERS: "Moderate Members",
    move_members, MOVE_MEMBERS: "Move Members",
    mute_members, MUTE_MEMBERS: "Mute Members",
    priority_speaker, PRIORITY_SPEAKER: "Priority Speaker",
    read_message_history, READ_MESSAGE_HISTORY: "Read Message History",
    request_to_speak, REQUEST_TO_SPEAK: "Request To Speak",
    send_messages, SEND_MESSAGES: "Send Messages",
    send_messages_in_threads, SEND_MESSAGES_IN_THREADS: "Send Messages in Threads",
    send_tts_messages, SEND_TTS_MESSAGES: "Send TTS Messages",
    speak, SPEAK: "Speak",
    stream, STREAM: "Stream",
    use_application_commands, USE_APPLICATION_COMMANDS: "Use Application Commands",
    use_embedded_activities, USE_EMBEDDED_ACTIVITIES: "Use Embedded Activities",
    use_external_emojis, USE_EXTERNAL_EMOJIS: "Use External Emojis",
    use_external_stickers, USE_EXTERNAL_STICKERS: "Use External Stickers",
    use_vad, USE_VAD: "Use Voice Activity",
    view_audit_log, VIEW_AUDIT_LOG: "View Audit Log",
    view_channel, VIEW_CHANNEL: "View Channel",
    view_guild_insights, VIEW_GUILD_INSIGHTS: "View Guild Insights",
}

impl Permissions {
    /// Builds a permission set from raw bits, keeping bits this library does not know about yet.
    #[must_use]
    pub const fn from_raw(bits: u64) -> Self {
        Self::from_bits_retain(bits)
    }
}

// Manual impl needed because Discord sends permissions as a string.
impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StrOrInt;

        impl<'de> Visitor<'de> for StrOrInt {
            type Value = u64;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a permission bitset as a string or integer")
            }

            fn visit_u64<E: DeError>(self, value: u64) -> Result<u64, E> {
                Ok(value)
            }

            fn visit_str<E: DeError>(self, value: &str) -> Result<u64, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(StrOrInt).map(Permissions::from_raw)
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.bits())
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.get_permission_names();

        let total = names.len();
        for (i, &name) in names.iter().enumerate() {
            if i > 0 && i != total - 1 {
                f.write_str(", ")?;
            }

            if total > 1 && i == total - 1 {
                f.write_str(" and ")?;
            }

            f.write_str(name)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_names() {
        let perms = Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::SPEAK;
        assert_eq!(perms.to_string(), "Send Messages, Speak and View Channel");
    }

    #[test]
    fn unknown_bits_are_retained() {
        let raw = (1 << 60) | Permissions::VIEW_CHANNEL.bits();
        let perms: Permissions = serde_json::from_str(&format!("\"{raw}\"")).unwrap();
        assert_eq!(perms.bits(), raw);
        assert!(perms.view_channel());
    }
}
