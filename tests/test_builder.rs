use std::sync::Arc;

use discord_entities::builder::{EntityBuilder, InteractionEntityBuilder};
use discord_entities::cache::{Cache, Settings};
use discord_entities::model::prelude::*;
use discord_entities::Error;
use serde_json::{json, Value};

const GUILD: GuildId = GuildId::new(1);

fn cached_guild() -> (EntityBuilder, Arc<Guild>) {
    let cache = Arc::new(Cache::new());
    let guild = cache.insert_guild(Guild::new(GUILD, "crabs", UserId::new(2)));
    (EntityBuilder::new(cache), guild)
}

fn channel_payloads() -> Vec<(u8, Value)> {
    vec![
        (0, json!({"id": "10", "type": 0, "name": "text", "topic": "a"})),
        (5, json!({"id": "11", "type": 5, "name": "news", "topic": "a"})),
        (2, json!({"id": "12", "type": 2, "name": "voice", "bitrate": 8000})),
        (13, json!({"id": "13", "type": 13, "name": "stage", "bitrate": 8000})),
        (4, json!({"id": "14", "type": 4, "name": "category"})),
        (15, json!({"id": "15", "type": 15, "name": "forum", "topic": "a"})),
        (16, json!({"id": "16", "type": 16, "name": "media", "topic": "a"})),
        (11, json!({"id": "17", "type": 11, "name": "thread", "message_count": 1})),
    ]
}

#[test]
fn rebuilding_keeps_identity_for_every_kind() {
    let (builder, guild) = cached_guild();

    for (kind, payload) in channel_payloads() {
        let first = builder.build_guild_channel(GUILD, &payload).unwrap().unwrap();

        let mut updated = payload.clone();
        updated["name"] = json!(format!("renamed {kind}"));
        let second = builder.build_guild_channel(GUILD, &updated).unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second), "kind {kind}");
        assert_eq!(first.read().name, format!("renamed {kind}"));
        assert_eq!(first.read().raw_kind(), kind);
        assert!(!first.read().is_detached());
    }

    assert_eq!(guild.channels().len(), 8);
}

#[test]
fn detached_entities_are_never_cached() {
    let (builder, guild) = cached_guild();
    let other = GuildId::new(99);

    for (_, payload) in channel_payloads() {
        let channel = builder.build_guild_channel(other, &payload).unwrap().unwrap();
        let channel = channel.read();

        assert!(channel.is_detached());
        assert_eq!(channel.guild.id(), other);
        assert!(matches!(
            channel.permission_overwrites(),
            Err(Error::Model(ModelError::DetachedEntity))
        ));
        assert!(matches!(channel.members(), Err(Error::Model(ModelError::DetachedEntity))));
        assert!(matches!(channel.parent_category(), Err(Error::Model(ModelError::DetachedEntity))));
    }

    let member = builder
        .build_member(other, &json!({"user": {"id": "5", "username": "ferris"}, "roles": []}))
        .unwrap();
    assert!(member.read().is_detached());
    assert!(matches!(member.read().roles(), Err(Error::Model(ModelError::DetachedEntity))));

    let role = builder.build_role(other, &json!({"id": "6", "name": "mods"})).unwrap();
    assert!(role.read().is_detached());

    assert!(guild.channels().is_empty());
    assert!(guild.members().is_empty());
    assert!(guild.roles().is_empty());
}

#[test]
fn role_cache_replaces_by_id_and_sorts_by_position() {
    let (builder, guild) = cached_guild();

    builder.build_role(GUILD, &json!({"id": "1", "name": "@everyone", "position": 0})).unwrap();
    builder.build_role(GUILD, &json!({"id": "7", "name": "mods", "position": 2})).unwrap();
    builder.build_role(GUILD, &json!({"id": "8", "name": "admins", "position": 5})).unwrap();
    builder
        .build_role(GUILD, &json!({"id": "7", "name": "moderators", "position": 9, "color": 255}))
        .unwrap();

    assert_eq!(guild.roles().len(), 3);

    let mods = guild.role(RoleId::new(7)).unwrap();
    assert_eq!(mods.read().name, "moderators");
    assert_eq!(mods.read().colour, 255);

    let names: Vec<String> = guild.roles().values().iter().map(|r| r.read().name.clone()).collect();
    assert_eq!(names, vec!["moderators", "admins", "@everyone"]);
    assert!(guild.everyone_role().unwrap().read().is_everyone());
}

#[test]
fn members_and_users() {
    let (builder, guild) = cached_guild();

    let payload = json!({
        "user": {"id": "5", "username": "ferris", "global_name": "Ferris"},
        "nick": "crab",
        "roles": ["7"],
        "joined_at": "2021-01-01T00:00:00Z",
    });
    let member = builder.build_member(GUILD, &payload).unwrap();

    assert!(Arc::ptr_eq(&member, &guild.member(UserId::new(5)).unwrap()));
    assert_eq!(member.read().display_name(), "crab");
    assert_eq!(member.read().roles, vec![RoleId::new(7)]);
    assert!(member.read().joined_at.is_some());
    assert_eq!(builder.cache().user(UserId::new(5)).unwrap().read().name, "ferris");
}

#[test]
fn members_are_not_cached_when_disabled() {
    let mut settings = Settings::default();
    settings.cache_members = false;
    settings.cache_users = false;

    let cache = Arc::new(Cache::new_with_settings(settings));
    let guild = cache.insert_guild(Guild::new(GUILD, "crabs", UserId::new(2)));
    let builder = EntityBuilder::new(Arc::clone(&cache));

    let payload = json!({"user": {"id": "5", "username": "ferris"}});
    let first = builder.build_member(GUILD, &payload).unwrap();
    let second = builder.build_member(GUILD, &payload).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(!first.read().is_detached());
    assert!(guild.members().is_empty());
    assert!(cache.user(UserId::new(5)).is_none());
}

#[test]
fn unknown_values_survive() {
    let (builder, _guild) = cached_guild();
    let flags: u32 = 1 << 20 | 1 << 4;

    let channel = builder
        .build_forum_channel(
            GUILD,
            &json!({
                "id": "15",
                "name": "forum",
                "flags": flags,
                "default_sort_order": 7,
                "default_forum_layout": 3,
            }),
        )
        .unwrap();
    let channel = channel.read();

    assert_eq!(channel.raw_flags(), flags);
    assert!(channel.flags().contains(ChannelFlags::REQUIRE_TAG));
    assert_eq!(channel.default_sort_order(), Some(SortOrder::Unknown(7)));
    assert_eq!(channel.default_forum_layout(), Some(ForumLayout::Unknown(3)));
}

#[test]
fn default_reactions() {
    let (builder, _guild) = cached_guild();
    let build = |id: &str, emoji: Value| {
        let payload = json!({"id": id, "name": "forum", "default_reaction_emoji": emoji});
        let channel = builder.build_forum_channel(GUILD, &payload).unwrap();
        let emoji = channel.read().default_reaction_emoji.clone();
        emoji
    };

    assert_eq!(
        build("20", json!({"emoji_id": "41771983429993937", "emoji_name": null})),
        Some(EmojiRef::Custom {
            id: EmojiId::new(41771983429993937),
            name: None,
        })
    );
    assert_eq!(
        build("21", json!({"emoji_id": null, "emoji_name": "\u{1f980}"})),
        Some(EmojiRef::Unicode("\u{1f980}".to_string()))
    );
    assert_eq!(build("22", json!({"emoji_id": null, "emoji_name": null})), None);
    assert_eq!(build("23", Value::Null), None);
}

#[test]
fn build_guild_populates_every_cache() {
    let cache = Arc::new(Cache::new());
    let builder = EntityBuilder::new(Arc::clone(&cache));

    let guild = builder
        .build_guild(&json!({
            "id": "1",
            "name": "crabs",
            "owner_id": "2",
            "icon": "abc",
            "roles": [{"id": "1", "name": "@everyone", "permissions": "1024"}],
            "channels": [
                {"id": "10", "type": 0, "name": "general"},
                {"id": "11", "type": 99, "name": "from the future"},
            ],
            "threads": [{"id": "12", "type": 11, "name": "thread", "parent_id": "10"}],
            "members": [{"user": {"id": "5", "username": "ferris"}, "roles": []}],
        }))
        .unwrap();

    assert!(Arc::ptr_eq(&guild, &cache.guild(GUILD).unwrap()));
    assert_eq!(guild.name(), "crabs");
    assert_eq!(guild.icon().as_deref(), Some("abc"));
    assert_eq!(guild.channels().ids(), vec![ChannelId::new(10), ChannelId::new(12)]);
    assert_eq!(guild.members().len(), 1);
    assert_eq!(guild.roles().len(), 1);

    let general = guild.channel(ChannelId::new(10)).unwrap();
    let members = general.read().members().unwrap();
    assert_eq!(members.len(), 1);

    // A second payload updates the same guild in place.
    let again = builder
        .build_guild(&json!({"id": "1", "name": "lobsters", "owner_id": "2"}))
        .unwrap();
    assert!(Arc::ptr_eq(&guild, &again));
    assert_eq!(guild.name(), "lobsters");
    assert!(Arc::ptr_eq(&general, &guild.channel(ChannelId::new(10)).unwrap()));
}

#[test]
fn unknown_kinds_do_not_abort_a_guild_build() {
    let cache = Arc::new(Cache::new());
    let builder = EntityBuilder::new(Arc::clone(&cache));

    let guild = builder
        .build_guild(&json!({
            "id": "1",
            "name": "crabs",
            "owner_id": "2",
            "channels": [
                {"id": "10", "type": 0, "name": "general"},
                {"id": "11", "type": 300, "name": "from the far future"},
            ],
            "threads": [{"id": "12", "type": 1000, "name": "not a thread we know"}],
        }))
        .unwrap();

    assert_eq!(guild.channels().ids(), vec![ChannelId::new(10)]);

    let payload = json!({"id": "13", "type": 300, "name": "?"});
    assert!(builder.build_guild_channel(GUILD, &payload).unwrap().is_none());
}

#[test]
fn dropped_guild_is_reported() {
    let (builder, guild) = cached_guild();
    let channel = builder.build_text_channel(GUILD, &json!({"id": "10", "name": "a"})).unwrap();

    builder.cache().remove_guild(GUILD);
    drop(guild);

    assert!(matches!(channel.read().members(), Err(Error::Model(ModelError::GuildNotFound))));
}

#[test]
fn permissions_follow_overwrites() {
    let (builder, guild) = cached_guild();

    builder.build_role(GUILD, &json!({"id": "1", "name": "@everyone", "permissions": "3072"})).unwrap();
    builder.build_role(GUILD, &json!({"id": "7", "name": "muted", "permissions": "0"})).unwrap();
    builder.build_role(GUILD, &json!({"id": "8", "name": "admin", "permissions": "8"})).unwrap();
    builder
        .build_member(GUILD, &json!({"user": {"id": "5", "username": "muted"}, "roles": ["7"]}))
        .unwrap();
    builder
        .build_member(GUILD, &json!({"user": {"id": "6", "username": "boss"}, "roles": ["8"]}))
        .unwrap();
    builder
        .build_member(GUILD, &json!({"user": {"id": "3", "username": "guest"}, "roles": []}))
        .unwrap();

    let channel = builder
        .build_text_channel(
            GUILD,
            &json!({
                "id": "10",
                "name": "general",
                "permission_overwrites": [
                    {"id": "7", "type": 0, "allow": "0", "deny": "2048"},
                    {"id": "1", "type": 0, "allow": "65536", "deny": "0"},
                    {"id": "3", "type": 1, "allow": "0", "deny": "1024"},
                ],
            }),
        )
        .unwrap();
    let channel = channel.read();

    let muted = channel.permissions_for_user(UserId::new(5)).unwrap();
    assert_eq!(muted, Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY);

    let owner = channel.permissions_for_user(UserId::new(2)).unwrap();
    assert_eq!(owner, Permissions::all());

    let admin = channel.permissions_for_user(UserId::new(6)).unwrap();
    assert_eq!(admin, Permissions::all());

    let guest = channel.permissions_for_user(UserId::new(3)).unwrap();
    assert_eq!(guest, Permissions::empty());

    let visible: Vec<UserId> = channel.members().unwrap().iter().map(|m| m.read().user.id).collect();
    assert!(visible.contains(&UserId::new(5)));
    assert!(!visible.contains(&UserId::new(3)));

    assert_eq!(guild.member_permissions(UserId::new(5)), Permissions::from_bits_retain(3072));
}

#[test]
fn interaction_member_overlay_is_private() {
    let (builder, guild) = cached_guild();
    let interaction = InteractionEntityBuilder::new(builder, ChannelId::new(10), UserId::new(5));

    let member = interaction
        .build_member(
            GUILD,
            &json!({"user": {"id": "5", "username": "ferris"}, "permissions": "2048"}),
        )
        .unwrap();
    let cached = guild.member(UserId::new(5)).unwrap();

    assert!(!Arc::ptr_eq(&member, &cached));
    assert!(cached.read().interaction_permissions().is_none());

    let overlay = *member.read().interaction_permissions().unwrap();
    assert_eq!(overlay.channel_id, ChannelId::new(10));
    assert_eq!(overlay.permissions, Permissions::SEND_MESSAGES);

    let channel = interaction
        .build_text_channel(GUILD, &json!({"id": "10", "name": "a", "permissions": "2048"}))
        .unwrap();
    assert_eq!(member.read().permissions_in(&channel.read()).unwrap(), Permissions::SEND_MESSAGES);
}
