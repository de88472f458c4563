use std::sync::Arc;

use discord_entities::builder::{EntityBuilder, GetMessages, SearchFilter};
use discord_entities::cache::Cache;
use discord_entities::http::{HttpError, MessageSource};
use discord_entities::model::prelude::*;
use discord_entities::{async_trait, Error, Result};
use parking_lot::Mutex;
use serde_json::{json, Value};

/// Serves a channel holding messages `1..=total`, newest first, and records every request.
#[derive(Debug)]
struct FakeHistory {
    total: u64,
    fail_on_call: Option<usize>,
    calls: Mutex<Vec<(Option<MessageId>, u8)>>,
}

impl FakeHistory {
    fn new(total: u64) -> Self {
        Self {
            total,
            fail_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(total: u64, call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::new(total)
        }
    }

    fn limits(&self) -> Vec<u8> {
        self.calls.lock().iter().map(|(_, limit)| *limit).collect()
    }

    fn cursors(&self) -> Vec<Option<MessageId>> {
        self.calls.lock().iter().map(|(before, _)| *before).collect()
    }
}

fn message(id: u64) -> Value {
    json!({
        "id": id.to_string(),
        "channel_id": "10",
        "author": {"id": "5", "username": "ferris"},
        "content": format!("message {id}"),
        "timestamp": "2024-01-01T00:00:00Z",
    })
}

#[async_trait]
impl MessageSource for FakeHistory {
    async fn get_messages(&self, _channel_id: ChannelId, query: &GetMessages) -> Result<Vec<Value>> {
        let before = match query.search_filter() {
            Some(SearchFilter::Before(id)) => Some(id),
            None => None,
            Some(other) => panic!("unexpected filter {other:?}"),
        };
        let limit = query.get_limit().unwrap_or(50);

        let call = {
            let mut calls = self.calls.lock();
            calls.push((before, limit));
            calls.len()
        };

        if self.fail_on_call == Some(call) {
            return Err(Error::Http(HttpError::Url(url::ParseError::EmptyHost)));
        }

        let newest = before.map_or(self.total, |id| id.get() - 1);
        Ok((1..=newest).rev().take(usize::from(limit)).map(message).collect())
    }
}

fn private_channel(builder: &EntityBuilder) -> Shared<PrivateChannel> {
    builder
        .build_private_channel(&json!({
            "id": "10",
            "type": 1,
            "recipients": [{"id": "5", "username": "ferris"}],
        }))
        .unwrap()
}

fn builder() -> EntityBuilder {
    EntityBuilder::new(Arc::new(Cache::new()))
}

fn ids(messages: &[Message]) -> Vec<u64> {
    messages.iter().map(|m| m.id.get()).collect()
}

#[tokio::test]
async fn fetch_all_walks_the_whole_history() {
    let builder = builder();
    let channel = private_channel(&builder);
    let source = Arc::new(FakeHistory::new(250));
    let mut history = MessageHistory::private(builder, Arc::clone(&source), &channel.read());

    let all = history.fetch_all().await;

    assert_eq!(ids(all), (1..=250).rev().collect::<Vec<_>>());
    assert!(history.reached_end());
    assert_eq!(source.limits(), vec![100, 100, 100]);
    assert_eq!(source.cursors(), vec![
        None,
        Some(MessageId::new(151)),
        Some(MessageId::new(51))
    ]);
    assert_eq!(history.cursor(), Some(MessageId::new(1)));
}

#[tokio::test]
async fn large_pages_are_chunked() {
    let builder = builder();
    let channel = private_channel(&builder);
    let source = Arc::new(FakeHistory::new(250));
    let mut history = MessageHistory::private(builder, Arc::clone(&source), &channel.read());

    let page = history.fetch_page(250).await.unwrap();

    assert_eq!(page.len(), 250);
    assert_eq!(source.limits(), vec![100, 100, 50]);
    assert!(!history.reached_end());

    // The channel held exactly 250 messages, so the next request finds nothing.
    assert!(history.fetch_next().await.is_none());
    assert!(history.reached_end());
    assert_eq!(history.recent().len(), 250);
}

#[tokio::test]
async fn short_page_marks_the_end() {
    let builder = builder();
    let channel = private_channel(&builder);
    let source = Arc::new(FakeHistory::new(30));
    let mut history = MessageHistory::private(builder, Arc::clone(&source), &channel.read());

    let page = history.fetch_next().await.unwrap();
    assert_eq!(page.len(), 30);
    assert!(history.reached_end());

    let before = ids(history.recent());
    assert!(history.fetch_next().await.is_none());
    assert!(history.fetch_page(10).await.is_none());
    assert_eq!(ids(history.recent()), before);
    assert_eq!(source.limits(), vec![100]);
}

#[tokio::test]
async fn failure_keeps_messages_already_fetched() {
    let builder = builder();
    let channel = private_channel(&builder);
    let source = Arc::new(FakeHistory::failing_on(250, 2));
    let mut history = MessageHistory::private(builder, Arc::clone(&source), &channel.read());

    let page = history.fetch_page(250).await.unwrap();

    assert_eq!(ids(&page), (151..=250).rev().collect::<Vec<_>>());
    assert!(!history.reached_end());
    assert_eq!(history.recent().len(), 100);
    assert_eq!(history.cursor(), Some(MessageId::new(151)));

    // Fetching resumes from the cursor.
    let next = history.fetch_next().await.unwrap();
    assert_eq!(next.first().map(|m| m.id.get()), Some(150));
}

#[tokio::test]
async fn failure_without_messages_returns_none() {
    let builder = builder();
    let channel = private_channel(&builder);
    let source = Arc::new(FakeHistory::failing_on(250, 1));
    let mut history = MessageHistory::private(builder, Arc::clone(&source), &channel.read());

    assert!(history.fetch_next().await.is_none());
    assert!(!history.reached_end());
    assert!(history.recent().is_empty());
}

#[tokio::test]
async fn zero_amount_does_not_fetch() {
    let builder = builder();
    let channel = private_channel(&builder);
    let source = Arc::new(FakeHistory::new(250));
    let mut history = MessageHistory::private(builder, Arc::clone(&source), &channel.read());

    assert!(history.fetch_page(0).await.is_none());
    assert!(source.limits().is_empty());
}

fn guild_with_channel(everyone: Permissions) -> (EntityBuilder, Shared<GuildChannel>) {
    let cache = Arc::new(Cache::new());
    cache.insert_guild(Guild::new(GuildId::new(1), "crabs", UserId::new(2)));
    let builder = EntityBuilder::new(cache);

    builder
        .build_role(
            GuildId::new(1),
            &json!({"id": "1", "name": "@everyone", "permissions": everyone.bits().to_string()}),
        )
        .unwrap();
    let payload = json!({"id": "10", "name": "general"});
    let channel = builder.build_text_channel(GuildId::new(1), &payload).unwrap();

    (builder, channel)
}

#[test]
fn guild_history_requires_the_current_user() {
    let (builder, channel) = guild_with_channel(Permissions::all());

    let err = MessageHistory::new(builder, FakeHistory::new(1), &channel.read()).unwrap_err();
    assert!(matches!(err, Error::Model(ModelError::CurrentUserMissing)));
}

#[test]
fn guild_history_requires_read_message_history() {
    let (builder, channel) = guild_with_channel(Permissions::VIEW_CHANNEL);
    builder.cache().set_current_user(User::new(UserId::new(3), "bot"));

    let err = MessageHistory::new(builder, FakeHistory::new(1), &channel.read()).unwrap_err();
    let Error::Model(ModelError::InvalidPermissions {
        required,
        present,
    }) = err
    else {
        panic!("expected missing permissions, got {err:?}");
    };
    assert_eq!(required, Permissions::READ_MESSAGE_HISTORY);
    assert_eq!(present, Permissions::VIEW_CHANNEL);
}

#[tokio::test]
async fn guild_history_with_permission() {
    let (builder, channel) =
        guild_with_channel(Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY);
    builder.cache().set_current_user(User::new(UserId::new(3), "bot"));

    let mut history = MessageHistory::new(builder, FakeHistory::new(3), &channel.read()).unwrap();
    assert_eq!(history.channel_id(), ChannelId::new(10));
    assert_eq!(ids(history.fetch_all().await), vec![3, 2, 1]);
}
