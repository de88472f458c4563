use tracing::{debug, warn};

use super::{GuildChannel, Message, PrivateChannel};
use crate::builder::{EntityBuilder, GetMessages};
use crate::constants::MESSAGE_PAGE_LIMIT;
use crate::http::MessageSource;
use crate::internal::prelude::*;
use crate::model::id::{ChannelId, MessageId};
use crate::model::overlay::effective_channel_permissions;
use crate::model::{ModelError, Permissions};

/// A cursor walking a channel's message history backwards, from the newest message to the
/// oldest, one page at a time.
///
/// Every fetched message is kept, in fetch order: each page is newest-first and pages are
/// appended as they arrive. Once a request comes back with fewer messages than asked for, the
/// history is considered exhausted and further fetches return `None` without contacting
/// Discord, even if new messages were sent since.
///
/// A history is meant to be driven by a single owner; fetches take `&mut self`.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use discord_entities::builder::EntityBuilder;
/// use discord_entities::http::Http;
/// use discord_entities::model::channel::{GuildChannel, MessageHistory};
///
/// # async fn run(builder: EntityBuilder, channel: &GuildChannel) -> discord_entities::Result<()> {
/// let http = Arc::new(Http::new("token"));
/// let mut history = MessageHistory::new(builder, http, channel)?;
///
/// while let Some(page) = history.fetch_next().await {
///     println!("fetched {} messages", page.len());
/// }
///
/// println!("{} messages in total", history.recent().len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MessageHistory<S> {
    channel_id: ChannelId,
    builder: EntityBuilder,
    source: S,
    cursor: Option<MessageId>,
    reached_end: bool,
    history: Vec<Message>,
}

impl<S: MessageSource> MessageHistory<S> {
    /// Creates a history over a guild channel.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::CurrentUserMissing`] if the current user is not cached,
    /// [`ModelError::InvalidPermissions`] if it lacks [Read Message History] in the channel, and
    /// [`ModelError::DetachedEntity`] if its permissions cannot be determined because the
    /// channel is detached and carries no overlay for it.
    ///
    /// [Read Message History]: Permissions::READ_MESSAGE_HISTORY
    pub fn new(builder: EntityBuilder, source: S, channel: &GuildChannel) -> Result<Self> {
        let current_user =
            builder.cache().current_user().ok_or(Error::Model(ModelError::CurrentUserMissing))?;

        let required = Permissions::READ_MESSAGE_HISTORY;
        let present = effective_channel_permissions(channel, current_user.id)?;

        if !present.contains(required) {
            return Err(Error::Model(ModelError::InvalidPermissions {
                required,
                present,
            }));
        }

        Ok(Self::from_parts(channel.id, builder, source))
    }

    /// Creates a history over a private channel. The recipient of a DM can always read its
    /// history, so no permission check is made.
    #[must_use]
    pub fn private(builder: EntityBuilder, source: S, channel: &PrivateChannel) -> Self {
        Self::from_parts(channel.id, builder, source)
    }

    fn from_parts(channel_id: ChannelId, builder: EntityBuilder, source: S) -> Self {
        Self {
            channel_id,
            builder,
            source,
            cursor: None,
            reached_end: false,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    /// The Id of the oldest message fetched so far, used as the `before` bound of the next
    /// request.
    #[must_use]
    pub fn cursor(&self) -> Option<MessageId> {
        self.cursor
    }

    /// Whether the start of the channel has been reached.
    #[must_use]
    pub fn reached_end(&self) -> bool {
        self.reached_end
    }

    /// Every message fetched so far, without fetching anything.
    #[must_use]
    pub fn recent(&self) -> &[Message] {
        &self.history
    }

    /// Fetches the next 100 messages.
    pub async fn fetch_next(&mut self) -> Option<Vec<Message>> {
        self.fetch_page(usize::from(MESSAGE_PAGE_LIMIT)).await
    }

    /// Fetches up to `amount` messages older than the ones fetched so far.
    ///
    /// Amounts above 100 are split into consecutive requests of at most 100 messages. A request
    /// returning fewer messages than asked for marks the end of the history and stops the
    /// fetch.
    ///
    /// A failed request also stops the fetch, and is logged: the messages retrieved by earlier
    /// requests of the same call are still kept and returned, and the end of the history is not
    /// marked.
    ///
    /// Returns `None` when the end of the history had already been reached, when `amount` is
    /// zero, or when no message could be fetched.
    #[cfg_attr(feature = "tracing_instrument", tracing::instrument(skip(self)))]
    pub async fn fetch_page(&mut self, amount: usize) -> Option<Vec<Message>> {
        if self.reached_end || amount == 0 {
            return None;
        }

        let mut remaining = amount;
        let mut fetched = Vec::new();

        while remaining > 0 {
            let limit = remaining.min(usize::from(MESSAGE_PAGE_LIMIT));

            let mut query = GetMessages::new().limit(limit as u8);
            if let Some(before) = self.cursor {
                query = query.before(before);
            }

            let page = match self.fetch_chunk(&query).await {
                Ok(page) => page,
                Err(why) => {
                    warn!(
                        "Stopped fetching the history of {} after {} messages: {:?}",
                        self.channel_id,
                        fetched.len(),
                        why
                    );
                    break;
                },
            };

            let count = page.len();
            if let Some(oldest) = page.last() {
                self.cursor = Some(oldest.id);
            }
            fetched.extend(page);

            if count < limit {
                debug!("Reached the start of the history of {}", self.channel_id);
                self.reached_end = true;
                break;
            }

            remaining -= limit;
        }

        if fetched.is_empty() {
            return None;
        }

        self.history.extend(fetched.iter().cloned());
        Some(fetched)
    }

    /// Fetches pages until the end of the history, returning every message fetched so far.
    pub async fn fetch_all(&mut self) -> &[Message] {
        while !self.reached_end && self.fetch_next().await.is_some() {}

        &self.history
    }

    /// Fetches one page and decodes it. A page with a malformed message is dropped whole.
    async fn fetch_chunk(&self, query: &GetMessages) -> Result<Vec<Message>> {
        let values = self.source.get_messages(self.channel_id, query).await?;
        values.iter().map(|value| self.builder.build_message(value)).collect()
    }
}
