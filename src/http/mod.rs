//! The HTTP module which provides functions for performing requests to endpoints in Discord's
//! API.
//!
//! Message history is fetched through the [`MessageSource`] trait, which [`Http`] implements
//! against the real API. Anything else able to serve a channel's messages can implement it too,
//! such as a local archive or a test double.

mod client;
mod error;

use async_trait::async_trait;

pub use self::client::Http;
pub use self::error::{DiscordJsonError, ErrorResponse, HttpError};
use crate::builder::GetMessages;
use crate::internal::prelude::*;
use crate::model::id::ChannelId;

/// A source of channel messages, as raw JSON objects.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Lists messages of a channel matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// Any error is treated by callers as a transport failure.
    async fn get_messages(&self, channel_id: ChannelId, query: &GetMessages) -> Result<Vec<Value>>;
}

#[async_trait]
impl<T: MessageSource + ?Sized> MessageSource for Arc<T> {
    async fn get_messages(&self, channel_id: ChannelId, query: &GetMessages) -> Result<Vec<Value>> {
        (**self).get_messages(channel_id, query).await
    }
}
