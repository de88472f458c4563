use std::fmt;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, Response};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};
use url::Url;

use super::{ErrorResponse, HttpError, MessageSource};
use crate::builder::GetMessages;
use crate::constants;
use crate::internal::prelude::*;
use crate::model::id::ChannelId;

/// A minimal client for Discord's REST API.
///
/// The only route it requests is the channel message listing used by [`MessageHistory`]; the
/// rest of the API surface lives outside this crate.
///
/// [`MessageHistory`]: crate::model::channel::MessageHistory
pub struct Http {
    client: Client,
    token: SecretString,
    api_base: String,
}

impl Http {
    /// Creates a client for the bot with the given token, against the public API.
    ///
    /// The `Bot ` prefix is added to the token if it is missing.
    #[must_use]
    pub fn new(token: &str) -> Self {
        Self::new_with_client(Client::new(), token)
    }

    /// Creates a client reusing an existing [`reqwest::Client`].
    #[must_use]
    pub fn new_with_client(client: Client, token: &str) -> Self {
        Self {
            client,
            token: SecretString::new(parse_token(token)),
            api_base: constants::API_BASE.to_string(),
        }
    }

    /// Points the client at another API root, such as a proxy or a test server.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Url`] if `base` is not a valid URL.
    pub fn with_base_url(mut self, base: &str) -> Result<Self> {
        Url::parse(base).map_err(HttpError::from)?;
        self.api_base = base.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// The API root requests are sent to.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Gets messages of a channel, newest first, as raw JSON objects.
    ///
    /// # Errors
    ///
    /// Returns an [`HttpError::UnsuccessfulRequest`] if Discord rejects the request, for
    /// instance when the current user lacks [Read Message History] in the channel.
    ///
    /// [Read Message History]: crate::model::Permissions::READ_MESSAGE_HISTORY
    pub async fn get_messages(
        &self,
        channel_id: ChannelId,
        query: &GetMessages,
    ) -> Result<Vec<Value>> {
        let mut url = Url::parse(&api!(self.api_base, "/channels/{}/messages", channel_id))
            .map_err(HttpError::from)?;
        url.query_pairs_mut().extend_pairs(query.to_query());

        let response = self.request(Method::GET, url).await?;
        decode_resp(response).await
    }

    async fn request(&self, method: Method, url: Url) -> Result<Response> {
        debug!("{} {}", method, url);

        let response = self
            .client
            .request(method.clone(), url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(HttpError::from)?;

        trace!("Response status: {}", response.status());

        if response.status().is_success() {
            Ok(response)
        } else {
            let error = ErrorResponse::from_response(response, method).await;
            Err(Error::Http(HttpError::UnsuccessfulRequest(error)))
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(USER_AGENT, HeaderValue::from_static(constants::USER_AGENT));

        let mut token =
            HeaderValue::from_str(self.token.expose_secret()).map_err(HttpError::from)?;
        token.set_sensitive(true);
        headers.insert(AUTHORIZATION, token);

        Ok(headers)
    }
}

impl fmt::Debug for Http {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Http").field("api_base", &self.api_base).finish_non_exhaustive()
    }
}

#[async_trait]
impl MessageSource for Http {
    async fn get_messages(&self, channel_id: ChannelId, query: &GetMessages) -> Result<Vec<Value>> {
        Http::get_messages(self, channel_id, query).await
    }
}

async fn decode_resp<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await.map_err(HttpError::from)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn parse_token(token: &str) -> String {
    let token = token.trim();

    if token.starts_with("Bot ") || token.starts_with("Bearer ") {
        token.to_string()
    } else {
        format!("Bot {token}")
    }
}
