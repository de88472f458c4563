use crate::constants::MESSAGE_PAGE_LIMIT;
use crate::model::id::MessageId;

/// Builds a request to the API to retrieve messages.
///
/// This accepts 2 types of parameters. The first type filters messages based on Id, and is set by
/// one of the following:
///
/// - [`Self::after`]
/// - [`Self::around`]
/// - [`Self::before`]
///
/// These are mutually exclusive, and override each other if called sequentially. If one is not
/// provided, messages are simply sorted by most recent.
///
/// The other parameter specifies the number of messages to retrieve. This is _optional_, and
/// defaults to 50 if not specified.
///
/// # Examples
///
/// Creating a `GetMessages` builder to retrieve the first 25 messages after the message with an
/// Id of `158339864557912064`:
///
/// ```rust
/// use discord_entities::builder::GetMessages;
/// use discord_entities::model::id::MessageId;
///
/// let builder = GetMessages::new().after(MessageId::new(158339864557912064)).limit(25);
///
/// assert_eq!(builder.to_query(), vec![
///     ("after", "158339864557912064".to_string()),
///     ("limit", "25".to_string()),
/// ]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct GetMessages {
    search_filter: Option<SearchFilter>,
    limit: Option<u8>,
}

impl GetMessages {
    /// Equivalent to [`Self::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Indicates to retrieve the messages after a specific message, given its Id.
    pub fn after(mut self, message_id: impl Into<MessageId>) -> Self {
        self.search_filter = Some(SearchFilter::After(message_id.into()));
        self
    }

    /// Indicates to retrieve the messages _around_ a specific message, in other words in either
    /// direction from the message in time.
    pub fn around(mut self, message_id: impl Into<MessageId>) -> Self {
        self.search_filter = Some(SearchFilter::Around(message_id.into()));
        self
    }

    /// Indicates to retrieve the messages before a specific message, given its Id.
    pub fn before(mut self, message_id: impl Into<MessageId>) -> Self {
        self.search_filter = Some(SearchFilter::Before(message_id.into()));
        self
    }

    /// The maximum number of messages to retrieve for the query.
    ///
    /// If this is not specified, a default value of 50 is used.
    ///
    /// **Note**: This field is capped to 100 messages due to a Discord limitation. If an amount
    /// larger than 100 is supplied, it will be truncated.
    pub fn limit(mut self, limit: u8) -> Self {
        self.limit = Some(limit.min(MESSAGE_PAGE_LIMIT));
        self
    }

    #[must_use]
    pub fn search_filter(&self) -> Option<SearchFilter> {
        self.search_filter
    }

    #[must_use]
    pub fn get_limit(&self) -> Option<u8> {
        self.limit
    }

    /// The query string pairs of the request, filter first.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::with_capacity(2);

        if let Some(filter) = self.search_filter {
            let (key, id) = match filter {
                SearchFilter::After(id) => ("after", id),
                SearchFilter::Around(id) => ("around", id),
                SearchFilter::Before(id) => ("before", id),
            };
            query.push((key, id.to_string()));
        }

        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }

        query
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchFilter {
    After(MessageId),
    Around(MessageId),
    Before(MessageId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_override_each_other() {
        let builder = GetMessages::new().after(MessageId::new(1)).before(MessageId::new(2));
        assert_eq!(builder.search_filter(), Some(SearchFilter::Before(MessageId::new(2))));
    }

    #[test]
    fn limit_is_capped() {
        let builder = GetMessages::new().limit(250);
        assert_eq!(builder.get_limit(), Some(100));
        assert_eq!(builder.to_query(), vec![("limit", "100".to_string())]);
    }

    #[test]
    fn empty_query() {
        assert!(GetMessages::new().to_query().is_empty());
    }
}
