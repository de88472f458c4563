//! A set of constants used by the library.

/// The API version used by the library.
pub const API_VERSION: u8 = 10;

/// The base URI of the REST API.
pub const API_BASE: &str = "https://discord.com/api/v10";

/// The maximum number of messages Discord returns for a single message listing request.
pub const MESSAGE_PAGE_LIMIT: u8 = 100;

/// The [UserAgent] sent along with every request.
///
/// [UserAgent]: ::reqwest::header::USER_AGENT
pub const USER_AGENT: &str = concat!(
    "DiscordBot (",
    env!("CARGO_PKG_NAME"),
    ", ",
    env!("CARGO_PKG_VERSION"),
    ")"
);
