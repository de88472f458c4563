//! discord-entities is the entity layer of a Rust library for the Discord API.
//!
//! Raw JSON payloads received over REST or the gateway are turned into typed entities by the
//! [`EntityBuilder`]. Entities belonging to a guild that is present in the [`Cache`] are
//! _attached_: they live in that guild's caches, and rebuilding one with the same id updates the
//! existing object in place, so every holder of an older handle observes the new data.
//! Entities whose guild is not cached yet (which is common while handling interactions before
//! the gateway has delivered the guild) are _detached_: they are standalone objects that never
//! enter a cache, and operations that need a live guild fail with
//! [`ModelError::DetachedEntity`].
//!
//! On top of the entity layer the crate offers:
//!
//! - request-scoped interaction permission overlays, see [`InteractionEntityBuilder`];
//! - channel copies, see [`GuildChannel::create_copy`];
//! - paged retrieval of a channel's message history, see [`MessageHistory`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use discord_entities::builder::EntityBuilder;
//! use discord_entities::cache::Cache;
//! use discord_entities::model::prelude::*;
//! use serde_json::json;
//!
//! # fn run() -> discord_entities::Result<()> {
//! let cache = Arc::new(Cache::new());
//! cache.insert_guild(Guild::new(GuildId::new(1), "guild", UserId::new(2)));
//!
//! let builder = EntityBuilder::new(Arc::clone(&cache));
//! let payload = json!({"id": "10", "type": 0, "name": "general", "position": 0});
//! let channel = builder.build_text_channel(GuildId::new(1), &payload)?;
//!
//! assert_eq!(channel.read().name, "general");
//! assert!(!channel.read().is_detached());
//! # Ok(())
//! # }
//! ```
//!
//! [`EntityBuilder`]: crate::builder::EntityBuilder
//! [`InteractionEntityBuilder`]: crate::builder::InteractionEntityBuilder
//! [`Cache`]: crate::cache::Cache
//! [`ModelError::DetachedEntity`]: crate::model::ModelError::DetachedEntity
//! [`GuildChannel::create_copy`]: crate::model::channel::GuildChannel::create_copy
//! [`MessageHistory`]: crate::model::channel::MessageHistory
#![forbid(unsafe_code)]
#![warn(
    unused,
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::clone_on_ref_ptr,
    clippy::non_ascii_literal,
    clippy::fallible_impl_from,
    clippy::let_underscore_must_use,
    clippy::format_push_string,
    clippy::pedantic
)]
#![allow(
    // Allowed as they are too pedantic
    clippy::cast_possible_truncation,
    clippy::module_name_repetitions,
    clippy::unreadable_literal,
    clippy::cast_possible_wrap,
    clippy::wildcard_imports,
    clippy::cast_sign_loss,
    clippy::too_many_lines,
    clippy::doc_markdown,
    clippy::missing_panics_doc,
    clippy::doc_link_with_quotes
)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

#[macro_use]
extern crate serde;

#[macro_use]
mod internal;

pub mod builder;
pub mod cache;
pub mod constants;
pub mod http;
pub mod json;
pub mod model;

mod error;

pub use crate::error::{Error, Result};

/// Special module that re-exports most public items from this crate.
pub mod all {
    #[doc(no_inline)]
    pub use crate::builder::*;
    #[doc(no_inline)]
    pub use crate::cache::*;
    #[doc(no_inline)]
    pub use crate::constants::*;
    #[doc(no_inline)]
    pub use crate::http::*;
    #[doc(no_inline)]
    pub use crate::{async_trait, model::prelude::*, Error, Result};
}

// Re-exports of crates used internally which are already publically exposed.
pub use async_trait::async_trait;
