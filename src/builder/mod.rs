//! A set of builders: the entity builders turning raw payloads into entities, and the request
//! builders used to talk to the API.
//!
//! Request builders are used when not all parameters are required, all parameters are optional,
//! and/or sane default values for required parameters can be applied by a builder.

mod create_channel;
mod entity;
mod fields;
mod get_messages;
mod interaction;

pub use self::create_channel::CreateChannel;
pub use self::entity::EntityBuilder;
pub use self::get_messages::{GetMessages, SearchFilter};
pub use self::interaction::InteractionEntityBuilder;
