//! Client SDK for the Ashlight assistant platform.
//!
//! The crate exposes a blocking and an async surface over the same wire
//! protocol. [`Assistant`] (or [`AsyncAssistant`]) is the entry point; it
//! owns façades for chat, memory, and the Slack interface.
//!
//! ```no_run
//! use ashlight::{Assistant, AssistantConfig};
//!
//! fn main() -> Result<(), ashlight::ClientError> {
//!     let config = AssistantConfig::new(
//!         "sam",
//!         "Help users track their orders politely.",
//!     )?;
//!     let assistant = Assistant::create(config)?;
//!
//!     let reply = assistant.chat().message("Where is my order #4211?")?;
//!     println!("{}", reply.content());
//!
//!     for event in assistant.chat().stream("And when will it arrive?")? {
//!         print!("{}", event?.content());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Streaming responses arrive as [`MessageStreamEvent`]s; concatenating
//! their content in order reconstructs the full reply, and the final event
//! (`stream_ended`) carries the memory and message references the assistant
//! consulted.

/// Assistant lifecycle and operation façades.
pub mod assistant;
/// Chat operations and streaming.
pub mod chat;
/// Client connection settings.
pub mod config;
mod decoder;
/// Error taxonomy.
pub mod errors;
/// Teaching operations.
pub mod learning;
/// Memory operations.
pub mod memory;
/// Slack interface management.
pub mod slack;
#[cfg(test)]
mod testing;
/// HTTP transport seam.
pub mod transport;
/// Wire-level data models.
pub mod types;

pub use assistant::{Assistant, AsyncAssistant};
pub use chat::{
    AsyncChat, AsyncMessageStream, Chat, ChatOptions, DEFAULT_HISTORY_LIMIT, MessageStream,
};
pub use config::{ClientConfig, ENV_API_KEY};
pub use errors::ClientError;
pub use learning::{AsyncLearning, Learning};
pub use memory::{AsyncMemory, MAX_QUERY_LEN, MAX_RECALL_LIMIT, Memory};
pub use slack::{AsyncSlackInterface, SlackInterface};
pub use transport::{AsyncTransport, Transport};
pub use types::{
    AssistantConfig, Author, InferenceModel, JsonSchema, JsonSchemaConfig, MemoryItem, MemoryKind,
    Message, MessageReferences, MessageStreamEvent, ReferencedMessage, ResponseFormat,
    SlackConfig, StructuredMessage,
};
