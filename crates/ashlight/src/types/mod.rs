//! Wire-level data models shared by the sync and async façades.

/// API response envelope.
pub mod api;
/// Assistant configuration and inference model identifiers.
pub mod assistant;
/// Chat messages, references, stream events, and structured-output schemas.
pub mod chat;
/// External interface configuration (Slack).
pub mod interface;
/// Vector memory items.
pub mod memory;
/// Tool definitions and tool-call records.
pub mod tools;

pub use api::{ApiContent, ApiStatus};
pub use assistant::{AssistantConfig, InferenceModel};
pub use chat::{
    Author, ChatRequest, JsonSchema, JsonSchemaConfig, MemoryConfiguration, Message,
    MessageReferences, MessageStreamEvent, ReferencedMessage, ResponseConfiguration,
    ResponseFormat, SchemaType, StructuredMessage, UnixTimestamp,
};
pub use interface::{Interfaces, SlackConfig, SlackCredentials, SlackTokens};
pub use memory::{MemoryItem, MemoryKind};
pub use tools::{FunctionCall, FunctionDefinition, Tool, ToolCall, ToolType};
