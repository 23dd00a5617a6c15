use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::errors::ClientError;
use crate::types::tools::ToolCall;

/// Seconds since the Unix epoch.
pub type UnixTimestamp = f64;

/// Chat group used when the caller does not specify one.
pub const DEFAULT_CHAT_GROUP: &str = "default";

const MAX_FORMAT_NAME_LEN: usize = 64;

pub(crate) fn now_timestamp() -> UnixTimestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn default_chat_group() -> String {
    DEFAULT_CHAT_GROUP.to_string()
}

/// Role that produced a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
    System,
}

/// A message between a user and an assistant.
///
/// All messages within one `chat_group` are private to that group; `name`
/// differentiates participants inside a shared group.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub assistant: String,
    #[serde(default = "default_chat_group")]
    pub chat_group: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "now_timestamp")]
    pub timestamp: UnixTimestamp,
    pub content: String,
    pub author: Author,
}

impl Message {
    /// Creates a message in the default chat group, timestamped now.
    pub fn new(
        assistant: impl Into<String>,
        content: impl Into<String>,
        author: Author,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            assistant: assistant.into(),
            chat_group: default_chat_group(),
            name: None,
            timestamp: now_timestamp(),
            content: content.into(),
            author,
        }
    }

    /// Sets the chat group.
    pub fn with_chat_group(mut self, chat_group: impl Into<String>) -> Self {
        self.chat_group = chat_group.into();
        self
    }

    /// Sets the participant display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Identifiers of the memories and prior messages the assistant consulted to
/// produce a response.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MessageReferences {
    pub memory_ids: Vec<Uuid>,
    pub message_ids: Vec<Uuid>,
}

/// An assistant response, optionally annotated with references and tool calls.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReferencedMessage {
    #[serde(flatten)]
    pub message: Message,
    #[serde(default)]
    pub references: Option<MessageReferences>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ReferencedMessage {
    /// Returns the message text.
    pub fn content(&self) -> &str {
        &self.message.content
    }
}

/// One decoded unit of a streaming response.
///
/// Exactly one event per stream invocation has `stream_ended == true`; it is
/// the last event emitted and the only one that may carry references.
/// Concatenating every event's content in order reconstructs the full reply.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MessageStreamEvent {
    #[serde(flatten)]
    pub message: ReferencedMessage,
    pub stream_ended: bool,
}

impl MessageStreamEvent {
    /// Returns the incremental text fragment.
    pub fn content(&self) -> &str {
        self.message.content()
    }

    /// Returns the author of the fragment.
    pub fn author(&self) -> Author {
        self.message.message.author
    }

    /// Returns the references, populated only on the terminal event.
    pub fn references(&self) -> Option<&MessageReferences> {
        self.message.references.as_ref()
    }

    /// Returns tool calls attached to this fragment, if any.
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        self.message.tool_calls.as_deref()
    }
}

/// Per-request response tuning forwarded to the server.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseConfiguration {
    /// Persona the assistant should embody in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    /// Extra instructions for this request only; never saved to memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Structured output configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// Memory behavior for one chat exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MemoryConfiguration {
    pub add_to_memory: bool,
    pub use_memory: bool,
}

impl Default for MemoryConfiguration {
    fn default() -> Self {
        Self {
            add_to_memory: true,
            use_memory: true,
        }
    }
}

/// Request body accepted by the chat endpoints.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatRequest {
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_config: Option<ResponseConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_config: Option<MemoryConfiguration>,
}

/// A structured response: the raw assistant message plus its content parsed
/// as JSON according to the requested schema.
#[derive(Clone, Debug, PartialEq)]
pub struct StructuredMessage {
    pub message: ReferencedMessage,
    pub data: serde_json::Value,
}

/// JSON type a schema validates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

/// A minimal, deterministic JSON Schema subset for structured outputs.
///
/// This is not a full JSON Schema implementation; it covers the keywords the
/// platform validates for objects and arrays.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JsonSchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, JsonSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// `true`/`false` or a nested schema.
    #[serde(
        rename = "additionalProperties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchema>>,
}

impl JsonSchema {
    fn bare(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            description: None,
            enumeration: None,
            properties: None,
            required: None,
            additional_properties: None,
            items: None,
        }
    }

    /// A string schema.
    pub fn string() -> Self {
        Self::bare(SchemaType::String)
    }

    /// A number schema.
    pub fn number() -> Self {
        Self::bare(SchemaType::Number)
    }

    /// A boolean schema.
    pub fn boolean() -> Self {
        Self::bare(SchemaType::Boolean)
    }

    /// An object schema with closed additional properties.
    pub fn object(
        properties: impl IntoIterator<Item = (String, JsonSchema)>,
        required: Vec<String>,
    ) -> Self {
        let mut schema = Self::bare(SchemaType::Object);
        schema.properties = Some(properties.into_iter().collect());
        schema.required = Some(required);
        schema.additional_properties = Some(serde_json::Value::Bool(false));
        schema
    }

    /// An array schema.
    pub fn array(items: JsonSchema) -> Self {
        let mut schema = Self::bare(SchemaType::Array);
        schema.items = Some(Box::new(items));
        schema
    }

    /// Sets the schema description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Enforces minimal correctness for the supported subset.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.schema_type == SchemaType::Object {
            let Some(properties) = &self.properties else {
                return Err(ClientError::validation(
                    "object schema must include 'properties'",
                ));
            };
            if self.additional_properties.is_none() {
                return Err(ClientError::validation(
                    "object schema must explicitly set 'additionalProperties'",
                ));
            }
            if let Some(required) = &self.required {
                let missing: Vec<&str> = required
                    .iter()
                    .filter(|key| !properties.contains_key(*key))
                    .map(String::as_str)
                    .collect();
                if !missing.is_empty() {
                    return Err(ClientError::validation(format!(
                        "required properties not defined in 'properties': {}",
                        missing.join(", ")
                    )));
                }
            }
            for nested in properties.values() {
                nested.validate()?;
            }
        }
        if self.schema_type == SchemaType::Array {
            match &self.items {
                Some(items) => items.validate()?,
                None => {
                    return Err(ClientError::validation("array schema must include 'items'"));
                }
            }
        }
        Ok(())
    }
}

/// Named schema configuration for structured outputs.
///
/// `strict` is pinned to true: strict adherence is always requested.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JsonSchemaConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: JsonSchema,
    pub strict: bool,
}

impl JsonSchemaConfig {
    /// Creates a validated schema configuration.
    ///
    /// The name must be 1-64 characters of `a-z A-Z 0-9 _ -`.
    pub fn new(name: impl Into<String>, schema: JsonSchema) -> Result<Self, ClientError> {
        let name = name.into();
        if name.is_empty() || name.len() > MAX_FORMAT_NAME_LEN {
            return Err(ClientError::validation(format!(
                "response format name must be 1-{MAX_FORMAT_NAME_LEN} characters"
            )));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ClientError::validation(
                "response format name may only contain a-z, A-Z, 0-9, underscores and dashes",
            ));
        }
        schema.validate()?;
        Ok(Self {
            name,
            description: None,
            schema,
            strict: true,
        })
    }

    /// Sets the format description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Kind of response format requested from the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormatType {
    JsonSchema,
    Text,
}

/// Output format descriptor attached to structured chat requests.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: ResponseFormatType,
    pub json_schema: JsonSchemaConfig,
}

impl ResponseFormat {
    /// Creates a `json_schema` response format.
    pub fn json_schema(config: JsonSchemaConfig) -> Self {
        Self {
            format_type: ResponseFormatType::JsonSchema,
            json_schema: config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_event_matches_wire_shape() {
        let wire = r#"{
            "assistant": "sam", "chat_group": "default", "name": null,
            "timestamp": 1700000000.5, "content": "Hello", "author": "assistant",
            "tool_calls": null,
            "references": null,
            "stream_ended": false
        }"#;
        let event: MessageStreamEvent = serde_json::from_str(wire).expect("decode");
        assert_eq!(event.content(), "Hello");
        assert_eq!(event.author(), Author::Assistant);
        assert!(!event.stream_ended);
        assert!(event.references().is_none());
    }

    #[test]
    fn terminal_event_carries_references() {
        let memory_id = Uuid::new_v4();
        let wire = format!(
            r#"{{"assistant":"sam","chat_group":"default","name":null,
                "timestamp":1700000000.5,"content":"","author":"assistant",
                "tool_calls":null,
                "references":{{"memory_ids":["{memory_id}"],"message_ids":[]}},
                "stream_ended":true}}"#
        );
        let event: MessageStreamEvent = serde_json::from_str(&wire).expect("decode");
        assert!(event.stream_ended);
        let references = event.references().expect("references");
        assert_eq!(references.memory_ids, vec![memory_id]);
        assert!(references.message_ids.is_empty());
    }

    #[test]
    fn message_defaults_fill_missing_fields() {
        let wire = r#"{"assistant":"sam","content":"hi","author":"user"}"#;
        let message: Message = serde_json::from_str(wire).expect("decode");
        assert_eq!(message.chat_group, DEFAULT_CHAT_GROUP);
        assert!(message.name.is_none());
        assert!(message.timestamp > 0.0);
    }

    #[test]
    fn object_schema_requires_properties_and_additional_properties() {
        let bare = JsonSchema::bare(SchemaType::Object);
        assert!(matches!(bare.validate(), Err(ClientError::Validation(_))));

        let schema = JsonSchema::object(
            [("name".to_string(), JsonSchema::string())],
            vec!["name".to_string()],
        );
        schema.validate().expect("valid object schema");
    }

    #[test]
    fn required_keys_must_exist_in_properties() {
        let schema = JsonSchema::object(
            [("name".to_string(), JsonSchema::string())],
            vec!["name".to_string(), "age".to_string()],
        );
        let err = schema.validate().err().expect("must fail");
        assert!(err.message().contains("age"));
    }

    #[test]
    fn array_schema_requires_items() {
        let bare = JsonSchema::bare(SchemaType::Array);
        assert!(matches!(bare.validate(), Err(ClientError::Validation(_))));
        JsonSchema::array(JsonSchema::number())
            .validate()
            .expect("valid array schema");
    }

    #[test]
    fn format_name_is_validated() {
        let schema = JsonSchema::object(
            [("ok".to_string(), JsonSchema::boolean())],
            vec!["ok".to_string()],
        );
        assert!(JsonSchemaConfig::new("weather report", schema.clone()).is_err());
        assert!(JsonSchemaConfig::new("", schema.clone()).is_err());
        let config = JsonSchemaConfig::new("weather_report", schema).expect("valid");
        assert!(config.strict);
    }

    #[test]
    fn response_format_serializes_type_tag() {
        let schema = JsonSchema::object(
            [("ok".to_string(), JsonSchema::boolean())],
            vec!["ok".to_string()],
        );
        let format = ResponseFormat::json_schema(
            JsonSchemaConfig::new("check", schema).expect("config"),
        );
        let value = serde_json::to_value(&format).expect("serialize");
        assert_eq!(value["type"], "json_schema");
        assert_eq!(value["json_schema"]["strict"], true);
        assert_eq!(
            value["json_schema"]["schema"]["additionalProperties"],
            false
        );
    }
}
