//! Chat operations: buffered messages, structured outputs, streaming, and
//! history management.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::StreamExt as _;
use reqwest::Method;
use tracing::debug;

use crate::decoder::EventAssembler;
use crate::errors::ClientError;
use crate::transport::{AsyncTransport, ByteChunkStream, ByteChunks, Transport};
use crate::types::api::{expect_data, expect_success};
use crate::types::{
    Author, ChatRequest, MemoryConfiguration, Message, MessageStreamEvent, ReferencedMessage,
    ResponseConfiguration, ResponseFormat, StructuredMessage,
};

const MESSAGE_PATH: &str = "/assistant/chat/message";
const STRUCTURED_PATH: &str = "/assistant/chat/structured";
const STREAM_PATH: &str = "/assistant/chat/stream";
const HISTORY_PATH: &str = "/assistant/chat/history";

/// Default page size for history reads.
pub const DEFAULT_HISTORY_LIMIT: u32 = 25;

/// Per-call chat settings.
///
/// The defaults send to the `default` chat group with memory reads and writes
/// enabled.
#[derive(Clone, Debug)]
pub struct ChatOptions {
    pub chat_group: String,
    pub username: Option<String>,
    pub character: Option<String>,
    pub instructions: Option<String>,
    pub add_to_memory: bool,
    pub use_memory: bool,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            chat_group: crate::types::chat::DEFAULT_CHAT_GROUP.to_string(),
            username: None,
            character: None,
            instructions: None,
            add_to_memory: true,
            use_memory: true,
        }
    }
}

impl ChatOptions {
    /// Targets a specific chat group.
    pub fn chat_group(mut self, chat_group: impl Into<String>) -> Self {
        self.chat_group = chat_group.into();
        self
    }

    /// Labels the sender inside a shared chat group.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets a persona for the response.
    pub fn character(mut self, character: impl Into<String>) -> Self {
        self.character = Some(character.into());
        self
    }

    /// Adds request-only instructions.
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Controls whether this exchange is written to memory.
    pub fn add_to_memory(mut self, add_to_memory: bool) -> Self {
        self.add_to_memory = add_to_memory;
        self
    }

    /// Controls whether memory is consulted for the response.
    pub fn use_memory(mut self, use_memory: bool) -> Self {
        self.use_memory = use_memory;
        self
    }
}

pub(crate) fn chat_request_body(
    assistant: &str,
    text: &str,
    options: &ChatOptions,
    format: Option<ResponseFormat>,
) -> Result<serde_json::Value, ClientError> {
    if text.trim().is_empty() {
        return Err(ClientError::validation("message text must not be empty"));
    }
    let mut message =
        Message::new(assistant, text, Author::User).with_chat_group(&options.chat_group);
    if let Some(username) = &options.username {
        message = message.with_name(username);
    }
    let needs_response_config =
        options.character.is_some() || options.instructions.is_some() || format.is_some();
    let request = ChatRequest {
        message,
        response_config: needs_response_config.then(|| ResponseConfiguration {
            character: options.character.clone(),
            instructions: options.instructions.clone(),
            response_format: format,
        }),
        memory_config: Some(MemoryConfiguration {
            add_to_memory: options.add_to_memory,
            use_memory: options.use_memory,
        }),
    };
    serde_json::to_value(&request)
        .map_err(|e| ClientError::validation(format!("failed to encode chat request: {e}")))
}

fn parse_structured(message: ReferencedMessage) -> Result<StructuredMessage, ClientError> {
    let data = serde_json::from_str(message.content()).map_err(|e| {
        ClientError::protocol(format!("structured response content is not valid JSON: {e}"))
    })?;
    Ok(StructuredMessage { message, data })
}

#[derive(serde::Deserialize)]
struct HistoryData {
    messages: Vec<Message>,
}

fn erase_guard(confirm: bool) -> Result<(), ClientError> {
    if !confirm {
        return Err(ClientError::validation(
            "chat history will be permanently erased; set confirm to true to proceed",
        ));
    }
    Ok(())
}

fn history_query<'a>(
    assistant: &str,
    chat_group: &str,
    limit: u32,
    offset: u32,
) -> Vec<(&'a str, String)> {
    vec![
        ("assistant", assistant.to_string()),
        ("chat_group", chat_group.to_string()),
        ("limit", limit.to_string()),
        ("offset", offset.to_string()),
    ]
}

/// Blocking chat façade for one assistant.
#[derive(Clone)]
pub struct Chat {
    assistant: String,
    transport: Arc<dyn Transport>,
}

impl Chat {
    pub(crate) fn new(assistant: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            assistant: assistant.into(),
            transport,
        }
    }

    /// Sends a message with default options and returns the full response.
    pub fn message(&self, text: &str) -> Result<ReferencedMessage, ClientError> {
        self.message_with(text, &ChatOptions::default())
    }

    /// Sends a message and returns the full response.
    pub fn message_with(
        &self,
        text: &str,
        options: &ChatOptions,
    ) -> Result<ReferencedMessage, ClientError> {
        let body = chat_request_body(&self.assistant, text, options, None)?;
        let response = self
            .transport
            .request(Method::POST, MESSAGE_PATH, &[], Some(&body))?;
        expect_data(response)
    }

    /// Sends a message with default options and returns the reply parsed
    /// against the requested schema.
    pub fn structured(
        &self,
        text: &str,
        format: ResponseFormat,
    ) -> Result<StructuredMessage, ClientError> {
        self.structured_with(text, &ChatOptions::default(), format)
    }

    /// Sends a message and returns the reply parsed against the schema.
    pub fn structured_with(
        &self,
        text: &str,
        options: &ChatOptions,
        format: ResponseFormat,
    ) -> Result<StructuredMessage, ClientError> {
        let body = chat_request_body(&self.assistant, text, options, Some(format))?;
        let response = self
            .transport
            .request(Method::POST, STRUCTURED_PATH, &[], Some(&body))?;
        parse_structured(expect_data(response)?)
    }

    /// Sends a message with default options and streams the reply.
    pub fn stream(&self, text: &str) -> Result<MessageStream, ClientError> {
        self.stream_with(text, &ChatOptions::default())
    }

    /// Sends a message and streams the reply as incremental events.
    ///
    /// The returned iterator yields events until the terminal event, then
    /// ends. Decoding state is owned by the iterator, so concurrent or
    /// back-to-back streams never share buffers.
    pub fn stream_with(
        &self,
        text: &str,
        options: &ChatOptions,
    ) -> Result<MessageStream, ClientError> {
        let body = chat_request_body(&self.assistant, text, options, None)?;
        debug!(assistant = %self.assistant, chat_group = %options.chat_group, "opening chat stream");
        let chunks = self.transport.stream(STREAM_PATH, &body)?;
        Ok(MessageStream::new(chunks))
    }

    /// Imports messages into the assistant's history.
    pub fn add_history(&self, messages: &[Message]) -> Result<(), ClientError> {
        let body = serde_json::json!({
            "assistant": self.assistant,
            "messages": messages,
        });
        let response = self
            .transport
            .request(Method::PUT, HISTORY_PATH, &[], Some(&body))?;
        expect_success(response)?;
        Ok(())
    }

    /// Fetches the most recent messages of a chat group.
    pub fn get_history(&self, chat_group: &str) -> Result<Vec<Message>, ClientError> {
        self.get_history_page(chat_group, DEFAULT_HISTORY_LIMIT, 0)
    }

    /// Fetches one page of a chat group's history.
    pub fn get_history_page(
        &self,
        chat_group: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Message>, ClientError> {
        let query = history_query(&self.assistant, chat_group, limit, offset);
        let response = self
            .transport
            .request(Method::GET, HISTORY_PATH, &query, None)?;
        let data: HistoryData = expect_data(response)?;
        Ok(data.messages)
    }

    /// Permanently erases a chat group's history.
    ///
    /// Refuses without a network call unless `confirm` is true.
    pub fn erase_history(&self, chat_group: &str, confirm: bool) -> Result<(), ClientError> {
        erase_guard(confirm)?;
        let query = vec![
            ("assistant", self.assistant.clone()),
            ("chat_group", chat_group.to_string()),
        ];
        let response = self
            .transport
            .request(Method::DELETE, HISTORY_PATH, &query, None)?;
        expect_success(response)?;
        Ok(())
    }
}

/// Blocking event stream returned by [`Chat::stream`].
pub struct MessageStream {
    chunks: Option<ByteChunks>,
    assembler: EventAssembler,
    ready: VecDeque<MessageStreamEvent>,
    failed: bool,
}

impl MessageStream {
    fn new(chunks: ByteChunks) -> Self {
        Self {
            chunks: Some(chunks),
            assembler: EventAssembler::new(),
            ready: VecDeque::new(),
            failed: false,
        }
    }
}

impl Iterator for MessageStream {
    type Item = Result<MessageStreamEvent, ClientError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.ready.pop_front() {
                if event.stream_ended {
                    self.chunks = None;
                }
                return Some(Ok(event));
            }
            if self.failed {
                return None;
            }
            let chunks = self.chunks.as_mut()?;
            match chunks.next() {
                Some(Ok(chunk)) => match self.assembler.on_chunk(&chunk) {
                    Ok(events) => self.ready.extend(events),
                    Err(e) => {
                        self.failed = true;
                        self.chunks = None;
                        return Some(Err(e));
                    }
                },
                Some(Err(e)) => {
                    self.failed = true;
                    self.chunks = None;
                    return Some(Err(e));
                }
                None => {
                    self.chunks = None;
                    match self.assembler.on_end() {
                        Ok(Some(event)) => self.ready.push_back(event),
                        Ok(None) => return None,
                        Err(e) => {
                            self.failed = true;
                            return Some(Err(e));
                        }
                    }
                }
            }
        }
    }
}

/// Async chat façade for one assistant.
#[derive(Clone)]
pub struct AsyncChat {
    assistant: String,
    transport: Arc<dyn AsyncTransport>,
}

impl AsyncChat {
    pub(crate) fn new(assistant: impl Into<String>, transport: Arc<dyn AsyncTransport>) -> Self {
        Self {
            assistant: assistant.into(),
            transport,
        }
    }

    /// Sends a message with default options and returns the full response.
    pub async fn message(&self, text: &str) -> Result<ReferencedMessage, ClientError> {
        self.message_with(text, &ChatOptions::default()).await
    }

    /// Sends a message and returns the full response.
    pub async fn message_with(
        &self,
        text: &str,
        options: &ChatOptions,
    ) -> Result<ReferencedMessage, ClientError> {
        let body = chat_request_body(&self.assistant, text, options, None)?;
        let response = self
            .transport
            .request(Method::POST, MESSAGE_PATH, &[], Some(&body))
            .await?;
        expect_data(response)
    }

    /// Sends a message with default options and returns the reply parsed
    /// against the requested schema.
    pub async fn structured(
        &self,
        text: &str,
        format: ResponseFormat,
    ) -> Result<StructuredMessage, ClientError> {
        self.structured_with(text, &ChatOptions::default(), format)
            .await
    }

    /// Sends a message and returns the reply parsed against the schema.
    pub async fn structured_with(
        &self,
        text: &str,
        options: &ChatOptions,
        format: ResponseFormat,
    ) -> Result<StructuredMessage, ClientError> {
        let body = chat_request_body(&self.assistant, text, options, Some(format))?;
        let response = self
            .transport
            .request(Method::POST, STRUCTURED_PATH, &[], Some(&body))
            .await?;
        parse_structured(expect_data(response)?)
    }

    /// Sends a message with default options and streams the reply.
    pub async fn stream(&self, text: &str) -> Result<AsyncMessageStream, ClientError> {
        self.stream_with(text, &ChatOptions::default()).await
    }

    /// Sends a message and streams the reply as incremental events.
    pub async fn stream_with(
        &self,
        text: &str,
        options: &ChatOptions,
    ) -> Result<AsyncMessageStream, ClientError> {
        let body = chat_request_body(&self.assistant, text, options, None)?;
        debug!(assistant = %self.assistant, chat_group = %options.chat_group, "opening chat stream");
        let chunks = self.transport.stream(STREAM_PATH, &body).await?;
        Ok(AsyncMessageStream::new(chunks))
    }

    /// Imports messages into the assistant's history.
    pub async fn add_history(&self, messages: &[Message]) -> Result<(), ClientError> {
        let body = serde_json::json!({
            "assistant": self.assistant,
            "messages": messages,
        });
        let response = self
            .transport
            .request(Method::PUT, HISTORY_PATH, &[], Some(&body))
            .await?;
        expect_success(response)?;
        Ok(())
    }

    /// Fetches the most recent messages of a chat group.
    pub async fn get_history(&self, chat_group: &str) -> Result<Vec<Message>, ClientError> {
        self.get_history_page(chat_group, DEFAULT_HISTORY_LIMIT, 0)
            .await
    }

    /// Fetches one page of a chat group's history.
    pub async fn get_history_page(
        &self,
        chat_group: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Message>, ClientError> {
        let query = history_query(&self.assistant, chat_group, limit, offset);
        let response = self
            .transport
            .request(Method::GET, HISTORY_PATH, &query, None)
            .await?;
        let data: HistoryData = expect_data(response)?;
        Ok(data.messages)
    }

    /// Permanently erases a chat group's history.
    ///
    /// Refuses without a network call unless `confirm` is true.
    pub async fn erase_history(&self, chat_group: &str, confirm: bool) -> Result<(), ClientError> {
        erase_guard(confirm)?;
        let query = vec![
            ("assistant", self.assistant.clone()),
            ("chat_group", chat_group.to_string()),
        ];
        let response = self
            .transport
            .request(Method::DELETE, HISTORY_PATH, &query, None)
            .await?;
        expect_success(response)?;
        Ok(())
    }
}

struct AsyncStreamState {
    chunks: Option<ByteChunkStream>,
    assembler: EventAssembler,
    ready: VecDeque<MessageStreamEvent>,
    failed: bool,
}

/// Async event stream returned by [`AsyncChat::stream`].
pub struct AsyncMessageStream {
    inner: Pin<Box<dyn futures::Stream<Item = Result<MessageStreamEvent, ClientError>> + Send>>,
}

impl AsyncMessageStream {
    fn new(chunks: ByteChunkStream) -> Self {
        let state = AsyncStreamState {
            chunks: Some(chunks),
            assembler: EventAssembler::new(),
            ready: VecDeque::new(),
            failed: false,
        };
        // Same state machine as the blocking iterator, driven by unfold.
        let inner = futures::stream::unfold(state, |mut state| async move {
            loop {
                if let Some(event) = state.ready.pop_front() {
                    if event.stream_ended {
                        state.chunks = None;
                    }
                    return Some((Ok(event), state));
                }
                if state.failed {
                    return None;
                }
                let chunks = state.chunks.as_mut()?;
                match chunks.next().await {
                    Some(Ok(chunk)) => match state.assembler.on_chunk(&chunk) {
                        Ok(events) => state.ready.extend(events),
                        Err(e) => {
                            state.failed = true;
                            state.chunks = None;
                            return Some((Err(e), state));
                        }
                    },
                    Some(Err(e)) => {
                        state.failed = true;
                        state.chunks = None;
                        return Some((Err(e), state));
                    }
                    None => {
                        state.chunks = None;
                        match state.assembler.on_end() {
                            Ok(Some(event)) => state.ready.push_back(event),
                            Ok(None) => return None,
                            Err(e) => {
                                state.failed = true;
                                return Some((Err(e), state));
                            }
                        }
                    }
                }
            }
        });
        Self {
            inner: Box::pin(inner),
        }
    }

    /// Returns the next event, or `None` once the stream is finished.
    pub async fn next_event(&mut self) -> Option<Result<MessageStreamEvent, ClientError>> {
        self.inner.next().await
    }
}

impl futures::Stream for AsyncMessageStream {
    type Item = Result<MessageStreamEvent, ClientError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeAsyncTransport, FakeTransport, envelope, event_json, stream_bytes};
    use crate::types::{JsonSchema, JsonSchemaConfig};
    use bytes::Bytes;

    fn referenced_message_json(content: &str) -> serde_json::Value {
        serde_json::json!({
            "assistant": "sam",
            "chat_group": "default",
            "name": null,
            "timestamp": 1700000000.0,
            "content": content,
            "author": "assistant",
            "tool_calls": null,
            "references": {"memory_ids": [], "message_ids": []}
        })
    }

    fn chat(transport: &Arc<FakeTransport>) -> Chat {
        Chat::new("sam", Arc::clone(transport) as Arc<dyn Transport>)
    }

    #[test]
    fn message_posts_request_and_parses_reply() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_response(200, envelope(referenced_message_json("Hello there")));

        let reply = chat(&transport).message("Hi").expect("reply");
        assert_eq!(reply.content(), "Hello there");

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(calls[0].path, MESSAGE_PATH);
        let body = calls[0].body.as_ref().expect("body");
        assert_eq!(body["message"]["assistant"], "sam");
        assert_eq!(body["message"]["chat_group"], "default");
        assert_eq!(body["message"]["author"], "user");
        assert_eq!(body["memory_config"]["use_memory"], true);
        assert!(body.get("response_config").is_none());
    }

    #[test]
    fn options_flow_into_the_request_body() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_response(200, envelope(referenced_message_json("ok")));

        let options = ChatOptions::default()
            .chat_group("support-42")
            .username("dana")
            .character("a calm senior agent")
            .add_to_memory(false);
        chat(&transport).message_with("Hi", &options).expect("reply");

        let body = transport.calls()[0].body.clone().expect("body");
        assert_eq!(body["message"]["chat_group"], "support-42");
        assert_eq!(body["message"]["name"], "dana");
        assert_eq!(body["response_config"]["character"], "a calm senior agent");
        assert_eq!(body["memory_config"]["add_to_memory"], false);
    }

    #[test]
    fn empty_message_text_is_rejected_locally() {
        let transport = Arc::new(FakeTransport::new());
        let err = chat(&transport).message("   ").err().expect("must fail");
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn unknown_assistant_surfaces_the_api_error() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_response(404, "assistant ghost not found");

        let err = chat(&transport).message("Hi").err().expect("must fail");
        assert_eq!(err.code(), Some(404));
        assert!(err.message().contains("not found"));
    }

    #[test]
    fn structured_parses_content_as_json() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_response(
            200,
            envelope(referenced_message_json(r#"{"city":"Oslo","temp":21}"#)),
        );

        let schema = JsonSchema::object(
            [
                ("city".to_string(), JsonSchema::string()),
                ("temp".to_string(), JsonSchema::number()),
            ],
            vec!["city".to_string(), "temp".to_string()],
        );
        let format =
            ResponseFormat::json_schema(JsonSchemaConfig::new("weather", schema).expect("config"));
        let reply = chat(&transport).structured("Weather?", format).expect("reply");
        assert_eq!(reply.data["city"], "Oslo");
        assert_eq!(reply.data["temp"], 21);
        assert_eq!(transport.calls()[0].path, STRUCTURED_PATH);
    }

    #[test]
    fn structured_with_non_json_content_is_a_protocol_error() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_response(200, envelope(referenced_message_json("plain prose")));

        let schema = JsonSchema::object(
            [("ok".to_string(), JsonSchema::boolean())],
            vec!["ok".to_string()],
        );
        let format =
            ResponseFormat::json_schema(JsonSchemaConfig::new("check", schema).expect("config"));
        let err = chat(&transport)
            .structured("Hi", format)
            .err()
            .expect("must fail");
        assert!(matches!(err, ClientError::Protocol(_)));
    }

    #[test]
    fn stream_yields_events_across_chunk_boundaries() {
        let transport = Arc::new(FakeTransport::new());
        let bytes = stream_bytes(&[
            event_json("The weather ", false),
            event_json("is sunny.", false),
            event_json("", true),
        ]);
        // Split mid-delimiter to exercise reassembly.
        let mid = bytes.len() / 2;
        transport.push_stream(vec![
            Ok(Bytes::copy_from_slice(&bytes[..mid])),
            Ok(Bytes::copy_from_slice(&bytes[mid..])),
        ]);

        let events: Vec<_> = chat(&transport)
            .stream("Weather?")
            .expect("stream")
            .collect::<Result<_, _>>()
            .expect("events");
        assert_eq!(events.len(), 3);
        let text: String = events.iter().map(|e| e.content()).collect();
        assert_eq!(text, "The weather is sunny.");
        assert_eq!(
            events.iter().filter(|e| e.stream_ended).count(),
            1,
            "exactly one terminal event"
        );
        assert!(events[2].references().is_some());
    }

    #[test]
    fn stream_without_terminal_event_errors() {
        let transport = Arc::new(FakeTransport::new());
        let bytes = stream_bytes(&[event_json("partial", false)]);
        transport.push_stream(vec![Ok(Bytes::from(bytes))]);

        let mut stream = chat(&transport).stream("Hi").expect("stream");
        let first = stream.next().expect("event").expect("decoded");
        assert_eq!(first.content(), "partial");
        let err = stream.next().expect("error").err().expect("must fail");
        assert!(err.message().contains("terminal"));
        assert!(stream.next().is_none());
    }

    #[test]
    fn transport_error_mid_stream_surfaces_and_ends_the_stream() {
        let transport = Arc::new(FakeTransport::new());
        let bytes = stream_bytes(&[event_json("a", false)]);
        transport.push_stream(vec![
            Ok(Bytes::from(bytes)),
            Err(ClientError::Timeout("read timed out".into())),
        ]);

        let mut stream = chat(&transport).stream("Hi").expect("stream");
        let err = stream
            .find_map(|item| item.err())
            .expect("error must surface");
        assert!(matches!(err, ClientError::Timeout(_)));
        assert!(stream.next().is_none());
    }

    #[test]
    fn back_to_back_streams_do_not_share_state() {
        let transport = Arc::new(FakeTransport::new());
        // First stream leaves an undelimited partial frame behind.
        transport.push_stream(vec![Ok(Bytes::from_static(b"data: {\"assist"))]);
        transport.push_stream(vec![Ok(Bytes::from(stream_bytes(&[event_json(
            "clean", true,
        )])))]);

        let chat = chat(&transport);
        let first: Vec<_> = chat.stream("one").expect("stream").collect();
        assert!(first.iter().any(|item| item.is_err()));

        let second: Vec<_> = chat
            .stream("two")
            .expect("stream")
            .collect::<Result<_, _>>()
            .expect("second stream is clean");
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].content(), "clean");
    }

    #[test]
    fn history_round_trip_uses_query_parameters() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_response(
            200,
            envelope(serde_json::json!({
                "messages": [{
                    "assistant": "sam",
                    "chat_group": "default",
                    "timestamp": 1700000000.0,
                    "content": "hi",
                    "author": "user"
                }]
            })),
        );

        let messages = chat(&transport).get_history("default").expect("history");
        assert_eq!(messages.len(), 1);

        let call = &transport.calls()[0];
        assert_eq!(call.method, Method::GET);
        assert_eq!(call.path, HISTORY_PATH);
        assert!(call.query.contains(&("chat_group".into(), "default".into())));
        assert!(call.query.contains(&("limit".into(), "25".into())));
        assert!(call.query.contains(&("offset".into(), "0".into())));
    }

    #[test]
    fn add_history_puts_messages() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_response(200, envelope(serde_json::Value::Null));

        let messages = vec![Message::new("sam", "imported", Author::User)];
        chat(&transport).add_history(&messages).expect("ok");

        let call = &transport.calls()[0];
        assert_eq!(call.method, Method::PUT);
        let body = call.body.as_ref().expect("body");
        assert_eq!(body["assistant"], "sam");
        assert_eq!(body["messages"][0]["content"], "imported");
    }

    #[test]
    fn erase_history_requires_confirmation() {
        let transport = Arc::new(FakeTransport::new());
        let err = chat(&transport)
            .erase_history("default", false)
            .err()
            .expect("must fail");
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(transport.call_count(), 0, "no network call without confirm");

        transport.push_response(200, envelope(serde_json::Value::Null));
        chat(&transport).erase_history("default", true).expect("ok");
        assert_eq!(transport.calls()[0].method, Method::DELETE);
    }

    #[tokio::test]
    async fn async_message_mirrors_blocking_behavior() {
        let transport = Arc::new(FakeAsyncTransport::new());
        transport.push_response(200, envelope(referenced_message_json("Hello")));

        let chat = AsyncChat::new("sam", Arc::clone(&transport) as Arc<dyn AsyncTransport>);
        let reply = chat.message("Hi").await.expect("reply");
        assert_eq!(reply.content(), "Hello");
        assert_eq!(transport.calls()[0].path, MESSAGE_PATH);
    }

    #[tokio::test]
    async fn async_stream_yields_events_in_order() {
        let transport = Arc::new(FakeAsyncTransport::new());
        let bytes = stream_bytes(&[
            event_json("Hel", false),
            event_json("lo", false),
            event_json("", true),
        ]);
        let mid = bytes.len() / 3;
        transport.push_stream(vec![
            Ok(Bytes::copy_from_slice(&bytes[..mid])),
            Ok(Bytes::copy_from_slice(&bytes[mid..])),
        ]);

        let chat = AsyncChat::new("sam", Arc::clone(&transport) as Arc<dyn AsyncTransport>);
        let mut stream = chat.stream("Hi").await.expect("stream");
        let mut text = String::new();
        let mut terminal_count = 0;
        while let Some(event) = stream.next_event().await {
            let event = event.expect("event");
            text.push_str(event.content());
            if event.stream_ended {
                terminal_count += 1;
            }
        }
        assert_eq!(text, "Hello");
        assert_eq!(terminal_count, 1);
    }

    #[tokio::test]
    async fn async_stream_without_terminal_event_errors() {
        let transport = Arc::new(FakeAsyncTransport::new());
        let bytes = stream_bytes(&[event_json("only", false)]);
        transport.push_stream(vec![Ok(Bytes::from(bytes))]);

        let chat = AsyncChat::new("sam", Arc::clone(&transport) as Arc<dyn AsyncTransport>);
        let mut stream = chat.stream("Hi").await.expect("stream");
        stream.next_event().await.expect("first").expect("decoded");
        let err = stream
            .next_event()
            .await
            .expect("error item")
            .err()
            .expect("must fail");
        assert!(matches!(err, ClientError::Protocol(_)));
        assert!(stream.next_event().await.is_none());
    }

    #[tokio::test]
    async fn async_erase_history_requires_confirmation() {
        let transport = Arc::new(FakeAsyncTransport::new());
        let chat = AsyncChat::new("sam", Arc::clone(&transport) as Arc<dyn AsyncTransport>);
        let err = chat
            .erase_history("default", false)
            .await
            .err()
            .expect("must fail");
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(transport.call_count(), 0);
    }
}
