//! Teaching operations: feed raw text, web pages, or chat transcripts into
//! the assistant's memory, with chunking and embedding done server-side.

use std::sync::Arc;

use reqwest::Method;
use tracing::info;
use uuid::Uuid;

use crate::errors::ClientError;
use crate::transport::{AsyncTransport, Transport};
use crate::types::Message;
use crate::types::api::{expect_data, expect_success};

const FAST_PATH: &str = "/learn/fast";
const URL_PATH: &str = "/learn/url";
const CHAT_MESSAGES_PATH: &str = "/learn/chat_messages";

fn fast_body(assistant: &str, text: &str) -> Result<serde_json::Value, ClientError> {
    if text.trim().is_empty() {
        return Err(ClientError::validation("teaching text must not be empty"));
    }
    Ok(serde_json::json!({
        "assistant": assistant,
        "text": text,
    }))
}

fn url_body(assistant: &str, url: &str) -> Result<serde_json::Value, ClientError> {
    if url.trim().is_empty() {
        return Err(ClientError::validation("url must not be empty"));
    }
    Ok(serde_json::json!({
        "assistant": assistant,
        "url": url,
    }))
}

fn chat_messages_body(assistant: &str, messages: &[Message]) -> serde_json::Value {
    serde_json::json!({
        "assistant": assistant,
        "messages": messages,
    })
}

#[derive(serde::Deserialize)]
struct LearnedData {
    memory_ids: Vec<Uuid>,
}

/// Blocking teaching façade for one assistant.
///
/// Unlike [`Memory::add`](crate::Memory::add), which stores caller-built
/// items verbatim, these operations hand raw material to the server, which
/// chunks and embeds it and reports the memories it created.
#[derive(Clone)]
pub struct Learning {
    assistant: String,
    transport: Arc<dyn Transport>,
}

impl Learning {
    pub(crate) fn new(assistant: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            assistant: assistant.into(),
            transport,
        }
    }

    /// Teaches the assistant from raw text and returns the ids of the
    /// memories the server created from it.
    pub fn fast(&self, text: &str) -> Result<Vec<Uuid>, ClientError> {
        let body = fast_body(&self.assistant, text)?;
        let response = self
            .transport
            .request(Method::POST, FAST_PATH, &[], Some(&body))?;
        let data: LearnedData = expect_data(response)?;
        info!(assistant = %self.assistant, memories = data.memory_ids.len(), "learned text");
        Ok(data.memory_ids)
    }

    /// Teaches the assistant the content of a web page.
    pub fn from_url(&self, url: &str) -> Result<(), ClientError> {
        let body = url_body(&self.assistant, url)?;
        let response = self
            .transport
            .request(Method::POST, URL_PATH, &[], Some(&body))?;
        expect_success(response)?;
        Ok(())
    }

    /// Teaches the assistant a chat transcript.
    ///
    /// Learned messages stay private to the user named in them, unlike
    /// memories, which every user's conversation can draw on.
    pub fn chat_messages(&self, messages: &[Message]) -> Result<(), ClientError> {
        let body = chat_messages_body(&self.assistant, messages);
        let response = self
            .transport
            .request(Method::POST, CHAT_MESSAGES_PATH, &[], Some(&body))?;
        expect_success(response)?;
        Ok(())
    }
}

/// Async teaching façade for one assistant.
#[derive(Clone)]
pub struct AsyncLearning {
    assistant: String,
    transport: Arc<dyn AsyncTransport>,
}

impl AsyncLearning {
    pub(crate) fn new(assistant: impl Into<String>, transport: Arc<dyn AsyncTransport>) -> Self {
        Self {
            assistant: assistant.into(),
            transport,
        }
    }

    /// Teaches the assistant from raw text and returns the ids of the
    /// memories the server created from it.
    pub async fn fast(&self, text: &str) -> Result<Vec<Uuid>, ClientError> {
        let body = fast_body(&self.assistant, text)?;
        let response = self
            .transport
            .request(Method::POST, FAST_PATH, &[], Some(&body))
            .await?;
        let data: LearnedData = expect_data(response)?;
        info!(assistant = %self.assistant, memories = data.memory_ids.len(), "learned text");
        Ok(data.memory_ids)
    }

    /// Teaches the assistant the content of a web page.
    pub async fn from_url(&self, url: &str) -> Result<(), ClientError> {
        let body = url_body(&self.assistant, url)?;
        let response = self
            .transport
            .request(Method::POST, URL_PATH, &[], Some(&body))
            .await?;
        expect_success(response)?;
        Ok(())
    }

    /// Teaches the assistant a chat transcript.
    pub async fn chat_messages(&self, messages: &[Message]) -> Result<(), ClientError> {
        let body = chat_messages_body(&self.assistant, messages);
        let response = self
            .transport
            .request(Method::POST, CHAT_MESSAGES_PATH, &[], Some(&body))
            .await?;
        expect_success(response)?;
        Ok(())
    }
}
