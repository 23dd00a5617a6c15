//! Long-term memory operations: semantic recall, direct CRUD, and sharing
//! memory collections between assistants.

use std::sync::Arc;

use reqwest::Method;
use tracing::debug;
use uuid::Uuid;

use crate::errors::ClientError;
use crate::transport::{AsyncTransport, Transport};
use crate::types::MemoryItem;
use crate::types::api::{expect_data, expect_success};

const RECALL_PATH: &str = "/assistant/memory/recall";
const GET_PATH: &str = "/assistant/memory/get";
const ADD_PATH: &str = "/assistant/memory/add";
const DELETE_PATH: &str = "/assistant/memory/delete";

/// Maximum number of memories one recall may return.
pub const MAX_RECALL_LIMIT: u32 = 500;
/// Maximum recall query length, in bytes.
pub const MAX_QUERY_LEN: usize = 1900;

fn recall_body(assistant: &str, query: &str, limit: u32) -> Result<serde_json::Value, ClientError> {
    if query.trim().is_empty() {
        return Err(ClientError::validation("recall query must not be empty"));
    }
    if query.len() > MAX_QUERY_LEN {
        return Err(ClientError::validation(format!(
            "recall query must be at most {MAX_QUERY_LEN} bytes"
        )));
    }
    if limit == 0 || limit > MAX_RECALL_LIMIT {
        return Err(ClientError::validation(format!(
            "recall limit must be between 1 and {MAX_RECALL_LIMIT}"
        )));
    }
    Ok(serde_json::json!({
        "assistant": assistant,
        "query": query,
        "limit": limit,
    }))
}

fn ids_body(assistant: &str, ids: &[Uuid]) -> serde_json::Value {
    serde_json::json!({
        "assistant": assistant,
        "memory_ids": ids,
    })
}

fn attach_guard(assistant: &str, other: &str) -> Result<(), ClientError> {
    if assistant == other {
        return Err(ClientError::validation(
            "an assistant cannot attach its own memory collection",
        ));
    }
    Ok(())
}

#[derive(serde::Deserialize)]
struct MemoriesData {
    memories: Vec<MemoryItem>,
}

#[derive(serde::Deserialize)]
struct MemoryIdsData {
    memory_ids: Vec<Uuid>,
}

/// Blocking memory façade for one assistant.
#[derive(Clone)]
pub struct Memory {
    assistant: String,
    transport: Arc<dyn Transport>,
}

impl Memory {
    pub(crate) fn new(assistant: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            assistant: assistant.into(),
            transport,
        }
    }

    /// Recalls the memories most relevant to a query.
    ///
    /// Results carry a `relevance` score and are ordered most relevant first.
    pub fn recall(&self, query: &str, limit: u32) -> Result<Vec<MemoryItem>, ClientError> {
        let body = recall_body(&self.assistant, query, limit)?;
        debug!(assistant = %self.assistant, limit, "recalling memories");
        let response = self
            .transport
            .request(Method::POST, RECALL_PATH, &[], Some(&body))?;
        let data: MemoriesData = expect_data(response)?;
        Ok(data.memories)
    }

    /// Fetches specific memories by id.
    pub fn get(&self, ids: &[Uuid]) -> Result<Vec<MemoryItem>, ClientError> {
        let body = ids_body(&self.assistant, ids);
        let response = self
            .transport
            .request(Method::POST, GET_PATH, &[], Some(&body))?;
        let data: MemoriesData = expect_data(response)?;
        Ok(data.memories)
    }

    /// Stores new memories.
    pub fn add(&self, items: &[MemoryItem]) -> Result<(), ClientError> {
        let body = serde_json::json!({
            "assistant": self.assistant,
            "memories": items,
        });
        let response = self
            .transport
            .request(Method::POST, ADD_PATH, &[], Some(&body))?;
        expect_success(response)?;
        Ok(())
    }

    /// Permanently deletes memories by id.
    pub fn delete(&self, ids: &[Uuid]) -> Result<(), ClientError> {
        let body = ids_body(&self.assistant, ids);
        let response = self
            .transport
            .request(Method::POST, DELETE_PATH, &[], Some(&body))?;
        expect_success(response)?;
        Ok(())
    }

    /// Lists the ids of every memory the assistant owns.
    pub fn list(&self) -> Result<Vec<Uuid>, ClientError> {
        let path = format!("/assistant/memory/list/{}", self.assistant);
        let response = self.transport.request(Method::GET, &path, &[], None)?;
        let data: MemoryIdsData = expect_data(response)?;
        Ok(data.memory_ids)
    }

    /// Makes another assistant's memory collection readable by this one.
    pub fn attach_memories(&self, other_assistant: &str) -> Result<(), ClientError> {
        attach_guard(&self.assistant, other_assistant)?;
        let path = format!(
            "/assistant/memory/attach/{}/{}",
            self.assistant, other_assistant
        );
        let response = self.transport.request(Method::PUT, &path, &[], None)?;
        expect_success(response)?;
        Ok(())
    }

    /// Detaches a previously attached memory collection.
    pub fn detach_memories(&self, other_assistant: &str) -> Result<(), ClientError> {
        let path = format!(
            "/assistant/memory/detach/{}/{}",
            self.assistant, other_assistant
        );
        let response = self.transport.request(Method::DELETE, &path, &[], None)?;
        expect_success(response)?;
        Ok(())
    }
}

/// Async memory façade for one assistant.
#[derive(Clone)]
pub struct AsyncMemory {
    assistant: String,
    transport: Arc<dyn AsyncTransport>,
}

impl AsyncMemory {
    pub(crate) fn new(assistant: impl Into<String>, transport: Arc<dyn AsyncTransport>) -> Self {
        Self {
            assistant: assistant.into(),
            transport,
        }
    }

    /// Recalls the memories most relevant to a query.
    pub async fn recall(&self, query: &str, limit: u32) -> Result<Vec<MemoryItem>, ClientError> {
        let body = recall_body(&self.assistant, query, limit)?;
        debug!(assistant = %self.assistant, limit, "recalling memories");
        let response = self
            .transport
            .request(Method::POST, RECALL_PATH, &[], Some(&body))
            .await?;
        let data: MemoriesData = expect_data(response)?;
        Ok(data.memories)
    }

    /// Fetches specific memories by id.
    pub async fn get(&self, ids: &[Uuid]) -> Result<Vec<MemoryItem>, ClientError> {
        let body = ids_body(&self.assistant, ids);
        let response = self
            .transport
            .request(Method::POST, GET_PATH, &[], Some(&body))
            .await?;
        let data: MemoriesData = expect_data(response)?;
        Ok(data.memories)
    }

    /// Stores new memories.
    pub async fn add(&self, items: &[MemoryItem]) -> Result<(), ClientError> {
        let body = serde_json::json!({
            "assistant": self.assistant,
            "memories": items,
        });
        let response = self
            .transport
            .request(Method::POST, ADD_PATH, &[], Some(&body))
            .await?;
        expect_success(response)?;
        Ok(())
    }

    /// Permanently deletes memories by id.
    pub async fn delete(&self, ids: &[Uuid]) -> Result<(), ClientError> {
        let body = ids_body(&self.assistant, ids);
        let response = self
            .transport
            .request(Method::POST, DELETE_PATH, &[], Some(&body))
            .await?;
        expect_success(response)?;
        Ok(())
    }

    /// Lists the ids of every memory the assistant owns.
    pub async fn list(&self) -> Result<Vec<Uuid>, ClientError> {
        let path = format!("/assistant/memory/list/{}", self.assistant);
        let response = self.transport.request(Method::GET, &path, &[], None).await?;
        let data: MemoryIdsData = expect_data(response)?;
        Ok(data.memory_ids)
    }

    /// Makes another assistant's memory collection readable by this one.
    pub async fn attach_memories(&self, other_assistant: &str) -> Result<(), ClientError> {
        attach_guard(&self.assistant, other_assistant)?;
        let path = format!(
            "/assistant/memory/attach/{}/{}",
            self.assistant, other_assistant
        );
        let response = self.transport.request(Method::PUT, &path, &[], None).await?;
        expect_success(response)?;
        Ok(())
    }

    /// Detaches a previously attached memory collection.
    pub async fn detach_memories(&self, other_assistant: &str) -> Result<(), ClientError> {
        let path = format!(
            "/assistant/memory/detach/{}/{}",
            self.assistant, other_assistant
        );
        let response = self
            .transport
            .request(Method::DELETE, &path, &[], None)
            .await?;
        expect_success(response)?;
        Ok(())
    }
}
