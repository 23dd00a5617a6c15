use uuid::Uuid;

use crate::errors::ClientError;
use crate::types::chat::{UnixTimestamp, now_timestamp};

/// Maximum length of a memory item's content, in bytes.
pub const MAX_MEMORY_CONTENT: usize = 4000;

/// Modality of a memory item. Only text is currently produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    #[default]
    Text,
    Image,
    Audio,
    Video,
}

/// A single unit of an assistant's long-term memory.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MemoryItem {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub assistant: String,
    pub content: String,
    #[serde(default = "now_timestamp")]
    pub timestamp: UnixTimestamp,
    #[serde(rename = "type", default)]
    pub kind: MemoryKind,
    /// Provenance label, e.g. a document name or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Similarity score set by recall; absent on stored items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f32>,
}

impl MemoryItem {
    /// Creates a text memory, timestamped now.
    pub fn new(
        assistant: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let content = content.into();
        if content.len() > MAX_MEMORY_CONTENT {
            return Err(ClientError::validation(format!(
                "memory content must be at most {MAX_MEMORY_CONTENT} bytes"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            assistant: assistant.into(),
            content,
            timestamp: now_timestamp(),
            kind: MemoryKind::default(),
            source: None,
            relevance: None,
        })
    }

    /// Sets the provenance label.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}
