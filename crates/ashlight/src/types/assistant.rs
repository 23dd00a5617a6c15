use std::fmt;

use crate::errors::ClientError;
use crate::types::interface::Interfaces;

const MAX_NAME_LEN: usize = 50;
const MIN_INSTRUCTIONS_LEN: usize = 20;

/// Inference model backing an assistant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InferenceModel {
    #[serde(rename = "openai/gpt-4")]
    Gpt4,
    #[serde(rename = "openai/gpt-4-turbo-preview")]
    Gpt4TurboPreview,
    #[default]
    #[serde(rename = "openai/gpt-4o")]
    Gpt4o,
    #[serde(rename = "openai/gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "openai/gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "mistral/mistral-medium")]
    MistralMedium,
    #[serde(rename = "mistral/mistral-small")]
    MistralSmall,
    #[serde(rename = "mistral/mistral-tiny")]
    MistralTiny,
}

impl fmt::Display for InferenceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            Self::Gpt4 => "openai/gpt-4",
            Self::Gpt4TurboPreview => "openai/gpt-4-turbo-preview",
            Self::Gpt4o => "openai/gpt-4o",
            Self::Gpt4oMini => "openai/gpt-4o-mini",
            Self::Gpt35Turbo => "openai/gpt-3.5-turbo",
            Self::MistralMedium => "mistral/mistral-medium",
            Self::MistralSmall => "mistral/mistral-small",
            Self::MistralTiny => "mistral/mistral-tiny",
        };
        f.write_str(id)
    }
}

/// Full configuration of an assistant.
///
/// The name is the assistant's unique identifier; all operations address it
/// by name. Values are validated at construction, so a deserialized or
/// constructed config is always well formed locally.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssistantConfig {
    pub name: String,
    pub instructions: String,
    #[serde(default)]
    pub model: InferenceModel,
    #[serde(default)]
    pub attached_memories: Vec<String>,
    #[serde(default)]
    pub interfaces: Interfaces,
}

impl AssistantConfig {
    /// Creates a validated configuration with the default model.
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let name = name.into();
        let instructions = instructions.into();
        validate_name(&name)?;
        validate_instructions(&instructions)?;
        Ok(Self {
            name,
            instructions,
            model: InferenceModel::default(),
            attached_memories: Vec::new(),
            interfaces: Interfaces::default(),
        })
    }

    /// Returns a copy of this config with new instructions.
    pub fn with_instructions(
        &self,
        instructions: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let instructions = instructions.into();
        validate_instructions(&instructions)?;
        let mut config = self.clone();
        config.instructions = instructions;
        Ok(config)
    }

    /// Returns a copy of this config with a new inference model.
    pub fn with_model(&self, model: InferenceModel) -> Self {
        let mut config = self.clone();
        config.model = model;
        config
    }
}

fn validate_name(name: &str) -> Result<(), ClientError> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(ClientError::validation(format!(
            "assistant name must be 1-{MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_instructions(instructions: &str) -> Result<(), ClientError> {
    if instructions.len() < MIN_INSTRUCTIONS_LEN {
        return Err(ClientError::validation(format!(
            "instructions must be at least {MIN_INSTRUCTIONS_LEN} characters"
        )));
    }
    Ok(())
}
