//! Assistant lifecycle and the entry point to the per-assistant façades.

use std::sync::Arc;

use reqwest::Method;
use tracing::info;

use crate::chat::{AsyncChat, Chat};
use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::learning::{AsyncLearning, Learning};
use crate::memory::{AsyncMemory, Memory};
use crate::slack::{AsyncSlackInterface, SlackInterface};
use crate::transport::{AsyncHttpTransport, AsyncTransport, HttpTransport, Transport};
use crate::types::api::{expect_data, expect_success};
use crate::types::{AssistantConfig, InferenceModel};

const ASSISTANT_PATH: &str = "/assistant";
const LIST_PATH: &str = "/assistant/list";
const INSTRUCTIONS_PATH: &str = "/assistant/instructions";
const MODEL_PATH: &str = "/assistant/model";

fn encode_config(config: &AssistantConfig) -> Result<serde_json::Value, ClientError> {
    serde_json::to_value(config)
        .map_err(|e| ClientError::validation(format!("failed to encode assistant config: {e}")))
}

fn delete_guard(confirm: bool) -> Result<(), ClientError> {
    if !confirm {
        return Err(ClientError::validation(
            "the assistant and all its memories will be permanently deleted; \
             set confirm to true to proceed",
        ));
    }
    Ok(())
}

/// A deployed assistant and its blocking operation façades.
///
/// Obtained through [`Assistant::create`] or [`Assistant::load`]; the handle
/// keeps the last server-acknowledged configuration.
pub struct Assistant {
    config: AssistantConfig,
    transport: Arc<dyn Transport>,
    chat: Chat,
    memory: Memory,
    learn: Learning,
    slack: SlackInterface,
}

impl Assistant {
    /// Creates a new assistant, authenticating from `ASHLIGHT_API_KEY`.
    pub fn create(config: AssistantConfig) -> Result<Self, ClientError> {
        Self::create_with(config, &ClientConfig::from_env()?)
    }

    /// Creates a new assistant with explicit client configuration.
    pub fn create_with(
        config: AssistantConfig,
        client: &ClientConfig,
    ) -> Result<Self, ClientError> {
        Self::create_on(config, Arc::new(HttpTransport::new(client)?))
    }

    pub(crate) fn create_on(
        config: AssistantConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        let body = encode_config(&config)?;
        let response = transport.request(Method::POST, ASSISTANT_PATH, &[], Some(&body))?;
        if !response.is_success() {
            return Err(ClientError::api(
                response.status,
                format!("failed to create assistant '{}': {}", config.name, response.body),
            ));
        }
        info!(assistant = %config.name, model = %config.model, "created assistant");
        Ok(Self::assemble(config, transport))
    }

    /// Loads an existing assistant by name, authenticating from
    /// `ASHLIGHT_API_KEY`.
    pub fn load(name: &str) -> Result<Self, ClientError> {
        Self::load_with(name, &ClientConfig::from_env()?)
    }

    /// Loads an existing assistant with explicit client configuration.
    pub fn load_with(name: &str, client: &ClientConfig) -> Result<Self, ClientError> {
        Self::load_on(name, Arc::new(HttpTransport::new(client)?))
    }

    pub(crate) fn load_on(
        name: &str,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        let query = vec![("name", name.to_string())];
        let response = transport.request(Method::GET, ASSISTANT_PATH, &query, None)?;
        if !response.is_success() {
            return Err(ClientError::api(
                response.status,
                format!("failed to load assistant '{name}': {}", response.body),
            ));
        }
        let config: AssistantConfig = expect_data(response)?;
        Ok(Self::assemble(config, transport))
    }

    /// Lists the configurations of every assistant in the account.
    pub fn list() -> Result<Vec<AssistantConfig>, ClientError> {
        Self::list_with(&ClientConfig::from_env()?)
    }

    /// Lists assistants with explicit client configuration.
    pub fn list_with(client: &ClientConfig) -> Result<Vec<AssistantConfig>, ClientError> {
        Self::list_on(&(Arc::new(HttpTransport::new(client)?) as Arc<dyn Transport>))
    }

    pub(crate) fn list_on(
        transport: &Arc<dyn Transport>,
    ) -> Result<Vec<AssistantConfig>, ClientError> {
        let response = transport.request(Method::GET, LIST_PATH, &[], None)?;
        expect_data(response)
    }

    fn assemble(config: AssistantConfig, transport: Arc<dyn Transport>) -> Self {
        let name = config.name.clone();
        Self {
            chat: Chat::new(&name, Arc::clone(&transport)),
            memory: Memory::new(&name, Arc::clone(&transport)),
            learn: Learning::new(&name, Arc::clone(&transport)),
            slack: SlackInterface::new(&name, Arc::clone(&transport)),
            config,
            transport,
        }
    }

    /// Returns the last server-acknowledged configuration.
    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Chat operations.
    pub fn chat(&self) -> &Chat {
        &self.chat
    }

    /// Memory operations.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Teaching operations.
    pub fn learn(&self) -> &Learning {
        &self.learn
    }

    /// Slack interface operations.
    pub fn slack(&self) -> &SlackInterface {
        &self.slack
    }

    /// Permanently deletes the assistant and everything it owns.
    ///
    /// Refuses without a network call unless `confirm` is true. Consumes the
    /// handle; a deleted assistant cannot be operated on.
    pub fn delete(self, confirm: bool) -> Result<(), ClientError> {
        delete_guard(confirm)?;
        let query = vec![("name", self.config.name.clone())];
        let response = self
            .transport
            .request(Method::DELETE, ASSISTANT_PATH, &query, None)?;
        expect_success(response)?;
        info!(assistant = %self.config.name, "deleted assistant");
        Ok(())
    }

    /// Replaces the assistant's instructions.
    ///
    /// Validates locally first; the handle's config is updated only after the
    /// server acknowledges.
    pub fn update_instructions(
        &mut self,
        instructions: impl Into<String>,
    ) -> Result<(), ClientError> {
        let updated = self.config.with_instructions(instructions)?;
        let body = serde_json::json!({
            "assistant": self.config.name,
            "instructions": updated.instructions,
        });
        let response = self
            .transport
            .request(Method::PUT, INSTRUCTIONS_PATH, &[], Some(&body))?;
        expect_success(response)?;
        self.config = updated;
        Ok(())
    }

    /// Switches the assistant to a different inference model.
    pub fn update_model(&mut self, model: InferenceModel) -> Result<(), ClientError> {
        let body = serde_json::json!({
            "assistant": self.config.name,
            "model": model,
        });
        let response = self
            .transport
            .request(Method::PUT, MODEL_PATH, &[], Some(&body))?;
        expect_success(response)?;
        self.config = self.config.with_model(model);
        Ok(())
    }
}

/// A deployed assistant and its async operation façades.
pub struct AsyncAssistant {
    config: AssistantConfig,
    transport: Arc<dyn AsyncTransport>,
    chat: AsyncChat,
    memory: AsyncMemory,
    learn: AsyncLearning,
    slack: AsyncSlackInterface,
}

impl AsyncAssistant {
    /// Creates a new assistant, authenticating from `ASHLIGHT_API_KEY`.
    pub async fn create(config: AssistantConfig) -> Result<Self, ClientError> {
        Self::create_with(config, &ClientConfig::from_env()?).await
    }

    /// Creates a new assistant with explicit client configuration.
    pub async fn create_with(
        config: AssistantConfig,
        client: &ClientConfig,
    ) -> Result<Self, ClientError> {
        Self::create_on(config, Arc::new(AsyncHttpTransport::new(client)?)).await
    }

    pub(crate) async fn create_on(
        config: AssistantConfig,
        transport: Arc<dyn AsyncTransport>,
    ) -> Result<Self, ClientError> {
        let body = encode_config(&config)?;
        let response = transport
            .request(Method::POST, ASSISTANT_PATH, &[], Some(&body))
            .await?;
        if !response.is_success() {
            return Err(ClientError::api(
                response.status,
                format!("failed to create assistant '{}': {}", config.name, response.body),
            ));
        }
        info!(assistant = %config.name, model = %config.model, "created assistant");
        Ok(Self::assemble(config, transport))
    }

    /// Loads an existing assistant by name, authenticating from
    /// `ASHLIGHT_API_KEY`.
    pub async fn load(name: &str) -> Result<Self, ClientError> {
        Self::load_with(name, &ClientConfig::from_env()?).await
    }

    /// Loads an existing assistant with explicit client configuration.
    pub async fn load_with(name: &str, client: &ClientConfig) -> Result<Self, ClientError> {
        Self::load_on(name, Arc::new(AsyncHttpTransport::new(client)?)).await
    }

    pub(crate) async fn load_on(
        name: &str,
        transport: Arc<dyn AsyncTransport>,
    ) -> Result<Self, ClientError> {
        let query = vec![("name", name.to_string())];
        let response = transport
            .request(Method::GET, ASSISTANT_PATH, &query, None)
            .await?;
        if !response.is_success() {
            return Err(ClientError::api(
                response.status,
                format!("failed to load assistant '{name}': {}", response.body),
            ));
        }
        let config: AssistantConfig = expect_data(response)?;
        Ok(Self::assemble(config, transport))
    }

    /// Lists the configurations of every assistant in the account.
    pub async fn list() -> Result<Vec<AssistantConfig>, ClientError> {
        Self::list_with(&ClientConfig::from_env()?).await
    }

    /// Lists assistants with explicit client configuration.
    pub async fn list_with(client: &ClientConfig) -> Result<Vec<AssistantConfig>, ClientError> {
        Self::list_on(&(Arc::new(AsyncHttpTransport::new(client)?) as Arc<dyn AsyncTransport>))
            .await
    }

    pub(crate) async fn list_on(
        transport: &Arc<dyn AsyncTransport>,
    ) -> Result<Vec<AssistantConfig>, ClientError> {
        let response = transport.request(Method::GET, LIST_PATH, &[], None).await?;
        expect_data(response)
    }

    fn assemble(config: AssistantConfig, transport: Arc<dyn AsyncTransport>) -> Self {
        let name = config.name.clone();
        Self {
            chat: AsyncChat::new(&name, Arc::clone(&transport)),
            memory: AsyncMemory::new(&name, Arc::clone(&transport)),
            learn: AsyncLearning::new(&name, Arc::clone(&transport)),
            slack: AsyncSlackInterface::new(&name, Arc::clone(&transport)),
            config,
            transport,
        }
    }

    /// Returns the last server-acknowledged configuration.
    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Chat operations.
    pub fn chat(&self) -> &AsyncChat {
        &self.chat
    }

    /// Memory operations.
    pub fn memory(&self) -> &AsyncMemory {
        &self.memory
    }

    /// Teaching operations.
    pub fn learn(&self) -> &AsyncLearning {
        &self.learn
    }

    /// Slack interface operations.
    pub fn slack(&self) -> &AsyncSlackInterface {
        &self.slack
    }

    /// Permanently deletes the assistant and everything it owns.
    ///
    /// Refuses without a network call unless `confirm` is true.
    pub async fn delete(self, confirm: bool) -> Result<(), ClientError> {
        delete_guard(confirm)?;
        let query = vec![("name", self.config.name.clone())];
        let response = self
            .transport
            .request(Method::DELETE, ASSISTANT_PATH, &query, None)
            .await?;
        expect_success(response)?;
        info!(assistant = %self.config.name, "deleted assistant");
        Ok(())
    }

    /// Replaces the assistant's instructions.
    pub async fn update_instructions(
        &mut self,
        instructions: impl Into<String>,
    ) -> Result<(), ClientError> {
        let updated = self.config.with_instructions(instructions)?;
        let body = serde_json::json!({
            "assistant": self.config.name,
            "instructions": updated.instructions,
        });
        let response = self
            .transport
            .request(Method::PUT, INSTRUCTIONS_PATH, &[], Some(&body))
            .await?;
        expect_success(response)?;
        self.config = updated;
        Ok(())
    }

    /// Switches the assistant to a different inference model.
    pub async fn update_model(&mut self, model: InferenceModel) -> Result<(), ClientError> {
        let body = serde_json::json!({
            "assistant": self.config.name,
            "model": model,
        });
        let response = self
            .transport
            .request(Method::PUT, MODEL_PATH, &[], Some(&body))
            .await?;
        expect_success(response)?;
        self.config = self.config.with_model(model);
        Ok(())
    }
}
