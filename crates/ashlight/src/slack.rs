//! Slack interface management: app lifecycle, tokens, and deployment.

use std::sync::Arc;

use reqwest::Method;
use tracing::info;

use crate::errors::ClientError;
use crate::transport::{AsyncTransport, Transport};
use crate::types::SlackConfig;
use crate::types::api::{expect_data, expect_success};

const CREATE_APP_PATH: &str = "/assistant/interface/slack/create_app";
const SET_TOKENS_PATH: &str = "/assistant/interface/slack/set_tokens";
const DEPLOY_PATH: &str = "/assistant/interface/slack/deploy";
const REMOVE_DEPLOYMENT_PATH: &str = "/assistant/interface/slack/remove_deployment";
const DELETE_APP_PATH: &str = "/assistant/interface/slack/delete_app";

fn create_app_body(
    assistant: &str,
    description: &str,
    configuration_token: &str,
) -> serde_json::Value {
    serde_json::json!({
        "assistant": assistant,
        "description": description,
        "configuration_token": configuration_token,
    })
}

fn set_tokens_body(assistant: &str, app_token: &str, bot_token: &str) -> serde_json::Value {
    serde_json::json!({
        "assistant": assistant,
        "app_token": app_token,
        "bot_token": bot_token,
    })
}

fn assistant_body(assistant: &str) -> serde_json::Value {
    serde_json::json!({ "assistant": assistant })
}

fn delete_app_body(assistant: &str, configuration_token: &str) -> serde_json::Value {
    serde_json::json!({
        "assistant": assistant,
        "configuration_token": configuration_token,
    })
}

/// Blocking Slack interface façade for one assistant.
///
/// The usual flow: `create_app`, install the app in the workspace, then
/// `set_tokens` and `deploy`.
#[derive(Clone)]
pub struct SlackInterface {
    assistant: String,
    transport: Arc<dyn Transport>,
}

impl SlackInterface {
    pub(crate) fn new(assistant: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            assistant: assistant.into(),
            transport,
        }
    }

    /// Creates a Slack app for the assistant and returns its configuration,
    /// including the credentials needed to install it.
    pub fn create_app(
        &self,
        description: &str,
        configuration_token: &str,
    ) -> Result<SlackConfig, ClientError> {
        let body = create_app_body(&self.assistant, description, configuration_token);
        let response = self
            .transport
            .request(Method::POST, CREATE_APP_PATH, &[], Some(&body))?;
        let config: SlackConfig = expect_data(response)?;
        info!(assistant = %self.assistant, app_id = ?config.app_id, "created slack app");
        Ok(config)
    }

    /// Stores the app-level and bot tokens issued on installation.
    pub fn set_tokens(&self, app_token: &str, bot_token: &str) -> Result<(), ClientError> {
        let body = set_tokens_body(&self.assistant, app_token, bot_token);
        let response = self
            .transport
            .request(Method::POST, SET_TOKENS_PATH, &[], Some(&body))?;
        expect_success(response)?;
        Ok(())
    }

    /// Starts serving the assistant in the Slack workspace.
    pub fn deploy(&self) -> Result<(), ClientError> {
        let body = assistant_body(&self.assistant);
        let response = self
            .transport
            .request(Method::POST, DEPLOY_PATH, &[], Some(&body))?;
        expect_success(response)?;
        info!(assistant = %self.assistant, "deployed to slack");
        Ok(())
    }

    /// Stops serving the assistant without deleting the app.
    pub fn remove_deployment(&self) -> Result<(), ClientError> {
        let body = assistant_body(&self.assistant);
        let response = self
            .transport
            .request(Method::POST, REMOVE_DEPLOYMENT_PATH, &[], Some(&body))?;
        expect_success(response)?;
        Ok(())
    }

    /// Deletes the Slack app entirely.
    pub fn delete_app(&self, configuration_token: &str) -> Result<(), ClientError> {
        let body = delete_app_body(&self.assistant, configuration_token);
        let response = self
            .transport
            .request(Method::POST, DELETE_APP_PATH, &[], Some(&body))?;
        expect_success(response)?;
        info!(assistant = %self.assistant, "deleted slack app");
        Ok(())
    }
}

/// Async Slack interface façade for one assistant.
#[derive(Clone)]
pub struct AsyncSlackInterface {
    assistant: String,
    transport: Arc<dyn AsyncTransport>,
}

impl AsyncSlackInterface {
    pub(crate) fn new(assistant: impl Into<String>, transport: Arc<dyn AsyncTransport>) -> Self {
        Self {
            assistant: assistant.into(),
            transport,
        }
    }

    /// Creates a Slack app for the assistant and returns its configuration.
    pub async fn create_app(
        &self,
        description: &str,
        configuration_token: &str,
    ) -> Result<SlackConfig, ClientError> {
        let body = create_app_body(&self.assistant, description, configuration_token);
        let response = self
            .transport
            .request(Method::POST, CREATE_APP_PATH, &[], Some(&body))
            .await?;
        let config: SlackConfig = expect_data(response)?;
        info!(assistant = %self.assistant, app_id = ?config.app_id, "created slack app");
        Ok(config)
    }

    /// Stores the app-level and bot tokens issued on installation.
    pub async fn set_tokens(&self, app_token: &str, bot_token: &str) -> Result<(), ClientError> {
        let body = set_tokens_body(&self.assistant, app_token, bot_token);
        let response = self
            .transport
            .request(Method::POST, SET_TOKENS_PATH, &[], Some(&body))
            .await?;
        expect_success(response)?;
        Ok(())
    }

    /// Starts serving the assistant in the Slack workspace.
    pub async fn deploy(&self) -> Result<(), ClientError> {
        let body = assistant_body(&self.assistant);
        let response = self
            .transport
            .request(Method::POST, DEPLOY_PATH, &[], Some(&body))
            .await?;
        expect_success(response)?;
        info!(assistant = %self.assistant, "deployed to slack");
        Ok(())
    }

    /// Stops serving the assistant without deleting the app.
    pub async fn remove_deployment(&self) -> Result<(), ClientError> {
        let body = assistant_body(&self.assistant);
        let response = self
            .transport
            .request(Method::POST, REMOVE_DEPLOYMENT_PATH, &[], Some(&body))
            .await?;
        expect_success(response)?;
        Ok(())
    }

    /// Deletes the Slack app entirely.
    pub async fn delete_app(&self, configuration_token: &str) -> Result<(), ClientError> {
        let body = delete_app_body(&self.assistant, configuration_token);
        let response = self
            .transport
            .request(Method::POST, DELETE_APP_PATH, &[], Some(&body))
            .await?;
        expect_success(response)?;
        info!(assistant = %self.assistant, "deleted slack app");
        Ok(())
    }
}
