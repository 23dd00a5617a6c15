/// Slack app-level and bot tokens, set after the app is installed.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SlackTokens {
    pub app_token: String,
    pub bot_token: String,
}

/// Credentials issued when a Slack app is created for an assistant.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SlackCredentials {
    pub signing_secret: String,
    pub client_id: String,
    pub client_secret: String,
}

/// State of an assistant's Slack integration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SlackConfig {
    /// Short description shown in the Slack app directory.
    pub description: String,
    /// Message posted when the assistant joins a channel.
    pub greeting: String,
    pub interface: String,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub credentials: Option<SlackCredentials>,
    #[serde(default)]
    pub tokens: Option<SlackTokens>,
}

/// All external interfaces configured for an assistant.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Interfaces {
    #[serde(default)]
    pub slack: Option<SlackConfig>,
}
