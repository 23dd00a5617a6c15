use crate::errors::ClientError;

/// Kind of tool exposed to the assistant. Only functions are supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    Function,
}

/// A callable function the assistant may invoke.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema describing the function parameters. The root must be an
    /// object schema with a `properties` mapping.
    pub parameters: serde_json::Value,
}

impl FunctionDefinition {
    /// Creates a validated function definition.
    pub fn new(
        name: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Result<Self, ClientError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ClientError::validation("function name must not be empty"));
        }
        let Some(root) = parameters.as_object() else {
            return Err(ClientError::validation(
                "function parameters must be a JSON object schema",
            ));
        };
        if root.get("type").and_then(|t| t.as_str()) != Some("object") {
            return Err(ClientError::validation(
                "function parameters schema must have \"type\": \"object\"",
            ));
        }
        if !root.get("properties").is_some_and(|p| p.is_object()) {
            return Err(ClientError::validation(
                "function parameters schema must define a 'properties' mapping",
            ));
        }
        Ok(Self {
            name,
            description: None,
            parameters,
        })
    }

    /// Sets the function description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A tool registration sent with a chat request.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tool {
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    pub function: FunctionDefinition,
}

impl Tool {
    /// Wraps a function definition as a tool.
    pub fn function(function: FunctionDefinition) -> Self {
        Self {
            tool_type: ToolType::Function,
            function,
        }
    }
}

/// The function invocation requested by the assistant.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Arguments as a JSON-encoded string, exactly as the provider sent them.
    pub arguments: String,
}

impl FunctionCall {
    /// Parses the argument string as JSON.
    pub fn arguments_json(&self) -> Result<serde_json::Value, ClientError> {
        serde_json::from_str(&self.arguments)
            .map_err(|e| ClientError::protocol(format!("invalid tool call arguments: {e}")))
    }
}

/// A tool invocation attached to an assistant message.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    pub function: FunctionCall,
}
