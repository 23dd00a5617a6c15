use serde::de::DeserializeOwned;

use crate::errors::ClientError;
use crate::transport::HttpResponse;
use crate::types::chat::UnixTimestamp;

/// Outcome flag carried by every API envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

/// Response envelope returned by every buffered endpoint.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ApiContent {
    pub status: ApiStatus,
    pub timestamp: UnixTimestamp,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub message: Option<String>,
}

/// Checks the HTTP status and parses the envelope.
///
/// A non-2xx response becomes `ClientError::Api` carrying the status code and
/// the raw server text.
pub(crate) fn expect_success(response: HttpResponse) -> Result<ApiContent, ClientError> {
    if !response.is_success() {
        return Err(ClientError::api(response.status, response.body));
    }
    response.json()
}

/// Checks the HTTP status and parses the envelope's `data` field into `T`.
pub(crate) fn expect_data<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ClientError> {
    let content = expect_success(response)?;
    serde_json::from_value(content.data)
        .map_err(|e| ClientError::protocol(format!("unexpected response payload: {e}")))
}
