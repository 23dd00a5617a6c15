/// Errors surfaced by every client operation.
///
/// `Config` and `Validation` are raised locally before any network call.
/// `Api` mirrors the HTTP status of a failed remote call (500 when the call
/// never produced a status). `Protocol` marks a response the server should
/// never have sent: a delimited stream frame that is invalid UTF-8/JSON, a
/// stream that ends without a terminal event, or a payload of the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Invalid client configuration, including missing credentials.
    #[error("config error: {0}")]
    Config(String),
    /// Caller-supplied arguments failed a local precondition check.
    #[error("validation error: {0}")]
    Validation(String),
    /// The remote call completed but reported failure.
    #[error("api error (code={code}): {message}")]
    Api { code: u16, message: String },
    /// The server response violated the wire protocol.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// A request or stream read exceeded the configured timeout.
    #[error("timeout: {0}")]
    Timeout(String),
}

impl ClientError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an API error carrying the HTTP status and server text.
    pub fn api(code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Returns the HTTP status code for `Api` errors.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Config(message)
            | Self::Validation(message)
            | Self::Protocol(message)
            | Self::Timeout(message)
            | Self::Api { message, .. } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_carries_status_code() {
        let err = ClientError::api(404, "not found");
        assert_eq!(err.code(), Some(404));
        assert_eq!(err.message(), "not found");
        assert_eq!(err.to_string(), "api error (code=404): not found");
    }

    #[test]
    fn non_api_errors_have_no_code() {
        assert_eq!(ClientError::validation("nope").code(), None);
        assert_eq!(ClientError::protocol("bad frame").code(), None);
    }
}
