use std::io::Read as _;
use std::pin::Pin;

use bytes::Bytes;
use futures::TryStreamExt as _;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::errors::ClientError;

/// Chunk sequence returned by the blocking streaming endpoint.
pub type ByteChunks = Box<dyn Iterator<Item = Result<Bytes, ClientError>> + Send>;

/// Chunk sequence returned by the async streaming endpoint.
pub type ByteChunkStream = Pin<Box<dyn futures::Stream<Item = Result<Bytes, ClientError>> + Send>>;

const STREAM_READ_BUF: usize = 8192;

/// A fully buffered HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body text.
    pub body: String,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body)
            .map_err(|e| ClientError::protocol(format!("invalid response body: {e}")))
    }
}

/// Blocking request execution boundary.
///
/// The SDK issues every network call through this trait so tests can swap in
/// scripted fakes. Non-2xx statuses on `request` are returned as ordinary
/// responses; the façades translate them into `ClientError::Api`.
pub trait Transport: Send + Sync {
    /// Executes a buffered request and returns the full response.
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, ClientError>;

    /// Opens a chunked POST and returns the raw chunk sequence.
    ///
    /// A non-2xx status fails here, before any chunk is yielded.
    fn stream(&self, path: &str, body: &serde_json::Value) -> Result<ByteChunks, ClientError>;
}

/// Async request execution boundary, mirroring [`Transport`].
#[async_trait::async_trait]
pub trait AsyncTransport: Send + Sync {
    /// Executes a buffered request and returns the full response.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, ClientError>;

    /// Opens a chunked POST and returns the raw chunk stream.
    async fn stream(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ByteChunkStream, ClientError>;
}

fn auth_headers(api_key: &str) -> Result<HeaderMap, ClientError> {
    if api_key.trim().is_empty() {
        return Err(ClientError::config("api key must not be empty"));
    }
    let mut value = HeaderValue::from_str(&format!("Bearer {api_key}"))
        .map_err(|_| ClientError::config("api key contains invalid header characters"))?;
    value.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

fn request_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout(e.to_string())
    } else {
        ClientError::api(500, format!("request failed: {e}"))
    }
}

fn read_error(e: std::io::Error) -> ClientError {
    match e.kind() {
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
            ClientError::Timeout(e.to_string())
        }
        _ => ClientError::api(500, format!("stream read failed: {e}")),
    }
}

/// Blocking HTTP transport over `reqwest::blocking`.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    /// Builds a transport from client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .default_headers(auth_headers(&config.api_key)?)
            .build()
            .map_err(|e| ClientError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Transport for HttpTransport {
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, ClientError> {
        let mut request = self.client.request(method, self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().map_err(request_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(request_error)?;
        Ok(HttpResponse { status, body })
    }

    fn stream(&self, path: &str, body: &serde_json::Value) -> Result<ByteChunks, ClientError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::api(status.as_u16(), text));
        }
        Ok(Box::new(BlockingChunks { response }))
    }
}

struct BlockingChunks {
    response: reqwest::blocking::Response,
}

impl Iterator for BlockingChunks {
    type Item = Result<Bytes, ClientError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = [0u8; STREAM_READ_BUF];
        match self.response.read(&mut buf) {
            Ok(0) => None,
            Ok(n) => Some(Ok(Bytes::copy_from_slice(&buf[..n]))),
            Err(e) => Some(Err(read_error(e))),
        }
    }
}

/// Async HTTP transport over `reqwest`.
pub struct AsyncHttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl AsyncHttpTransport {
    /// Builds a transport from client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(auth_headers(&config.api_key)?)
            .build()
            .map_err(|e| ClientError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait::async_trait]
impl AsyncTransport for AsyncHttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, ClientError> {
        let mut request = self.client.request(method, self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(request_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(request_error)?;
        Ok(HttpResponse { status, body })
    }

    async fn stream(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ByteChunkStream, ClientError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::api(status.as_u16(), text));
        }
        Ok(Box::pin(response.bytes_stream().map_err(request_error)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_covers_2xx_only() {
        let ok = HttpResponse {
            status: 204,
            body: String::new(),
        };
        let not_found = HttpResponse {
            status: 404,
            body: "not found".into(),
        };
        assert!(ok.is_success());
        assert!(!not_found.is_success());
    }

    #[test]
    fn empty_api_key_is_a_config_error() {
        let err = HttpTransport::new(&ClientConfig::new("  ")).err().expect("must fail");
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn api_key_with_control_characters_is_rejected() {
        let err = auth_headers("abc\ndef").err().expect("must fail");
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn io_timeout_maps_to_timeout_error() {
        let e = std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out");
        assert!(matches!(read_error(e), ClientError::Timeout(_)));
        let e = std::io::Error::other("connection reset");
        assert!(matches!(read_error(e), ClientError::Api { code: 500, .. }));
    }

    #[test]
    fn invalid_json_body_is_a_protocol_error() {
        let response = HttpResponse {
            status: 200,
            body: "{not json".into(),
        };
        let err = response.json::<serde_json::Value>().err().expect("must fail");
        assert!(matches!(err, ClientError::Protocol(_)));
    }
}
