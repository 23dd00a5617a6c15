//! Scripted transport fakes shared by the façade tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use bytes::Bytes;
use reqwest::Method;

use crate::errors::ClientError;
use crate::transport::{AsyncTransport, ByteChunkStream, ByteChunks, HttpResponse, Transport};

#[derive(Clone, Debug)]
pub(crate) struct RecordedCall {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<serde_json::Value>,
}

/// Wraps a payload in the standard success envelope.
pub(crate) fn envelope(data: serde_json::Value) -> String {
    serde_json::json!({
        "status": "success",
        "timestamp": 1700000000.0,
        "data": data,
        "message": null
    })
    .to_string()
}

/// One stream event in the wire JSON shape.
pub(crate) fn event_json(content: &str, stream_ended: bool) -> String {
    serde_json::json!({
        "assistant": "sam",
        "chat_group": "default",
        "name": null,
        "timestamp": 1700000000.0,
        "content": content,
        "author": "assistant",
        "tool_calls": null,
        "references": if stream_ended {
            serde_json::json!({"memory_ids": [], "message_ids": []})
        } else {
            serde_json::Value::Null
        },
        "stream_ended": stream_ended
    })
    .to_string()
}

/// Joins frames with the wire delimiter.
pub(crate) fn stream_bytes(frames: &[String]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, frame) in frames.iter().enumerate() {
        if i > 0 {
            out.extend_from_slice(b"\n\n");
        }
        out.extend_from_slice(b"data: ");
        out.extend_from_slice(frame.as_bytes());
    }
    out
}

#[derive(Default)]
struct Script {
    responses: VecDeque<HttpResponse>,
    streams: VecDeque<Vec<Result<Bytes, ClientError>>>,
    calls: Vec<RecordedCall>,
}

impl Script {
    fn record(
        &mut self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) {
        self.calls.push(RecordedCall {
            method,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body: body.cloned(),
        });
    }
}

/// Blocking transport double driven by scripted responses.
#[derive(Default)]
pub(crate) struct FakeTransport {
    script: Mutex<Script>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_response(&self, status: u16, body: impl Into<String>) {
        self.script.lock().unwrap().responses.push_back(HttpResponse {
            status,
            body: body.into(),
        });
    }

    pub(crate) fn push_stream(&self, chunks: Vec<Result<Bytes, ClientError>>) {
        self.script.lock().unwrap().streams.push_back(chunks);
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.script.lock().unwrap().calls.clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.script.lock().unwrap().calls.len()
    }
}

impl Transport for FakeTransport {
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, ClientError> {
        let mut script = self.script.lock().unwrap();
        script.record(method, path, query, body);
        Ok(script.responses.pop_front().expect("no scripted response"))
    }

    fn stream(&self, path: &str, body: &serde_json::Value) -> Result<ByteChunks, ClientError> {
        let mut script = self.script.lock().unwrap();
        script.record(Method::POST, path, &[], Some(body));
        let chunks = script.streams.pop_front().expect("no scripted stream");
        Ok(Box::new(chunks.into_iter()))
    }
}

/// Async transport double driven by scripted responses.
#[derive(Default)]
pub(crate) struct FakeAsyncTransport {
    script: Mutex<Script>,
}

impl FakeAsyncTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_response(&self, status: u16, body: impl Into<String>) {
        self.script.lock().unwrap().responses.push_back(HttpResponse {
            status,
            body: body.into(),
        });
    }

    pub(crate) fn push_stream(&self, chunks: Vec<Result<Bytes, ClientError>>) {
        self.script.lock().unwrap().streams.push_back(chunks);
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.script.lock().unwrap().calls.clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.script.lock().unwrap().calls.len()
    }
}

#[async_trait::async_trait]
impl AsyncTransport for FakeAsyncTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, ClientError> {
        let mut script = self.script.lock().unwrap();
        script.record(method, path, query, body);
        Ok(script.responses.pop_front().expect("no scripted response"))
    }

    async fn stream(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ByteChunkStream, ClientError> {
        let mut script = self.script.lock().unwrap();
        script.record(Method::POST, path, &[], Some(body));
        let chunks = script.streams.pop_front().expect("no scripted stream");
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}
