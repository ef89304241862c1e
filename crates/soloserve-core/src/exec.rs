//! The in-process request/response pair exchanged with route handlers.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;

use crate::cancel::CancelToken;
use crate::error::Result;

/// The request handed to a route handler.
///
/// Mirrors what the HTTP layer would pass: a target path tag, headers
/// (unused by this front end but part of the handler contract), the
/// serialized JSON body, and the cancellation token the handler may observe.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Target path or operation tag.
    pub path: String,
    /// Request headers. Always empty for CLI invocations.
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body.
    pub body: String,
    /// Cancellation token for cooperative shutdown.
    pub cancel: CancelToken,
}

impl ExecutionRequest {
    /// Creates a request for the given path with the given body.
    #[must_use]
    pub fn new(path: impl Into<String>, body: impl Into<String>, cancel: CancelToken) -> Self {
        Self {
            path: path.into(),
            headers: Vec::new(),
            body: body.into(),
            cancel,
        }
    }
}

/// The response returned from a route handler.
#[derive(Debug)]
pub struct ExecutionResponse {
    /// HTTP-style status code. For streaming responses this is the status
    /// known at handler return; failures inside the stream surface as chunk
    /// errors.
    pub status: u16,
    /// Response payload, finished or streaming.
    pub payload: ResponsePayload,
}

impl ExecutionResponse {
    /// Creates a finished response.
    #[must_use]
    pub fn complete(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            payload: ResponsePayload::Full(body.into()),
        }
    }

    /// Creates a streaming response.
    #[must_use]
    pub fn stream(status: u16, chunks: ChunkStream) -> Self {
        Self {
            status,
            payload: ResponsePayload::Chunks(chunks),
        }
    }

    /// Returns `true` if this response streams its payload.
    #[must_use]
    pub fn is_stream(&self) -> bool {
        matches!(self.payload, ResponsePayload::Chunks(_))
    }
}

/// A response payload, either fully materialized or delivered in chunks.
#[derive(Debug)]
pub enum ResponsePayload {
    /// A single finished body.
    Full(String),
    /// An ordered sequence of raw chunks.
    Chunks(ChunkStream),
}

/// An ordered stream of raw response chunks.
///
/// Chunks are opaque bytes-as-text; for chat/completion streams they carry
/// SSE framing produced by the route layer. The emitter writes each chunk
/// verbatim as it arrives.
pub struct ChunkStream {
    inner: Pin<Box<dyn Stream<Item = Result<String>> + Send>>,
}

impl ChunkStream {
    /// Creates a new `ChunkStream` from a stream of chunks.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<String>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Creates an empty stream.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(futures::stream::empty())
    }

    /// Creates a stream from a sequence of ready chunks.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        Self::new(futures::stream::iter(chunks.into_iter().map(Ok)))
    }

    /// Collects the remaining chunks into a single string.
    ///
    /// # Errors
    ///
    /// Returns the first chunk error encountered.
    pub async fn collect_text(self) -> Result<String> {
        use futures::StreamExt;
        let mut out = String::new();
        let mut stream = self;
        while let Some(chunk) = stream.next().await {
            out.push_str(&chunk?);
        }
        Ok(out)
    }
}

impl Stream for ChunkStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ChunkStream(..)")
    }
}
