//! Wire types for the route bodies.
//!
//! Request shapes match what the HTTP layer of an OpenAI-compatible server
//! would accept, so a raw `--body` payload written against that API works
//! here unchanged.

use serde::{Deserialize, Serialize};

use soloserve_core::Message;

// === Chat completions ===

/// Chat completion request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    /// Messages in the conversation.
    pub messages: Vec<Message>,
    /// Whether to stream the response.
    #[serde(default)]
    pub stream: bool,
    /// Model override. The CLI always serves the loaded model; accepted for
    /// body compatibility.
    #[serde(default)]
    pub model: Option<String>,
}

/// Chat completion response.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionResponse {
    /// Response ID.
    pub id: String,
    /// Object type ("chat.completion").
    pub object: String,
    /// Creation timestamp (Unix epoch).
    pub created: i64,
    /// Model used.
    pub model: String,
    /// Generated choices.
    pub choices: Vec<ChatChoice>,
    /// Token usage statistics.
    pub usage: Usage,
}

/// A chat completion choice.
#[derive(Debug, Clone, Serialize)]
pub struct ChatChoice {
    /// Choice index.
    pub index: u32,
    /// Generated message.
    pub message: Message,
    /// Finish reason.
    pub finish_reason: String,
}

// === Text completions ===

/// Text completion request.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionRequest {
    /// The prompt to complete.
    pub prompt: String,
    /// Whether to stream the response.
    #[serde(default)]
    pub stream: bool,
    /// Model override, accepted for body compatibility.
    #[serde(default)]
    pub model: Option<String>,
}

/// Text completion response.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionResponse {
    /// Response ID.
    pub id: String,
    /// Object type ("text_completion").
    pub object: String,
    /// Creation timestamp.
    pub created: i64,
    /// Model used.
    pub model: String,
    /// Generated choices.
    pub choices: Vec<CompletionChoice>,
    /// Token usage.
    pub usage: Usage,
}

/// A text completion choice.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionChoice {
    /// Generated text.
    pub text: String,
    /// Choice index.
    pub index: u32,
    /// Finish reason.
    pub finish_reason: String,
}

// === Embeddings ===

/// Embedding request.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingRequest {
    /// Input text(s) to embed.
    pub input: EmbeddingInput,
    /// Model override, accepted for body compatibility.
    #[serde(default)]
    pub model: Option<String>,
}

/// Embedding input, single string or array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    /// Single text input.
    Single(String),
    /// Multiple text inputs.
    Multiple(Vec<String>),
}

impl EmbeddingInput {
    /// Returns the inputs as an owned list.
    #[must_use]
    pub fn into_texts(self) -> Vec<String> {
        match self {
            Self::Single(s) => vec![s],
            Self::Multiple(v) => v,
        }
    }
}

/// Embedding response.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingResponse {
    /// Object type ("list").
    pub object: String,
    /// Embedding data.
    pub data: Vec<EmbeddingData>,
    /// Model used.
    pub model: String,
}

/// A single embedding result.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingData {
    /// Object type ("embedding").
    pub object: String,
    /// Index in the input array.
    pub index: u32,
    /// The embedding vector.
    pub embedding: Vec<f32>,
}

// === Rerank ===

/// Rerank request.
#[derive(Debug, Clone, Deserialize)]
pub struct RerankRequest {
    /// Query to score documents against.
    pub query: String,
    /// Candidate documents.
    pub documents: Vec<String>,
    /// Cutoff for the ranked list. Absent means no cutoff.
    #[serde(default)]
    pub top_n: Option<u32>,
    /// Model override, accepted for body compatibility.
    #[serde(default)]
    pub model: Option<String>,
}

/// Rerank response.
#[derive(Debug, Clone, Serialize)]
pub struct RerankResponse {
    /// Model used.
    pub model: String,
    /// Ranked results, best first.
    pub results: Vec<RerankResult>,
}

/// One ranked document.
#[derive(Debug, Clone, Serialize)]
pub struct RerankResult {
    /// Index of the document in the request.
    pub index: usize,
    /// Relevance score, higher is better.
    pub relevance_score: f32,
}

// === Tokenization ===

/// Tokenize request.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenizeRequest {
    /// Text to tokenize.
    pub content: String,
}

/// Tokenize response.
#[derive(Debug, Clone, Serialize)]
pub struct TokenizeResponse {
    /// Token ids.
    pub tokens: Vec<u32>,
}

/// Detokenize request.
#[derive(Debug, Clone, Deserialize)]
pub struct DetokenizeRequest {
    /// Token ids to reassemble.
    pub tokens: Vec<u32>,
}

/// Detokenize response.
#[derive(Debug, Clone, Serialize)]
pub struct DetokenizeResponse {
    /// Reassembled text.
    pub content: String,
}

// === Template ===

/// Apply-template request.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplyTemplateRequest {
    /// Messages to render.
    pub messages: Vec<Message>,
}

/// Apply-template response.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyTemplateResponse {
    /// Rendered prompt.
    pub prompt: String,
}

// === Common ===

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated.
    pub completion_tokens: u32,
    /// Total tokens.
    pub total_tokens: u32,
}

impl Usage {
    /// Creates new usage statistics.
    #[must_use]
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Error body served for failed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error detail.
    pub error: ErrorDetail,
}

/// Error detail carried in [`ErrorResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable message.
    pub message: String,
    /// Machine-readable error class.
    #[serde(rename = "type")]
    pub error_type: String,
}

impl ErrorResponse {
    /// Creates an error body.
    #[must_use]
    pub fn new(message: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                error_type: error_type.into(),
            },
        }
    }

    /// Serializes the body, falling back to a fixed string if serialization
    /// itself fails.
    #[must_use]
    pub fn to_body(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":{"message":"internal error","type":"server_error"}}"#.to_string())
    }
}
