//! Canonical route operations and alias normalization.

use serde::{Deserialize, Serialize};

/// Canonical identifier for a server route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Chat completions (`/v1/chat/completions`).
    Chat,
    /// Text completions (`/v1/completions`).
    Completion,
    /// Embeddings (`/v1/embeddings`).
    Embedding,
    /// Document reranking (`/v1/rerank`).
    Rerank,
    /// Tokenization.
    Tokenize,
    /// Detokenization.
    Detokenize,
    /// Chat template application without generation.
    ApplyTemplate,
    /// Server/model properties.
    Props,
    /// Health probe.
    Health,
}

impl Operation {
    /// Resolves a free-form operation string to a canonical operation.
    ///
    /// Matching is case-insensitive and accepts the known route aliases
    /// (`chat/completions`, `emb`, `reranking`, `healthz`, ...). Returns
    /// `None` for anything unrecognized; callers surface that as an
    /// unsupported-operation error at dispatch time, keeping the raw user
    /// string intact for the message.
    ///
    /// Normalization is idempotent: every canonical name resolves to itself.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "chat" | "chat/completions" | "chat-completions" | "chat_completion" => {
                Some(Self::Chat)
            }
            "completion" | "completions" | "cmpl" => Some(Self::Completion),
            "embedding" | "emb" | "embeddings" => Some(Self::Embedding),
            "rerank" | "reranking" => Some(Self::Rerank),
            "tokenize" => Some(Self::Tokenize),
            "detokenize" => Some(Self::Detokenize),
            "apply-template" | "apply_template" => Some(Self::ApplyTemplate),
            "props" => Some(Self::Props),
            "health" | "healthz" => Some(Self::Health),
            _ => None,
        }
    }

    /// Returns the canonical name of this operation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Completion => "completion",
            Self::Embedding => "embedding",
            Self::Rerank => "rerank",
            Self::Tokenize => "tokenize",
            Self::Detokenize => "detokenize",
            Self::ApplyTemplate => "apply-template",
            Self::Props => "props",
            Self::Health => "health",
        }
    }

    /// Returns `true` for operations that require the engine to run in
    /// embedding mode (pooled output instead of causal generation).
    #[must_use]
    pub fn needs_embedding_mode(&self) -> bool {
        matches!(self, Self::Embedding | Self::Rerank)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
