//! The inference engine collaborator boundary.
//!
//! Model loading, the processing loop, and the numerical behavior of
//! inference live behind [`Engine`]. The pipeline only depends on this
//! trait; the binary ships a deterministic reference implementation and a
//! real engine plugs in the same way.

use std::path::PathBuf;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Parameters handed to the engine at load time.
///
/// Built from the pass-through portion of the command line (the tokens the
/// front scanner did not consume).
#[derive(Debug, Clone)]
pub struct EngineParams {
    /// Path to the model weights.
    pub model: PathBuf,
    /// Display alias for the model. Defaults to the file stem.
    pub model_alias: Option<String>,
    /// Context window size in tokens.
    pub ctx_size: u32,
    /// Number of parallel slots in the processing loop.
    pub parallel: u32,
    /// Run in embedding mode (pooled output instead of causal generation).
    pub embedding: bool,
    /// Prompt supplied through the engine-side `-p/--prompt` flag; the body
    /// builder uses it as fallback text.
    pub prompt: Option<String>,
}

impl EngineParams {
    /// Returns the effective model alias: the explicit alias if set,
    /// otherwise the model file stem.
    #[must_use]
    pub fn alias(&self) -> String {
        self.model_alias.clone().unwrap_or_else(|| {
            self.model
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.model.to_string_lossy().into_owned())
        })
    }
}

/// Metadata about the loaded model, served by the props route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model alias.
    pub id: String,
    /// Path the model was loaded from.
    pub path: PathBuf,
    /// Context window size.
    pub ctx_size: u32,
    /// Parallel slots.
    pub parallel: u32,
    /// Whether the engine runs in embedding mode.
    pub embedding: bool,
}

/// A message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Sender role (`system`, `user`, `assistant`).
    pub role: String,
    /// Message content.
    pub content: String,
}

/// Prompt input accepted by the generation primitives.
#[derive(Debug, Clone)]
pub enum Prompt {
    /// Raw text.
    Text(String),
    /// Chat messages, formatted through the model's template.
    Messages(Vec<Message>),
}

/// A finished generation.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Generated text.
    pub text: String,
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated.
    pub completion_tokens: u32,
}

/// Incremental text deltas produced by streaming generation.
pub type DeltaStream = BoxStream<'static, Result<String>>;

/// A reranked document reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedDocument {
    /// Index of the document in the request order.
    pub index: usize,
    /// Relevance score, higher is more relevant.
    pub relevance_score: f32,
}

/// The inference engine collaborator.
///
/// Lifecycle contract: [`load_model`](Engine::load_model) is called exactly
/// once before the processing loop starts; [`start_loop`](Engine::start_loop)
/// blocks and runs on a dedicated worker thread for the whole run;
/// [`terminate`](Engine::terminate) is safe to call from the foreground
/// thread and makes `start_loop` return. No inference primitive is invoked
/// before the loop is running or after `terminate`.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Loads the model described by `params`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelLoad`](crate::Error::ModelLoad) if the model
    /// cannot be loaded; the run aborts without starting the worker.
    fn load_model(&self, params: &EngineParams) -> Result<()>;

    /// Runs the processing loop. Blocks until [`terminate`](Engine::terminate).
    fn start_loop(&self);

    /// Signals the processing loop to wind down.
    fn terminate(&self);

    /// Returns `true` once a model is loaded and the engine can serve.
    fn is_ready(&self) -> bool;

    /// Returns metadata about the loaded model.
    ///
    /// # Errors
    ///
    /// Fails if no model is loaded.
    fn model_info(&self) -> Result<ModelInfo>;

    /// Generates a completion for the prompt.
    async fn generate(&self, prompt: Prompt) -> Result<Generation>;

    /// Generates a completion, yielding incremental text deltas.
    async fn generate_stream(&self, prompt: Prompt) -> Result<DeltaStream>;

    /// Embeds each input text.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Scores each document against the query, best first.
    async fn rerank(&self, query: &str, documents: &[String]) -> Result<Vec<RankedDocument>>;

    /// Tokenizes text into model token ids.
    async fn tokenize(&self, text: &str) -> Result<Vec<u32>>;

    /// Reassembles text from model token ids.
    async fn detokenize(&self, tokens: &[u32]) -> Result<String>;

    /// Renders chat messages through the model's template without generating.
    async fn apply_template(&self, messages: &[Message]) -> Result<String>;
}
