//! Deterministic reference backend.
//!
//! `EchoEngine` implements the [`Engine`] collaborator with deterministic,
//! model-free behavior: generation echoes the rendered prompt, embeddings
//! are seeded hashes, reranking scores lexical overlap, tokenization is
//! byte-level. It validates the model path at load time and parks its
//! processing loop until terminated, so the full lifecycle (load, worker,
//! dispatch, teardown) can run and be tested without real weights. A real
//! engine replaces it behind the same trait.

use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::{Condvar, Mutex, RwLock};

use soloserve_core::{
    DeltaStream, Engine, EngineParams, Error, Generation, Message, ModelInfo, Prompt,
    RankedDocument, Result,
};

/// Deterministic [`Engine`] implementation.
#[derive(Default)]
pub struct EchoEngine {
    loaded: RwLock<Option<ModelInfo>>,
    stopped: Mutex<bool>,
    latch: Condvar,
}

impl EchoEngine {
    /// Creates an engine with no model loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn render(&self, prompt: &Prompt) -> String {
        match prompt {
            Prompt::Text(text) => text.clone(),
            Prompt::Messages(messages) => render_template(messages),
        }
    }
}

fn render_template(messages: &[Message]) -> String {
    let mut rendered = String::new();
    for message in messages {
        rendered.push_str(&message.role);
        rendered.push_str(": ");
        rendered.push_str(&message.content);
        rendered.push('\n');
    }
    rendered.push_str("assistant: ");
    rendered
}

fn embed_text(text: &str) -> Vec<f32> {
    // FNV-1a folded per dimension; stable across runs and platforms.
    const DIMS: u64 = 8;
    (0..DIMS)
        .map(|dim| {
            let mut state: u64 = 0xcbf2_9ce4_8422_2325 ^ dim;
            for byte in text.bytes() {
                state ^= u64::from(byte);
                state = state.wrapping_mul(0x0000_0100_0000_01b3);
            }
            (state % 2001) as f32 / 1000.0 - 1.0
        })
        .collect()
}

fn overlap_score(query: &str, document: &str) -> f32 {
    let query = query.to_lowercase();
    let document = document.to_lowercase();
    let doc_words: Vec<&str> = document.split_whitespace().collect();
    query
        .split_whitespace()
        .filter(|word| doc_words.contains(word))
        .count() as f32
}

#[async_trait]
impl Engine for EchoEngine {
    fn load_model(&self, params: &EngineParams) -> Result<()> {
        if !params.model.is_file() {
            return Err(Error::model_load(format!(
                "no such model file: {}",
                params.model.display()
            )));
        }
        tracing::info!(model = %params.model.display(), alias = %params.alias(), "echo backend loaded");
        *self.loaded.write() = Some(ModelInfo {
            id: params.alias(),
            path: params.model.clone(),
            ctx_size: params.ctx_size,
            parallel: params.parallel,
            embedding: params.embedding,
        });
        Ok(())
    }

    fn start_loop(&self) {
        let mut stopped = self.stopped.lock();
        while !*stopped {
            self.latch.wait(&mut stopped);
        }
        tracing::debug!("echo backend loop exited");
    }

    fn terminate(&self) {
        *self.stopped.lock() = true;
        self.latch.notify_all();
    }

    fn is_ready(&self) -> bool {
        self.loaded.read().is_some()
    }

    fn model_info(&self) -> Result<ModelInfo> {
        self.loaded
            .read()
            .clone()
            .ok_or_else(|| Error::internal("no model loaded"))
    }

    async fn generate(&self, prompt: Prompt) -> Result<Generation> {
        let rendered = self.render(&prompt);
        let tokens = rendered.len() as u32;
        Ok(Generation {
            text: rendered,
            prompt_tokens: tokens,
            completion_tokens: tokens,
        })
    }

    async fn generate_stream(&self, prompt: Prompt) -> Result<DeltaStream> {
        let rendered = self.render(&prompt);
        let deltas: Vec<Result<String>> = rendered
            .split_inclusive(' ')
            .map(|piece| Ok(piece.to_string()))
            .collect();
        Ok(Box::pin(futures::stream::iter(deltas)))
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(inputs.iter().map(|text| embed_text(text)).collect())
    }

    async fn rerank(&self, query: &str, documents: &[String]) -> Result<Vec<RankedDocument>> {
        let mut ranked: Vec<RankedDocument> = documents
            .iter()
            .enumerate()
            .map(|(index, doc)| RankedDocument {
                index,
                relevance_score: overlap_score(query, doc),
            })
            .collect();
        // Stable sort keeps request order among equal scores.
        ranked.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(ranked)
    }

    async fn tokenize(&self, text: &str) -> Result<Vec<u32>> {
        Ok(text.bytes().map(u32::from).collect())
    }

    async fn detokenize(&self, tokens: &[u32]) -> Result<String> {
        let bytes: std::result::Result<Vec<u8>, _> =
            tokens.iter().map(|t| u8::try_from(*t)).collect();
        let bytes = bytes.map_err(|_| Error::backend("token id out of byte range"))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn apply_template(&self, messages: &[Message]) -> Result<String> {
        Ok(render_template(messages))
    }
}

/// Builds engine params pointing at `model` with library defaults; handy for
/// tests and embedding callers.
#[must_use]
pub fn default_params(model: PathBuf) -> EngineParams {
    EngineParams {
        model,
        model_alias: None,
        ctx_size: 4096,
        parallel: 1,
        embedding: false,
        prompt: None,
    }
}
