//! Route handler collection backed by an [`Engine`].

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use serde::de::DeserializeOwned;

use soloserve_core::{
    ChunkStream, Engine, Error, ExecutionRequest, ExecutionResponse, Prompt, Result,
};

use crate::wire::{
    ApplyTemplateRequest, ApplyTemplateResponse, ChatChoice, ChatCompletionRequest,
    ChatCompletionResponse, CompletionChoice, CompletionRequest, CompletionResponse,
    DetokenizeRequest, DetokenizeResponse, EmbeddingData, EmbeddingRequest, EmbeddingResponse,
    ErrorResponse, RerankRequest, RerankResponse, RerankResult, TokenizeRequest,
    TokenizeResponse, Usage,
};

/// The handler collection: one method per canonical operation.
///
/// This is the same surface the HTTP layer would mount; the CLI invokes it
/// directly. Handlers return `Err` only for failures that should surface as
/// a synthetic 500; expected request problems (malformed body, empty input)
/// come back as finished responses with 4xx statuses.
#[async_trait]
pub trait RouteTable: Send + Sync {
    /// Handles a chat completion request.
    async fn post_chat_completions(&self, req: ExecutionRequest) -> Result<ExecutionResponse>;
    /// Handles a text completion request.
    async fn post_completions(&self, req: ExecutionRequest) -> Result<ExecutionResponse>;
    /// Handles an embedding request.
    async fn post_embeddings(&self, req: ExecutionRequest) -> Result<ExecutionResponse>;
    /// Handles a rerank request.
    async fn post_rerank(&self, req: ExecutionRequest) -> Result<ExecutionResponse>;
    /// Handles a tokenize request.
    async fn post_tokenize(&self, req: ExecutionRequest) -> Result<ExecutionResponse>;
    /// Handles a detokenize request.
    async fn post_detokenize(&self, req: ExecutionRequest) -> Result<ExecutionResponse>;
    /// Handles an apply-template request.
    async fn post_apply_template(&self, req: ExecutionRequest) -> Result<ExecutionResponse>;
    /// Serves model/server properties.
    async fn get_props(&self, req: ExecutionRequest) -> Result<ExecutionResponse>;
    /// Serves the health probe.
    async fn get_health(&self, req: ExecutionRequest) -> Result<ExecutionResponse>;
}

/// Engine-backed [`RouteTable`] implementation.
pub struct ServerRoutes<E> {
    engine: Arc<E>,
}

impl<E: Engine> ServerRoutes<E> {
    /// Creates the route table over the given engine.
    pub fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }

    fn model_alias(&self) -> String {
        self.engine
            .model_info()
            .map(|info| info.id)
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

fn bad_request(message: &str) -> ExecutionResponse {
    ExecutionResponse::complete(
        400,
        ErrorResponse::new(message, "invalid_request_error").to_body(),
    )
}

fn parse_body<T: DeserializeOwned>(body: &str) -> std::result::Result<T, ExecutionResponse> {
    serde_json::from_str(body).map_err(|e| bad_request(&format!("invalid request body: {e}")))
}

fn json_response<T: serde::Serialize>(value: &T) -> Result<ExecutionResponse> {
    Ok(ExecutionResponse::complete(
        200,
        serde_json::to_string(value)?,
    ))
}

fn sse_frame(value: &serde_json::Value) -> String {
    format!("data: {value}\n\n")
}

#[async_trait]
impl<E: Engine + 'static> RouteTable for ServerRoutes<E> {
    async fn post_chat_completions(&self, req: ExecutionRequest) -> Result<ExecutionResponse> {
        let body: ChatCompletionRequest = match parse_body(&req.body) {
            Ok(b) => b,
            Err(res) => return Ok(res),
        };
        if body.messages.is_empty() {
            return Ok(bad_request("messages must not be empty"));
        }

        let id = format!("chatcmpl-{}", uuid::Uuid::new_v4());
        let created = chrono::Utc::now().timestamp();
        let model = self.model_alias();
        tracing::debug!(request_id = %id, stream = body.stream, "chat completion request");

        if body.stream {
            let deltas = self
                .engine
                .generate_stream(Prompt::Messages(body.messages))
                .await?;

            let frames = deltas
                .map(move |delta| {
                    let value = match delta {
                        Ok(content) => serde_json::json!({
                            "id": id,
                            "object": "chat.completion.chunk",
                            "created": created,
                            "model": model,
                            "choices": [{
                                "index": 0,
                                "delta": {"content": content},
                                "finish_reason": null,
                            }],
                        }),
                        Err(e) => serde_json::json!({
                            "error": {"message": e.to_string(), "type": "server_error"}
                        }),
                    };
                    Ok(sse_frame(&value))
                })
                .chain(futures::stream::once(async {
                    Ok("data: [DONE]\n\n".to_string())
                }));

            return Ok(ExecutionResponse::stream(200, ChunkStream::new(frames)));
        }

        let generation = self.engine.generate(Prompt::Messages(body.messages)).await?;
        json_response(&ChatCompletionResponse {
            id,
            object: "chat.completion".to_string(),
            created,
            model,
            choices: vec![ChatChoice {
                index: 0,
                message: soloserve_core::Message {
                    role: "assistant".to_string(),
                    content: generation.text,
                },
                finish_reason: "stop".to_string(),
            }],
            usage: Usage::new(generation.prompt_tokens, generation.completion_tokens),
        })
    }

    async fn post_completions(&self, req: ExecutionRequest) -> Result<ExecutionResponse> {
        let body: CompletionRequest = match parse_body(&req.body) {
            Ok(b) => b,
            Err(res) => return Ok(res),
        };

        let id = format!("cmpl-{}", uuid::Uuid::new_v4());
        let created = chrono::Utc::now().timestamp();
        let model = self.model_alias();
        tracing::debug!(request_id = %id, stream = body.stream, "completion request");

        if body.stream {
            let deltas = self.engine.generate_stream(Prompt::Text(body.prompt)).await?;

            let frames = deltas
                .map(move |delta| {
                    let value = match delta {
                        Ok(text) => serde_json::json!({
                            "id": id,
                            "object": "text_completion",
                            "created": created,
                            "model": model,
                            "choices": [{
                                "index": 0,
                                "text": text,
                                "finish_reason": null,
                            }],
                        }),
                        Err(e) => serde_json::json!({
                            "error": {"message": e.to_string(), "type": "server_error"}
                        }),
                    };
                    Ok(sse_frame(&value))
                })
                .chain(futures::stream::once(async {
                    Ok("data: [DONE]\n\n".to_string())
                }));

            return Ok(ExecutionResponse::stream(200, ChunkStream::new(frames)));
        }

        let generation = self.engine.generate(Prompt::Text(body.prompt)).await?;
        json_response(&CompletionResponse {
            id,
            object: "text_completion".to_string(),
            created,
            model,
            choices: vec![CompletionChoice {
                text: generation.text,
                index: 0,
                finish_reason: "stop".to_string(),
            }],
            usage: Usage::new(generation.prompt_tokens, generation.completion_tokens),
        })
    }

    async fn post_embeddings(&self, req: ExecutionRequest) -> Result<ExecutionResponse> {
        let body: EmbeddingRequest = match parse_body(&req.body) {
            Ok(b) => b,
            Err(res) => return Ok(res),
        };
        let texts = body.input.into_texts();
        if texts.is_empty() {
            return Ok(bad_request("input must not be empty"));
        }

        let vectors = self.engine.embed(&texts).await?;
        let data = vectors
            .into_iter()
            .enumerate()
            .map(|(index, embedding)| EmbeddingData {
                object: "embedding".to_string(),
                index: index as u32,
                embedding,
            })
            .collect();

        json_response(&EmbeddingResponse {
            object: "list".to_string(),
            data,
            model: self.model_alias(),
        })
    }

    async fn post_rerank(&self, req: ExecutionRequest) -> Result<ExecutionResponse> {
        let body: RerankRequest = match parse_body(&req.body) {
            Ok(b) => b,
            Err(res) => return Ok(res),
        };
        if body.documents.is_empty() {
            return Ok(bad_request("documents must not be empty"));
        }

        let mut ranked = self.engine.rerank(&body.query, &body.documents).await?;
        if let Some(top_n) = body.top_n {
            ranked.truncate(top_n as usize);
        }

        json_response(&RerankResponse {
            model: self.model_alias(),
            results: ranked
                .into_iter()
                .map(|r| RerankResult {
                    index: r.index,
                    relevance_score: r.relevance_score,
                })
                .collect(),
        })
    }

    async fn post_tokenize(&self, req: ExecutionRequest) -> Result<ExecutionResponse> {
        let body: TokenizeRequest = match parse_body(&req.body) {
            Ok(b) => b,
            Err(res) => return Ok(res),
        };
        let tokens = self.engine.tokenize(&body.content).await?;
        json_response(&TokenizeResponse { tokens })
    }

    async fn post_detokenize(&self, req: ExecutionRequest) -> Result<ExecutionResponse> {
        let body: DetokenizeRequest = match parse_body(&req.body) {
            Ok(b) => b,
            Err(res) => return Ok(res),
        };
        let content = self.engine.detokenize(&body.tokens).await?;
        json_response(&DetokenizeResponse { content })
    }

    async fn post_apply_template(&self, req: ExecutionRequest) -> Result<ExecutionResponse> {
        let body: ApplyTemplateRequest = match parse_body(&req.body) {
            Ok(b) => b,
            Err(res) => return Ok(res),
        };
        if body.messages.is_empty() {
            return Ok(bad_request("messages must not be empty"));
        }
        let prompt = self.engine.apply_template(&body.messages).await?;
        json_response(&ApplyTemplateResponse { prompt })
    }

    async fn get_props(&self, _req: ExecutionRequest) -> Result<ExecutionResponse> {
        let info = self
            .engine
            .model_info()
            .map_err(|e| Error::internal(format!("props requested with no model: {e}")))?;
        json_response(&info)
    }

    async fn get_health(&self, _req: ExecutionRequest) -> Result<ExecutionResponse> {
        if self.engine.is_ready() {
            Ok(ExecutionResponse::complete(200, r#"{"status":"ok"}"#))
        } else {
            Ok(ExecutionResponse::complete(
                503,
                ErrorResponse::new("model not ready", "unavailable_error").to_body(),
            ))
        }
    }
}
