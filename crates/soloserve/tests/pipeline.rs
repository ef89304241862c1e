//! End-to-end pipeline tests over the reference backend: argv in, bytes on
//! the output sinks and an exit code out.

use std::io::Write;
use std::sync::Arc;

use soloserve::args::{parse_front, EngineArgs};
use soloserve::body::build_body;
use soloserve::echo::EchoEngine;
use soloserve::emit::emit;
use soloserve::lifecycle::WorkerHandle;
use soloserve_core::{
    CancelToken, Engine, EngineParams, ExecutionRequest, Operation, Result,
};
use soloserve_routes::{dispatch, ServerRoutes};

/// Runs one invocation against a freshly loaded backend, capturing both
/// output sinks. `argv` is everything after the program name except the
/// model flag, which points at a throwaway weights file.
async fn run(argv: &[&str]) -> Result<(u8, String, String)> {
    let mut model = tempfile::NamedTempFile::new().unwrap();
    write!(model, "weights").unwrap();

    let (opts, residual) = parse_front(argv.iter().map(|s| s.to_string()))?;
    let engine_args = EngineArgs::from_residual(&residual).unwrap();

    let raw_op = opts.op.clone().unwrap_or_else(|| "chat".to_string());
    let embedding = Operation::parse(&raw_op)
        .map(|op| op.needs_embedding_mode())
        .unwrap_or(false);
    let params = EngineParams {
        model: model.path().to_path_buf(),
        model_alias: Some("test-model".to_string()),
        ctx_size: 512,
        parallel: 1,
        embedding,
        prompt: engine_args.prompt.clone(),
    };

    let engine = Arc::new(EchoEngine::new());
    engine.load_model(&params)?;
    let worker = WorkerHandle::spawn(Arc::clone(&engine) as Arc<dyn Engine>)?;

    let cancel = CancelToken::new();
    let outcome = async {
        let body = build_body(&opts, &raw_op, engine_args.prompt.as_deref())?;
        let routes = ServerRoutes::new(Arc::clone(&engine));
        let req = ExecutionRequest::new(raw_op.as_str(), body, cancel.clone());
        let res = dispatch(&routes, &raw_op, req).await?;

        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = emit(res, &cancel, &mut out, &mut err).await?;
        Ok((
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        ))
    }
    .await;

    cancel.cancel();
    worker.shutdown();
    outcome
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body.trim()).unwrap()
}

#[tokio::test]
async fn chat_without_streaming_prints_handler_json() {
    let (code, out, err) = run(&["chat", "--text", "hello", "--no-stream"]).await.unwrap();
    assert_eq!(code, 0);
    assert!(err.is_empty());

    let value = json(&out);
    assert_eq!(value["object"], "chat.completion");
    assert_eq!(value["model"], "test-model");
    assert_eq!(
        value["choices"][0]["message"]["content"],
        "user: hello\nassistant: "
    );
}

#[tokio::test]
async fn default_operation_is_chat() {
    let (code, out, _) = run(&["--text", "hi", "--no-stream"]).await.unwrap();
    assert_eq!(code, 0);
    assert_eq!(json(&out)["object"], "chat.completion");
}

#[tokio::test]
async fn streaming_chat_emits_sse_frames_ending_with_done() {
    let (code, out, _) = run(&["chat", "--text", "hello world", "--stream"]).await.unwrap();
    assert_eq!(code, 0);
    assert!(out.starts_with("data: "));
    assert!(out.contains("chat.completion.chunk"));
    assert!(out.ends_with("data: [DONE]\n\n"));
}

#[tokio::test]
async fn rerank_with_cutoff_keeps_the_best_document() {
    let (code, out, _) = run(&[
        "rerank",
        "--query",
        "borrow checker",
        "--doc",
        "a cooking recipe",
        "--doc",
        "the borrow checker explained",
        "--top-n",
        "1",
    ])
    .await
    .unwrap();
    assert_eq!(code, 0);

    let value = json(&out);
    let results = value["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["index"], 1);
}

#[tokio::test]
async fn raw_body_overrides_text_flags() {
    let (code, out, _) = run(&[
        "completion",
        "--body",
        r#"{"prompt": "from body", "stream": false}"#,
        "--text",
        "ignored",
    ])
    .await
    .unwrap();
    assert_eq!(code, 0);
    assert_eq!(json(&out)["choices"][0]["text"], "from body");
}

#[tokio::test]
async fn prompt_flag_backs_body_synthesis() {
    let (code, out, _) = run(&["chat", "-p", "from prompt", "--no-stream"]).await.unwrap();
    assert_eq!(code, 0);
    assert_eq!(
        json(&out)["choices"][0]["message"]["content"],
        "user: from prompt\nassistant: "
    );
}

#[tokio::test]
async fn operation_aliases_are_case_insensitive() {
    let (code, out, _) = run(&["CHAT/COMPLETIONS", "--text", "hi", "--no-stream"])
        .await
        .unwrap();
    assert_eq!(code, 0);
    assert_eq!(json(&out)["object"], "chat.completion");
}

#[tokio::test]
async fn embeddings_return_one_vector_per_input() {
    let (code, out, _) = run(&["embeddings", "--text", "embed me"]).await.unwrap();
    assert_eq!(code, 0);

    let value = json(&out);
    assert_eq!(value["object"], "list");
    assert_eq!(value["data"].as_array().unwrap().len(), 1);
    assert_eq!(value["data"][0]["object"], "embedding");
}

#[tokio::test]
async fn tokenize_round_trips_through_detokenize() {
    let (_, out, _) = run(&["tokenize", "--text", "hi"]).await.unwrap();
    let tokens = json(&out)["tokens"].clone();

    let body = serde_json::json!({ "tokens": tokens }).to_string();
    let (code, out, _) = run(&["detokenize", "--body", &body]).await.unwrap();
    assert_eq!(code, 0);
    assert_eq!(json(&out)["content"], "hi");
}

#[tokio::test]
async fn health_reports_ok_for_a_loaded_model() {
    let (code, out, _) = run(&["health", "--body", "{}"]).await.unwrap();
    assert_eq!(code, 0);
    assert_eq!(json(&out)["status"], "ok");
}

#[tokio::test]
async fn props_reports_model_details() {
    let (code, out, _) = run(&["props", "--body", "{}"]).await.unwrap();
    assert_eq!(code, 0);

    let value = json(&out);
    assert_eq!(value["id"], "test-model");
    assert_eq!(value["ctx_size"], 512);
    assert_eq!(value["embedding"], false);
}

#[tokio::test]
async fn unsupported_operation_error_keeps_the_raw_string() {
    let err = run(&["Frobnicate", "--text", "x"]).await.unwrap_err();
    match err {
        soloserve_core::Error::UnsupportedOperation { operation } => {
            assert_eq!(operation, "Frobnicate");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_chat_text_is_a_missing_input_error() {
    let err = run(&["chat"]).await.unwrap_err();
    assert!(matches!(
        err,
        soloserve_core::Error::MissingInput { .. }
    ));
}

#[tokio::test]
async fn malformed_raw_body_yields_a_400_on_stderr() {
    let (code, out, err) = run(&["chat", "--body", "not json"]).await.unwrap();
    assert_eq!(code, 1);
    assert!(out.is_empty());
    assert_eq!(json(&err)["error"]["type"], "invalid_request_error");
}
