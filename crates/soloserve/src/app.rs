//! Top-level pipeline: parse, configure, load, dispatch, emit, tear down.

use std::path::PathBuf;
use std::sync::Arc;

use soloserve_core::{CancelToken, Engine, EngineParams, ExecutionRequest, Operation, Result};
use soloserve_routes::{dispatch, ServerRoutes};

use crate::args::{self, CliOptions, EngineArgs, USAGE};
use crate::body::build_body;
use crate::config::Config;
use crate::echo::EchoEngine;
use crate::emit::emit;
use crate::lifecycle::{install_signal_handlers, WorkerHandle};
use crate::logging;

/// Runs one invocation end to end and returns the process exit code.
///
/// `argv` is the argument vector without the program name.
pub async fn run(argv: Vec<String>) -> u8 {
    let (opts, residual) = match args::parse_front(argv) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("error: {e}\n\n{USAGE}");
            return 1;
        }
    };

    if opts.help {
        eprintln!("{USAGE}");
        return 0;
    }

    let engine_args = match EngineArgs::from_residual(&residual) {
        Ok(parsed) => parsed,
        Err(e) => {
            let _ = e.print();
            return 1;
        }
    };

    let cfg = Config::load();
    logging::init(
        engine_args.log_level.as_deref().unwrap_or(&cfg.log_level),
        engine_args.json_logs,
    );

    let Some(model) = engine_args
        .model
        .clone()
        .or_else(|| cfg.default_model.clone().map(PathBuf::from))
    else {
        tracing::error!("no model given; pass -m/--model or set default_model in the config");
        return 1;
    };

    // Applied before load so the normalizer sees the same string dispatch
    // will; an unknown operation just leaves embedding mode off and fails
    // later at dispatch.
    let raw_op = opts.op.clone().unwrap_or_else(|| "chat".to_string());
    let embedding = Operation::parse(&raw_op)
        .map(|op| op.needs_embedding_mode())
        .unwrap_or(false);

    let params = EngineParams {
        model,
        model_alias: engine_args.model_alias.clone(),
        ctx_size: engine_args.ctx_size.unwrap_or(cfg.ctx_size),
        parallel: engine_args.parallel,
        embedding,
        prompt: engine_args.prompt.clone(),
    };

    let cancel = CancelToken::new();
    install_signal_handlers(cancel.clone());

    let engine = Arc::new(EchoEngine::new());
    execute(engine, &params, &opts, &raw_op, cancel).await
}

/// Loads the model, runs the worker around the dispatch, and tears down.
///
/// Teardown runs on every path that started the worker: the token is tripped,
/// the loop terminated, the thread joined.
async fn execute<E: Engine + 'static>(
    engine: Arc<E>,
    params: &EngineParams,
    opts: &CliOptions,
    raw_op: &str,
    cancel: CancelToken,
) -> u8 {
    if let Err(e) = engine.load_model(params) {
        tracing::error!(error = %e, "model load failed");
        return 1;
    }

    let worker = match WorkerHandle::spawn(Arc::clone(&engine) as Arc<dyn Engine>) {
        Ok(worker) => worker,
        Err(e) => {
            tracing::error!(error = %e, "failed to start engine loop");
            return 1;
        }
    };

    let code = match run_pipeline(engine, opts, raw_op, params.prompt.as_deref(), &cancel).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "request failed");
            1
        }
    };

    cancel.cancel();
    worker.shutdown();
    code
}

async fn run_pipeline<E: Engine + 'static>(
    engine: Arc<E>,
    opts: &CliOptions,
    raw_op: &str,
    fallback_text: Option<&str>,
    cancel: &CancelToken,
) -> Result<u8> {
    let body = build_body(opts, raw_op, fallback_text)?;
    tracing::debug!(operation = raw_op, bytes = body.len(), "dispatching");

    let routes = ServerRoutes::new(engine);
    let req = ExecutionRequest::new(raw_op, body, cancel.clone());
    let res = dispatch(&routes, raw_op, req).await?;

    let mut out = std::io::stdout();
    let mut err = std::io::stderr();
    Ok(emit(res, cancel, &mut out, &mut err).await?)
}
