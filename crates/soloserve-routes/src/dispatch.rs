//! In-process dispatch from a canonical operation to its route handler.

use soloserve_core::{Error, ExecutionRequest, ExecutionResponse, Operation, Result};

use crate::routes::RouteTable;
use crate::wire::ErrorResponse;

/// Invokes the route handler matching `raw_op`.
///
/// The operation string is normalized here; an unrecognized operation fails
/// with [`Error::UnsupportedOperation`] carrying the string exactly as the
/// user supplied it. A handler failure does not propagate: it is converted
/// into a synthetic status-500 response with a structured error body, so the
/// caller's emission and teardown path is the same on every outcome.
///
/// # Errors
///
/// Only [`Error::UnsupportedOperation`].
pub async fn dispatch(
    routes: &dyn RouteTable,
    raw_op: &str,
    req: ExecutionRequest,
) -> Result<ExecutionResponse> {
    let Some(op) = Operation::parse(raw_op) else {
        return Err(Error::unsupported_operation(raw_op));
    };

    let result = match op {
        Operation::Chat => routes.post_chat_completions(req).await,
        Operation::Completion => routes.post_completions(req).await,
        Operation::Embedding => routes.post_embeddings(req).await,
        Operation::Rerank => routes.post_rerank(req).await,
        Operation::Tokenize => routes.post_tokenize(req).await,
        Operation::Detokenize => routes.post_detokenize(req).await,
        Operation::ApplyTemplate => routes.post_apply_template(req).await,
        Operation::Props => routes.get_props(req).await,
        Operation::Health => routes.get_health(req).await,
    };

    Ok(result.unwrap_or_else(|e| {
        tracing::error!(operation = %op, error = %e, "route handler failed");
        ExecutionResponse::complete(
            500,
            ErrorResponse::new(e.to_string(), "server_error").to_body(),
        )
    }))
}
