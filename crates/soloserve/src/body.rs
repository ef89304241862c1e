//! JSON body construction.
//!
//! Resolves the request payload for the selected operation from, in order
//! of precedence: a raw inline body, a body file, stdin, or synthesis from
//! the simple flags. Synthesis produces the same shapes the HTTP layer
//! accepts (see `soloserve_routes::wire`).

use std::fs;
use std::io::Read;
use std::path::Path;

use soloserve_core::{Error, Operation, Result};

use crate::args::CliOptions;

/// Builds the JSON body string for the given operation.
///
/// `fallback_text` is the engine-side prompt (`-p/--prompt`); it backs
/// `--text` for synthesis and `--query` for rerank.
///
/// # Errors
///
/// Fails when a body file cannot be read, when required synthesis input is
/// empty, or when the operation has no synthesized form and no explicit body
/// was given.
pub fn build_body(opts: &CliOptions, raw_op: &str, fallback_text: Option<&str>) -> Result<String> {
    if let Some(body) = &opts.body {
        if !body.is_empty() {
            return Ok(body.clone());
        }
    }
    if let Some(path) = &opts.body_file {
        return read_file(path);
    }
    if opts.use_stdin {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        return Ok(body);
    }

    let text = opts
        .text
        .as_deref()
        .filter(|t| !t.is_empty())
        .or(fallback_text)
        .unwrap_or("");
    let stream = opts.stream.unwrap_or(false);

    match Operation::parse(raw_op) {
        Some(Operation::Chat) => {
            if text.is_empty() {
                return Err(Error::missing_input(
                    "chat requires --text or -p/--prompt content",
                ));
            }
            Ok(serde_json::json!({
                "messages": [{"role": "user", "content": text}],
                "stream": stream,
            })
            .to_string())
        }
        Some(Operation::Completion) => {
            if text.is_empty() {
                return Err(Error::missing_input(
                    "completion requires --text or -p/--prompt content",
                ));
            }
            Ok(serde_json::json!({"prompt": text, "stream": stream}).to_string())
        }
        Some(Operation::Embedding) => {
            if text.is_empty() {
                return Err(Error::missing_input(
                    "embeddings require --text or -p/--prompt content",
                ));
            }
            Ok(serde_json::json!({"input": text}).to_string())
        }
        Some(Operation::Rerank) => {
            let mut documents = opts.documents.clone();
            if let Some(path) = &opts.documents_file {
                documents.extend(read_lines(path)?);
            }
            if documents.is_empty() {
                return Err(Error::missing_input(
                    "rerank requires at least one --document or --documents-file line",
                ));
            }

            let query = opts
                .query
                .as_deref()
                .filter(|q| !q.is_empty())
                .unwrap_or(text);
            if query.is_empty() {
                return Err(Error::missing_input(
                    "rerank requires --query or --text/-p content",
                ));
            }

            let mut payload = serde_json::json!({
                "query": query,
                "documents": documents,
            });
            // top_n is present only when explicitly set; absence means "no
            // cutoff", not zero.
            if let Some(top_n) = opts.top_n {
                payload["top_n"] = top_n.into();
            }
            Ok(payload.to_string())
        }
        Some(Operation::Tokenize) => {
            if text.is_empty() {
                return Err(Error::missing_input(
                    "tokenize requires --text or -p/--prompt content or a raw JSON body",
                ));
            }
            Ok(serde_json::json!({"content": text}).to_string())
        }
        _ => Err(Error::missing_input(format!(
            "operation '{raw_op}' requires a JSON body (--body/--body-file/--stdin)"
        ))),
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::missing_input(format!("failed to read {}: {e}", path.display())))
}

/// Reads non-blank lines, preserving file order.
fn read_lines(path: &Path) -> Result<Vec<String>> {
    Ok(read_file(path)?
        .lines()
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
