//! Command-line parsing.
//!
//! Parsing happens in two stages. The front scanner walks the raw argument
//! vector and consumes only the flags this tool owns; every other token is
//! passed through, in order, to the engine-side parser (`EngineArgs`), the
//! stand-in for the underlying engine's own parameter set.

use std::path::PathBuf;

use clap::Parser;

use soloserve_core::{Error, Result};

/// Options consumed by the front scanner. Populated once from argv and
/// read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    /// Requested operation, exactly as supplied. `None` until the user sets
    /// it; the `chat` default is applied at normalization time so an empty
    /// string stays distinguishable from "not given".
    pub op: Option<String>,
    /// Raw inline JSON body.
    pub body: Option<String>,
    /// Path to a file holding the JSON body.
    pub body_file: Option<PathBuf>,
    /// Plain text for body synthesis.
    pub text: Option<String>,
    /// Rerank query.
    pub query: Option<String>,
    /// Rerank documents, in flag order.
    pub documents: Vec<String>,
    /// Newline-delimited rerank documents file.
    pub documents_file: Option<PathBuf>,
    /// Rerank cutoff. `None` means no cutoff, not zero.
    pub top_n: Option<u32>,
    /// Read the JSON body from stdin.
    pub use_stdin: bool,
    /// Explicit streaming override; `None` leaves the per-operation default.
    pub stream: Option<bool>,
    /// Print usage and exit without touching the model.
    pub help: bool,
}

/// Scans argv (without the program name) into [`CliOptions`] plus the
/// residual tokens destined for the engine parser.
///
/// A bare token that appears before any operation has been set is taken as
/// the operation name; everything unrecognized passes through untouched and
/// in its original order.
///
/// # Errors
///
/// Fails with [`Error::InvalidArgument`] when a value-taking flag is the
/// last token or `--top-n` is not an unsigned integer.
pub fn parse_front<I>(args: I) -> Result<(CliOptions, Vec<String>)>
where
    I: IntoIterator<Item = String>,
{
    let mut opts = CliOptions::default();
    let mut residual = Vec::new();
    let mut it = args.into_iter();

    while let Some(arg) = it.next() {
        let mut value = |flag: &str| {
            it.next()
                .ok_or_else(|| Error::invalid_argument(format!("missing value for {flag}")))
        };

        match arg.as_str() {
            "--op" | "--mode" | "--route" => opts.op = Some(value(&arg)?),
            "--body" | "--json" | "--input-json" => opts.body = Some(value(&arg)?),
            "--body-file" | "--json-file" => opts.body_file = Some(PathBuf::from(value(&arg)?)),
            "--text" | "-t" => opts.text = Some(value(&arg)?),
            "--query" => opts.query = Some(value(&arg)?),
            "--document" | "--doc" => opts.documents.push(value(&arg)?),
            "--documents-file" => opts.documents_file = Some(PathBuf::from(value(&arg)?)),
            "--top-n" => {
                let raw = value(&arg)?;
                let parsed = raw.parse().map_err(|_| {
                    Error::invalid_argument(format!("--top-n expects an integer, got '{raw}'"))
                })?;
                opts.top_n = Some(parsed);
            }
            "--stdin" => opts.use_stdin = true,
            "--stream" => opts.stream = Some(true),
            "--no-stream" => opts.stream = Some(false),
            "--help-cli" => opts.help = true,
            _ => {
                if !arg.is_empty() && !arg.starts_with('-') && opts.op.is_none() {
                    opts.op = Some(arg);
                } else {
                    residual.push(arg);
                }
            }
        }
    }

    Ok((opts, residual))
}

/// Engine-side arguments, parsed from the residual tokens the front scanner
/// left alone. In the full product this set belongs to the engine itself;
/// here it covers what the pipeline and the reference backend need.
#[derive(Debug, Clone, Parser)]
#[command(name = "soloserve", version, disable_help_flag = true)]
pub struct EngineArgs {
    /// Path to the model weights.
    #[arg(short = 'm', long)]
    pub model: Option<PathBuf>,

    /// Prompt text; used as fallback for body synthesis.
    #[arg(short = 'p', long)]
    pub prompt: Option<String>,

    /// Context window size in tokens.
    #[arg(short = 'c', long)]
    pub ctx_size: Option<u32>,

    /// Parallel slots for the processing loop.
    #[arg(long, default_value_t = 1)]
    pub parallel: u32,

    /// Display alias for the model (defaults to the file stem).
    #[arg(long)]
    pub model_alias: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Enable JSON logging.
    #[arg(long)]
    pub json_logs: bool,
}

impl EngineArgs {
    /// Parses the residual token list.
    ///
    /// # Errors
    ///
    /// Returns the clap error for unknown or malformed engine flags.
    pub fn from_residual(residual: &[String]) -> std::result::Result<Self, clap::Error> {
        Self::try_parse_from(
            std::iter::once("soloserve".to_string()).chain(residual.iter().cloned()),
        )
    }
}

/// Usage text for the front-end flags, printed to stderr.
pub const USAGE: &str = "\
Soloserve: run one inference-server route in-process (no HTTP listener)
Usage: soloserve [OPERATION] [front-end opts] [engine opts]

Operations: chat, completion, embeddings, rerank, tokenize, detokenize,
            apply-template, props, health

Front-end opts:
  --op|--mode|--route <name>   Route to run (bare leading word works too)
  --text|-t <str>              Plain text to use when no JSON body is supplied
  --body|--json <str>          Raw JSON payload (same shape as the HTTP API)
  --body-file|--json-file <p>  File containing the raw JSON payload
  --stdin                      Read the raw JSON payload from stdin
  --query <str>                Rerank query (falls back to --text/-p)
  --document|--doc <str>       Rerank document (repeatable)
  --documents-file <p>         Newline-delimited rerank documents
  --top-n <n>                  Rerank cutoff (optional)
  --stream / --no-stream       Override the stream flag for chat/completion
  --help-cli                   Show this help without loading the model

Engine opts (passed through):
  -m/--model <path>, -p/--prompt <str>, -c/--ctx-size <n>, --parallel <n>,
  --model-alias <str>, --log-level <lvl>, --json-logs

Examples:
  soloserve chat --text \"hello\" -m model.gguf --no-stream
  soloserve embeddings --text \"embed me\" -m model.gguf
  soloserve rerank --query \"title\" --doc \"a\" --doc \"b\" -m model.gguf --top-n 1
  soloserve chat --body-file request.json -m model.gguf
";

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_leading_token_becomes_the_operation() {
        let (opts, residual) = parse_front(argv(&["rerank", "--query", "q"])).unwrap();
        assert_eq!(opts.op.as_deref(), Some("rerank"));
        assert_eq!(opts.query.as_deref(), Some("q"));
        assert!(residual.is_empty());
    }

    #[test]
    fn second_bare_token_passes_through() {
        let (opts, residual) = parse_front(argv(&["chat", "model.gguf"])).unwrap();
        assert_eq!(opts.op.as_deref(), Some("chat"));
        assert_eq!(residual, vec!["model.gguf".to_string()]);
    }

    #[test]
    fn operation_stays_unset_without_input() {
        let (opts, _) = parse_front(argv(&["--text", "hi"])).unwrap();
        assert_eq!(opts.op, None);
    }

    #[test]
    fn flag_aliases() {
        for flag in ["--op", "--mode", "--route"] {
            let (opts, _) = parse_front(argv(&[flag, "props"])).unwrap();
            assert_eq!(opts.op.as_deref(), Some("props"));
        }
        for flag in ["--body", "--json", "--input-json"] {
            let (opts, _) = parse_front(argv(&[flag, "{}"])).unwrap();
            assert_eq!(opts.body.as_deref(), Some("{}"));
        }
        for flag in ["--body-file", "--json-file"] {
            let (opts, _) = parse_front(argv(&[flag, "req.json"])).unwrap();
            assert_eq!(opts.body_file, Some(PathBuf::from("req.json")));
        }
        for flag in ["--text", "-t"] {
            let (opts, _) = parse_front(argv(&[flag, "hi"])).unwrap();
            assert_eq!(opts.text.as_deref(), Some("hi"));
        }
    }

    #[test]
    fn documents_accumulate_in_flag_order() {
        let (opts, _) =
            parse_front(argv(&["--document", "a", "--doc", "b", "--document", "c"])).unwrap();
        assert_eq!(opts.documents, vec!["a", "b", "c"]);
    }

    #[test]
    fn residual_preserves_order() {
        let (opts, residual) = parse_front(argv(&[
            "--op", "chat", "-m", "model.gguf", "--text", "hi", "--ctx-size", "512",
        ]))
        .unwrap();
        assert_eq!(opts.op.as_deref(), Some("chat"));
        assert_eq!(
            residual,
            vec!["-m", "model.gguf", "--ctx-size", "512"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn stream_override_tristate() {
        let (opts, _) = parse_front(argv(&[])).unwrap();
        assert_eq!(opts.stream, None);
        let (opts, _) = parse_front(argv(&["--stream"])).unwrap();
        assert_eq!(opts.stream, Some(true));
        let (opts, _) = parse_front(argv(&["--no-stream"])).unwrap();
        assert_eq!(opts.stream, Some(false));
    }

    #[test]
    fn missing_value_is_an_argument_error() {
        let err = parse_front(argv(&["--text"])).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert!(err.to_string().contains("--text"));
    }

    #[test]
    fn non_integer_top_n_is_an_argument_error() {
        let err = parse_front(argv(&["--top-n", "many"])).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn top_n_unset_by_default() {
        let (opts, _) = parse_front(argv(&["--query", "q"])).unwrap();
        assert_eq!(opts.top_n, None);
        let (opts, _) = parse_front(argv(&["--top-n", "3"])).unwrap();
        assert_eq!(opts.top_n, Some(3));
    }

    #[test]
    fn engine_args_parse_from_residual() {
        let residual = argv(&["-m", "model.gguf", "-p", "hello", "--ctx-size", "2048"]);
        let engine = EngineArgs::from_residual(&residual).unwrap();
        assert_eq!(engine.model, Some(PathBuf::from("model.gguf")));
        assert_eq!(engine.prompt.as_deref(), Some("hello"));
        assert_eq!(engine.ctx_size, Some(2048));
        assert_eq!(engine.parallel, 1);
    }

    #[test]
    fn engine_args_reject_unknown_flags() {
        let residual = argv(&["--definitely-not-a-flag"]);
        assert!(EngineArgs::from_residual(&residual).is_err());
    }
}
