//! Response emission.
//!
//! The single place output is written. The emitter does not know which
//! operation produced the response; it only distinguishes streaming from
//! finished payloads and derives the process exit code.

use std::io::Write;

use futures::StreamExt;

use soloserve_core::{CancelToken, ExecutionResponse, ResponsePayload};

/// Writes the response to `out`/`err` and returns the exit code.
///
/// Streaming payloads are written chunk by chunk, flushing after each write,
/// while the cancellation token stays untripped; cancellation mid-stream
/// stops pulling and yields exit code 1 with everything already pulled left
/// on stdout. Finished payloads with status >= 400 go to `err`, otherwise to
/// `out` with a trailing newline.
///
/// # Errors
///
/// Propagates write failures on the output sinks.
pub async fn emit<O, E>(
    res: ExecutionResponse,
    cancel: &CancelToken,
    out: &mut O,
    err: &mut E,
) -> std::io::Result<u8>
where
    O: Write,
    E: Write,
{
    let ExecutionResponse { status, payload } = res;

    match payload {
        ResponsePayload::Chunks(mut chunks) => {
            while !cancel.is_cancelled() {
                match chunks.next().await {
                    Some(Ok(chunk)) => {
                        out.write_all(chunk.as_bytes())?;
                        out.flush()?;
                    }
                    Some(Err(e)) => {
                        writeln!(err, "{e}")?;
                        return Ok(1);
                    }
                    None => break,
                }
            }
            if cancel.is_cancelled() {
                return Ok(1);
            }
            Ok(u8::from(status >= 400))
        }
        ResponsePayload::Full(body) => {
            if status >= 400 {
                writeln!(err, "{body}")?;
                Ok(1)
            } else {
                writeln!(out, "{body}")?;
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures::stream;
    use soloserve_core::{ChunkStream, Error};

    async fn run(res: ExecutionResponse, cancel: &CancelToken) -> (u8, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = emit(res, cancel, &mut out, &mut err).await.unwrap();
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[tokio::test]
    async fn success_body_goes_to_stdout_with_newline() {
        let res = ExecutionResponse::complete(200, r#"{"ok":true}"#);
        let (code, out, err) = run(res, &CancelToken::new()).await;
        assert_eq!(code, 0);
        assert_eq!(out, "{\"ok\":true}\n");
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn failure_body_goes_to_stderr() {
        let res = ExecutionResponse::complete(404, r#"{"error":"missing"}"#);
        let (code, out, err) = run(res, &CancelToken::new()).await;
        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert_eq!(err, "{\"error\":\"missing\"}\n");
    }

    #[tokio::test]
    async fn stream_writes_chunks_in_order() {
        let res = ExecutionResponse::stream(
            200,
            ChunkStream::from_chunks(["one ".to_string(), "two".to_string()]),
        );
        let (code, out, _) = run(res, &CancelToken::new()).await;
        assert_eq!(code, 0);
        assert_eq!(out, "one two");
    }

    #[tokio::test]
    async fn exhausted_stream_with_error_status_exits_nonzero() {
        let res = ExecutionResponse::stream(500, ChunkStream::from_chunks(["x".to_string()]));
        let (code, out, _) = run(res, &CancelToken::new()).await;
        assert_eq!(code, 1);
        assert_eq!(out, "x");
    }

    #[tokio::test]
    async fn cancellation_mid_stream_stops_pulling() {
        let cancel = CancelToken::new();
        let tripper = cancel.clone();
        // The token trips while the second chunk is produced; nothing after
        // it may be pulled.
        let chunks = ChunkStream::new(stream::iter(0..100).map(move |i| {
            if i == 1 {
                tripper.cancel();
            }
            Ok(format!("c{i}"))
        }));

        let (code, out, _) = run(ExecutionResponse::stream(200, chunks), &cancel).await;
        assert_eq!(code, 1);
        assert_eq!(out, "c0c1");
    }

    #[tokio::test]
    async fn chunk_error_surfaces_on_stderr() {
        let chunks = ChunkStream::new(stream::iter([
            Ok("good".to_string()),
            Err(Error::backend("stream broke")),
        ]));
        let (code, out, err) = run(ExecutionResponse::stream(200, chunks), &CancelToken::new()).await;
        assert_eq!(code, 1);
        assert_eq!(out, "good");
        assert!(err.contains("stream broke"));
    }
}
