//! Browser native-messaging transport
//!
//! Each frame is a 4-byte little-endian length followed by that many bytes
//! of UTF-8 JSON. Requests arrive on the reader, responses leave on the
//! writer. Deferred responses are written by one writer task as they
//! complete, so frames never interleave.

use std::sync::Arc;

use classbatch_domain::constants::{MAX_INCOMING_MESSAGE_BYTES, MAX_OUTGOING_MESSAGE_BYTES};
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::protocol::Response;
use crate::router::{Dispatch, MessageRouter};

/// Transport failures
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Message too large: {len} bytes (limit {limit})")]
    TooLarge { len: usize, limit: usize },

    #[error("Truncated frame: expected {expected} bytes")]
    Truncated { expected: usize },
}

/// One inbound frame
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    Message(Vec<u8>),
    /// Body exceeded the inbound limit and was discarded.
    Oversized(usize),
}

/// Read one frame; `Ok(None)` on a clean end of stream.
///
/// # Errors
/// `Truncated` when the stream ends inside a frame, `Io` otherwise.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Frame>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    let mut filled = 0;
    while filled < prefix.len() {
        let n = reader.read(&mut prefix[filled..]).await?;
        if n == 0 {
            return if filled == 0 {
                Ok(None)
            } else {
                Err(FrameError::Truncated { expected: prefix.len() })
            };
        }
        filled += n;
    }

    let len = u32::from_le_bytes(prefix) as usize;
    if len > MAX_INCOMING_MESSAGE_BYTES {
        let skipped =
            tokio::io::copy(&mut (&mut *reader).take(len as u64), &mut tokio::io::sink()).await?;
        if skipped < len as u64 {
            return Err(FrameError::Truncated { expected: len });
        }
        return Ok(Some(Frame::Oversized(len)));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await.map_err(|err| match err.kind() {
        std::io::ErrorKind::UnexpectedEof => FrameError::Truncated { expected: len },
        _ => FrameError::Io(err),
    })?;
    Ok(Some(Frame::Message(body)))
}

/// Write one frame and flush.
///
/// # Errors
/// `TooLarge` above the outbound limit, `Io` on write failure.
pub async fn write_frame<W>(writer: &mut W, body: &[u8]) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    if body.len() > MAX_OUTGOING_MESSAGE_BYTES {
        return Err(FrameError::TooLarge { len: body.len(), limit: MAX_OUTGOING_MESSAGE_BYTES });
    }
    let len = u32::try_from(body.len())
        .map_err(|_| FrameError::TooLarge { len: body.len(), limit: MAX_OUTGOING_MESSAGE_BYTES })?;
    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}

/// Serialize a response, swapping in a failure when it would exceed the
/// browser's limit.
pub fn encode_response(response: &Response) -> Vec<u8> {
    let body = serde_json::to_vec(response)
        .unwrap_or_else(|err| failure_bytes(response, &format!("Internal error: {err}")));
    if body.len() <= MAX_OUTGOING_MESSAGE_BYTES {
        return body;
    }
    warn!(bytes = body.len(), "Response exceeds native messaging limit");
    failure_bytes(
        response,
        &format!("Response too large: {} bytes (limit {MAX_OUTGOING_MESSAGE_BYTES})", body.len()),
    )
}

fn failure_bytes(original: &Response, error: &str) -> Vec<u8> {
    let replacement = Response::failure(error).with_request_id(original.request_id().cloned());
    serde_json::to_vec(&replacement).unwrap_or_default()
}

/// Drop completed command tasks so a long-lived port does not accumulate
/// them; returns how many were removed.
fn reap_finished(in_flight: &mut JoinSet<()>) -> usize {
    let mut reaped = 0;
    while let Some(joined) = in_flight.try_join_next() {
        log_join_error(joined);
        reaped += 1;
    }
    reaped
}

fn log_join_error(joined: Result<(), tokio::task::JoinError>) {
    if let Err(err) = joined {
        error!(error = %err, "Command task failed");
    }
}

fn parse_message(body: &[u8]) -> Result<Value, Response> {
    serde_json::from_slice(body)
        .map_err(|err| Response::failure(format!("Invalid message: {err}")))
}

/// Serve requests from `reader` until end of stream.
///
/// In-flight deferred responses are written before returning.
///
/// # Errors
/// Broken framing on the reader or a failed write.
pub async fn serve<R, W>(router: Arc<MessageRouter>, mut reader: R, mut writer: W) -> Result<(), FrameError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let writer_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            write_frame(&mut writer, &frame).await?;
        }
        Ok::<(), FrameError>(())
    });

    let mut in_flight = JoinSet::new();
    let read_result = loop {
        reap_finished(&mut in_flight);
        let frame = match read_frame(&mut reader).await {
            Ok(Some(frame)) => frame,
            Ok(None) => break Ok(()),
            Err(err) => break Err(err),
        };

        let dispatch = match frame {
            Frame::Oversized(len) => {
                warn!(bytes = len, "Discarded oversized message");
                Dispatch::Immediate(Response::failure(format!(
                    "Message too large: {len} bytes (limit {MAX_INCOMING_MESSAGE_BYTES})"
                )))
            }
            Frame::Message(body) => match parse_message(&body) {
                Ok(message) => router.dispatch_value(message),
                Err(response) => Dispatch::Immediate(response),
            },
        };

        match dispatch {
            Dispatch::Immediate(response) => {
                if tx.send(encode_response(&response)).is_err() {
                    break Ok(());
                }
            }
            Dispatch::Deferred(future) => {
                let tx = tx.clone();
                in_flight.spawn(async move {
                    let response = future.await;
                    if tx.send(encode_response(&response)).is_err() {
                        debug!("Writer closed before deferred response");
                    }
                });
            }
        }
    };

    if !in_flight.is_empty() {
        info!(pending = in_flight.len(), "Input closed; waiting for in-flight commands");
    }
    while let Some(joined) = in_flight.join_next().await {
        log_join_error(joined);
    }
    drop(tx);

    let write_result = match writer_task.await {
        Ok(result) => result,
        Err(err) => Err(FrameError::Io(std::io::Error::other(err))),
    };
    read_result.and(write_result)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn frames_round_trip_through_a_pipe() {
        let (mut client, mut server) = tokio::io::duplex(64);
        write_frame(&mut client, br#"{"action":"x"}"#).await.unwrap();
        drop(client);

        assert_eq!(
            read_frame(&mut server).await.unwrap(),
            Some(Frame::Message(br#"{"action":"x"}"#.to_vec()))
        );
        assert_eq!(read_frame(&mut server).await.unwrap(), None);
    }

    #[tokio::test]
    async fn finished_commands_are_reaped_while_others_keep_running() {
        let mut in_flight = JoinSet::new();
        for _ in 0..3 {
            in_flight.spawn(async {});
        }
        let (release, blocked) = tokio::sync::oneshot::channel::<()>();
        in_flight.spawn(async move {
            let _ = blocked.await;
        });
        in_flight.spawn(async { panic!("command blew up") });

        let mut reaped = 0;
        while in_flight.len() > 1 {
            tokio::task::yield_now().await;
            reaped += reap_finished(&mut in_flight);
        }

        assert_eq!(reaped, 4);
        assert_eq!(in_flight.len(), 1);
        release.send(()).unwrap();
        assert!(in_flight.join_next().await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn length_prefix_is_little_endian() {
        let mut out = Vec::new();
        write_frame(&mut out, b"{}").await.unwrap();
        assert_eq!(out, [2, 0, 0, 0, b'{', b'}']);
    }

    #[tokio::test]
    async fn truncated_body_is_an_error() {
        let mut input: &[u8] = &[10, 0, 0, 0, b'{'];
        assert!(matches!(read_frame(&mut input).await, Err(FrameError::Truncated { expected: 10 })));
    }

    #[tokio::test]
    async fn partial_prefix_is_an_error() {
        let mut input: &[u8] = &[1, 0];
        assert!(matches!(read_frame(&mut input).await, Err(FrameError::Truncated { .. })));
    }

    #[tokio::test]
    async fn outgoing_limit_is_enforced() {
        let mut out = Vec::new();
        let body = vec![b' '; MAX_OUTGOING_MESSAGE_BYTES + 1];
        assert!(matches!(write_frame(&mut out, &body).await, Err(FrameError::TooLarge { .. })));
        assert!(out.is_empty());
    }

    #[test]
    fn oversized_response_is_replaced_by_failure() {
        let huge = "x".repeat(MAX_OUTGOING_MESSAGE_BYTES);
        let response = Response::success(&json!({"blob": huge})).with_request_id(Some(json!(9)));

        let encoded: Value = serde_json::from_slice(&encode_response(&response)).unwrap();

        assert_eq!(encoded["success"], json!(false));
        assert_eq!(encoded["requestId"], json!(9));
        assert!(encoded["error"].as_str().unwrap().starts_with("Response too large"));
    }
}
