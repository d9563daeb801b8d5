//! # Line Framing
//!
//! One JSON envelope per `\n`-terminated line. Used over the stdin/stdout
//! pipes between the coordinator and its worker processes.

use crate::error::TransportError;
use crate::sink::ChannelSink;
use crate::MAX_FRAME_BYTES;
use shared_types::PeerMessage;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Read the next envelope.
///
/// Returns `Ok(None)` at end of stream. Blank lines are skipped. A line that
/// is not valid UTF-8 JSON is reported as [`TransportError::Codec`]. An
/// oversized line is consumed in full and reported as
/// [`TransportError::FrameTooLarge`], so the caller can log it and keep reading.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<PeerMessage>, TransportError>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let mut line = Vec::new();
        let limit = (MAX_FRAME_BYTES + 1) as u64;
        let read = (&mut *reader).take(limit).read_until(b'\n', &mut line).await?;
        if read == 0 {
            return Ok(None);
        }

        if line.last() != Some(&b'\n') && read > MAX_FRAME_BYTES {
            discard_rest_of_line(reader).await?;
            return Err(TransportError::FrameTooLarge {
                size: read,
                max: MAX_FRAME_BYTES,
            });
        }

        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }
        return Ok(Some(serde_json::from_slice(trimmed)?));
    }
}

async fn discard_rest_of_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(());
        }
        if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
            reader.consume(pos + 1);
            return Ok(());
        }
        let len = buf.len();
        reader.consume(len);
    }
}

/// Read envelopes until end of stream, handing each to `on_message`.
///
/// Undecodable and oversized lines are logged and skipped. Stops early when
/// `on_message` returns `false`. I/O errors end the loop and are returned.
pub async fn pump_frames<R, F>(reader: &mut R, mut on_message: F) -> Result<(), TransportError>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(PeerMessage) -> bool,
{
    loop {
        match read_frame(reader).await {
            Ok(Some(message)) => {
                if !on_message(message) {
                    return Ok(());
                }
            }
            Ok(None) => return Ok(()),
            Err(TransportError::Codec(e)) => {
                warn!(error = %e, "Skipping undecodable frame");
            }
            Err(TransportError::FrameTooLarge { size, max }) => {
                warn!(size, max, "Skipping oversized frame");
            }
            Err(e) => return Err(e),
        }
    }
}

/// Encode `message` as one line, write it and flush.
pub async fn write_frame<W>(writer: &mut W, message: &PeerMessage) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let mut bytes = serde_json::to_vec(message)?;
    if bytes.len() > MAX_FRAME_BYTES {
        return Err(TransportError::FrameTooLarge {
            size: bytes.len(),
            max: MAX_FRAME_BYTES,
        });
    }
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Put a non-blocking [`ChannelSink`] in front of `writer`.
///
/// A background task drains the channel into the stream. It stops when every
/// clone of the sink is dropped or when a write fails; after a write failure
/// further `deliver` calls report `Closed`.
pub fn spawn_writer<W>(mut writer: W) -> (ChannelSink, JoinHandle<()>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (sink, mut receiver) = ChannelSink::pair();
    let handle = tokio::spawn(async move {
        while let Some(message) = receiver.recv().await {
            match write_frame(&mut writer, &message).await {
                Ok(()) => {}
                Err(TransportError::FrameTooLarge { size, max }) => {
                    warn!(
                        correlation_id = %message.exchange_id(),
                        size,
                        max,
                        "Dropping oversized frame"
                    );
                }
                Err(e) => {
                    warn!(error = %e, "Writer stopped");
                    break;
                }
            }
        }
        debug!("Writer task finished");
    });
    (sink, handle)
}
