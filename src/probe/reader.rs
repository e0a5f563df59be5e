//! Resumable reads over a response body for early-stop probing.

use bytes::Bytes;
use futures::{Stream, StreamExt};

use super::{probe, SizeProbe};
use crate::config::PROBE_CHUNK_SIZE;
use crate::error_handling::{FetchFailure, FetchFailureKind};
use crate::models::ImageFormat;

/// Buffers a chunked body so it can be read up to N bytes, probed, and then
/// resumed where it stopped.
pub struct ProbeReader<S> {
    stream: S,
    buf: Vec<u8>,
    exhausted: bool,
}

impl<S> ProbeReader<S>
where
    S: Stream<Item = Result<Bytes, FetchFailure>> + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buf: Vec::new(),
            exhausted: false,
        }
    }

    /// Bytes read so far.
    pub fn buffer(&self) -> &[u8] {
        &self.buf
    }

    /// True once the underlying body has ended.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Pulls chunks until at least `target` bytes are buffered or the body
    /// ends. Chunks are never split, so the buffer may overshoot `target`.
    pub async fn fill_to(&mut self, target: usize) -> Result<usize, FetchFailure> {
        while !self.exhausted && self.buf.len() < target {
            match self.stream.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(e),
                None => self.exhausted = true,
            }
        }
        Ok(self.buf.len())
    }

    /// Reads the rest of the body, failing once more than `max_size` bytes
    /// have arrived.
    pub async fn read_to_end(&mut self, max_size: usize) -> Result<(), FetchFailure> {
        while !self.exhausted {
            self.fill_to(self.buf.len().saturating_add(1)).await?;
            if self.buf.len() > max_size {
                return Err(FetchFailure::new(
                    FetchFailureKind::TooLarge,
                    format!(
                        "exceeds {}KB limit (aborting at {} bytes)",
                        max_size / 1024,
                        self.buf.len()
                    ),
                ));
            }
        }
        Ok(())
    }

    pub fn into_buffer(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads at most `byte_budget` bytes (rounded up to whole chunks), probing
/// after every `PROBE_CHUNK_SIZE` step, and stops as soon as the size is
/// known.
///
/// The reader keeps everything it buffered, so a caller receiving
/// `SizeProbe::Unknown` can continue with `read_to_end`.
pub async fn probe_prefix<S>(
    reader: &mut ProbeReader<S>,
    byte_budget: usize,
    hint: Option<ImageFormat>,
) -> Result<SizeProbe, FetchFailure>
where
    S: Stream<Item = Result<Bytes, FetchFailure>> + Unpin,
{
    loop {
        let target = (reader.buffer().len() + PROBE_CHUNK_SIZE).min(byte_budget.max(1));
        reader.fill_to(target).await?;

        let result = probe(reader.buffer(), hint);
        if result.is_known() || reader.is_exhausted() || reader.buffer().len() >= byte_budget {
            return Ok(result);
        }
    }
}
