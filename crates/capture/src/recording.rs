//! One in-flight recording and its chunk buffer.

use tokio::sync::mpsc;

use crate::device::{MediaEncoder, MediaStream};
use crate::error::CaptureError;

/// Hard cap on recording length, seconds.
pub const RECORDING_LIMIT_SECS: u32 = 60;

/// Encoder format requested from the stream.
pub const RECORDER_MIME_TYPE: &str = "video/webm;codecs=vp9";

/// Content type of a finalized recording.
pub const CLIP_CONTENT_TYPE: &str = "video/webm";

/// Chunks the encoder may queue before it has to wait for a drain.
pub const CHUNK_CHANNEL_CAPACITY: usize = 256;

/// An encoder writing into a buffer that belongs to exactly one
/// recording. A new [`Recording`] always starts with an empty buffer.
pub struct Recording {
    encoder: Box<dyn MediaEncoder>,
    chunks_rx: mpsc::Receiver<Vec<u8>>,
    chunks: Vec<Vec<u8>>,
}

impl Recording {
    /// Start encoding `stream` into a fresh buffer.
    pub fn start(stream: &mut dyn MediaStream) -> Result<Self, CaptureError> {
        let (tx, chunks_rx) = mpsc::channel(CHUNK_CHANNEL_CAPACITY);
        let encoder = stream.start_encoder(RECORDER_MIME_TYPE, tx)?;
        Ok(Self {
            encoder,
            chunks_rx,
            chunks: Vec::new(),
        })
    }

    /// Bytes buffered so far.
    pub fn buffered_bytes(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Move chunks already produced by the encoder into the buffer.
    pub fn drain_pending(&mut self) {
        while let Ok(chunk) = self.chunks_rx.try_recv() {
            self.push(chunk);
        }
    }

    /// Stop the encoder, collect everything it flushed, and return the
    /// assembled media.
    pub async fn finish(mut self) -> Result<Vec<u8>, CaptureError> {
        self.drain_pending();
        let Recording {
            encoder,
            mut chunks_rx,
            mut chunks,
        } = self;

        // Keep draining while the encoder flushes, or a full channel stalls it.
        let mut finalize = encoder.finalize();
        let finalized = loop {
            tokio::select! {
                result = &mut finalize => break result,
                Some(chunk) = chunks_rx.recv() => {
                    if !chunk.is_empty() {
                        chunks.push(chunk);
                    }
                }
            }
        };

        // No more sends after this point; already-queued chunks still arrive.
        chunks_rx.close();
        while let Some(chunk) = chunks_rx.recv().await {
            if !chunk.is_empty() {
                chunks.push(chunk);
            }
        }
        finalized?;
        Ok(chunks.concat())
    }

    fn push(&mut self, chunk: Vec<u8>) {
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
    }
}

impl std::fmt::Debug for Recording {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recording")
            .field("chunks", &self.chunks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::device::{DeviceError, StreamSettings};

    struct ChunkEncoder {
        tx: mpsc::Sender<Vec<u8>>,
        tail: Vec<u8>,
    }

    #[async_trait]
    impl MediaEncoder for ChunkEncoder {
        async fn finalize(self: Box<Self>) -> Result<(), DeviceError> {
            let _ = self.tx.send(Vec::new()).await;
            let _ = self.tx.send(self.tail.clone()).await;
            Ok(())
        }
    }

    struct ChunkStream {
        head: Vec<u8>,
    }

    impl MediaStream for ChunkStream {
        fn settings(&self) -> StreamSettings {
            StreamSettings {
                width: 640,
                height: 480,
            }
        }

        fn stop_tracks(&mut self) {}

        fn start_encoder(
            &mut self,
            mime_type: &str,
            sink: mpsc::Sender<Vec<u8>>,
        ) -> Result<Box<dyn MediaEncoder>, DeviceError> {
            assert_eq!(mime_type, RECORDER_MIME_TYPE);
            sink.try_send(self.head.clone())
                .map_err(|e| DeviceError::Encoder(e.to_string()))?;
            Ok(Box::new(ChunkEncoder {
                tx: sink,
                tail: b"tail".to_vec(),
            }))
        }
    }

    #[tokio::test]
    async fn finish_includes_flushed_tail_and_skips_empty_chunks() {
        let mut stream = ChunkStream {
            head: b"head-".to_vec(),
        };
        let mut rec = Recording::start(&mut stream).unwrap();
        rec.drain_pending();
        assert_eq!(rec.buffered_bytes(), 5);

        let data = rec.finish().await.unwrap();
        assert_eq!(data, b"head-tail");
    }

    #[tokio::test]
    async fn each_recording_starts_empty() {
        let mut stream = ChunkStream { head: b"x".to_vec() };
        let first = Recording::start(&mut stream).unwrap();
        let second = Recording::start(&mut stream).unwrap();

        assert_eq!(first.finish().await.unwrap(), b"xtail");
        assert_eq!(second.finish().await.unwrap(), b"xtail");
    }

    struct FloodEncoder {
        tx: mpsc::Sender<Vec<u8>>,
    }

    #[async_trait]
    impl MediaEncoder for FloodEncoder {
        async fn finalize(self: Box<Self>) -> Result<(), DeviceError> {
            for _ in 0..=CHUNK_CHANNEL_CAPACITY {
                self.tx
                    .send(vec![1])
                    .await
                    .map_err(|e| DeviceError::Encoder(e.to_string()))?;
            }
            Ok(())
        }
    }

    struct FloodStream;

    impl MediaStream for FloodStream {
        fn settings(&self) -> StreamSettings {
            StreamSettings {
                width: 640,
                height: 480,
            }
        }

        fn stop_tracks(&mut self) {}

        fn start_encoder(
            &mut self,
            _mime_type: &str,
            sink: mpsc::Sender<Vec<u8>>,
        ) -> Result<Box<dyn MediaEncoder>, DeviceError> {
            Ok(Box::new(FloodEncoder { tx: sink }))
        }
    }

    #[tokio::test]
    async fn finish_drains_while_encoder_flushes_past_capacity() {
        let rec = Recording::start(&mut FloodStream).unwrap();

        let data = tokio::time::timeout(Duration::from_secs(5), rec.finish())
            .await
            .expect("finish stalled on a full chunk channel")
            .unwrap();
        assert_eq!(data.len(), CHUNK_CHANNEL_CAPACITY + 1);
    }
}
