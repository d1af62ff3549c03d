use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("client connection closed")]
pub struct SinkClosed;

/// Destination of an incrementally written response.
///
/// The gateway implements this over a pingora session; tests implement it over
/// an in-memory buffer.
#[async_trait]
pub trait StreamSink: Send {
    /// Write one fragment. It must reach the client without waiting for more data.
    async fn send(&mut self, data: Bytes) -> Result<(), SinkClosed>;

    /// Resolves once the client has gone away. Never resolves for a live client.
    ///
    /// Must be cancel-safe: callers race it against timers and drop it often.
    async fn closed(&mut self);
}
