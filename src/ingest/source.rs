//! Message sources feeding the ingestion loop
//!
//! A [`MessageSource`] yields raw payloads one at a time from a single logical
//! stream. Offsets, partitions and acknowledgement are the transport's concern.

use crate::core::error::IngestError;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// A stream of encoded order events
#[async_trait]
pub trait MessageSource: Send {
    /// Wait for the next payload
    ///
    /// Returns `Ok(None)` once the stream has ended. The returned future must
    /// be cancel-safe: dropping it before completion loses no message.
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, IngestError>;

    /// Release the transport's resources
    async fn close(&mut self) -> Result<(), IngestError>;
}

/// In-process source backed by a bounded `tokio::sync::mpsc` channel
///
/// The stream ends when every sender has been dropped and the buffer drained.
///
/// # Example
///
/// ```rust,ignore
/// let (tx, mut source) = ChannelSource::new(64);
/// tx.send(br#"{"order_uid": "abc"}"#.to_vec()).await?;
/// let payload = source.recv().await?;
/// ```
pub struct ChannelSource {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl ChannelSource {
    /// Create a source together with the sender that feeds it
    pub fn new(capacity: usize) -> (mpsc::Sender<Vec<u8>>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }
}

impl From<mpsc::Receiver<Vec<u8>>> for ChannelSource {
    fn from(rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self { rx }
    }
}

#[async_trait]
impl MessageSource for ChannelSource {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, IngestError> {
        Ok(self.rx.recv().await)
    }

    async fn close(&mut self) -> Result<(), IngestError> {
        self.rx.close();
        Ok(())
    }
}
