//! Stream ingestion: message sources and the loop that feeds them into the
//! order service

pub mod consumer;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod source;

pub use consumer::{IngestStats, IngestionLoop};
#[cfg(feature = "kafka")]
pub use kafka::KafkaSource;
pub use source::{ChannelSource, MessageSource};
