//! Kafka message source
//!
//! Subscribes to one topic as a member of a consumer group. Offsets are
//! auto-committed by the client, so a message counts as consumed whether or
//! not its order was saved.

use crate::config::KafkaConfig;
use crate::core::error::{IngestError, StartupError};
use crate::ingest::source::MessageSource;
use async_trait::async_trait;
use rdkafka::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;

/// [`MessageSource`] backed by an `rdkafka` [`StreamConsumer`]
pub struct KafkaSource {
    consumer: StreamConsumer,
    topic: String,
}

impl KafkaSource {
    /// Create the consumer and subscribe to the configured topic
    pub fn new(config: &KafkaConfig) -> Result<Self, StartupError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "earliest")
            .create()
            .map_err(|e| StartupError::Source(format!("failed to create consumer: {}", e)))?;

        consumer
            .subscribe(&[config.topic.as_str()])
            .map_err(|e| {
                StartupError::Source(format!("failed to subscribe to '{}': {}", config.topic, e))
            })?;

        tracing::info!(
            brokers = %config.brokers.join(","),
            topic = %config.topic,
            group_id = %config.group_id,
            "kafka consumer subscribed"
        );

        Ok(Self {
            consumer,
            topic: config.topic.clone(),
        })
    }
}

#[async_trait]
impl MessageSource for KafkaSource {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, IngestError> {
        let message = self
            .consumer
            .recv()
            .await
            .map_err(|e| IngestError::Receive(e.to_string()))?;

        tracing::debug!(
            topic = message.topic(),
            partition = message.partition(),
            offset = message.offset(),
            "message received"
        );

        // A tombstone has no payload; it fails decoding like any empty body
        Ok(Some(message.payload().map(<[u8]>::to_vec).unwrap_or_default()))
    }

    async fn close(&mut self) -> Result<(), IngestError> {
        self.consumer.unsubscribe();
        tracing::info!(topic = %self.topic, "kafka consumer unsubscribed");
        Ok(())
    }
}
