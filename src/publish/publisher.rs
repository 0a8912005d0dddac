use async_trait::async_trait;
use lapin::{
    options::{BasicPublishOptions, QueueDeclareOptions},
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties,
};
use tracing::{debug, info};

use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("amqp error: {0}")]
    Amqp(#[from] lapin::Error),

    #[error("publisher is closed")]
    Closed,
}

/// Fire-and-forget text publishing. No confirms and no retries: a message
/// is delivered at most once.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(&self, queue: &str, body: &str) -> Result<(), PublishError>;
}

impl From<PublishError> for AppError {
    fn from(e: PublishError) -> Self {
        AppError::Transport(e.to_string())
    }
}

/// Publishes `body` on `queue`, reporting broker failures as
/// `AppError::Transport`.
pub async fn publish_text(
    publisher: &dyn MessagePublisher,
    queue: &str,
    body: &str,
) -> Result<(), AppError> {
    publisher.publish(queue, body).await?;
    Ok(())
}

/// One connection and one channel, opened at startup and shared by every
/// request. A dropped connection is not re-established.
pub struct AmqpPublisher {
    _connection: Connection,
    channel: Channel,
}

impl AmqpPublisher {
    pub async fn connect(url: &str) -> Result<Self, PublishError> {
        let connection = Connection::connect(url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;
        info!(channel_id = channel.id(), "amqp channel opened");
        Ok(Self {
            _connection: connection,
            channel,
        })
    }
}

#[async_trait]
impl MessagePublisher for AmqpPublisher {
    async fn publish(&self, queue: &str, body: &str) -> Result<(), PublishError> {
        if !self.channel.status().connected() {
            return Err(PublishError::Closed);
        }
        // Declaring is idempotent; the queue is created on first use.
        self.channel
            .queue_declare(queue, QueueDeclareOptions::default(), FieldTable::default())
            .await?;

        self.channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                body.as_bytes(),
                BasicProperties::default().with_content_type("text/plain".into()),
            )
            .await?;
        debug!(queue, bytes = body.len(), "message published");
        Ok(())
    }
}

#[cfg(test)]
pub mod recording {
    use std::sync::Mutex;

    use super::*;

    /// Keeps published messages in memory; can be switched to fail.
    #[derive(Default)]
    pub struct RecordingPublisher {
        pub sent: Mutex<Vec<(String, String)>>,
        pub closed: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl MessagePublisher for RecordingPublisher {
        async fn publish(&self, queue: &str, body: &str) -> Result<(), PublishError> {
            if self.closed.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(PublishError::Closed);
            }
            self.sent
                .lock()
                .expect("publisher lock")
                .push((queue.to_string(), body.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn broker_failure_is_a_transport_error() {
        let publisher = RecordingPublisher::default();
        publish_text(&publisher, "q", "first").await.expect("publish");

        publisher
            .closed
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let err = publish_text(&publisher, "q", "second").await.unwrap_err();
        assert!(matches!(err, AppError::Transport(ref msg) if msg == "publisher is closed"));
        assert_eq!(publisher.sent.lock().expect("publisher lock").len(), 1);
    }
}
