use crate::error::{MqError, Result};
use crate::message::Message;
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// A handler returns `true` to acknowledge delivery, `false` to request
/// redelivery (spec 4.F "Delivery").
pub type Handler =
    Arc<dyn Fn(Message) -> Pin<Box<dyn Future<Output = bool> + Send>> + Send + Sync>;

const CHANNEL_CAPACITY: usize = 256;
const MAX_REDELIVERY_ATTEMPTS: u32 = 5;

#[async_trait]
pub trait Producer: Send + Sync {
    async fn publish(&self, topic: &str, message: Message) -> Result<()>;
}

#[async_trait]
pub trait Consumer: Send + Sync {
    /// Registers `handler` as the sole consumer of `topic` and starts
    /// draining it in a background task. Messages the handler nacks are
    /// requeued up to `MAX_REDELIVERY_ATTEMPTS` times, then dropped with a
    /// warning (dead-lettered).
    async fn subscribe(&self, topic: &str, handler: Handler) -> Result<()>;
}

struct Envelope {
    message: Message,
    attempt: u32,
}

/// Single-process topic broker: one `mpsc` channel per topic, at-least-once
/// delivery via requeue-on-nack. Stands in for the Kafka topic named in the
/// spec (`connector.events`, the reconciliation topic) without requiring a
/// real broker for tests or single-process deployment.
pub struct InMemoryBroker {
    senders: Mutex<HashMap<String, mpsc::Sender<Envelope>>>,
    receivers: Mutex<HashMap<String, mpsc::Receiver<Envelope>>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self { senders: Mutex::new(HashMap::new()), receivers: Mutex::new(HashMap::new()) }
    }

    fn sender_for(&self, topic: &str) -> mpsc::Sender<Envelope> {
        let mut senders = self.senders.lock().unwrap();
        if let Some(tx) = senders.get(topic) {
            return tx.clone();
        }
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        senders.insert(topic.to_string(), tx.clone());
        self.receivers.lock().unwrap().insert(topic.to_string(), rx);
        tx
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Producer for InMemoryBroker {
    async fn publish(&self, topic: &str, message: Message) -> Result<()> {
        let tx = self.sender_for(topic);
        tx.send(Envelope { message, attempt: 0 })
            .await
            .map_err(|_| MqError::TopicClosed(topic.to_string()))
    }
}

#[async_trait]
impl Consumer for InMemoryBroker {
    async fn subscribe(&self, topic: &str, handler: Handler) -> Result<()> {
        self.sender_for(topic);
        let mut rx = self
            .receivers
            .lock()
            .unwrap()
            .remove(topic)
            .ok_or_else(|| MqError::Broker(format!("topic {topic} already has a consumer")))?;
        let tx = self.sender_for(topic);
        let topic = topic.to_string();

        tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                let acked = handler(envelope.message.clone()).await;
                if !acked {
                    if envelope.attempt + 1 >= MAX_REDELIVERY_ATTEMPTS {
                        tracing::warn!(
                            topic = %topic,
                            event_type = %envelope.message.event_type,
                            attempts = envelope.attempt + 1,
                            "dead-lettering message after exhausting redelivery attempts"
                        );
                        continue;
                    }
                    let requeued =
                        Envelope { message: envelope.message, attempt: envelope.attempt + 1 };
                    if tx.send(requeued).await.is_err() {
                        break;
                    }
                }
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn delivers_published_message_to_handler() {
        let broker = InMemoryBroker::new();
        let received = Arc::new(AtomicUsize::new(0));
        let received_clone = received.clone();

        broker
            .subscribe(
                "connector.events",
                Arc::new(move |_msg| {
                    let received = received_clone.clone();
                    Box::pin(async move {
                        received.fetch_add(1, Ordering::SeqCst);
                        true
                    })
                }),
            )
            .await
            .unwrap();

        broker
            .publish("connector.events", Message::new("drive.start", serde_json::json!({})))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(received.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn nack_requeues_until_success() {
        let broker = InMemoryBroker::new();
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();

        broker
            .subscribe(
                "connector.events",
                Arc::new(move |_msg| {
                    let attempts = attempts_clone.clone();
                    Box::pin(async move {
                        let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                        n >= 3
                    })
                }),
            )
            .await
            .unwrap();

        broker
            .publish("connector.events", Message::new("drive.start", serde_json::json!({})))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn second_subscribe_on_same_topic_errors() {
        let broker = InMemoryBroker::new();
        broker.subscribe("t", Arc::new(|_| Box::pin(async { true }))).await.unwrap();
        assert!(broker.subscribe("t", Arc::new(|_| Box::pin(async { true }))).await.is_err());
    }
}
