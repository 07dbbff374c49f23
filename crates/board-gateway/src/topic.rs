use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Buffered payloads per local subscriber before it starts lagging.
const LOCAL_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum TopicError {
    #[error("topic closed")]
    Closed,

    #[error("broker error: {0}")]
    Broker(#[from] redis::RedisError),

    #[error("undecodable payload: {0}")]
    Payload(String),
}

/// Handle to the notification topic. Cheap to clone; every clone publishes
/// to and subscribes from the same channel.
#[derive(Clone)]
pub struct Topic {
    inner: Arc<TopicInner>,
}

struct TopicInner {
    name: String,
    backend: Backend,
}

enum Backend {
    /// In-process broadcast channel, used when no broker is configured.
    Local(broadcast::Sender<String>),

    /// Redis pub/sub. Publishing shares one managed connection; every
    /// subscriber gets its own pub/sub connection.
    Redis {
        client: redis::Client,
        publisher: ConnectionManager,
    },
}

/// A live subscription to the topic. Dropping it unsubscribes.
pub struct Subscription {
    inner: SubscriptionInner,
}

enum SubscriptionInner {
    Local(broadcast::Receiver<String>),
    Redis(BoxStream<'static, redis::Msg>),
}

impl Topic {
    pub fn local(name: impl Into<String>) -> Self {
        let (tx, _) = broadcast::channel(LOCAL_CAPACITY);
        let name = name.into();
        info!("Using in-process topic '{}'", name);
        Self {
            inner: Arc::new(TopicInner {
                name,
                backend: Backend::Local(tx),
            }),
        }
    }

    /// Connect to a Redis broker, e.g. `redis://127.0.0.1:6379`.
    pub async fn redis(url: &str, name: impl Into<String>) -> Result<Self, TopicError> {
        let client = redis::Client::open(url)?;
        let publisher = client.get_connection_manager().await?;
        let name = name.into();
        info!("Using Redis topic '{}' at {}", name, url);
        Ok(Self {
            inner: Arc::new(TopicInner {
                name,
                backend: Backend::Redis { client, publisher },
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Number of in-process subscribers. `None` for a broker-backed topic,
    /// where subscribers live outside this process.
    pub fn subscriber_count(&self) -> Option<usize> {
        match &self.inner.backend {
            Backend::Local(tx) => Some(tx.receiver_count()),
            Backend::Redis { .. } => None,
        }
    }

    pub async fn publish(&self, payload: &str) -> Result<(), TopicError> {
        match &self.inner.backend {
            Backend::Local(tx) => {
                // No receivers is not an error: nobody is listening right now.
                if tx.send(payload.to_string()).is_err() {
                    debug!("Published to '{}' with no subscribers", self.inner.name);
                }
                Ok(())
            }
            Backend::Redis { publisher, .. } => {
                let mut conn = publisher.clone();
                let _: () = conn.publish(&self.inner.name, payload).await?;
                Ok(())
            }
        }
    }

    pub async fn subscribe(&self) -> Result<Subscription, TopicError> {
        let inner = match &self.inner.backend {
            Backend::Local(tx) => SubscriptionInner::Local(tx.subscribe()),
            Backend::Redis { client, .. } => {
                let mut pubsub = client.get_async_pubsub().await?;
                pubsub.subscribe(&self.inner.name).await?;
                SubscriptionInner::Redis(pubsub.into_on_message().boxed())
            }
        };
        Ok(Subscription { inner })
    }
}

impl Subscription {
    /// Wait for the next payload. Cancel-safe, so it can sit in a `select!`.
    pub async fn recv(&mut self) -> Result<String, TopicError> {
        match &mut self.inner {
            SubscriptionInner::Local(rx) => loop {
                match rx.recv().await {
                    Ok(payload) => return Ok(payload),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Topic subscriber lagged by {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => return Err(TopicError::Closed),
                }
            },
            SubscriptionInner::Redis(stream) => {
                let msg = stream.next().await.ok_or(TopicError::Closed)?;
                decode_payload(&msg)
            }
        }
    }
}

fn decode_payload(msg: &redis::Msg) -> Result<String, TopicError> {
    msg.get_payload::<String>()
        .map_err(|e| TopicError::Payload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_topic_delivers_in_publish_order() {
        let topic = Topic::local("notifications");
        let mut sub = topic.subscribe().await.unwrap();

        topic.publish("a").await.unwrap();
        topic.publish("b").await.unwrap();

        assert_eq!(sub.recv().await.unwrap(), "a");
        assert_eq!(sub.recv().await.unwrap(), "b");
    }

    #[tokio::test]
    async fn every_subscriber_gets_every_payload() {
        let topic = Topic::local("notifications");
        let mut first = topic.subscribe().await.unwrap();
        let mut second = topic.clone().subscribe().await.unwrap();
        assert_eq!(topic.subscriber_count(), Some(2));

        topic.publish("hello").await.unwrap();

        assert_eq!(first.recv().await.unwrap(), "hello");
        assert_eq!(second.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn publish_without_subscribers_succeeds() {
        let topic = Topic::local("notifications");
        assert_eq!(topic.subscriber_count(), Some(0));
        topic.publish("into the void").await.unwrap();
    }

    #[tokio::test]
    async fn dropping_subscription_unsubscribes() {
        let topic = Topic::local("notifications");
        let sub = topic.subscribe().await.unwrap();
        assert_eq!(topic.subscriber_count(), Some(1));
        drop(sub);
        assert_eq!(topic.subscriber_count(), Some(0));
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_lost_messages() {
        let topic = Topic::local("notifications");
        let mut sub = topic.subscribe().await.unwrap();

        for i in 0..LOCAL_CAPACITY + 10 {
            topic.publish(&i.to_string()).await.unwrap();
        }

        // The oldest payloads were overwritten; recv resumes at the oldest retained one.
        assert_eq!(sub.recv().await.unwrap(), "10");
    }

    #[test]
    fn undecodable_payload_is_reported() {
        let value = redis::Value::Array(vec![
            redis::Value::BulkString(b"message".to_vec()),
            redis::Value::BulkString(b"notifications".to_vec()),
            redis::Value::BulkString(vec![0xff, 0xfe, 0xfd]),
        ]);
        let msg = redis::Msg::from_value(&value).expect("pub/sub message");
        assert!(matches!(decode_payload(&msg), Err(TopicError::Payload(_))));
    }

    // Needs a running broker: BOARD_TEST_REDIS_URL=redis://127.0.0.1:6379 cargo test -- --ignored
    fn redis_url() -> Option<String> {
        std::env::var("BOARD_TEST_REDIS_URL").ok().filter(|s| !s.is_empty())
    }

    fn unique_channel() -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        format!("board-test-{}-{}", std::process::id(), nanos)
    }

    #[tokio::test]
    #[ignore]
    async fn redis_topic_delivers_in_publish_order() {
        let Some(url) = redis_url() else { return };
        let channel = unique_channel();
        let topic = Topic::redis(&url, channel.as_str()).await.unwrap();
        assert_eq!(topic.subscriber_count(), None);

        let mut sub = topic.subscribe().await.unwrap();
        topic.publish("a").await.unwrap();
        topic.publish("b").await.unwrap();

        let timeout = std::time::Duration::from_secs(5);
        let first = tokio::time::timeout(timeout, sub.recv()).await.unwrap().unwrap();
        let second = tokio::time::timeout(timeout, sub.recv()).await.unwrap().unwrap();
        assert_eq!((first.as_str(), second.as_str()), ("a", "b"));

        // Dropping the subscription closes its pub/sub connection
        drop(sub);
        let admin = redis::Client::open(url.as_str()).unwrap();
        let mut conn = admin.get_multiplexed_async_connection().await.unwrap();
        let mut remaining = -1;
        for _ in 0..100 {
            let (_, count): (String, i64) = redis::cmd("PUBSUB")
                .arg("NUMSUB")
                .arg(&channel)
                .query_async(&mut conn)
                .await
                .unwrap();
            remaining = count;
            if count == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    #[ignore]
    async fn redis_subscription_ends_when_connection_drops() {
        let Some(url) = redis_url() else { return };
        let channel = unique_channel();
        let topic = Topic::redis(&url, channel.as_str()).await.unwrap();
        let mut sub = topic.subscribe().await.unwrap();

        // Kill every pub/sub connection from a separate admin connection
        let admin = redis::Client::open(url.as_str()).unwrap();
        let mut conn = admin.get_multiplexed_async_connection().await.unwrap();
        let _: () = redis::cmd("CLIENT")
            .arg("KILL")
            .arg("TYPE")
            .arg("pubsub")
            .query_async(&mut conn)
            .await
            .unwrap();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), sub.recv())
            .await
            .expect("subscription should end once its connection is gone");
        assert!(matches!(result, Err(TopicError::Closed)));

        // Publishing still works; the publisher is not a pub/sub connection
        topic.publish("after").await.unwrap();
    }
}
