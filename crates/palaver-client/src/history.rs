//! Where older messages come from.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use palaver_shared::constants::SAMPLE_HISTORY_TEXTS;
use palaver_shared::{ChatError, ChatroomId, MessageId, MessageKind, MessageStatus};
use palaver_store::Message;
use rand::seq::SliceRandom;
use rand::Rng;

/// One page request, issued by the pagination engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub chatroom_id: ChatroomId,
    pub page: u32,
    pub page_size: usize,
    /// Every returned message must be older than this.
    pub before: DateTime<Utc>,
}

/// A source of older messages.  Batches come back oldest first.
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn fetch(&self, request: HistoryRequest) -> Result<Vec<Message>, ChatError>;
}

/// Made-up history: sample texts one minute apart, after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedHistory {
    latency: Duration,
}

impl SimulatedHistory {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl HistorySource for SimulatedHistory {
    async fn fetch(&self, request: HistoryRequest) -> Result<Vec<Message>, ChatError> {
        tokio::time::sleep(self.latency).await;
        Ok(sample_page(&request))
    }
}

fn sample_page(request: &HistoryRequest) -> Vec<Message> {
    let mut rng = rand::thread_rng();
    let size = request.page_size as i64;

    (0..size)
        .map(|i| {
            let kind = if rng.gen_bool(0.5) {
                MessageKind::User
            } else {
                MessageKind::Ai
            };
            let content = SAMPLE_HISTORY_TEXTS
                .choose(&mut rng)
                .copied()
                .unwrap_or_default();
            Message {
                id: MessageId::new(),
                chatroom_id: request.chatroom_id,
                content: content.to_string(),
                image: None,
                kind,
                timestamp: request.before - chrono::Duration::minutes(size - i),
                status: MessageStatus::Sent,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn simulated_page_is_older_and_ordered() {
        let source = SimulatedHistory::new(Duration::from_millis(1_000));
        let before = Utc::now();
        let room = ChatroomId::new();

        let started = tokio::time::Instant::now();
        let batch = source
            .fetch(HistoryRequest {
                chatroom_id: room,
                page: 1,
                page_size: 20,
                before,
            })
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(1_000));
        assert_eq!(batch.len(), 20);
        assert!(batch.iter().all(|m| m.timestamp < before && m.chatroom_id == room));
        assert!(batch.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert!(batch.iter().all(|m| m.kind != MessageKind::System));
    }
}
