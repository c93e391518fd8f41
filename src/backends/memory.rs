// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Unbounded in-memory queue shared by the workers of connected processors.

use async_trait::async_trait;
use crossbeam::queue::SegQueue;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Notify;

use crate::errors::TransportError;
use crate::models::Payload;
use crate::traits::Transport;

/// A lock-free MPMC queue with an async, cancel-safe `pull`.
///
/// Any number of producers may push while any number of workers wait on
/// `pull`; every payload is handed to exactly one of them.
pub struct MemoryQueue {
    name: String,
    items: SegQueue<Payload>,
    available: Notify,
}

impl MemoryQueue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: SegQueue::new(),
            available: Notify::new(),
        }
    }

    /// A new queue behind the handle processors hold their queues by.
    pub fn shared(name: impl Into<String>) -> Arc<dyn Transport> {
        Arc::new(Self::new(name))
    }
}

#[async_trait]
impl Transport for MemoryQueue {
    fn name(&self) -> &str {
        &self.name
    }

    fn push(&self, payload: Payload) -> Result<(), TransportError> {
        self.items.push(payload);
        self.available.notify_one();
        Ok(())
    }

    fn try_pull(&self) -> Option<Payload> {
        self.items.pop()
    }

    async fn pull(&self) -> Result<Payload, TransportError> {
        loop {
            // Register interest before checking so a push in between is not missed.
            let notified = self.available.notified();
            if let Some(payload) = self.items.pop() {
                if !self.items.is_empty() {
                    // Pass the wakeup on; a stored permit may have been consumed for this item.
                    self.available.notify_one();
                }
                return Ok(payload);
            }
            notified.await;
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

impl fmt::Debug for MemoryQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryQueue")
            .field("name", &self.name)
            .field("len", &self.items.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_fifo_order() {
        let queue = MemoryQueue::new("fifo");
        for i in 0..5u32 {
            queue.push(Payload::new(i)).unwrap();
        }

        assert_eq!(queue.len(), 5);
        let drained: Vec<u32> = std::iter::from_fn(|| queue.try_pull())
            .map(|p| *p.downcast_ref::<u32>().unwrap())
            .collect();
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_pull_waits_for_push() {
        let queue = Arc::new(MemoryQueue::new("wait"));
        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pull().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_finished());

        queue.push(Payload::new("hello")).unwrap();
        let payload = timeout(Duration::from_secs(1), consumer)
            .await
            .expect("pull should complete after push")
            .unwrap()
            .unwrap();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"hello"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_competing_consumers_take_each_item_once() {
        let queue = Arc::new(MemoryQueue::new("competing"));
        let total = 200u32;

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move {
                    let mut seen = Vec::new();
                    while let Ok(Ok(payload)) =
                        timeout(Duration::from_millis(200), queue.pull()).await
                    {
                        seen.push(*payload.downcast_ref::<u32>().unwrap());
                    }
                    seen
                })
            })
            .collect();

        for i in 0..total {
            queue.push(Payload::new(i)).unwrap();
        }

        let mut all = Vec::new();
        for consumer in consumers {
            all.extend(consumer.await.unwrap());
        }

        assert_eq!(all.len(), total as usize);
        let unique: HashSet<u32> = all.into_iter().collect();
        assert_eq!(unique.len(), total as usize);
    }

    #[tokio::test]
    async fn test_cancelled_pull_loses_nothing() {
        let queue = MemoryQueue::new("cancel");

        let cancelled = timeout(Duration::from_millis(10), queue.pull()).await;
        assert!(cancelled.is_err());

        queue.push(Payload::new(42u64)).unwrap();
        let payload = timeout(Duration::from_secs(1), queue.pull())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payload.downcast_ref::<u64>(), Some(&42));
    }

    #[tokio::test]
    async fn test_pull_drains_burst_pushed_before_waiting() {
        let queue = MemoryQueue::new("burst");
        for i in 0..3i32 {
            queue.push(Payload::new(i)).unwrap();
        }

        for expected in 0..3i32 {
            let payload = timeout(Duration::from_secs(1), queue.pull())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(payload.downcast_ref::<i32>(), Some(&expected));
        }
    }
}
