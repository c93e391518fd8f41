// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::backends::kafka::BrokerClient;
use crate::errors::TransportError;

/// An in-memory broker for tests: append-only topics with one offset per
/// (topic, group).
#[derive(Default)]
pub struct StubBroker {
    topics: Mutex<HashMap<String, Vec<Vec<u8>>>>,
    offsets: Mutex<HashMap<(String, String), usize>>,
    failing: AtomicBool,
}

impl StubBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything produced to `topic` so far, consumed or not.
    pub fn messages(&self, topic: &str) -> Vec<Vec<u8>> {
        self.topics
            .lock()
            .unwrap()
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every consume call fail, simulating a broker outage.
    pub fn fail_consumes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl BrokerClient for StubBroker {
    fn produce(&self, topic: &str, message: Vec<u8>) -> Result<(), TransportError> {
        self.topics
            .lock()
            .unwrap()
            .entry(topic.to_string())
            .or_default()
            .push(message);
        Ok(())
    }

    fn try_consume(&self, topic: &str, group: &str) -> Result<Option<Vec<u8>>, TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Broker {
                queue: topic.to_string(),
                message: "broker unavailable".to_string(),
            });
        }

        let topics = self.topics.lock().unwrap();
        let mut offsets = self.offsets.lock().unwrap();
        let offset = offsets
            .entry((topic.to_string(), group.to_string()))
            .or_insert(0);

        match topics.get(topic).and_then(|messages| messages.get(*offset)) {
            Some(message) => {
                *offset += 1;
                Ok(Some(message.clone()))
            }
            None => Ok(None),
        }
    }

    fn lag(&self, topic: &str, group: &str) -> usize {
        let produced = self.topics.lock().unwrap().get(topic).map_or(0, Vec::len);
        let consumed = self
            .offsets
            .lock()
            .unwrap()
            .get(&(topic.to_string(), group.to_string()))
            .copied()
            .unwrap_or(0);
        produced.saturating_sub(consumed)
    }
}
