// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Broker-backed transport boundary.
//!
//! A processor deployed across hosts exchanges payloads through a message
//! broker instead of an in-memory queue. This module fixes the contract such a
//! deployment relies on and leaves the client itself pluggable:
//!
//! * every processor publishes its results to [`output_topic`]
//!   (`bowline-<processor>-output`),
//! * every processor consumes as the group [`consumer_group`]
//!   (`bowline-<processor>`), so its instances compete for messages,
//! * messages are the JSON serialization of the declared model ([`JsonCodec`]),
//! * consumers wait for a message with a short timeout ([`BROKER_POLL_INTERVAL`])
//!   through the client's async [`BrokerClient::consume`], so a worker
//!   waiting on an idle topic never holds a runtime thread.
//!
//! [`BrokerTransport`] implements [`Transport`] over any [`BrokerClient`], so
//! the worker loop is reused unchanged.
//!
//! # Example
//!
//! ```rust,ignore
//! let endpoints = BrokerEndpoints::new(Arc::new(my_client));
//! square.set_input_queue(endpoints.input_for("square", "add", JsonCodec::of::<AddOutput>()))?;
//! square.add_output_queue(endpoints.output_for("square", JsonCodec::of::<SquareOutput>()))?;
//! ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::consts::{BROKER_POLL_INTERVAL, TOPIC_PREFIX};
use crate::errors::TransportError;
use crate::models::{Payload, TypeTag};
use crate::observability::messages::transport::{ConsumeFailed, MessageSkipped};
use crate::observability::messages::StructuredLog;
use crate::traits::Transport;

/// Topic a processor publishes its results to.
pub fn output_topic(processor: &str) -> String {
    format!("{}-{}-output", TOPIC_PREFIX, processor)
}

/// Consumer group shared by all instances of a processor.
pub fn consumer_group(processor: &str) -> String {
    format!("{}-{}", TOPIC_PREFIX, processor)
}

/// Minimal client surface a message broker must offer.
///
/// A consumed message is committed for the group and delivered to one member
/// of it.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    fn produce(&self, topic: &str, message: Vec<u8>) -> Result<(), TransportError>;

    /// The next message for the group if one is already buffered. Must return
    /// without waiting on the network.
    fn try_consume(&self, topic: &str, group: &str) -> Result<Option<Vec<u8>>, TransportError>;

    /// Wait up to `timeout` for the next message for the group.
    ///
    /// Must be cancel safe: a message is committed only when the returned
    /// future completes with it. Clients with a native async poll should
    /// override this; the default checks the buffer and then sleeps.
    async fn consume(
        &self,
        topic: &str,
        group: &str,
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        if let Some(message) = self.try_consume(topic, group)? {
            return Ok(Some(message));
        }
        tokio::time::sleep(timeout).await;
        Ok(None)
    }

    /// Messages in `topic` not yet consumed by `group`.
    fn lag(&self, topic: &str, group: &str) -> usize;
}

/// JSON wire format for one model type.
#[derive(Clone, Copy)]
pub struct JsonCodec {
    tag: TypeTag,
    encode: fn(&Payload) -> Result<Vec<u8>, String>,
    decode: fn(&[u8]) -> Result<Payload, String>,
}

impl JsonCodec {
    pub fn of<T>() -> Self
    where
        T: Serialize + DeserializeOwned + Any + Send + Sync,
    {
        Self {
            tag: TypeTag::of::<T>(),
            encode: encode_json::<T>,
            decode: decode_json::<T>,
        }
    }

    pub fn type_tag(&self) -> TypeTag {
        self.tag
    }

    pub fn encode(&self, queue: &str, payload: &Payload) -> Result<Vec<u8>, TransportError> {
        (self.encode)(payload).map_err(|reason| TransportError::Encode {
            queue: queue.to_string(),
            type_name: self.tag.name().to_string(),
            reason,
        })
    }

    pub fn decode(&self, queue: &str, bytes: &[u8]) -> Result<Payload, TransportError> {
        (self.decode)(bytes).map_err(|reason| TransportError::Decode {
            queue: queue.to_string(),
            type_name: self.tag.name().to_string(),
            reason,
        })
    }
}

impl fmt::Debug for JsonCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonCodec({})", self.tag.name())
    }
}

fn encode_json<T: Serialize + Any>(payload: &Payload) -> Result<Vec<u8>, String> {
    let value = payload
        .downcast_ref::<T>()
        .ok_or_else(|| format!("payload is {}", payload.type_tag()))?;
    serde_json::to_vec(value).map_err(|e| e.to_string())
}

fn decode_json<T: DeserializeOwned + Any + Send + Sync>(bytes: &[u8]) -> Result<Payload, String> {
    serde_json::from_slice::<T>(bytes)
        .map(Payload::new)
        .map_err(|e| e.to_string())
}

/// A [`Transport`] reading and writing one broker topic as one consumer group.
pub struct BrokerTransport<C: BrokerClient> {
    client: Arc<C>,
    topic: String,
    group: String,
    codec: JsonCodec,
    poll_interval: Duration,
}

impl<C: BrokerClient> BrokerTransport<C> {
    pub fn new(
        client: Arc<C>,
        topic: impl Into<String>,
        group: impl Into<String>,
        codec: JsonCodec,
    ) -> Self {
        Self {
            client,
            topic: topic.into(),
            group: group.into(),
            codec,
            poll_interval: BROKER_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Next decodable buffered message; undecodable ones are consumed and skipped.
    fn next_payload(&self) -> Result<Option<Payload>, TransportError> {
        while let Some(bytes) = self.client.try_consume(&self.topic, &self.group)? {
            if let Some(payload) = self.decode_or_skip(&bytes) {
                return Ok(Some(payload));
            }
        }
        Ok(None)
    }

    fn decode_or_skip(&self, bytes: &[u8]) -> Option<Payload> {
        match self.codec.decode(&self.topic, bytes) {
            Ok(payload) => Some(payload),
            Err(error) => {
                MessageSkipped {
                    topic: &self.topic,
                    error: &error,
                }
                .log();
                None
            }
        }
    }
}

#[async_trait]
impl<C: BrokerClient + 'static> Transport for BrokerTransport<C> {
    fn name(&self) -> &str {
        &self.topic
    }

    fn push(&self, payload: Payload) -> Result<(), TransportError> {
        let message = self.codec.encode(&self.topic, &payload)?;
        self.client.produce(&self.topic, message)
    }

    fn try_pull(&self) -> Option<Payload> {
        match self.next_payload() {
            Ok(payload) => payload,
            Err(error) => {
                ConsumeFailed {
                    topic: &self.topic,
                    group: &self.group,
                    error: &error,
                }
                .log();
                None
            }
        }
    }

    async fn pull(&self) -> Result<Payload, TransportError> {
        loop {
            let consumed = self
                .client
                .consume(&self.topic, &self.group, self.poll_interval)
                .await?;
            if let Some(payload) = consumed.and_then(|bytes| self.decode_or_skip(&bytes)) {
                return Ok(payload);
            }
        }
    }

    fn len(&self) -> usize {
        self.client.lag(&self.topic, &self.group)
    }
}

impl<C: BrokerClient> fmt::Debug for BrokerTransport<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerTransport")
            .field("topic", &self.topic)
            .field("group", &self.group)
            .field("codec", &self.codec)
            .finish()
    }
}

/// Builds the broker transports for processors sharing one client.
pub struct BrokerEndpoints<C: BrokerClient> {
    client: Arc<C>,
    poll_interval: Duration,
}

impl<C: BrokerClient + 'static> BrokerEndpoints<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            poll_interval: BROKER_POLL_INTERVAL,
        }
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Input of `processor`: the output topic of `upstream`, consumed as `processor`'s group.
    pub fn input_for(&self, processor: &str, upstream: &str, codec: JsonCodec) -> Arc<dyn Transport> {
        Arc::new(
            BrokerTransport::new(
                self.client.clone(),
                output_topic(upstream),
                consumer_group(processor),
                codec,
            )
            .with_poll_interval(self.poll_interval),
        )
    }

    /// Output of `processor`: its own output topic. Reading from it drains as `processor`'s group.
    pub fn output_for(&self, processor: &str, codec: JsonCodec) -> Arc<dyn Transport> {
        Arc::new(
            BrokerTransport::new(
                self.client.clone(),
                output_topic(processor),
                consumer_group(processor),
                codec,
            )
            .with_poll_interval(self.poll_interval),
        )
    }
}
