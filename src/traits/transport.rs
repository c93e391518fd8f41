// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::fmt;

use crate::errors::TransportError;
use crate::models::Payload;

/// A queue that processors read inputs from and write outputs to.
///
/// The worker loop only ever talks to `dyn Transport`, so the same loop runs
/// over in-memory queues ([`crate::backends::memory::MemoryQueue`]) and over a
/// message broker ([`crate::backends::kafka::BrokerTransport`]).
///
/// Implementations must be safe for several competing consumers: each payload
/// is handed to exactly one caller of `pull`/`try_pull`.
#[async_trait]
pub trait Transport: fmt::Debug + Send + Sync {
    /// Queue or topic name, used in logs
    fn name(&self) -> &str;

    /// Enqueue without blocking.
    fn push(&self, payload: Payload) -> Result<(), TransportError>;

    /// Dequeue one payload if one is immediately available.
    fn try_pull(&self) -> Option<Payload>;

    /// Wait until a payload is available and dequeue it.
    ///
    /// Must be cancel safe: dropping the future before it completes must not
    /// lose a payload, because workers race it against their shutdown signal.
    async fn pull(&self) -> Result<Payload, TransportError>;

    /// Number of payloads currently waiting
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
