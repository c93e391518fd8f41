// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for queue and broker events.

use std::fmt::{Display, Formatter};

use crate::errors::TransportError;
use crate::observability::messages::StructuredLog;

/// A broker message could not be decoded and was skipped.
///
/// # Log Level
/// `warn!` - The message is lost, the consumer keeps going
pub struct MessageSkipped<'a> {
    pub topic: &'a str,
    pub error: &'a TransportError,
}

impl Display for MessageSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipping message on '{}': {}", self.topic, self.error)
    }
}

impl StructuredLog for MessageSkipped<'_> {
    fn log(&self) {
        tracing::warn!(topic = self.topic, error = %self.error, "{}", self);
    }
}

/// Reading from the broker failed.
///
/// # Log Level
/// `warn!` - Potential issue, the consumer retries on the next poll
pub struct ConsumeFailed<'a> {
    pub topic: &'a str,
    pub group: &'a str,
    pub error: &'a TransportError,
}

impl Display for ConsumeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Group '{}' could not consume from '{}': {}",
            self.group, self.topic, self.error
        )
    }
}

impl StructuredLog for ConsumeFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            topic = self.topic,
            group = self.group,
            error = %self.error,
            "{}", self
        );
    }
}
