// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it at its level with its fields attached.
//!
//! # Organization
//!
//! * `processor` - worker pool lifecycle and per-item failures
//! * `engine` - chain and graph wiring, start and shutdown
//! * `transport` - queue and broker events
//! * `config` - configuration loading and resolution
//!
//! # Usage Pattern
//!
//! ```rust
//! use bowline::observability::messages::engine::PipelineStarting;
//! use bowline::observability::messages::StructuredLog;
//!
//! let msg = PipelineStarting {
//!     kind: "graph",
//!     processor_count: 3,
//! };
//!
//! msg.log();
//! ```

pub mod config;
pub mod engine;
pub mod processor;
pub mod transport;

use std::fmt::Display;
use tracing::Span;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the message as a tracing event.
    fn log(&self);

    /// A span carrying the message's fields, for work done on its behalf.
    fn span(&self, name: &str) -> Span {
        tracing::info_span!("bowline", span_name = name)
    }
}
