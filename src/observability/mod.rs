// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Log lines are produced through message structs that implement `Display`
//! and [`messages::StructuredLog`], so the wording of every event lives in one
//! place instead of being scattered through the engine as format strings.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::processor` - worker pool lifecycle and per-item failures
//! * `messages::engine` - chain and graph wiring, start and shutdown
//! * `messages::transport` - queue and broker events
//! * `messages::config` - configuration loading and resolution
//!
//! # Logging handle
//!
//! Nothing in the engine installs a subscriber. Workers log through whatever
//! dispatcher was current when their processor started, or through a
//! [`tracing::Dispatch`] injected with
//! [`crate::engine::ProcessorBuilder::dispatch`]. [`init_logging`] installs a
//! process-wide default for binaries and demos.
//!
//! # Usage
//!
//! ```rust
//! use bowline::observability::messages::processor::InvocationFailed;
//! use bowline::observability::messages::StructuredLog;
//!
//! let error = anyhow::anyhow!("division by zero");
//! InvocationFailed {
//!     processor: "divide",
//!     instance: 0,
//!     error: &error,
//! }
//! .log();
//! ```

mod logging;
pub mod messages;

pub use logging::{init_logging, logging_dispatch};
