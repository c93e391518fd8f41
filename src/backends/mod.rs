// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Transport backends that carry payloads between processors.
//!
//! Every backend implements the [`Transport`](crate::traits::Transport) trait,
//! so the worker loop is written once and runs unchanged over any of them.
//!
//! # Available Backends
//!
//! ## Memory Backend
//! Unbounded in-process MPMC queue:
//! - **Delivery**: Competing consumers, each payload taken by exactly one worker
//! - **Ordering**: FIFO per queue
//! - **Waiting**: Cancel-safe async `pull`, no polling
//! - **Use Case**: Default wiring for processors, chains and graphs
//!
//! ## Kafka Backend
//! The broker boundary a distributed deployment plugs into:
//! - **Naming**: `bowline-<processor>-output` topics, `bowline-<processor>` groups
//! - **Wire format**: JSON-serialized payloads of the declared model
//! - **Client**: Any [`BrokerClient`](kafka::BrokerClient) implementation
//!
//! ## Stub Backend (Test-Only)
//! An in-memory [`BrokerClient`](kafka::BrokerClient) with per-group offsets,
//! used to exercise the broker transport without a broker.
//!
//! # Examples
//!
//! ```rust
//! use bowline::backends::memory::MemoryQueue;
//! use bowline::models::Payload;
//! use bowline::traits::Transport;
//!
//! let queue = MemoryQueue::new("numbers");
//! queue.push(Payload::new(7u32))?;
//!
//! let item = queue.try_pull().expect("one item queued");
//! assert_eq!(item.downcast_ref::<u32>(), Some(&7));
//! # Ok::<(), bowline::errors::TransportError>(())
//! ```

pub mod kafka;
pub mod memory;
#[cfg(test)]
pub mod stub;
