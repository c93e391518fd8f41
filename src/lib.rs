// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed worker-pool processors composed into chains and graphs.
//!
//! A [`Processor`](engine::Processor) runs a target function on a pool of
//! workers that compete for items on its input queue. Processors are composed
//! into a [`ProcessorChain`](engine::ProcessorChain) or a single-root
//! [`ProcessorGraph`](engine::ProcessorGraph); types are checked when the
//! container starts, and a graph's results are drained from its terminal
//! processors in round-robin order.

pub mod backends;      // queue transports
pub mod config;        // config files, registry, factory
pub mod engine;        // processors, chains, graphs
pub mod errors;        // error handling
pub mod models;        // payloads, results, stats
pub mod observability; // structured logging
pub mod traits;        // transport and pipeline abstractions

pub use engine::{Processor, ProcessorBuilder, ProcessorChain, ProcessorGraph, SetupFunction, TargetFunction};
pub use errors::{ConfigError, PipelineError, TransportError};
pub use models::{Payload, ProcessorResult, SetupArgs};
pub use traits::Pipeline;
