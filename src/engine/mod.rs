// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker-pool execution and the containers that compose processors.
//!
//! * [`Processor`] - one typed stage run by a pool of workers
//! * [`ProcessorChain`] - stages connected one after another
//! * [`ProcessorGraph`] - stages connected as a single-root DAG, drained round-robin

pub mod chain;
pub mod function;
pub mod graph;
pub mod processor;
mod worker;


pub use chain::ProcessorChain;
pub use function::{SetupFunction, TargetFunction};
pub use graph::ProcessorGraph;
pub use processor::{Processor, ProcessorBuilder};
