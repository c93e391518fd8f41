// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::PipelineError;
use crate::models::{Payload, ProcessorResult};

/// Common surface of anything that accepts input and hands back results:
/// a single [`crate::engine::Processor`], a [`crate::engine::ProcessorChain`]
/// or a [`crate::engine::ProcessorGraph`].
///
/// The config factory returns a `Box<dyn Pipeline>` so callers can drive a
/// configured pipeline without knowing its shape.
#[async_trait]
pub trait Pipeline: Send {
    /// "processor", "chain" or "graph"
    fn kind(&self) -> &'static str;

    /// Push a type-erased input to the entry stage.
    fn push_payload(&self, input: Payload) -> Result<(), PipelineError>;

    /// Wire queues and spawn all workers.
    fn start(&mut self) -> Result<(), PipelineError>;

    fn has_output(&self) -> bool;

    /// Non-blocking; `None` when nothing is ready.
    fn get_output(&mut self) -> Option<ProcessorResult>;

    /// Stop every worker. Returns only once all of them have exited.
    async fn shutdown(&mut self);
}
