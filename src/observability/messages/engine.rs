// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for chain and graph lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Starting and shutting down a container of processors
//! * Wiring one processor's output queue to another's input

use std::fmt::{Display, Formatter};
use tracing::Span;

use crate::observability::messages::StructuredLog;

/// A chain or graph is wiring and starting its processors.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use bowline::observability::messages::engine::PipelineStarting;
/// use bowline::observability::messages::StructuredLog;
///
/// let msg = PipelineStarting {
///     kind: "chain",
///     processor_count: 2,
/// };
///
/// let span = msg.span("start");
/// let _guard = span.enter();
/// msg.log();
/// ```
pub struct PipelineStarting<'a> {
    pub kind: &'a str,
    pub processor_count: usize,
}

impl Display for PipelineStarting<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting {} with {} processor(s)",
            self.kind, self.processor_count
        )
    }
}

impl StructuredLog for PipelineStarting<'_> {
    fn log(&self) {
        tracing::info!(
            kind = self.kind,
            processor_count = self.processor_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline",
            span_name = name,
            kind = self.kind,
            processor_count = self.processor_count,
        )
    }
}

/// One processor's output queue became another's input queue.
///
/// # Log Level
/// `info!` - Important operational event
pub struct QueueWired<'a> {
    pub upstream: &'a str,
    pub downstream: &'a str,
    pub queue: &'a str,
}

impl Display for QueueWired<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Setting output queue '{}' of '{}' as input queue of '{}'",
            self.queue, self.upstream, self.downstream
        )
    }
}

impl StructuredLog for QueueWired<'_> {
    fn log(&self) {
        tracing::info!(
            upstream = self.upstream,
            downstream = self.downstream,
            queue = self.queue,
            "{}", self
        );
    }
}

/// A processor name already present in a graph was linked under a new parent;
/// the duplicate instance passed in is dropped.
///
/// # Log Level
/// `warn!` - The processor passed in is discarded
pub struct ExistingProcessorLinked<'a> {
    pub processor: &'a str,
    pub parent: &'a str,
}

impl Display for ExistingProcessorLinked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' is already in the graph; linking the existing processor under '{}' and discarding the new one",
            self.processor, self.parent
        )
    }
}

impl StructuredLog for ExistingProcessorLinked<'_> {
    fn log(&self) {
        tracing::warn!(
            processor = self.processor,
            parent = self.parent,
            "{}", self
        );
    }
}

/// A chain or graph is shutting down its processors.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PipelineShuttingDown<'a> {
    pub kind: &'a str,
    pub processor_count: usize,
}

impl Display for PipelineShuttingDown<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Shutting down {} with {} processor(s)",
            self.kind, self.processor_count
        )
    }
}

impl StructuredLog for PipelineShuttingDown<'_> {
    fn log(&self) {
        tracing::info!(
            kind = self.kind,
            processor_count = self.processor_count,
            "{}", self
        );
    }
}
