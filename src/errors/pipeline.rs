// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration and lifecycle errors for processors, chains and graphs.
//!
//! All of these surface synchronously to the caller, before any worker is
//! spawned. Failures inside a target function never become a `PipelineError`;
//! they are logged by the worker and the item is dropped.

use thiserror::Error;

use crate::errors::TransportError;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A chain or graph was used before any processor was added
    #[error("There are no processors in the {container}. You must add processors before you can {action}.")]
    NoProcessors {
        container: &'static str,
        action: &'static str,
    },

    /// `start()` was called on a processor that is already running
    #[error("Processor '{processor}' has already been started. You cannot start it again.")]
    AlreadyStarted { processor: String },

    /// Workers can only be spawned from inside a tokio runtime
    #[error("Processor '{processor}' cannot start outside of a tokio runtime")]
    NoRuntime { processor: String },

    /// Input was pushed to a source stage
    #[error("No input type was specified for processor '{processor}'. Cannot push data to it.")]
    NoInputType { processor: String },

    /// Input was pushed to a processor whose input queue is missing
    #[error("Input queue does not exist for processor '{processor}'")]
    NoInputQueue { processor: String },

    /// A sink stage was wired to feed another stage
    #[error("Processor '{processor}' declares no output type and cannot feed '{downstream}'")]
    NoOutputType {
        processor: String,
        downstream: String,
    },

    /// The sole output queue was requested from a fan-out processor
    #[error("Processor '{processor}' has {count} output queues; expected exactly one")]
    AmbiguousOutputQueue { processor: String, count: usize },

    /// Pushed input does not match the declared input type
    #[error("Input is of type {found}, but the '{processor}' processor expects {expected}")]
    InputTypeMismatch {
        processor: String,
        expected: String,
        found: String,
    },

    /// An upstream output type does not match a downstream input type
    #[error("The output type of processor '{upstream}' ({output}) does not match the input type of processor '{downstream}' ({input})")]
    TypeMismatch {
        upstream: String,
        output: String,
        downstream: String,
        input: String,
    },

    /// A second parentless processor was added to a graph
    #[error("ProcessorGraph already has root '{root}'. You must provide a parent to link '{processor}' to.")]
    RootAlreadyDefined { root: String, processor: String },

    /// The named parent is not part of the graph
    #[error("Parent '{parent}' of processor '{processor}' has not been added to the ProcessorGraph")]
    UnknownParent { parent: String, processor: String },

    /// The edge parent -> processor already exists
    #[error("Processor '{processor}' is already linked to '{parent}'")]
    DuplicateEdge { parent: String, processor: String },

    /// A second processor reuses a graph name but differs in types or instance count
    #[error("Processor '{processor}' is already in the graph with a different definition: {reason}")]
    ConflictingDefinition { processor: String, reason: String },

    /// The edge parent -> processor would close a loop
    #[error("Linking '{processor}' under '{parent}' would introduce a cycle")]
    CycleDetected { parent: String, processor: String },

    #[error("Processor '{processor}' requires at least one instance")]
    InvalidInstances { processor: String },

    #[error("Processor '{processor}' has no target function")]
    MissingTarget { processor: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}
