// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for processor and worker lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Spawning worker instances
//! * Setup function and target function failures
//! * Delivering results to output queues
//! * The shutdown protocol

use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

use crate::errors::TransportError;
use crate::observability::messages::StructuredLog;

/// Processor is spawning its worker instances.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ProcessorStarting<'a> {
    pub processor: &'a str,
    pub instances: usize,
}

impl Display for ProcessorStarting<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting processor '{}' with {} instance(s)",
            self.processor, self.instances
        )
    }
}

impl StructuredLog for ProcessorStarting<'_> {
    fn log(&self) {
        tracing::info!(
            processor = self.processor,
            instances = self.instances,
            "{}", self
        );
    }
}

/// A worker instance entered its execution loop.
///
/// # Log Level
/// `debug!` - Lifecycle detail
///
/// The span produced by this message wraps everything the worker logs.
pub struct WorkerStarted<'a> {
    pub processor: &'a str,
    pub instance: usize,
}

impl Display for WorkerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} of processor '{}' started",
            self.instance, self.processor
        )
    }
}

impl StructuredLog for WorkerStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            processor = self.processor,
            instance = self.instance,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker",
            span_name = name,
            processor = self.processor,
            instance = self.instance,
        )
    }
}

/// A worker instance left its execution loop.
///
/// # Log Level
/// `debug!` - Lifecycle detail
pub struct WorkerStopped<'a> {
    pub processor: &'a str,
    pub instance: usize,
    pub inputs_processed: u64,
}

impl Display for WorkerStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} of processor '{}' stopped after {} input(s)",
            self.instance, self.processor, self.inputs_processed
        )
    }
}

impl StructuredLog for WorkerStopped<'_> {
    fn log(&self) {
        tracing::debug!(
            processor = self.processor,
            instance = self.instance,
            inputs_processed = self.inputs_processed,
            "{}", self
        );
    }
}

/// The setup function failed; this worker will not run.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct SetupFailed<'a> {
    pub processor: &'a str,
    pub instance: usize,
    pub error: &'a anyhow::Error,
}

impl Display for SetupFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Setup of worker {} of processor '{}' failed, worker will not start: {:#}",
            self.instance, self.processor, self.error
        )
    }
}

impl StructuredLog for SetupFailed<'_> {
    fn log(&self) {
        tracing::error!(
            processor = self.processor,
            instance = self.instance,
            error = %self.error,
            "{}", self
        );
    }
}

/// The target function returned an error; the item is dropped.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct InvocationFailed<'a> {
    pub processor: &'a str,
    pub instance: usize,
    pub error: &'a anyhow::Error,
}

impl Display for InvocationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' (worker {}) failed to process an item: {:#}",
            self.processor, self.instance, self.error
        )
    }
}

impl StructuredLog for InvocationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            processor = self.processor,
            instance = self.instance,
            error = %self.error,
            "{}", self
        );
    }
}

/// The target function panicked; the item is dropped.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct InvocationPanicked<'a> {
    pub processor: &'a str,
    pub instance: usize,
    pub reason: &'a str,
}

impl Display for InvocationPanicked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' (worker {}) panicked while processing an item: {}",
            self.processor, self.instance, self.reason
        )
    }
}

impl StructuredLog for InvocationPanicked<'_> {
    fn log(&self) {
        tracing::error!(
            processor = self.processor,
            instance = self.instance,
            reason = self.reason,
            "{}", self
        );
    }
}

/// Waiting for input failed on the transport.
///
/// # Log Level
/// `warn!` - Potential issue, the worker retries
pub struct InputPullFailed<'a> {
    pub processor: &'a str,
    pub instance: usize,
    pub error: &'a TransportError,
}

impl Display for InputPullFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} of processor '{}' could not read input: {}",
            self.instance, self.processor, self.error
        )
    }
}

impl StructuredLog for InputPullFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            processor = self.processor,
            instance = self.instance,
            error = %self.error,
            "{}", self
        );
    }
}

/// A result could not be written to one of the output queues.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct OutputDeliveryFailed<'a> {
    pub processor: &'a str,
    pub queue: &'a str,
    pub error: &'a TransportError,
}

impl Display for OutputDeliveryFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' could not deliver a result to '{}': {}",
            self.processor, self.queue, self.error
        )
    }
}

impl StructuredLog for OutputDeliveryFailed<'_> {
    fn log(&self) {
        tracing::error!(
            processor = self.processor,
            queue = self.queue,
            error = %self.error,
            "{}", self
        );
    }
}

/// Shutdown signals are being sent to the live workers.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ShutdownRequested<'a> {
    pub processor: &'a str,
    pub live_workers: usize,
}

impl Display for ShutdownRequested<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Shutting down processor '{}' ({} live worker(s))",
            self.processor, self.live_workers
        )
    }
}

impl StructuredLog for ShutdownRequested<'_> {
    fn log(&self) {
        tracing::info!(
            processor = self.processor,
            live_workers = self.live_workers,
            "{}", self
        );
    }
}

/// A worker did not exit within the join timeout; it will be signalled again.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct ShutdownStalled<'a> {
    pub processor: &'a str,
    pub instance: usize,
    pub attempt: u32,
    pub timeout: Duration,
}

impl Display for ShutdownStalled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} of processor '{}' still running {:?} after shutdown attempt {}; retrying",
            self.instance, self.processor, self.timeout, self.attempt
        )
    }
}

impl StructuredLog for ShutdownStalled<'_> {
    fn log(&self) {
        tracing::warn!(
            processor = self.processor,
            instance = self.instance,
            attempt = self.attempt,
            timeout_ms = self.timeout.as_millis() as u64,
            "{}", self
        );
    }
}

/// All workers of a processor have exited.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ShutdownCompleted<'a> {
    pub processor: &'a str,
    pub attempts: u32,
}

impl Display for ShutdownCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Processor '{}' shut down after {} attempt(s)",
            self.processor, self.attempts
        )
    }
}

impl StructuredLog for ShutdownCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            processor = self.processor,
            attempts = self.attempts,
            "{}", self
        );
    }
}
