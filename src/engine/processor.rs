// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A typed processing stage backed by a pool of workers.
//!
//! A [`Processor`] owns one input queue (unless it is a source), a list of
//! output queues (empty for a sink) and, once started, one worker task per
//! instance. All instances of a processor compete for items on the same input
//! queue and push every result to all of its output queues.
//!
//! # Lifecycle
//!
//! ```text
//! ProcessorBuilder::build ──► start() ──► push_input / get_output ──► shutdown()
//!        queues created        workers spawned                        workers joined
//! ```
//!
//! # Example
//!
//! ```rust
//! use bowline::engine::{Processor, TargetFunction};
//! use bowline::models::SetupArgs;
//!
//! # #[tokio::main(flavor = "multi_thread")]
//! # async fn main() -> Result<(), bowline::errors::PipelineError> {
//! let mut square = Processor::builder("square")
//!     .target(TargetFunction::transform(|x: &i64, _: &SetupArgs| Ok(x * x)))
//!     .instances(2)
//!     .build()?;
//!
//! square.start()?;
//! square.push_input(7i64)?;
//!
//! let result = loop {
//!     if let Some(result) = square.get_output() {
//!         break result;
//!     }
//!     tokio::task::yield_now().await;
//! };
//! assert_eq!(result.processor(), "square");
//! assert_eq!(result.output_as::<i64>(), Some(&49));
//!
//! square.shutdown().await;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::instrument::WithSubscriber;
use tracing::Dispatch;

use crate::backends::memory::MemoryQueue;
use crate::config::consts::{DEFAULT_INSTANCES, DEFAULT_JOIN_TIMEOUT};
use crate::engine::function::{SetupFunction, TargetFunction};
use crate::engine::worker::Worker;
use crate::errors::PipelineError;
use crate::models::{InstanceStats, InstanceStatsSnapshot, Payload, ProcessorResult, Signal, TypeTag};
use crate::observability::messages::processor::{
    ProcessorStarting, ShutdownCompleted, ShutdownRequested, ShutdownStalled,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Pipeline, Transport};

/// Configures and builds a [`Processor`].
pub struct ProcessorBuilder {
    name: String,
    target: Option<TargetFunction>,
    setup: Option<SetupFunction>,
    instances: usize,
    delay: Option<Duration>,
    join_timeout: Duration,
    dispatch: Option<Dispatch>,
}

impl ProcessorBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            setup: None,
            instances: DEFAULT_INSTANCES,
            delay: None,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
            dispatch: None,
        }
    }

    pub fn target(mut self, target: TargetFunction) -> Self {
        self.target = Some(target);
        self
    }

    pub fn setup(mut self, setup: SetupFunction) -> Self {
        self.setup = Some(setup);
        self
    }

    pub fn instances(mut self, instances: usize) -> Self {
        self.instances = instances;
        self
    }

    /// Pause each worker for `delay` after every item. Zero disables the pause.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = (!delay.is_zero()).then_some(delay);
        self
    }

    /// How long `shutdown` waits for one worker before signalling it again.
    pub fn join_timeout(mut self, join_timeout: Duration) -> Self {
        self.join_timeout = join_timeout;
        self
    }

    /// Send worker logs to `dispatch` instead of the dispatcher current at `start()`.
    pub fn dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn build(self) -> Result<Processor, PipelineError> {
        let target = self.target.ok_or_else(|| PipelineError::MissingTarget {
            processor: self.name.clone(),
        })?;
        if self.instances == 0 {
            return Err(PipelineError::InvalidInstances {
                processor: self.name,
            });
        }

        let input_queue = target
            .input_type()
            .map(|_| MemoryQueue::shared(format!("{}-input", self.name)));
        let output_queues = target
            .output_type()
            .map(|_| MemoryQueue::shared(format!("{}-output", self.name)))
            .into_iter()
            .collect();

        Ok(Processor {
            name: self.name,
            target,
            setup: self.setup,
            instances: self.instances,
            delay: self.delay,
            join_timeout: self.join_timeout,
            dispatch: self.dispatch,
            input_queue,
            output_queues,
            workers: Vec::new(),
            stats: Vec::new(),
            started: false,
        })
    }
}

struct WorkerHandle {
    signals: UnboundedSender<Signal>,
    handle: JoinHandle<()>,
}

/// A named stage that runs its target function on a pool of workers.
pub struct Processor {
    name: String,
    target: TargetFunction,
    setup: Option<SetupFunction>,
    instances: usize,
    delay: Option<Duration>,
    join_timeout: Duration,
    dispatch: Option<Dispatch>,
    input_queue: Option<Arc<dyn Transport>>,
    output_queues: Vec<Arc<dyn Transport>>,
    workers: Vec<WorkerHandle>,
    stats: Vec<Arc<InstanceStats>>,
    started: bool,
}

impl Processor {
    pub fn builder(name: impl Into<String>) -> ProcessorBuilder {
        ProcessorBuilder::new(name)
    }

    /// Spawn one worker per instance on the current tokio runtime.
    pub fn start(&mut self) -> Result<(), PipelineError> {
        if self.started {
            return Err(PipelineError::AlreadyStarted {
                processor: self.name.clone(),
            });
        }
        let runtime = Handle::try_current().map_err(|_| PipelineError::NoRuntime {
            processor: self.name.clone(),
        })?;

        ProcessorStarting {
            processor: &self.name,
            instances: self.instances,
        }
        .log();

        for instance in 0..self.instances {
            let (signals, receiver) = mpsc::unbounded_channel();
            let stats = Arc::new(InstanceStats::new(instance));
            let worker = Worker {
                processor: self.name.clone(),
                instance,
                target: self.target.clone(),
                setup: self.setup.clone(),
                input: self.input_queue.clone(),
                outputs: self.output_queues.clone(),
                delay: self.delay,
                stats: stats.clone(),
            };

            let task = worker.run(receiver);
            let handle = match &self.dispatch {
                Some(dispatch) => runtime.spawn(task.with_subscriber(dispatch.clone())),
                None => runtime.spawn(task.with_current_subscriber()),
            };

            self.workers.push(WorkerHandle { signals, handle });
            self.stats.push(stats);
        }

        self.started = true;
        Ok(())
    }

    pub fn push_input<T: Any + Send + Sync>(&self, value: T) -> Result<(), PipelineError> {
        self.push_payload(Payload::new(value))
    }

    /// Enqueue an already wrapped value; its type must match the declared input type.
    pub fn push_payload(&self, payload: Payload) -> Result<(), PipelineError> {
        let expected = self
            .target
            .input_type()
            .ok_or_else(|| PipelineError::NoInputType {
                processor: self.name.clone(),
            })?;
        let queue = self
            .input_queue
            .as_ref()
            .ok_or_else(|| PipelineError::NoInputQueue {
                processor: self.name.clone(),
            })?;

        if payload.type_tag() != expected {
            return Err(PipelineError::InputTypeMismatch {
                processor: self.name.clone(),
                expected: expected.name().to_string(),
                found: payload.type_tag().name().to_string(),
            });
        }

        queue.push(payload)?;
        Ok(())
    }

    /// Take one result from the first output queue that has one.
    pub fn get_output(&self) -> Option<ProcessorResult> {
        self.output_queues
            .iter()
            .find_map(|queue| queue.try_pull())
            .map(|output| ProcessorResult::new(self.name.as_str(), output))
    }

    pub fn has_output(&self) -> bool {
        self.output_queues.iter().any(|queue| !queue.is_empty())
    }

    /// Results waiting across all output queues.
    pub fn output_len(&self) -> usize {
        self.output_queues.iter().map(|queue| queue.len()).sum()
    }

    pub fn get_stats(&self) -> Vec<InstanceStatsSnapshot> {
        self.stats.iter().map(|stats| stats.snapshot()).collect()
    }

    /// Signal every live worker and wait for it, repeating until none is left.
    ///
    /// A worker busy inside its target function only sees the signal once the
    /// call returns, so a call that never returns keeps this waiting.
    pub async fn shutdown(&mut self) {
        let live_workers = self.live_workers();
        if live_workers == 0 {
            return;
        }

        ShutdownRequested {
            processor: &self.name,
            live_workers,
        }
        .log();

        let mut attempts = 0;
        loop {
            attempts += 1;
            let mut stalled = false;

            for (instance, worker) in self.workers.iter_mut().enumerate() {
                if worker.handle.is_finished() {
                    continue;
                }

                // A closed channel means the worker is already on its way out.
                let _ = worker.signals.send(Signal::Shutdown);

                if tokio::time::timeout(self.join_timeout, &mut worker.handle)
                    .await
                    .is_err()
                {
                    ShutdownStalled {
                        processor: &self.name,
                        instance,
                        attempt: attempts,
                        timeout: self.join_timeout,
                    }
                    .log();
                    stalled = true;
                }
            }

            if !stalled {
                break;
            }
        }

        ShutdownCompleted {
            processor: &self.name,
            attempts,
        }
        .log();
    }

    pub fn live_workers(&self) -> usize {
        self.workers
            .iter()
            .filter(|worker| !worker.handle.is_finished())
            .count()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_type(&self) -> Option<TypeTag> {
        self.target.input_type()
    }

    pub fn output_type(&self) -> Option<TypeTag> {
        self.target.output_type()
    }

    pub fn instances(&self) -> usize {
        self.instances
    }

    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn input_queue(&self) -> Option<&Arc<dyn Transport>> {
        self.input_queue.as_ref()
    }

    pub fn output_queues(&self) -> &[Arc<dyn Transport>] {
        &self.output_queues
    }

    /// Replace the queue this processor's workers read from.
    pub fn set_input_queue(&mut self, queue: Arc<dyn Transport>) -> Result<(), PipelineError> {
        self.ensure_not_started()?;
        if self.input_type().is_none() {
            return Err(PipelineError::NoInputType {
                processor: self.name.clone(),
            });
        }
        self.input_queue = Some(queue);
        Ok(())
    }

    /// Add a queue that receives a copy of every result.
    pub fn add_output_queue(&mut self, queue: Arc<dyn Transport>) -> Result<(), PipelineError> {
        self.ensure_not_started()?;
        if self.output_type().is_none() {
            return Err(PipelineError::NoOutputType {
                processor: self.name.clone(),
                downstream: queue.name().to_string(),
            });
        }
        self.output_queues.push(queue);
        Ok(())
    }

    /// The single output queue, to be shared with `downstream` as its input.
    pub fn output_queue(&self, downstream: &str) -> Result<Arc<dyn Transport>, PipelineError> {
        match self.output_queues.as_slice() {
            [queue] => Ok(queue.clone()),
            [] => Err(PipelineError::NoOutputType {
                processor: self.name.clone(),
                downstream: downstream.to_string(),
            }),
            queues => Err(PipelineError::AmbiguousOutputQueue {
                processor: self.name.clone(),
                count: queues.len(),
            }),
        }
    }

    pub(crate) fn clear_output_queues(&mut self) -> Result<(), PipelineError> {
        self.ensure_not_started()?;
        self.output_queues.clear();
        Ok(())
    }

    fn ensure_not_started(&self) -> Result<(), PipelineError> {
        if self.started {
            return Err(PipelineError::AlreadyStarted {
                processor: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Check that `upstream`'s results can feed `downstream`.
pub(crate) fn check_link(upstream: &Processor, downstream: &Processor) -> Result<(), PipelineError> {
    let Some(output) = upstream.output_type() else {
        return Err(PipelineError::NoOutputType {
            processor: upstream.name().to_string(),
            downstream: downstream.name().to_string(),
        });
    };

    if downstream.input_type() != Some(output) {
        return Err(PipelineError::TypeMismatch {
            upstream: upstream.name().to_string(),
            output: output.name().to_string(),
            downstream: downstream.name().to_string(),
            input: TypeTag::describe(downstream.input_type()),
        });
    }
    Ok(())
}

#[async_trait]
impl Pipeline for Processor {
    fn kind(&self) -> &'static str {
        "processor"
    }

    fn push_payload(&self, payload: Payload) -> Result<(), PipelineError> {
        Processor::push_payload(self, payload)
    }

    fn start(&mut self) -> Result<(), PipelineError> {
        Processor::start(self)
    }

    fn has_output(&self) -> bool {
        Processor::has_output(self)
    }

    fn get_output(&mut self) -> Option<ProcessorResult> {
        Processor::get_output(self)
    }

    async fn shutdown(&mut self) {
        Processor::shutdown(self).await
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("name", &self.name)
            .field("input", &TypeTag::describe(self.input_type()))
            .field("output", &TypeTag::describe(self.output_type()))
            .field("instances", &self.instances)
            .field("output_queues", &self.output_queues.len())
            .field("started", &self.started)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SetupArgs;

    fn square() -> ProcessorBuilder {
        Processor::builder("square").target(TargetFunction::transform(|x: &i64, _: &SetupArgs| Ok(x * x)))
    }

    #[test]
    fn test_build_requires_target() {
        let err = Processor::builder("empty").build().unwrap_err();
        assert!(matches!(err, PipelineError::MissingTarget { processor } if processor == "empty"));
    }

    #[test]
    fn test_build_rejects_zero_instances() {
        let err = square().instances(0).build().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInstances { .. }));
    }

    #[test]
    fn test_build_creates_queues_from_declared_types() {
        let transform = square().build().unwrap();
        assert!(transform.input_queue().is_some());
        assert_eq!(transform.output_queues().len(), 1);

        let source = Processor::builder("ticks")
            .target(TargetFunction::source(|_: &SetupArgs| Ok(Some(1u8))))
            .build()
            .unwrap();
        assert!(source.input_queue().is_none());
        assert_eq!(source.output_queues().len(), 1);

        let sink = Processor::builder("drop")
            .target(TargetFunction::sink(|_: &u8, _: &SetupArgs| Ok(())))
            .build()
            .unwrap();
        assert!(sink.input_queue().is_some());
        assert!(sink.output_queues().is_empty());
    }

    #[test]
    fn test_start_outside_runtime_fails() {
        let mut processor = square().build().unwrap();
        let err = processor.start().unwrap_err();
        assert!(matches!(err, PipelineError::NoRuntime { .. }));
        assert!(!processor.is_started());
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let mut processor = square().build().unwrap();
        processor.start().unwrap();

        let err = processor.start().unwrap_err();
        assert!(matches!(err, PipelineError::AlreadyStarted { .. }));
        assert_eq!(processor.get_stats().len(), 1);

        processor.shutdown().await;
    }

    #[test]
    fn test_push_to_source_fails() {
        let source = Processor::builder("ticks")
            .target(TargetFunction::source(|_: &SetupArgs| Ok(Some(1u8))))
            .build()
            .unwrap();

        let err = source.push_input(1u8).unwrap_err();
        assert!(matches!(err, PipelineError::NoInputType { .. }));
    }

    #[test]
    fn test_push_wrong_type_fails() {
        let processor = square().build().unwrap();

        let err = processor.push_input("seven").unwrap_err();
        match err {
            PipelineError::InputTypeMismatch { expected, found, .. } => {
                assert_eq!(expected, "i64");
                assert_eq!(found, "&str");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_push_before_start_is_queued() {
        let processor = square().build().unwrap();
        processor.push_input(3i64).unwrap();
        processor.push_input(4i64).unwrap();

        assert_eq!(processor.input_queue().unwrap().len(), 2);
        assert!(!processor.has_output());
        assert!(processor.get_output().is_none());
    }

    #[test]
    fn test_output_queue_requires_exactly_one() {
        let mut processor = square().build().unwrap();
        assert!(processor.output_queue("next").is_ok());

        processor
            .add_output_queue(MemoryQueue::shared("extra"))
            .unwrap();
        let err = processor.output_queue("next").unwrap_err();
        assert!(matches!(err, PipelineError::AmbiguousOutputQueue { count: 2, .. }));

        processor.clear_output_queues().unwrap();
        let err = processor.output_queue("next").unwrap_err();
        assert!(matches!(err, PipelineError::NoOutputType { .. }));
    }

    #[test]
    fn test_sink_cannot_gain_output_queue() {
        let mut sink = Processor::builder("drop")
            .target(TargetFunction::sink(|_: &u8, _: &SetupArgs| Ok(())))
            .build()
            .unwrap();

        let err = sink.add_output_queue(MemoryQueue::shared("x")).unwrap_err();
        assert!(matches!(err, PipelineError::NoOutputType { .. }));
    }

    #[tokio::test]
    async fn test_wiring_after_start_fails() {
        let mut processor = square().build().unwrap();
        processor.start().unwrap();

        let err = processor
            .set_input_queue(MemoryQueue::shared("late"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::AlreadyStarted { .. }));

        processor.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_before_start_returns() {
        let mut processor = square().build().unwrap();
        processor.shutdown().await;
        assert_eq!(processor.live_workers(), 0);
    }

    #[test]
    fn test_zero_delay_disables_pause() {
        let processor = square().delay(Duration::ZERO).build().unwrap();
        assert_eq!(processor.delay(), None);
    }
}
