// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The execution loop run by each processor instance.

use anyhow::anyhow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::{JoinError, JoinHandle};
use tracing::{Dispatch, Instrument, Span};

use crate::config::consts::TRANSPORT_RETRY_DELAY;
use crate::engine::function::{SetupFunction, TargetFunction};
use crate::models::{InstanceStats, Payload, SetupArgs, Signal};
use crate::observability::messages::processor::{
    InputPullFailed, InvocationFailed, InvocationPanicked, OutputDeliveryFailed, SetupFailed,
    WorkerStarted, WorkerStopped,
};
use crate::observability::messages::StructuredLog;
use crate::traits::Transport;

/// Everything one instance needs, captured when its processor starts.
pub(crate) struct Worker {
    pub(crate) processor: String,
    pub(crate) instance: usize,
    pub(crate) target: TargetFunction,
    pub(crate) setup: Option<SetupFunction>,
    pub(crate) input: Option<Arc<dyn Transport>>,
    pub(crate) outputs: Vec<Arc<dyn Transport>>,
    pub(crate) delay: Option<Duration>,
    pub(crate) stats: Arc<InstanceStats>,
}

impl Worker {
    /// Run until a shutdown signal arrives or the signal channel closes.
    pub(crate) async fn run(self, signals: UnboundedReceiver<Signal>) {
        let span = WorkerStarted {
            processor: &self.processor,
            instance: self.instance,
        }
        .span("worker");

        self.execute(signals).instrument(span).await
    }

    async fn execute(self, mut signals: UnboundedReceiver<Signal>) {
        WorkerStarted {
            processor: &self.processor,
            instance: self.instance,
        }
        .log();

        let Some(args) = self.run_setup().await else {
            return;
        };

        match self.input.clone() {
            Some(input) => self.consume(input, &mut signals, args).await,
            None => self.generate(&mut signals, args).await,
        }

        WorkerStopped {
            processor: &self.processor,
            instance: self.instance,
            inputs_processed: self.stats.inputs_processed(),
        }
        .log();
    }

    async fn run_setup(&self) -> Option<Arc<SetupArgs>> {
        let Some(setup) = self.setup.clone() else {
            return Some(Arc::new(SetupArgs::new()));
        };

        let result = match spawn_in_context(move || setup.call()).await {
            Ok(result) => result,
            Err(join_error) => Err(anyhow!(
                "setup function panicked: {}",
                panic_reason(join_error)
            )),
        };

        match result {
            Ok(args) => Some(Arc::new(args)),
            Err(error) => {
                SetupFailed {
                    processor: &self.processor,
                    instance: self.instance,
                    error: &error,
                }
                .log();
                None
            }
        }
    }

    /// Wait on the signal channel and the input queue together; the signal wins ties.
    async fn consume(
        &self,
        input: Arc<dyn Transport>,
        signals: &mut UnboundedReceiver<Signal>,
        args: Arc<SetupArgs>,
    ) {
        loop {
            let pulled = tokio::select! {
                biased;
                signal = signals.recv() => match signal {
                    Some(Signal::Shutdown) | None => break,
                },
                pulled = input.pull() => pulled,
            };

            match pulled {
                Ok(payload) => {
                    let failed = self.invoke(Some(payload), &args).await;
                    self.stats.record_input(failed);
                }
                Err(error) => {
                    InputPullFailed {
                        processor: &self.processor,
                        instance: self.instance,
                        error: &error,
                    }
                    .log();
                    tokio::time::sleep(TRANSPORT_RETRY_DELAY).await;
                    continue;
                }
            }

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Source stages have nothing to wait on, so they check for a signal between calls.
    async fn generate(&self, signals: &mut UnboundedReceiver<Signal>, args: Arc<SetupArgs>) {
        loop {
            match signals.try_recv() {
                Ok(Signal::Shutdown) | Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => {}
            }

            self.invoke(None, &args).await;

            match self.delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => tokio::task::yield_now().await,
            }
        }
    }

    /// Returns true when the call failed or panicked.
    async fn invoke(&self, item: Option<Payload>, args: &Arc<SetupArgs>) -> bool {
        let target = self.target.clone();
        let call_args = args.clone();
        let outcome = spawn_in_context(move || target.call(item.as_ref(), &call_args)).await;

        match outcome {
            Ok(Ok(Some(output))) => {
                self.deliver(output);
                false
            }
            Ok(Ok(None)) => false,
            Ok(Err(error)) => {
                InvocationFailed {
                    processor: &self.processor,
                    instance: self.instance,
                    error: &error,
                }
                .log();
                true
            }
            Err(join_error) => {
                InvocationPanicked {
                    processor: &self.processor,
                    instance: self.instance,
                    reason: &panic_reason(join_error),
                }
                .log();
                true
            }
        }
    }

    /// Every output queue gets its own copy of the result.
    fn deliver(&self, output: Payload) {
        for queue in &self.outputs {
            if let Err(error) = queue.push(output.clone()) {
                OutputDeliveryFailed {
                    processor: &self.processor,
                    queue: queue.name(),
                    error: &error,
                }
                .log();
            }
        }
    }
}

/// Run a user call on the blocking pool under the worker's dispatcher and span,
/// so anything the call logs is attributed to this processor instance.
fn spawn_in_context<F, R>(call: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let dispatch = tracing::dispatcher::get_default(Dispatch::clone);
    let span = Span::current();
    tokio::task::spawn_blocking(move || {
        tracing::dispatcher::with_default(&dispatch, || span.in_scope(call))
    })
}

fn panic_reason(join_error: JoinError) -> String {
    if !join_error.is_panic() {
        return join_error.to_string();
    }

    let panic = join_error.into_panic();
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::memory::MemoryQueue;
    use crate::engine::integration_tests::CapturedLogs;
    use tokio::sync::mpsc;
    use tracing::instrument::WithSubscriber;
    use tokio::time::timeout;

    fn worker(target: TargetFunction, input: Arc<dyn Transport>, output: Arc<dyn Transport>) -> Worker {
        Worker {
            processor: "test".to_string(),
            instance: 0,
            target,
            setup: None,
            input: Some(input),
            outputs: vec![output],
            delay: None,
            stats: Arc::new(InstanceStats::new(0)),
        }
    }

    #[tokio::test]
    async fn test_worker_stops_on_signal() {
        let input = MemoryQueue::shared("in");
        let output = MemoryQueue::shared("out");
        let target = TargetFunction::transform(|x: &u8, _: &SetupArgs| Ok(*x));
        let (sender, receiver) = mpsc::unbounded_channel();

        let handle = tokio::spawn(worker(target, input, output).run(receiver));
        sender.send(Signal::Shutdown).unwrap();

        timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_worker_stops_when_channel_closes() {
        let input = MemoryQueue::shared("in");
        let output = MemoryQueue::shared("out");
        let target = TargetFunction::transform(|x: &u8, _: &SetupArgs| Ok(*x));
        let (sender, receiver) = mpsc::unbounded_channel::<Signal>();

        let handle = tokio::spawn(worker(target, input, output).run(receiver));
        drop(sender);

        timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_panicking_target_is_counted_as_failure() {
        let input = MemoryQueue::shared("in");
        let output = MemoryQueue::shared("out");
        let target = TargetFunction::transform(|x: &u8, _: &SetupArgs| {
            if *x == 0 {
                panic!("zero");
            }
            Ok(*x)
        });
        let worker = worker(target, input.clone(), output.clone());
        let stats = worker.stats.clone();
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(worker.run(receiver));

        input.push(Payload::new(0u8)).unwrap();
        input.push(Payload::new(1u8)).unwrap();

        timeout(Duration::from_secs(2), async {
            while stats.inputs_processed() < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!(stats.inputs_failed(), 1);
        assert_eq!(output.len(), 1);
        sender.send(Signal::Shutdown).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_results_are_broadcast_to_every_output() {
        let input = MemoryQueue::shared("in");
        let left = MemoryQueue::shared("left");
        let right = MemoryQueue::shared("right");
        let target = TargetFunction::transform(|x: &u8, _: &SetupArgs| Ok(*x + 1));
        let mut worker = worker(target, input.clone(), left.clone());
        worker.outputs.push(right.clone());
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(worker.run(receiver));

        input.push(Payload::new(1u8)).unwrap();
        let from_left = timeout(Duration::from_secs(1), left.pull()).await.unwrap().unwrap();
        let from_right = timeout(Duration::from_secs(1), right.pull()).await.unwrap().unwrap();
        assert_eq!(from_left.downcast_ref::<u8>(), Some(&2));
        assert_eq!(from_right.downcast_ref::<u8>(), Some(&2));

        sender.send(Signal::Shutdown).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_setup_stops_the_worker() {
        let input = MemoryQueue::shared("in");
        let output = MemoryQueue::shared("out");
        let target = TargetFunction::transform(|x: &u8, _: &SetupArgs| Ok(*x));
        let mut worker = worker(target, input.clone(), output);
        worker.setup = Some(SetupFunction::new(|| Err(anyhow!("no connection"))));
        let (_sender, receiver) = mpsc::unbounded_channel();

        timeout(Duration::from_secs(1), tokio::spawn(worker.run(receiver)))
            .await
            .expect("worker should exit after failed setup")
            .unwrap();

        input.push(Payload::new(1u8)).unwrap();
        assert_eq!(input.len(), 1);
    }

    #[tokio::test]
    async fn test_user_calls_log_inside_the_worker_span() {
        let logs = CapturedLogs::default();
        let input = MemoryQueue::shared("in");
        let output = MemoryQueue::shared("out");
        let target = TargetFunction::transform(|x: &u8, _: &SetupArgs| {
            tracing::info!("doubling {}", x);
            Ok(*x * 2)
        });
        let mut worker = worker(target, input.clone(), output.clone());
        worker.setup = Some(SetupFunction::new(|| {
            tracing::info!("opening connection");
            Ok(SetupArgs::new())
        }));
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(worker.run(receiver).with_subscriber(logs.dispatch()));

        input.push(Payload::new(4u8)).unwrap();
        let doubled = timeout(Duration::from_secs(1), output.pull()).await.unwrap().unwrap();
        assert_eq!(doubled.downcast_ref::<u8>(), Some(&8));

        sender.send(Signal::Shutdown).unwrap();
        handle.await.unwrap();

        let captured = logs.contents();
        let user_line = captured
            .lines()
            .find(|line| line.contains("doubling 4"))
            .expect("target log should reach the worker's subscriber");
        assert!(user_line.contains("processor=\"test\""), "{}", user_line);
        assert!(user_line.contains("instance=0"), "{}", user_line);
        assert!(captured.contains("opening connection"));
    }
}
