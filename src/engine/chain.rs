// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Linear composition of processors.
//!
//! Each processor's single output queue becomes the next processor's input
//! queue. Types are checked for every adjacent pair when the chain starts,
//! before any queue is rewired or any worker spawned.

use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

use crate::engine::processor::{check_link, Processor};
use crate::errors::PipelineError;
use crate::models::{Payload, ProcessorResult};
use crate::observability::messages::engine::{
    PipelineShuttingDown, PipelineStarting, QueueWired,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Pipeline, Transport};

/// Processors run one after another, the output of each feeding the next.
#[derive(Debug, Default)]
pub struct ProcessorChain {
    processors: Vec<Processor>,
}

impl ProcessorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage. Compatibility with the previous stage is checked at `start()`.
    pub fn add_processor(&mut self, processor: Processor) {
        self.processors.push(processor);
    }

    pub fn push_input<T: Any + Send + Sync>(&self, value: T) -> Result<(), PipelineError> {
        self.push_payload(Payload::new(value))
    }

    pub fn push_payload(&self, payload: Payload) -> Result<(), PipelineError> {
        let head = self
            .processors
            .first()
            .ok_or(PipelineError::NoProcessors {
                container: "chain",
                action: "push input",
            })?;
        head.push_payload(payload)
    }

    pub fn get_output(&self) -> Option<ProcessorResult> {
        self.processors.last()?.get_output()
    }

    pub fn has_output(&self) -> bool {
        self.processors
            .last()
            .is_some_and(|tail| tail.has_output())
    }

    /// Validate every link, connect the queues, then start every stage in order.
    pub fn start(&mut self) -> Result<(), PipelineError> {
        if self.processors.is_empty() {
            return Err(PipelineError::NoProcessors {
                container: "chain",
                action: "start it",
            });
        }
        if let Some(started) = self.processors.iter().find(|p| p.is_started()) {
            return Err(PipelineError::AlreadyStarted {
                processor: started.name().to_string(),
            });
        }

        let links = self
            .processors
            .windows(2)
            .map(|pair| {
                check_link(&pair[0], &pair[1])?;
                pair[0].output_queue(pair[1].name())
            })
            .collect::<Result<Vec<Arc<dyn Transport>>, PipelineError>>()?;

        let span = PipelineStarting {
            kind: "chain",
            processor_count: self.processors.len(),
        }
        .span("start");
        let _guard = span.enter();
        PipelineStarting {
            kind: "chain",
            processor_count: self.processors.len(),
        }
        .log();

        for (index, queue) in links.into_iter().enumerate() {
            QueueWired {
                upstream: self.processors[index].name(),
                downstream: self.processors[index + 1].name(),
                queue: queue.name(),
            }
            .log();
            self.processors[index + 1].set_input_queue(queue)?;
        }

        for processor in &mut self.processors {
            processor.start()?;
        }
        Ok(())
    }

    pub async fn shutdown(&mut self) {
        PipelineShuttingDown {
            kind: "chain",
            processor_count: self.processors.len(),
        }
        .log();

        for processor in &mut self.processors {
            processor.shutdown().await;
        }
    }

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    pub fn processor(&self, name: &str) -> Option<&Processor> {
        self.processors.iter().find(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

#[async_trait]
impl Pipeline for ProcessorChain {
    fn kind(&self) -> &'static str {
        "chain"
    }

    fn push_payload(&self, payload: Payload) -> Result<(), PipelineError> {
        ProcessorChain::push_payload(self, payload)
    }

    fn start(&mut self) -> Result<(), PipelineError> {
        ProcessorChain::start(self)
    }

    fn has_output(&self) -> bool {
        ProcessorChain::has_output(self)
    }

    fn get_output(&mut self) -> Option<ProcessorResult> {
        ProcessorChain::get_output(self)
    }

    async fn shutdown(&mut self) {
        ProcessorChain::shutdown(self).await
    }
}
