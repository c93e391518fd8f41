// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Processors composed into a directed acyclic graph with a single root.
//!
//! Every processor except the root names the parent it consumes from. A parent
//! with several children sends each result to all of them; results are read
//! from the terminal processors (those without children) in round-robin order.
//!
//! ```text
//!              ┌──► square
//!   add (root) ┤
//!              └──► sqrt
//! ```
//!
//! # Example
//!
//! ```rust
//! use bowline::engine::{Processor, ProcessorGraph, TargetFunction};
//! use bowline::models::SetupArgs;
//!
//! # fn main() -> Result<(), bowline::errors::PipelineError> {
//! let add = Processor::builder("add")
//!     .target(TargetFunction::transform(|p: &(i64, i64), _: &SetupArgs| Ok(p.0 + p.1)))
//!     .build()?;
//! let square = Processor::builder("square")
//!     .target(TargetFunction::transform(|x: &i64, _: &SetupArgs| Ok(x * x)))
//!     .build()?;
//! let sqrt = Processor::builder("sqrt")
//!     .target(TargetFunction::transform(|x: &i64, _: &SetupArgs| Ok((*x as f64).sqrt())))
//!     .build()?;
//!
//! let mut graph = ProcessorGraph::new();
//! graph.add_processor(add, None)?;
//! graph.add_processor(square, Some("add"))?;
//! graph.add_processor(sqrt, Some("add"))?;
//!
//! let terminals: Vec<&str> = graph.terminal_processors().iter().map(|p| p.name()).collect();
//! assert_eq!(terminals, vec!["square", "sqrt"]);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::backends::memory::MemoryQueue;
use crate::engine::processor::{check_link, Processor};
use crate::errors::PipelineError;
use crate::models::{Payload, ProcessorResult, TypeTag};
use crate::observability::messages::engine::{
    ExistingProcessorLinked, PipelineShuttingDown, PipelineStarting, QueueWired,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Pipeline, Transport};

#[derive(Debug)]
struct GraphNode {
    processor: Processor,
    children: Vec<usize>,
}

#[derive(Debug, Default)]
pub struct ProcessorGraph {
    nodes: Vec<GraphNode>,
    current_terminal_index: Option<usize>,
}

impl ProcessorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `processor` under `parent`, or as the root when `parent` is `None`.
    ///
    /// Names are unique: adding a name that is already present links the
    /// existing processor under `parent` and drops the one passed in. The
    /// dropped processor must agree with the existing one on input type,
    /// output type and instance count (`ConflictingDefinition`), and since
    /// its target function never runs the link is logged as a warning.
    pub fn add_processor(
        &mut self,
        processor: Processor,
        parent: Option<&str>,
    ) -> Result<(), PipelineError> {
        let Some(parent) = parent else {
            if let Some(root) = self.nodes.first() {
                return Err(PipelineError::RootAlreadyDefined {
                    root: root.processor.name().to_string(),
                    processor: processor.name().to_string(),
                });
            }
            self.nodes.push(GraphNode {
                processor,
                children: Vec::new(),
            });
            return Ok(());
        };

        let parent_index =
            self.index_of(parent)
                .ok_or_else(|| PipelineError::UnknownParent {
                    parent: parent.to_string(),
                    processor: processor.name().to_string(),
                })?;

        let child_index = match self.index_of(processor.name()) {
            Some(existing) => {
                if self.nodes[parent_index].children.contains(&existing) {
                    return Err(PipelineError::DuplicateEdge {
                        parent: parent.to_string(),
                        processor: processor.name().to_string(),
                    });
                }
                if self.reaches(existing, parent_index) {
                    return Err(PipelineError::CycleDetected {
                        parent: parent.to_string(),
                        processor: processor.name().to_string(),
                    });
                }
                if let Some(reason) = definition_conflict(&self.nodes[existing].processor, &processor) {
                    return Err(PipelineError::ConflictingDefinition {
                        processor: processor.name().to_string(),
                        reason,
                    });
                }
                ExistingProcessorLinked {
                    processor: processor.name(),
                    parent,
                }
                .log();
                existing
            }
            None => {
                self.nodes.push(GraphNode {
                    processor,
                    children: Vec::new(),
                });
                self.nodes.len() - 1
            }
        };

        self.nodes[parent_index].children.push(child_index);
        Ok(())
    }

    pub fn push_input<T: Any + Send + Sync>(&self, value: T) -> Result<(), PipelineError> {
        self.push_payload(Payload::new(value))
    }

    pub fn push_payload(&self, payload: Payload) -> Result<(), PipelineError> {
        let root = self.root().ok_or(PipelineError::NoProcessors {
            container: "graph",
            action: "push input",
        })?;
        root.push_payload(payload)
    }

    /// Validate every edge, give each edge its own queue, then start every
    /// processor in insertion order.
    pub fn start(&mut self) -> Result<(), PipelineError> {
        if self.nodes.is_empty() {
            return Err(PipelineError::NoProcessors {
                container: "graph",
                action: "start it",
            });
        }
        if let Some(started) = self.nodes.iter().find(|n| n.processor.is_started()) {
            return Err(PipelineError::AlreadyStarted {
                processor: started.processor.name().to_string(),
            });
        }

        let edges: Vec<(usize, usize)> = self
            .nodes
            .iter()
            .enumerate()
            .flat_map(|(parent, node)| node.children.iter().map(move |&child| (parent, child)))
            .collect();
        for &(parent, child) in &edges {
            check_link(&self.nodes[parent].processor, &self.nodes[child].processor)?;
        }

        let span = PipelineStarting {
            kind: "graph",
            processor_count: self.nodes.len(),
        }
        .span("start");
        let _guard = span.enter();
        PipelineStarting {
            kind: "graph",
            processor_count: self.nodes.len(),
        }
        .log();

        for node in self.nodes.iter_mut().filter(|n| !n.children.is_empty()) {
            node.processor.clear_output_queues()?;
        }

        // A child with several parents reads all of them from one queue.
        let mut inputs: HashMap<usize, Arc<dyn Transport>> = HashMap::new();
        for (parent, child) in edges {
            let queue = match inputs.get(&child) {
                Some(queue) => queue.clone(),
                None => {
                    let queue = MemoryQueue::shared(format!(
                        "{}->{}",
                        self.nodes[parent].processor.name(),
                        self.nodes[child].processor.name()
                    ));
                    self.nodes[child].processor.set_input_queue(queue.clone())?;
                    inputs.insert(child, queue.clone());
                    queue
                }
            };

            QueueWired {
                upstream: self.nodes[parent].processor.name(),
                downstream: self.nodes[child].processor.name(),
                queue: queue.name(),
            }
            .log();
            self.nodes[parent].processor.add_output_queue(queue)?;
        }

        for node in &mut self.nodes {
            node.processor.start()?;
        }
        Ok(())
    }

    pub fn has_output(&self) -> bool {
        self.terminal_indices()
            .into_iter()
            .any(|index| self.nodes[index].processor.has_output())
    }

    /// Take one result, visiting the terminal processors in round-robin order.
    pub fn get_output(&mut self) -> Option<ProcessorResult> {
        let terminals = self.terminal_indices();

        for _ in 0..terminals.len() {
            let next = match self.current_terminal_index {
                Some(current) if current + 1 < terminals.len() => current + 1,
                _ => 0,
            };
            self.current_terminal_index = Some(next);

            if let Some(result) = self.nodes[terminals[next]].processor.get_output() {
                return Some(result);
            }
        }
        None
    }

    pub async fn shutdown(&mut self) {
        PipelineShuttingDown {
            kind: "graph",
            processor_count: self.nodes.len(),
        }
        .log();

        for node in &mut self.nodes {
            node.processor.shutdown().await;
        }
    }

    pub fn root(&self) -> Option<&Processor> {
        self.nodes.first().map(|node| &node.processor)
    }

    pub fn processor(&self, name: &str) -> Option<&Processor> {
        self.index_of(name).map(|index| &self.nodes[index].processor)
    }

    /// Names of the processors consuming from `name`, in the order they were linked.
    pub fn children(&self, name: &str) -> Vec<&str> {
        self.index_of(name)
            .map(|index| {
                self.nodes[index]
                    .children
                    .iter()
                    .map(|&child| self.nodes[child].processor.name())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Processors without children, in insertion order.
    pub fn terminal_processors(&self) -> Vec<&Processor> {
        self.terminal_indices()
            .into_iter()
            .map(|index| &self.nodes[index].processor)
            .collect()
    }

    pub fn processors(&self) -> impl Iterator<Item = &Processor> {
        self.nodes.iter().map(|node| &node.processor)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn terminal_indices(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(index, _)| index)
            .collect()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.processor.name() == name)
    }

    /// Whether `to` can be reached from `from` by following child links.
    fn reaches(&self, from: usize, to: usize) -> bool {
        let mut stack = vec![from];
        let mut visited = vec![false; self.nodes.len()];

        while let Some(index) = stack.pop() {
            if index == to {
                return true;
            }
            if std::mem::replace(&mut visited[index], true) {
                continue;
            }
            stack.extend(self.nodes[index].children.iter().copied());
        }
        false
    }
}

/// Describe how `duplicate` differs from the processor already registered under its name.
fn definition_conflict(existing: &Processor, duplicate: &Processor) -> Option<String> {
    let describe = |tag: Option<TypeTag>| tag.map_or("nothing".to_string(), |t| t.to_string());

    if existing.input_type() != duplicate.input_type() {
        return Some(format!(
            "input {} vs {}",
            describe(existing.input_type()),
            describe(duplicate.input_type())
        ));
    }
    if existing.output_type() != duplicate.output_type() {
        return Some(format!(
            "output {} vs {}",
            describe(existing.output_type()),
            describe(duplicate.output_type())
        ));
    }
    if existing.instances() != duplicate.instances() {
        return Some(format!(
            "{} instance(s) vs {}",
            existing.instances(),
            duplicate.instances()
        ));
    }
    None
}

#[async_trait]
impl Pipeline for ProcessorGraph {
    fn kind(&self) -> &'static str {
        "graph"
    }

    fn push_payload(&self, payload: Payload) -> Result<(), PipelineError> {
        ProcessorGraph::push_payload(self, payload)
    }

    fn start(&mut self) -> Result<(), PipelineError> {
        ProcessorGraph::start(self)
    }

    fn has_output(&self) -> bool {
        ProcessorGraph::has_output(self)
    }

    fn get_output(&mut self) -> Option<ProcessorResult> {
        ProcessorGraph::get_output(self)
    }

    async fn shutdown(&mut self) {
        ProcessorGraph::shutdown(self).await
    }
}
