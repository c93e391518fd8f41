// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Turns a [`PipelineConfig`] into running-ready processors.

use std::path::Path;
use tracing::Dispatch;

use crate::config::loader::{load_config, ContainerConfig, NamedProcessorConfig, PipelineConfig};
use crate::config::registry::FunctionRegistry;
use crate::engine::{Processor, ProcessorChain, ProcessorGraph};
use crate::errors::ConfigError;
use crate::models::TypeTag;
use crate::observability::messages::config::ProcessorResolved;
use crate::observability::messages::StructuredLog;
use crate::traits::Pipeline;

/// Builds processors, chains and graphs from configuration, resolving every
/// name through a [`FunctionRegistry`].
///
/// Nothing is started; call `start()` on the result.
pub struct PipelineFactory<'a> {
    registry: &'a FunctionRegistry,
    dispatch: Option<Dispatch>,
}

impl<'a> PipelineFactory<'a> {
    pub fn new(registry: &'a FunctionRegistry) -> Self {
        Self {
            registry,
            dispatch: None,
        }
    }

    /// Logging handle given to every processor built by this factory.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Load `path` and build whatever it describes.
    pub fn from_file<P: AsRef<Path>>(&self, path: P) -> Result<Box<dyn Pipeline>, ConfigError> {
        let config = load_config(path)?;
        self.build(&config)
    }

    pub fn build(&self, config: &PipelineConfig) -> Result<Box<dyn Pipeline>, ConfigError> {
        match config {
            PipelineConfig::Chain(container) => Ok(Box::new(self.build_chain(container)?)),
            PipelineConfig::Graph(container) => Ok(Box::new(self.build_graph(container)?)),
        }
    }

    pub fn build_chain(&self, config: &ContainerConfig) -> Result<ProcessorChain, ConfigError> {
        let mut chain = ProcessorChain::new();
        for entry in &config.processors {
            if !entry.config.processors.is_empty() {
                return Err(ConfigError::NestedProcessorsInChain {
                    processor: entry.name.clone(),
                });
            }
            chain.add_processor(self.build_processor(entry)?);
        }
        Ok(chain)
    }

    /// The single top-level entry is the root; children nest under their parent.
    pub fn build_graph(&self, config: &ContainerConfig) -> Result<ProcessorGraph, ConfigError> {
        let [root] = config.processors.as_slice() else {
            return Err(ConfigError::InvalidRoot {
                count: config.processors.len(),
            });
        };

        let mut graph = ProcessorGraph::new();
        self.add_to_graph(&mut graph, root, None)?;
        Ok(graph)
    }

    fn add_to_graph(
        &self,
        graph: &mut ProcessorGraph,
        entry: &NamedProcessorConfig,
        parent: Option<&str>,
    ) -> Result<(), ConfigError> {
        graph.add_processor(self.build_processor(entry)?, parent)?;
        for child in &entry.config.processors {
            self.add_to_graph(graph, child, Some(&entry.name))?;
        }
        Ok(())
    }

    pub fn build_processor(&self, entry: &NamedProcessorConfig) -> Result<Processor, ConfigError> {
        let name = entry.name.as_str();
        let config = &entry.config;

        let target = self.registry.resolve_function(name, &config.target_function)?;
        self.check_model(name, "input_model", config.input_model.as_deref(), target.input_type())?;
        self.check_model(name, "output_model", config.output_model.as_deref(), target.output_type())?;

        let mut builder = Processor::builder(name)
            .target(target)
            .instances(config.instances());
        if let Some(setup) = &config.setup_function {
            builder = builder.setup(self.registry.resolve_setup(name, setup)?);
        }
        if let Some(delay) = config.delay() {
            builder = builder.delay(delay);
        }
        if let Some(dispatch) = &self.dispatch {
            builder = builder.dispatch(dispatch.clone());
        }

        let processor = builder.build()?;
        ProcessorResolved {
            processor: name,
            function: &config.target_function,
            instances: processor.instances(),
        }
        .log();
        Ok(processor)
    }

    /// A configured model must be the type the function was registered with.
    fn check_model(
        &self,
        processor: &str,
        field: &'static str,
        configured: Option<&str>,
        declared: Option<TypeTag>,
    ) -> Result<(), ConfigError> {
        let Some(model) = configured else {
            return Ok(());
        };

        let tag = self.registry.resolve_model(processor, model)?;
        if declared != Some(tag) {
            return Err(ConfigError::ModelMismatch {
                processor: processor.to_string(),
                field,
                configured: model.to_string(),
                declared: TypeTag::describe(declared),
            });
        }
        Ok(())
    }
}
