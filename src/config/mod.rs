// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod factory;
mod loader;
mod registry;

#[cfg(test)]
mod integration_tests;
pub mod consts;

pub use factory::PipelineFactory;
pub use loader::{load_config, ContainerConfig, NamedProcessorConfig, PipelineConfig, ProcessorConfig};
pub use registry::FunctionRegistry;
