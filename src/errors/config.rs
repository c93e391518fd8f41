// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for loading pipeline configuration and resolving it into processors.

use std::path::PathBuf;
use thiserror::Error;

use crate::errors::PipelineError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file extension is neither YAML nor TOML
    #[error("Unsupported configuration format for '{}'. Expected .yaml, .yml or .toml", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Processor '{processor}' references unknown target function '{function}'")]
    UnknownFunction { processor: String, function: String },

    #[error("Processor '{processor}' references unknown setup function '{function}'")]
    UnknownSetup { processor: String, function: String },

    #[error("Processor '{processor}' references unknown model '{model}'")]
    UnknownModel { processor: String, model: String },

    /// A configured model disagrees with the type the function declares
    #[error("Processor '{processor}' configures {field} '{configured}', but its target function declares {declared}")]
    ModelMismatch {
        processor: String,
        field: &'static str,
        configured: String,
        declared: String,
    },

    /// Chain entries cannot carry children
    #[error("Processor '{processor}' nests child processors, which is only supported in a graph")]
    NestedProcessorsInChain { processor: String },

    /// A graph config must start from exactly one processor
    #[error("A graph configuration must contain exactly one root processor, found {count}")]
    InvalidRoot { count: usize },

    /// A processor entry must be a map with exactly one key, the processor name
    #[error("Invalid processor entry: {reason}")]
    InvalidEntry { reason: String },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
