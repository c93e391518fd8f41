// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod pipeline;
mod transport;

pub use config::ConfigError;
pub use pipeline::PipelineError;
pub use transport::TransportError;
