// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration loading and resolution.

use std::fmt::{Display, Formatter};
use std::path::Path;

use crate::observability::messages::StructuredLog;

/// A configuration file was parsed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConfigLoaded<'a> {
    pub path: &'a Path,
    pub kind: &'a str,
    pub processor_count: usize,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} configuration from '{}' with {} processor(s)",
            self.kind,
            self.path.display(),
            self.processor_count
        )
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = %self.path.display(),
            kind = self.kind,
            processor_count = self.processor_count,
            "{}", self
        );
    }
}

/// A configured processor was resolved against the function registry.
///
/// # Log Level
/// `debug!` - Resolution detail
pub struct ProcessorResolved<'a> {
    pub processor: &'a str,
    pub function: &'a str,
    pub instances: usize,
}

impl Display for ProcessorResolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Resolved processor '{}' to function '{}' with {} instance(s)",
            self.processor, self.function, self.instances
        )
    }
}

impl StructuredLog for ProcessorResolved<'_> {
    fn log(&self) {
        tracing::debug!(
            processor = self.processor,
            function = self.function,
            instances = self.instances,
            "{}", self
        );
    }
}
