// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;

use crate::models::Payload;

/// One output drained from a processor, chain or graph, tagged with the name
/// of the processor that produced it.
///
/// Results are only built inside the crate, when a processor hands out an item
/// from its output queues.
#[derive(Debug, Clone)]
pub struct ProcessorResult {
    processor: String,
    output: Payload,
}

impl ProcessorResult {
    pub(crate) fn new(processor: impl Into<String>, output: Payload) -> Self {
        Self {
            processor: processor.into(),
            output,
        }
    }

    /// Name of the producing processor
    pub fn processor(&self) -> &str {
        &self.processor
    }

    pub fn output(&self) -> &Payload {
        &self.output
    }

    /// The output as a concrete type, if it is one
    pub fn output_as<T: Any>(&self) -> Option<&T> {
        self.output.downcast_ref::<T>()
    }

    pub fn into_output(self) -> Payload {
        self.output
    }
}
