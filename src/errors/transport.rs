// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by queue transports.

use thiserror::Error;

/// Failures moving a payload into or out of a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A payload could not be serialized for the wire
    #[error("Failed to encode payload of type {type_name} for '{queue}': {reason}")]
    Encode {
        queue: String,
        type_name: String,
        reason: String,
    },

    /// A message read from the wire is not a valid payload
    #[error("Failed to decode message from '{queue}' as {type_name}: {reason}")]
    Decode {
        queue: String,
        type_name: String,
        reason: String,
    },

    /// The broker client reported an error
    #[error("Broker error on '{queue}': {message}")]
    Broker { queue: String, message: String },
}
