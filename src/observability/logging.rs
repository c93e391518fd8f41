// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber.
///
/// `RUST_LOG` wins over `default_directive` when set. Logs go to stderr so
/// stdout stays clean for program output. Fails if a global subscriber is
/// already installed.
pub fn init_logging(default_directive: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
}

/// Build a stand-alone logging handle for injection into processors, without
/// touching the global default.
pub fn logging_dispatch(directive: &str) -> Dispatch {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(std::io::stderr)
        .finish();

    Dispatch::new(subscriber)
}
