// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

/// Worker instances per processor when none are configured
pub const DEFAULT_INSTANCES: usize = 1;
/// How long shutdown waits for one worker before signalling it again
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(10);
/// Wait between empty polls of a broker topic
pub const BROKER_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Back-off after a transport fails to yield input
pub const TRANSPORT_RETRY_DELAY: Duration = Duration::from_millis(100);
/// Prefix of every broker topic and consumer group
pub const TOPIC_PREFIX: &str = "bowline";
