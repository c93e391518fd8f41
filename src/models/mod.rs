// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Values that flow through, and are reported by, processors.

pub mod payload;
pub mod result;
pub mod setup;
pub mod signal;
pub mod stats;

pub use payload::{Payload, TypeTag};
pub use result::ProcessorResult;
pub use setup::SetupArgs;
pub use signal::Signal;
pub use stats::{InstanceStats, InstanceStatsSnapshot};
