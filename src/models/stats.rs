// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-instance processing counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters owned by one worker instance and read by its processor.
///
/// Each instance has its own counters, so workers never contend with each
/// other when recording.
#[derive(Debug, Default)]
pub struct InstanceStats {
    instance: usize,
    inputs_processed: AtomicU64,
    inputs_failed: AtomicU64,
}

impl InstanceStats {
    pub fn new(instance: usize) -> Self {
        Self {
            instance,
            ..Default::default()
        }
    }

    /// Record one input handed to the target function. Failed inputs are
    /// processed inputs too.
    pub fn record_input(&self, failed: bool) {
        self.inputs_processed.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.inputs_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn inputs_processed(&self) -> u64 {
        self.inputs_processed.load(Ordering::Relaxed)
    }

    pub fn inputs_failed(&self) -> u64 {
        self.inputs_failed.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> InstanceStatsSnapshot {
        InstanceStatsSnapshot {
            instance: self.instance,
            inputs_processed: self.inputs_processed(),
            inputs_failed: self.inputs_failed(),
        }
    }
}

/// Point-in-time copy of an instance's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceStatsSnapshot {
    pub instance: usize,
    pub inputs_processed: u64,
    pub inputs_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_record_input_counts_failures_as_processed() {
        let stats = InstanceStats::new(3);
        stats.record_input(false);
        stats.record_input(true);
        stats.record_input(false);

        assert_eq!(
            stats.snapshot(),
            InstanceStatsSnapshot {
                instance: 3,
                inputs_processed: 3,
                inputs_failed: 1,
            }
        );
    }

    #[test]
    fn test_concurrent_recording() {
        let stats = Arc::new(InstanceStats::new(0));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        stats.record_input(false);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.inputs_processed(), 1000);
        assert_eq!(stats.inputs_failed(), 0);
    }
}
