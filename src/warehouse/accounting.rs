// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Mutex, MutexGuard};

use crate::config::consts::BYTES_PER_GIGABYTE;

/// Per-run record of what each query cost, in gigabytes processed.
///
/// One sample is appended per query invocation. The orchestrator resets it at
/// the start of every run and reads it when reporting. Shared as
/// `Arc<ByteAccounting>`; updates are serialized by an internal mutex.
///
/// # Example
/// ```
/// use spacejar::warehouse::ByteAccounting;
///
/// let accounting = ByteAccounting::new();
/// accounting.record(1_073_741_824);
/// accounting.record(536_870_912);
/// assert_eq!(accounting.samples(), vec![1.0, 0.5]);
/// assert_eq!(accounting.total_gigabytes(), 1.5);
/// ```
#[derive(Debug, Default)]
pub struct ByteAccounting {
    samples: Mutex<Vec<f64>>,
}

impl ByteAccounting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one query's bytes processed; returns the gigabyte sample stored.
    pub fn record(&self, bytes_processed: u64) -> f64 {
        let gigabytes = bytes_processed as f64 / BYTES_PER_GIGABYTE;
        self.lock().push(gigabytes);
        gigabytes
    }

    pub fn reset(&self) {
        self.lock().clear();
    }

    pub fn samples(&self) -> Vec<f64> {
        self.lock().clone()
    }

    pub fn query_count(&self) -> usize {
        self.lock().len()
    }

    pub fn total_gigabytes(&self) -> f64 {
        self.lock().iter().sum()
    }

    // A panic while holding the lock cannot leave a half-pushed sample.
    fn lock(&self) -> MutexGuard<'_, Vec<f64>> {
        self.samples
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_reset_clears_samples() {
        let accounting = ByteAccounting::new();
        accounting.record(1024);
        assert_eq!(accounting.query_count(), 1);

        accounting.reset();
        assert_eq!(accounting.query_count(), 0);
        assert_eq!(accounting.total_gigabytes(), 0.0);
    }

    #[test]
    fn test_concurrent_records_are_all_kept() {
        let accounting = Arc::new(ByteAccounting::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let accounting = Arc::clone(&accounting);
                thread::spawn(move || {
                    for _ in 0..100 {
                        accounting.record(1_073_741_824);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(accounting.query_count(), 800);
        assert_eq!(accounting.total_gigabytes(), 800.0);
    }
}
