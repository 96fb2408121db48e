//! Generation statistics shared between callers.
//!
//! Counters only ever increase. A [`GenerationStats`] can be shared across
//! threads behind an `Arc`; each increment is a single atomic add.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Thread-safe generation counters.
#[derive(Debug, Default)]
pub struct GenerationStats {
    queries_generated: AtomicU64,
    successful_generations: AtomicU64,
}

impl GenerationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one generation attempt.
    pub fn record_attempt(&self) {
        self.queries_generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one successful generation.
    pub fn record_success(&self) {
        self.successful_generations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn queries_generated(&self) -> u64 {
        self.queries_generated.load(Ordering::Relaxed)
    }

    pub fn successful_generations(&self) -> u64 {
        self.successful_generations.load(Ordering::Relaxed)
    }

    /// Point-in-time view of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        // Successes first: attempts never trail them.
        let successful = self.successful_generations();
        let total = self.queries_generated().max(successful);
        StatsSnapshot::new(total, successful)
    }
}

/// Counters plus derived values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub total_queries: u64,
    pub successful_queries: u64,
    pub failed_queries: u64,
    /// Percentage of successful queries, rounded to two decimals.
    pub success_rate: f64,
}

impl StatsSnapshot {
    fn new(total: u64, successful: u64) -> Self {
        let success_rate = if total == 0 {
            0.0
        } else {
            (successful as f64 / total as f64 * 10_000.0).round() / 100.0
        };
        Self {
            total_queries: total,
            successful_queries: successful,
            failed_queries: total - successful,
            success_rate,
        }
    }
}
