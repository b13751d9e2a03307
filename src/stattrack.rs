use crate::policy::Outcome;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Simplified cost model for the average access time report: a hit is served from memory, a
/// fault has to wait on the backing store.
pub const HIT_TIME_MS: usize = 10;
pub const FAULT_TIME_MS: usize = 100;

/* Each step produces a small `StatTracker` describing only itself (one hit or one fault) which is
 * then folded into the running totals with `+=`. Ratios are always derived from the two counters
 * and never stored, so they cannot drift out of sync.
 */

#[derive(Debug, PartialEq, Eq, Copy, Clone, Default, Serialize, Deserialize)]
pub struct StatTracker {
    pub hits: usize,
    pub faults: usize,
}

impl StatTracker {
    pub fn new() -> Self {
        Self { hits: 0, faults: 0 }
    }

    /// Fold a single outcome into the counters.
    pub fn record(&mut self, outcome: Outcome) {
        *self += StatTracker::from(outcome);
    }

    pub fn total(&self) -> usize {
        self.hits + self.faults
    }

    /// Fraction of requests served without a fault, `0.0` before any request.
    pub fn hit_ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    /// Fraction of requests that faulted, `0.0` before any request.
    pub fn fault_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.faults as f64 / total as f64,
        }
    }

    /// Hit ratio as a whole percentage, rounded to nearest.
    pub fn hit_percent(&self) -> u32 {
        (self.hit_ratio() * 100.0).round() as u32
    }

    pub fn fault_percent(&self) -> u32 {
        (self.fault_rate() * 100.0).round() as u32
    }

    /// Average cost per request in milliseconds under the `HIT_TIME_MS`/`FAULT_TIME_MS` model.
    pub fn average_access_time_ms(&self) -> u32 {
        match self.total() {
            0 => 0,
            total => {
                let cost = self.hits * HIT_TIME_MS + self.faults * FAULT_TIME_MS;
                (cost as f64 / total as f64).round() as u32
            }
        }
    }
}

impl From<Outcome> for StatTracker {
    fn from(value: Outcome) -> Self {
        match value {
            Outcome::Hit => Self { hits: 1, faults: 0 },
            Outcome::Fault { .. } => Self { hits: 0, faults: 1 },
        }
    }
}

impl Add<StatTracker> for StatTracker {
    type Output = StatTracker;

    fn add(self, rhs: StatTracker) -> Self::Output {
        Self::Output {
            hits: self.hits + rhs.hits,
            faults: self.faults + rhs.faults,
        }
    }
}

impl AddAssign for StatTracker {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.add(rhs)
    }
}

impl std::fmt::Display for StatTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "
Stats Tracked
---------------------------------
page_faults:             {:08}
page_hits:               {:08}
hit ratio:               {:>7}%
fault rate:              {:>7}%
avg access time:         {:>6}ms
               ",
            self.faults,
            self.hits,
            self.hit_percent(),
            self.fault_percent(),
            self.average_access_time_ms(),
        )
    }
}
