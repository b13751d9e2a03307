use super::{
    least_by, render_map, validate_clock, validate_metadata, Lookahead, Outcome,
    ReplacementPolicy,
};
use crate::error::Result;
use crate::sequence::PageId;
use crate::table::FrameTable;
use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default width, in accesses, of the reported working set window.
pub const WORKING_SET_WINDOW: u64 = 3;

/// Working-Set. A virtual clock `time` ticks on every access before anything else happens and
/// each accessed page is stamped with it. A fault on a full table evicts the resident page with
/// the oldest stamp.
///
/// `window` only feeds [`WorkingSetState::working_set`], a report of the pages referenced during
/// the last `window` ticks. Eviction never consults it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingSetState {
    pub time: u64,
    pub timestamps: LinkedHashMap<PageId, u64>,
    pub window: u64,
}

impl Default for WorkingSetState {
    fn default() -> Self {
        Self {
            time: 0,
            timestamps: LinkedHashMap::new(),
            window: WORKING_SET_WINDOW,
        }
    }
}

impl WorkingSetState {
    /// Pages referenced within the last `window` ticks, least recent first.
    pub fn working_set(&self) -> Vec<PageId> {
        self.timestamps
            .iter()
            .filter(|(_, stamp)| self.time.saturating_sub(**stamp) < self.window)
            .map(|(page, _)| *page)
            .collect()
    }
}

impl ReplacementPolicy for WorkingSetState {
    fn access(&mut self, frames: &mut FrameTable, page: PageId, _: Lookahead<'_>) -> Outcome {
        self.time += 1;

        if frames.contains(page) {
            self.timestamps.insert(page, self.time);
            return Outcome::Hit;
        }
        if !frames.is_full() {
            frames.push(page);
            self.timestamps.insert(page, self.time);
            return Outcome::Fault { evicted: None };
        }

        let victim = least_by(frames, |resident| {
            self.timestamps.get(&resident).copied().unwrap_or(0)
        });
        let evicted = frames.replace(victim, page);
        self.timestamps.insert(page, self.time);
        Outcome::Fault {
            evicted: Some(evicted),
        }
    }

    fn frame_detail(&self, frames: &FrameTable, slot: usize) -> String {
        match self.timestamps.get(&frames[slot]) {
            Some(stamp) => format!("Last used: {}", stamp),
            None => String::from("Last used: N/A"),
        }
    }

    fn validate(&self, frames: &FrameTable, served: usize) -> Result<()> {
        validate_metadata(&self.timestamps, frames)?;
        validate_clock(self.time, &self.timestamps, served)
    }
}

impl fmt::Display for WorkingSetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = self
            .working_set()
            .iter()
            .map(|page| page.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        write!(
            f,
            "Current time: {}\nTimestamps: {}\nWorking set (window {}): [{}]",
            self.time,
            render_map(&self.timestamps, u64::to_string),
            self.window,
            set
        )
    }
}
