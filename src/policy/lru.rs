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

/// Least recently used. Every access, hit or fault, draws a fresh tick from `counter` and stamps
/// the page with it; a fault on a full table evicts the resident page with the oldest stamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LruState {
    pub counter: u64,
    /// Last tick at which each page was accessed, least recently stamped first.
    pub timestamps: LinkedHashMap<PageId, u64>,
}

impl ReplacementPolicy for LruState {
    fn access(&mut self, frames: &mut FrameTable, page: PageId, _: Lookahead<'_>) -> Outcome {
        self.counter += 1;

        if frames.contains(page) {
            self.timestamps.insert(page, self.counter);
            return Outcome::Hit;
        }
        if !frames.is_full() {
            frames.push(page);
            self.timestamps.insert(page, self.counter);
            return Outcome::Fault { evicted: None };
        }

        let victim = least_by(frames, |resident| {
            self.timestamps.get(&resident).copied().unwrap_or(0)
        });
        let evicted = frames.replace(victim, page);
        self.timestamps.insert(page, self.counter);
        Outcome::Fault {
            evicted: Some(evicted),
        }
    }

    fn frame_detail(&self, frames: &FrameTable, slot: usize) -> String {
        match self.timestamps.get(&frames[slot]) {
            Some(tick) => format!("Last used: {}", tick),
            None => String::from("Last used: N/A"),
        }
    }

    fn validate(&self, frames: &FrameTable, served: usize) -> Result<()> {
        validate_metadata(&self.timestamps, frames)?;
        validate_clock(self.counter, &self.timestamps, served)
    }
}

impl fmt::Display for LruState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Counter: {}\nTimestamps: {}",
            self.counter,
            render_map(&self.timestamps, u64::to_string)
        )
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::policy::tests::{hits, replay};
    use crate::policy::{PolicyKind, PolicyState};

    fn lru(state: &PolicyState) -> &LruState {
        match state {
            PolicyState::Lru(inner) => inner,
            other => panic!("expected lru state, got {:?}", other),
        }
    }

    #[cfg(test)]
    mod lru_tests {

        use super::*;

        #[test]
        fn evicts_least_recent() {
            let mut state = PolicyState::new(PolicyKind::Lru);
            let (frames, outcomes) = replay(&mut state, 3, &[1, 2, 3, 1, 4]);

            // 2 is the oldest stamp once 1 has been touched again
            assert_eq!(hits(&outcomes), vec![false, false, false, true, false]);
            assert_eq!(outcomes[4].evicted(), Some(2));
            assert_eq!(frames.pages(), &[1, 4, 3]);
        }

        #[test]
        fn counter_advances_on_hits() {
            let mut state = PolicyState::new(PolicyKind::Lru);
            replay(&mut state, 2, &[5, 5, 5, 6]);
            let inner = lru(&state);
            assert_eq!(inner.counter, 4);
            assert_eq!(inner.timestamps.get(&5), Some(&3));
            assert_eq!(inner.timestamps.get(&6), Some(&4));
        }

        #[test]
        fn textbook_reference_string() {
            let pages = [7, 0, 1, 2, 0, 3, 0, 4, 2, 3, 0, 3, 2, 1, 2, 0, 1, 7, 0, 1];
            let mut state = PolicyState::new(PolicyKind::Lru);
            let (_, outcomes) = replay(&mut state, 3, &pages);
            assert_eq!(outcomes.iter().filter(|o| o.is_fault()).count(), 12);
        }

        #[test]
        fn stale_stamps_are_kept() {
            let mut state = PolicyState::new(PolicyKind::Lru);
            let (frames, _) = replay(&mut state, 1, &[1, 2]);
            assert_eq!(frames.pages(), &[2]);
            assert_eq!(lru(&state).timestamps.get(&1), Some(&1));
        }

        #[test]
        fn display() {
            let mut state = PolicyState::new(PolicyKind::Lru);
            let (frames, _) = replay(&mut state, 2, &[3, 4, 3]);
            assert_eq!(state.to_string(), "Counter: 3\nTimestamps: {4: 2, 3: 3}");
            assert_eq!(state.frame_detail(&frames, 0), "Last used: 3");
        }
    }
}
