use super::{least_by, render_map, validate_metadata, Lookahead, Outcome, ReplacementPolicy};
use crate::error::{Error, Result};
use crate::sequence::PageId;
use crate::table::FrameTable;
use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Not frequently used. Each page counts its accesses; a fault on a full table evicts the
/// resident page with the lowest count. Counts are never aged, and a page loaded into a freed
/// slot starts again from one rather than inheriting anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NfuState {
    pub counters: LinkedHashMap<PageId, u64>,
}

impl ReplacementPolicy for NfuState {
    fn access(&mut self, frames: &mut FrameTable, page: PageId, _: Lookahead<'_>) -> Outcome {
        if frames.contains(page) {
            let count = self.counters.get(&page).copied().unwrap_or(0);
            self.counters.insert(page, count + 1);
            return Outcome::Hit;
        }
        if !frames.is_full() {
            frames.push(page);
            self.counters.insert(page, 1);
            return Outcome::Fault { evicted: None };
        }

        let victim = least_by(frames, |resident| {
            self.counters.get(&resident).copied().unwrap_or(0)
        });
        let evicted = frames.replace(victim, page);
        self.counters.insert(page, 1);
        Outcome::Fault {
            evicted: Some(evicted),
        }
    }

    fn frame_detail(&self, frames: &FrameTable, slot: usize) -> String {
        format!(
            "Count: {}",
            self.counters.get(&frames[slot]).copied().unwrap_or(0)
        )
    }

    fn validate(&self, frames: &FrameTable, served: usize) -> Result<()> {
        validate_metadata(&self.counters, frames)?;
        match self.counters.iter().find(|(_, count)| **count > served as u64) {
            Some((page, count)) => Err(Error::MalformedSnapshot(format!(
                "page {} counts {} accesses out of {} requests",
                page, count, served
            ))),
            None => Ok(()),
        }
    }
}

impl fmt::Display for NfuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Counters: {}", render_map(&self.counters, u64::to_string))
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::policy::tests::{hits, replay};
    use crate::policy::{PolicyKind, PolicyState};

    fn nfu(state: &PolicyState) -> &NfuState {
        match state {
            PolicyState::Nfu(inner) => inner,
            other => panic!("expected nfu state, got {:?}", other),
        }
    }

    #[cfg(test)]
    mod nfu_tests {

        use super::*;

        #[test]
        fn evicts_least_frequent() {
            let mut state = PolicyState::new(PolicyKind::Nfu);
            let (frames, outcomes) = replay(&mut state, 3, &[1, 1, 2, 2, 3, 4]);
            assert_eq!(
                hits(&outcomes),
                vec![false, true, false, true, false, false]
            );
            assert_eq!(outcomes[5].evicted(), Some(3));
            assert_eq!(frames.pages(), &[1, 2, 4]);
        }

        #[test]
        fn ties_go_to_lowest_slot() {
            let mut state = PolicyState::new(PolicyKind::Nfu);
            let (_, outcomes) = replay(&mut state, 3, &[1, 2, 3, 4, 5]);
            assert_eq!(outcomes[3].evicted(), Some(1));

            // 4 entered slot 0 with a count of one, level with 2 and 3
            assert_eq!(outcomes[4].evicted(), Some(4));
        }

        #[test]
        fn new_page_does_not_inherit() {
            let mut state = PolicyState::new(PolicyKind::Nfu);
            replay(&mut state, 1, &[7, 7, 7, 8]);
            let inner = nfu(&state);
            assert_eq!(inner.counters.get(&8), Some(&1));
            assert_eq!(inner.counters.get(&7), Some(&3));
        }

        #[test]
        fn display() {
            let mut state = PolicyState::new(PolicyKind::Nfu);
            let (frames, _) = replay(&mut state, 2, &[1, 2, 1]);
            assert_eq!(state.to_string(), "Counters: {2: 1, 1: 2}");
            assert_eq!(state.frame_detail(&frames, 0), "Count: 2");
        }
    }
}
