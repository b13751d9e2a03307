use super::{
    bit, render_map, sweep, validate_metadata, validate_pointer, Lookahead, Outcome,
    ReplacementPolicy,
};
use crate::error::Result;
use crate::sequence::PageId;
use crate::table::FrameTable;
use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Second-Chance. The same hand sweep as Clock, but a page only earns its chance bit by being hit
/// after it was loaded: freshly loaded pages, including the one that replaces a victim, start
/// with the bit clear. Without hits it degrades to FIFO.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondChanceState {
    pub pointer: usize,
    pub chances: LinkedHashMap<PageId, bool>,
}

impl ReplacementPolicy for SecondChanceState {
    fn access(&mut self, frames: &mut FrameTable, page: PageId, _: Lookahead<'_>) -> Outcome {
        if frames.contains(page) {
            self.chances.insert(page, true);
            return Outcome::Hit;
        }
        if !frames.is_full() {
            frames.push(page);
            self.chances.insert(page, false);
            return Outcome::Fault { evicted: None };
        }

        let (victim, _) = sweep(frames, &mut self.chances, &mut self.pointer);
        let evicted = frames.replace(victim, page);
        self.chances.insert(page, false);
        Outcome::Fault {
            evicted: Some(evicted),
        }
    }

    fn frame_detail(&self, frames: &FrameTable, slot: usize) -> String {
        let set = self.chances.get(&frames[slot]).copied().unwrap_or(false);
        format!("Second chance: {}", bit(&set))
    }

    fn validate(&self, frames: &FrameTable, _: usize) -> Result<()> {
        validate_pointer(self.pointer, frames)?;
        validate_metadata(&self.chances, frames)
    }
}

impl fmt::Display for SecondChanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pointer: {}\nSecond chance bits: {}",
            self.pointer,
            render_map(&self.chances, bit)
        )
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::policy::tests::replay;
    use crate::policy::{PolicyKind, PolicyState};

    fn second_chance(state: &PolicyState) -> &SecondChanceState {
        match state {
            PolicyState::SecondChance(inner) => inner,
            other => panic!("expected second chance state, got {:?}", other),
        }
    }

    #[cfg(test)]
    mod second_chance_tests {

        use super::*;

        #[test]
        fn without_hits_behaves_like_fifo() {
            let pages = [1, 2, 3, 4, 1, 2];
            let mut fifo = PolicyState::new(PolicyKind::Fifo);
            let mut chance = PolicyState::new(PolicyKind::SecondChance);
            let (fifo_frames, fifo_outcomes) = replay(&mut fifo, 3, &pages);
            let (chance_frames, chance_outcomes) = replay(&mut chance, 3, &pages);
            assert!(fifo_outcomes.iter().all(Outcome::is_fault));
            assert_eq!(fifo_outcomes, chance_outcomes);
            assert_eq!(fifo_frames, chance_frames);
        }

        #[test]
        fn inserted_pages_start_clear() {
            let mut state = PolicyState::new(PolicyKind::SecondChance);
            let (frames, outcomes) = replay(&mut state, 3, &[1, 2, 3, 4]);

            // no sweeping needed: slot 0 is clear
            assert_eq!(outcomes[3].evicted(), Some(1));
            assert_eq!(frames.pages(), &[4, 2, 3]);
            let inner = second_chance(&state);
            assert_eq!(inner.pointer, 1);
            assert_eq!(inner.chances.get(&4), Some(&false));
        }

        #[test]
        fn hit_grants_a_second_chance() {
            let mut state = PolicyState::new(PolicyKind::SecondChance);
            let (frames, outcomes) = replay(&mut state, 3, &[1, 2, 3, 1, 4]);

            // 1 is skipped once and loses its bit, 2 goes instead
            assert_eq!(outcomes[4].evicted(), Some(2));
            assert_eq!(frames.pages(), &[1, 4, 3]);
            let inner = second_chance(&state);
            assert_eq!(inner.pointer, 2);
            assert_eq!(inner.chances.get(&1), Some(&false));
        }

        #[test]
        fn display() {
            let mut state = PolicyState::new(PolicyKind::SecondChance);
            let (frames, _) = replay(&mut state, 2, &[1, 2, 2]);
            assert_eq!(
                state.to_string(),
                "Pointer: 0\nSecond chance bits: {1: 0, 2: 1}"
            );
            assert_eq!(state.frame_detail(&frames, 1), "Second chance: 1");
        }
    }
}
