use super::{Lookahead, Outcome, ReplacementPolicy};
use crate::sequence::PageId;
use crate::table::FrameTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Belady's optimal policy. On a full table it evicts the resident page whose next request lies
/// furthest in the future, which requires the whole reference sequence up front. It keeps no
/// state of its own and serves as the lower bound for every other policy's fault count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimalState {}

impl ReplacementPolicy for OptimalState {
    fn access(
        &mut self,
        frames: &mut FrameTable,
        page: PageId,
        lookahead: Lookahead<'_>,
    ) -> Outcome {
        if frames.contains(page) {
            return Outcome::Hit;
        }
        if !frames.is_full() {
            frames.push(page);
            return Outcome::Fault { evicted: None };
        }

        let mut victim = 0;
        let mut farthest: Option<usize> = None;
        for (slot, resident) in frames.iter().enumerate() {
            match lookahead.sequence.next_use(*resident, lookahead.cursor) {
                None => {
                    victim = slot;
                    break;
                }
                Some(next) => {
                    let distance = next - lookahead.cursor;
                    if farthest.map_or(true, |best| distance > best) {
                        farthest = Some(distance);
                        victim = slot;
                    }
                }
            }
        }

        let evicted = frames.replace(victim, page);
        Outcome::Fault {
            evicted: Some(evicted),
        }
    }
}

impl fmt::Display for OptimalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Looks ahead in the reference sequence to pick the page needed furthest in the future"
        )
    }
}
