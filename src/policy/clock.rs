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

/// Clock. Pages enter with their reference bit set and have it set again on every hit. On a full
/// table the hand sweeps from `pointer`, clearing set bits until it reaches a page whose bit is
/// already clear; that page is evicted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    pub pointer: usize,
    pub referenced: LinkedHashMap<PageId, bool>,
}

impl ReplacementPolicy for ClockState {
    fn access(&mut self, frames: &mut FrameTable, page: PageId, _: Lookahead<'_>) -> Outcome {
        if frames.contains(page) {
            self.referenced.insert(page, true);
            return Outcome::Hit;
        }
        if !frames.is_full() {
            frames.push(page);
            self.referenced.insert(page, true);
            return Outcome::Fault { evicted: None };
        }

        let (victim, _) = sweep(frames, &mut self.referenced, &mut self.pointer);
        let evicted = frames.replace(victim, page);
        self.referenced.insert(page, true);
        Outcome::Fault {
            evicted: Some(evicted),
        }
    }

    fn frame_detail(&self, frames: &FrameTable, slot: usize) -> String {
        let set = self.referenced.get(&frames[slot]).copied().unwrap_or(false);
        format!("Ref bit: {}", bit(&set))
    }

    fn validate(&self, frames: &FrameTable, _: usize) -> Result<()> {
        validate_pointer(self.pointer, frames)?;
        validate_metadata(&self.referenced, frames)
    }
}

impl fmt::Display for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pointer: {}\nReference bits: {}",
            self.pointer,
            render_map(&self.referenced, bit)
        )
    }
}
