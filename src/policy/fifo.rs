use super::{validate_pointer, Lookahead, Outcome, ReplacementPolicy};
use crate::error::Result;
use crate::sequence::PageId;
use crate::table::FrameTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// First-in, first-out. Slots are overwritten in a fixed circular order, so the page loaded
/// earliest is always the next victim regardless of how often it is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FifoState {
    /// Next slot to overwrite once the table is full.
    pub pointer: usize,
}

impl ReplacementPolicy for FifoState {
    fn access(&mut self, frames: &mut FrameTable, page: PageId, _: Lookahead<'_>) -> Outcome {
        if frames.contains(page) {
            return Outcome::Hit;
        }
        if !frames.is_full() {
            frames.push(page);
            return Outcome::Fault { evicted: None };
        }
        let evicted = frames.replace(self.pointer, page);
        self.pointer = (self.pointer + 1) % frames.capacity();
        Outcome::Fault {
            evicted: Some(evicted),
        }
    }

    fn frame_detail(&self, _: &FrameTable, slot: usize) -> String {
        match slot == self.pointer {
            true => String::from("Next to replace"),
            false => String::new(),
        }
    }

    fn validate(&self, frames: &FrameTable, _: usize) -> Result<()> {
        validate_pointer(self.pointer, frames)
    }
}

impl fmt::Display for FifoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pointer: {}", self.pointer)
    }
}
