use crate::error::{Error, Result};
use crate::sequence::PageId;
use crate::{MAX_FRAMES, MIN_FRAMES};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// The `FrameTable` struct holds the pages currently resident in memory. Slots are filled in
/// order until the configured capacity is reached; from then on every fault replaces exactly one
/// slot, so the table never grows past its capacity. Slot positions carry meaning for the
/// pointer-based policies (FIFO, Clock, Second-Chance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTable {
    capacity: usize,
    slots: Vec<PageId>,
}

impl FrameTable {
    /// Create an empty table able to hold `capacity` pages.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCapacity` unless `capacity` lies within `MIN_FRAMES..=MAX_FRAMES`.
    pub fn build(capacity: usize) -> Result<Self> {
        validate_capacity(capacity)?;
        Ok(Self {
            capacity,
            slots: Vec::with_capacity(capacity),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    pub fn contains(&self, page: PageId) -> bool {
        self.slots.contains(&page)
    }

    /// Slot index currently holding `page`.
    pub fn position(&self, page: PageId) -> Option<usize> {
        self.slots.iter().position(|resident| *resident == page)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageId> {
        self.slots.iter()
    }

    pub fn pages(&self) -> &[PageId] {
        &self.slots
    }

    /// Place `page` in the next empty slot. Callers must check `is_full` first.
    pub(crate) fn push(&mut self, page: PageId) {
        debug_assert!(!self.is_full(), "push into a full frame table");
        self.slots.push(page);
    }

    /// Empty every slot, keeping the capacity.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }

    /// Overwrite slot `index` with `page`, returning the evicted page.
    pub(crate) fn replace(&mut self, index: usize, page: PageId) -> PageId {
        std::mem::replace(&mut self.slots[index], page)
    }

    /// Check that a table restored from outside keeps the invariants `build` and the policies
    /// maintain: a legal capacity, no overflow and no page resident twice.
    pub(crate) fn validate(&self) -> Result<()> {
        validate_capacity(self.capacity)?;
        if self.slots.len() > self.capacity {
            return Err(Error::MalformedSnapshot(format!(
                "{} resident pages exceed {} frames",
                self.slots.len(),
                self.capacity
            )));
        }
        for (index, page) in self.slots.iter().enumerate() {
            if self.slots[..index].contains(page) {
                return Err(Error::MalformedSnapshot(format!(
                    "page {} is resident twice",
                    page
                )));
            }
        }
        Ok(())
    }
}

impl Index<usize> for FrameTable {
    type Output = PageId;

    fn index(&self, index: usize) -> &Self::Output {
        &self.slots[index]
    }
}

impl fmt::Display for FrameTable {
    /// Renders every slot, empty ones included, e.g. `[7, 0, -]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = (0..self.capacity)
            .map(|index| match self.slots.get(index) {
                Some(page) => page.to_string(),
                None => String::from("-"),
            })
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "[{}]", cells)
    }
}

/// Frame counts outside `MIN_FRAMES..=MAX_FRAMES` are configuration errors.
pub fn validate_capacity(capacity: usize) -> Result<()> {
    if (MIN_FRAMES..=MAX_FRAMES).contains(&capacity) {
        Ok(())
    } else {
        Err(Error::InvalidCapacity {
            value: capacity,
            min: MIN_FRAMES,
            max: MAX_FRAMES,
        })
    }
}
