//! Replacement policies. Each policy owns nothing but its bookkeeping state; the frame table and
//! the reference sequence are handed in on every access, so two simulations never share state.

mod clock;
mod fifo;
mod lru;
mod nfu;
mod optimal;
mod second_chance;
mod working_set;

pub use clock::ClockState;
pub use fifo::FifoState;
pub use lru::LruState;
pub use nfu::NfuState;
pub use optimal::OptimalState;
pub use second_chance::SecondChanceState;
pub use working_set::{WorkingSetState, WORKING_SET_WINDOW};

use crate::error::{Error, Result};
use crate::sequence::{PageId, ReferenceSequence};
use crate::table::FrameTable;
use clap::ValueEnum;
use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The seven available replacement policies. The serialized and command line names are the
/// canonical identifiers `fifo`, `lru`, `optimal`, `clock`, `nfu`, `secondChance` and
/// `workingSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum PolicyKind {
    Fifo,
    Lru,
    Optimal,
    Clock,
    Nfu,
    #[value(name = "secondChance", alias = "second-chance")]
    SecondChance,
    #[value(name = "workingSet", alias = "working-set")]
    WorkingSet,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 7] = [
        PolicyKind::Fifo,
        PolicyKind::Lru,
        PolicyKind::Optimal,
        PolicyKind::Clock,
        PolicyKind::Nfu,
        PolicyKind::SecondChance,
        PolicyKind::WorkingSet,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PolicyKind::Fifo => "fifo",
            PolicyKind::Lru => "lru",
            PolicyKind::Optimal => "optimal",
            PolicyKind::Clock => "clock",
            PolicyKind::Nfu => "nfu",
            PolicyKind::SecondChance => "secondChance",
            PolicyKind::WorkingSet => "workingSet",
        }
    }

    /// Human readable title used in reports.
    pub fn title(&self) -> &'static str {
        match self {
            PolicyKind::Fifo => "FIFO",
            PolicyKind::Lru => "LRU",
            PolicyKind::Optimal => "Optimal",
            PolicyKind::Clock => "Clock",
            PolicyKind::Nfu => "NFU",
            PolicyKind::SecondChance => "Second-Chance",
            PolicyKind::WorkingSet => "Working-Set",
        }
    }
}

impl FromStr for PolicyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PolicyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnknownPolicy(String::from(s)))
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Result of a single page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Hit,
    /// The page had to be loaded. `evicted` names the page it displaced, if the table was full.
    Fault { evicted: Option<PageId> },
}

impl Outcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, Outcome::Hit)
    }

    pub fn is_fault(&self) -> bool {
        !self.is_hit()
    }

    pub fn evicted(&self) -> Option<PageId> {
        match self {
            Outcome::Fault { evicted } => *evicted,
            Outcome::Hit => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Hit => write!(f, "HIT"),
            Outcome::Fault { .. } => write!(f, "FAULT"),
        }
    }
}

/// Read-only view of the workload at the moment of an access: the complete sequence and the
/// index of the request being served.
#[derive(Debug, Clone, Copy)]
pub struct Lookahead<'a> {
    pub sequence: &'a ReferenceSequence,
    pub cursor: usize,
}

/// The transition contract every policy implements. `access` serves `page`, mutating only the
/// frame table and the policy's own state, and reports whether the request hit.
pub trait ReplacementPolicy {
    fn access(&mut self, frames: &mut FrameTable, page: PageId, lookahead: Lookahead<'_>)
        -> Outcome;

    /// Short per-frame annotation, e.g. a reference bit or a timestamp.
    fn frame_detail(&self, _frames: &FrameTable, _slot: usize) -> String {
        String::new()
    }

    /// Check restored state against the frame table it will drive, after `served` requests.
    fn validate(&self, _frames: &FrameTable, _served: usize) -> Result<()> {
        Ok(())
    }
}

/// Bookkeeping for whichever policy a simulation runs. Each variant carries only the fields its
/// policy reads, so LRU timestamps can never be consulted while running FIFO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PolicyState {
    Fifo(FifoState),
    Lru(LruState),
    Optimal(OptimalState),
    Clock(ClockState),
    Nfu(NfuState),
    SecondChance(SecondChanceState),
    WorkingSet(WorkingSetState),
}

impl PolicyState {
    /// The zero value of `kind`'s state, as used at the start of every run.
    pub fn new(kind: PolicyKind) -> Self {
        match kind {
            PolicyKind::Fifo => PolicyState::Fifo(FifoState::default()),
            PolicyKind::Lru => PolicyState::Lru(LruState::default()),
            PolicyKind::Optimal => PolicyState::Optimal(OptimalState::default()),
            PolicyKind::Clock => PolicyState::Clock(ClockState::default()),
            PolicyKind::Nfu => PolicyState::Nfu(NfuState::default()),
            PolicyKind::SecondChance => PolicyState::SecondChance(SecondChanceState::default()),
            PolicyKind::WorkingSet => PolicyState::WorkingSet(WorkingSetState::default()),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            PolicyState::Fifo(_) => PolicyKind::Fifo,
            PolicyState::Lru(_) => PolicyKind::Lru,
            PolicyState::Optimal(_) => PolicyKind::Optimal,
            PolicyState::Clock(_) => PolicyKind::Clock,
            PolicyState::Nfu(_) => PolicyKind::Nfu,
            PolicyState::SecondChance(_) => PolicyKind::SecondChance,
            PolicyState::WorkingSet(_) => PolicyKind::WorkingSet,
        }
    }

    fn as_policy(&self) -> &dyn ReplacementPolicy {
        match self {
            PolicyState::Fifo(state) => state,
            PolicyState::Lru(state) => state,
            PolicyState::Optimal(state) => state,
            PolicyState::Clock(state) => state,
            PolicyState::Nfu(state) => state,
            PolicyState::SecondChance(state) => state,
            PolicyState::WorkingSet(state) => state,
        }
    }

    fn as_policy_mut(&mut self) -> &mut dyn ReplacementPolicy {
        match self {
            PolicyState::Fifo(state) => state,
            PolicyState::Lru(state) => state,
            PolicyState::Optimal(state) => state,
            PolicyState::Clock(state) => state,
            PolicyState::Nfu(state) => state,
            PolicyState::SecondChance(state) => state,
            PolicyState::WorkingSet(state) => state,
        }
    }
}

impl ReplacementPolicy for PolicyState {
    fn access(
        &mut self,
        frames: &mut FrameTable,
        page: PageId,
        lookahead: Lookahead<'_>,
    ) -> Outcome {
        self.as_policy_mut().access(frames, page, lookahead)
    }

    fn frame_detail(&self, frames: &FrameTable, slot: usize) -> String {
        self.as_policy().frame_detail(frames, slot)
    }

    fn validate(&self, frames: &FrameTable, served: usize) -> Result<()> {
        self.as_policy().validate(frames, served)
    }
}

impl fmt::Display for PolicyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyState::Fifo(state) => fmt::Display::fmt(state, f),
            PolicyState::Lru(state) => fmt::Display::fmt(state, f),
            PolicyState::Optimal(state) => fmt::Display::fmt(state, f),
            PolicyState::Clock(state) => fmt::Display::fmt(state, f),
            PolicyState::Nfu(state) => fmt::Display::fmt(state, f),
            PolicyState::SecondChance(state) => fmt::Display::fmt(state, f),
            PolicyState::WorkingSet(state) => fmt::Display::fmt(state, f),
        }
    }
}

/// Slot of the resident page with the smallest key. Ties go to the lowest slot index.
fn least_by<F>(frames: &FrameTable, key: F) -> usize
where
    F: Fn(PageId) -> u64,
{
    let mut victim = 0;
    let mut lowest = u64::MAX;
    for (slot, page) in frames.iter().enumerate() {
        let value = key(*page);
        if slot == 0 || value < lowest {
            victim = slot;
            lowest = value;
        }
    }
    victim
}

/// One pass of the clock hand used by Clock and Second-Chance. Starting at `pointer`, a page
/// with a clear bit is chosen; a set bit is cleared and the hand moves on. The hand always ends
/// one past the chosen slot. Returns the chosen slot and the number of slots inspected.
///
/// Bits are only ever cleared here, so after one full revolution every bit is clear and the
/// sweep stops within `2 * capacity` inspections.
fn sweep(
    frames: &FrameTable,
    bits: &mut LinkedHashMap<PageId, bool>,
    pointer: &mut usize,
) -> (usize, usize) {
    let capacity = frames.capacity();
    let mut inspected = 0;
    loop {
        inspected += 1;
        debug_assert!(inspected <= 2 * capacity, "clock sweep failed to terminate");
        let slot = *pointer;
        let current = frames[slot];
        *pointer = (slot + 1) % capacity;
        match bits.get_mut(&current) {
            Some(bit) if *bit => *bit = false,
            Some(_) => return (slot, inspected),
            None => {
                bits.insert(current, false);
            }
        }
    }
}

/// Pointer must address a slot of the table.
fn validate_pointer(pointer: usize, frames: &FrameTable) -> Result<()> {
    if pointer < frames.capacity() {
        Ok(())
    } else {
        Err(Error::MalformedSnapshot(format!(
            "pointer {} is outside {} frames",
            pointer,
            frames.capacity()
        )))
    }
}

/// Every resident page must carry metadata in `map`.
fn validate_metadata<V>(map: &LinkedHashMap<PageId, V>, frames: &FrameTable) -> Result<()> {
    match frames.iter().find(|page| !map.contains_key(*page)) {
        Some(page) => Err(Error::MalformedSnapshot(format!(
            "resident page {} has no bookkeeping entry",
            page
        ))),
        None => Ok(()),
    }
}

/// A logical clock ticks once per served request and no stamp can be ahead of it.
fn validate_clock(clock: u64, stamps: &LinkedHashMap<PageId, u64>, served: usize) -> Result<()> {
    if clock != served as u64 {
        return Err(Error::MalformedSnapshot(format!(
            "clock reads {} after {} requests",
            clock, served
        )));
    }
    match stamps.iter().find(|(_, stamp)| **stamp > clock) {
        Some((page, stamp)) => Err(Error::MalformedSnapshot(format!(
            "page {} is stamped {} but the clock reads {}",
            page, stamp, clock
        ))),
        None => Ok(()),
    }
}

/// Renders a metadata map as `{page: value, ...}` in iteration order.
fn render_map<V, F>(map: &LinkedHashMap<PageId, V>, render: F) -> String
where
    F: Fn(&V) -> String,
{
    let entries = map
        .iter()
        .map(|(page, value)| format!("{}: {}", page, render(value)))
        .collect::<Vec<String>>()
        .join(", ");
    format!("{{{}}}", entries)
}

fn bit(value: &bool) -> String {
    String::from(if *value { "1" } else { "0" })
}
