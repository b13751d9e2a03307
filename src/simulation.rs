use crate::error::{Error, Result};
use crate::policy::{Lookahead, Outcome, PolicyKind, PolicyState, ReplacementPolicy};
use crate::sequence::{PageId, ReferenceSequence};
use crate::snapshot::Snapshot;
use crate::stattrack::StatTracker;
use crate::table::FrameTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Everything observable after a single step: which request was served, how, and the state it
/// left behind. Snapshots of the frame table and policy state are owned copies, so a report stays
/// valid while the simulation keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub index: usize,
    pub page: PageId,
    pub outcome: Outcome,
    pub frames: FrameTable,
    pub state: PolicyState,
    pub stats: StatTracker,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}: Page {} - {}", self.index + 1, self.page, self.outcome)?;
        if let Some(evicted) = self.outcome.evicted() {
            write!(f, " (evicted {})", evicted)?;
        }
        write!(f, "\nFrames: {}\n{}", self.frames, self.state)
    }
}

/// The `Simulation` struct drives one replacement policy over a reference sequence. It owns the
/// frame table, the policy's bookkeeping, the cursor and the statistics; only `step` mutates them
/// and `reset` puts all four back to their initial values together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    sequence: ReferenceSequence,
    frames: FrameTable,
    state: PolicyState,
    cursor: Option<usize>,
    tracker: StatTracker,
}

impl Simulation {
    /// Create a new `Simulation` ready to serve the first request of `sequence`.
    ///
    /// # Arguments
    ///
    /// * `sequence` - the workload; it is owned by the simulation for the whole run.
    /// * `capacity` - number of frames, between `MIN_FRAMES` and `MAX_FRAMES`.
    /// * `kind` - the replacement policy to run.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCapacity` for an out of range frame count.
    pub fn build(sequence: ReferenceSequence, capacity: usize, kind: PolicyKind) -> Result<Self> {
        Ok(Self {
            sequence,
            frames: FrameTable::build(capacity)?,
            state: PolicyState::new(kind),
            cursor: None,
            tracker: StatTracker::new(),
        })
    }

    /// Start the run over with `capacity` frames and the current policy.
    ///
    /// # Errors
    ///
    /// An out of range `capacity` is reported before anything is cleared; the simulation is left
    /// exactly as it was.
    pub fn reset(&mut self, capacity: usize) -> Result<()> {
        self.frames = FrameTable::build(capacity)?;
        self.restart();
        Ok(())
    }

    /// Switch to another policy. Policy states are not interchangeable, so this always restarts
    /// the run with the current frame count.
    pub fn select(&mut self, kind: PolicyKind) {
        self.state = PolicyState::new(kind);
        self.restart();
    }

    /// Replace the workload and restart the run.
    pub fn load(&mut self, sequence: ReferenceSequence) {
        self.sequence = sequence;
        self.restart();
    }

    fn restart(&mut self) {
        self.frames.clear();
        self.state = PolicyState::new(self.state.kind());
        self.cursor = None;
        self.tracker = StatTracker::new();
        info!(
            "reset: policy {}, {} frames, {} requests",
            self.state.kind(),
            self.frames.capacity(),
            self.sequence.len()
        );
    }

    /// Serve the next request of the sequence with the selected policy and fold the outcome into
    /// the statistics.
    ///
    /// # Errors
    ///
    /// Once the last request has been served this returns `Error::SequenceExhausted` and changes
    /// nothing.
    pub fn step(&mut self) -> Result<StepReport> {
        let index = self.cursor.map_or(0, |cursor| cursor + 1);
        let page = match self.sequence.get(index) {
            Some(page) => page,
            None => return Err(Error::SequenceExhausted(self.sequence.len())),
        };

        let lookahead = Lookahead {
            sequence: &self.sequence,
            cursor: index,
        };
        let outcome = self.state.access(&mut self.frames, page, lookahead);
        self.cursor = Some(index);
        self.tracker.record(outcome);

        debug!(
            "step {}: page {} -> {} frames {}",
            index + 1,
            page,
            outcome,
            self.frames
        );

        Ok(StepReport {
            index,
            page,
            outcome,
            frames: self.frames.clone(),
            state: self.state.clone(),
            stats: self.tracker,
        })
    }

    /// Step until the sequence is exhausted and return the final statistics. A run that already
    /// finished returns its statistics unchanged.
    pub fn run(&mut self) -> StatTracker {
        while let Ok(report) = self.step() {
            debug_assert_eq!(report.stats, self.tracker);
        }
        self.tracker
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    /// Requests not yet served.
    pub fn remaining(&self) -> usize {
        let served = self.cursor.map_or(0, |cursor| cursor + 1);
        self.sequence.len() - served
    }

    pub fn kind(&self) -> PolicyKind {
        self.state.kind()
    }

    pub fn sequence(&self) -> &ReferenceSequence {
        &self.sequence
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn state(&self) -> &PolicyState {
        &self.state
    }

    /// Index of the last served request, `None` before the first step.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn stats(&self) -> StatTracker {
        self.tracker
    }

    /// One line per frame: the resident page and its policy annotation, or `Empty`.
    pub fn frame_details(&self) -> Vec<String> {
        (0..self.frames.capacity())
            .map(|slot| match slot < self.frames.len() {
                true => {
                    let detail = self.state.frame_detail(&self.frames, slot);
                    match detail.is_empty() {
                        true => format!("{}", self.frames[slot]),
                        false => format!("{} ({})", self.frames[slot], detail),
                    }
                }
                false => String::from("Empty"),
            })
            .collect()
    }

    /// Capture the full run state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            policy: self.state.kind(),
            frames: self.frames.clone(),
            sequence: self.sequence.clone(),
            cursor: self.cursor,
            stats: self.tracker,
            state: self.state.clone(),
        }
    }

    /// Serialize the full run state into a single blob.
    pub fn save(&self) -> Result<String> {
        self.snapshot().to_json()
    }

    /// Rebuild a simulation from a blob produced by `save`.
    ///
    /// # Errors
    ///
    /// `Error::MalformedSnapshot` if the blob does not parse or describes an impossible state.
    pub fn from_blob(blob: &str) -> Result<Self> {
        Ok(Self::from(Snapshot::from_json(blob)?))
    }

    /// Replace the running state with the one stored in `blob`. The blob is parsed and checked in
    /// full before anything is committed, so a failed restore leaves the current run untouched.
    pub fn restore(&mut self, blob: &str) -> Result<()> {
        match Self::from_blob(blob) {
            Ok(restored) => {
                *self = restored;
                info!(
                    "restored {} run at step {} of {}",
                    self.kind(),
                    self.cursor.map_or(0, |cursor| cursor + 1),
                    self.sequence.len()
                );
                Ok(())
            }
            Err(err) => {
                warn!("rejected snapshot: {}", err);
                Err(err)
            }
        }
    }
}

impl From<Snapshot> for Simulation {
    /// Assumes `value` has been validated, as `Snapshot::from_json` does.
    fn from(value: Snapshot) -> Self {
        Self {
            sequence: value.sequence,
            frames: value.frames,
            state: value.state,
            cursor: value.cursor,
            tracker: value.stats,
        }
    }
}
