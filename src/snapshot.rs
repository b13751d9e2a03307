use crate::error::{Error, Result};
use crate::policy::{PolicyKind, PolicyState, ReplacementPolicy};
use crate::sequence::ReferenceSequence;
use crate::stattrack::StatTracker;
use crate::table::FrameTable;
use serde::{Deserialize, Serialize};

/// A complete, self-contained picture of a run: enough to resume it exactly where it stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub policy: PolicyKind,
    pub frames: FrameTable,
    pub sequence: ReferenceSequence,
    pub cursor: Option<usize>,
    pub stats: StatTracker,
    pub state: PolicyState,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a blob.
    ///
    /// # Errors
    ///
    /// `Error::MalformedSnapshot` when the blob is not valid JSON for a snapshot or when its parts
    /// contradict each other (see `validate`).
    pub fn from_json(blob: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(blob)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check the invariants a simulation maintains between its parts. Anything a real run could
    /// not have produced is rejected.
    pub fn validate(&self) -> Result<()> {
        if self.sequence.is_empty() {
            return Err(malformed("the reference sequence is empty"));
        }
        self.frames.validate().map_err(|err| match err {
            Error::InvalidCapacity { .. } => Error::MalformedSnapshot(err.to_string()),
            other => other,
        })?;
        if self.state.kind() != self.policy {
            return Err(malformed(&format!(
                "state belongs to {} but the policy is {}",
                self.state.kind(),
                self.policy
            )));
        }

        let served = match self.cursor {
            Some(cursor) if cursor >= self.sequence.len() => {
                return Err(malformed(&format!(
                    "cursor {} is past the end of {} requests",
                    cursor,
                    self.sequence.len()
                )))
            }
            Some(cursor) => cursor + 1,
            None => 0,
        };
        match self.stats.hits.checked_add(self.stats.faults) {
            Some(total) if total == served => {}
            _ => {
                return Err(malformed(&format!(
                    "statistics count {} hits and {} faults but {} requests were served",
                    self.stats.hits, self.stats.faults, served
                )))
            }
        }

        let requested = &self.sequence.as_slice()[..served];
        if let Some(page) = self.frames.iter().find(|page| !requested.contains(*page)) {
            return Err(malformed(&format!(
                "page {} is resident but was never requested",
                page
            )));
        }

        self.state.validate(&self.frames, served)
    }
}

fn malformed(reason: &str) -> Error {
    Error::MalformedSnapshot(String::from(reason))
}
