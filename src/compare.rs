use crate::error::Result;
use crate::policy::PolicyKind;
use crate::sequence::ReferenceSequence;
use crate::simulation::Simulation;
use crate::stattrack::StatTracker;
use crate::table::{validate_capacity, FrameTable};
use std::fmt;
use tracing::info;

/// Final result of one policy's run over the shared workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonEntry {
    pub policy: PolicyKind,
    pub stats: StatTracker,
    pub frames: FrameTable,
}

impl ComparisonEntry {
    /// Hit rate as a rounded whole percentage.
    pub fn hit_rate(&self) -> u32 {
        self.stats.hit_percent()
    }
}

/// Results of running every policy over the same sequence and frame count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub capacity: usize,
    pub entries: Vec<ComparisonEntry>,
}

impl Comparison {
    pub fn get(&self, policy: PolicyKind) -> Option<&ComparisonEntry> {
        self.entries.iter().find(|entry| entry.policy == policy)
    }

    /// Entry with the fewest faults; the earliest listed policy wins a tie.
    pub fn best(&self) -> Option<&ComparisonEntry> {
        self.entries.iter().reduce(|best, entry| {
            match entry.stats.faults < best.stats.faults {
                true => entry,
                false => best,
            }
        })
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Comparison ({} frames)", self.capacity)?;
        writeln!(f, "---------------------------------------------------------")?;
        writeln!(
            f,
            "{:<14} {:>6} {:>6} {:>9}  final frames",
            "policy", "faults", "hits", "hit rate"
        )?;
        for entry in &self.entries {
            writeln!(
                f,
                "{:<14} {:>6} {:>6} {:>8}%  {}",
                entry.policy.title(),
                entry.stats.faults,
                entry.stats.hits,
                entry.hit_rate(),
                entry.frames
            )?;
        }
        Ok(())
    }
}

/// Run `policy` alone over `sequence` from a cold start.
pub fn run_policy(
    sequence: &ReferenceSequence,
    capacity: usize,
    policy: PolicyKind,
) -> Result<ComparisonEntry> {
    let mut simulation = Simulation::build(sequence.clone(), capacity, policy)?;
    let stats = simulation.run();
    Ok(ComparisonEntry {
        policy,
        stats,
        frames: simulation.frames().clone(),
    })
}

/// Run all seven policies over `sequence`, each in its own simulation built from its own copy of
/// the sequence, so no run can observe another's state.
///
/// # Errors
///
/// `Error::InvalidCapacity` is reported before any policy runs.
pub fn compare(sequence: &ReferenceSequence, capacity: usize) -> Result<Comparison> {
    validate_capacity(capacity)?;
    let entries = PolicyKind::ALL
        .iter()
        .map(|policy| run_policy(sequence, capacity, *policy))
        .collect::<Result<Vec<ComparisonEntry>>>()?;
    info!(
        "compared {} policies over {} requests with {} frames",
        entries.len(),
        sequence.len(),
        capacity
    );
    Ok(Comparison { capacity, entries })
}
