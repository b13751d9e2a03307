pub mod compare;
pub mod config;
pub mod error;
pub mod policy;
pub mod sequence;
pub mod simulation;
pub mod snapshot;
pub mod stattrack;
pub mod storage;
pub mod table;

pub use compare::{compare, Comparison, ComparisonEntry};
pub use error::{Error, Result};
pub use policy::{Outcome, PolicyKind, PolicyState, ReplacementPolicy};
pub use sequence::{PageId, ReferenceSequence};
pub use simulation::{Simulation, StepReport};
pub use snapshot::Snapshot;
pub use stattrack::StatTracker;
pub use storage::{Storage, SNAPSHOT_KEY};
pub use table::FrameTable;

use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use std::thread;
use std::time::Duration;
use tracing::info;

pub const MIN_FRAMES: usize = 1;
pub const MAX_FRAMES: usize = 10;
pub const DEFAULT_FRAMES: usize = 3;

fn prepare_simulation(config: &Config, storage: &Storage) -> Result<Simulation> {
    if !config.load {
        let sequence = config.reference_sequence()?;
        return Simulation::build(sequence, config.capacity(), config.algorithm);
    }
    match storage.get(SNAPSHOT_KEY)? {
        Some(blob) => {
            info!("resuming the run saved in {:?}", storage.path());
            Simulation::from_blob(&blob)
        }
        None => Err(Error::MalformedSnapshot(format!(
            "no saved run under '{}' in {:?}",
            SNAPSHOT_KEY,
            storage.path()
        ))),
    }
}

fn progress_bar(length: usize) -> ProgressBar {
    let bar = ProgressBar::new(length as u64);
    let style = ProgressStyle::with_template("[{bar:40}] {pos}/{len} requests")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar
}

/// Serve every remaining request, printing a report for each step.
fn step_through(simulation: &mut Simulation, delay: Duration) -> Result<()> {
    let bar = progress_bar(simulation.remaining());
    while !simulation.is_finished() {
        let report = simulation.step()?;
        bar.println(format!("{}\n", report));
        bar.inc(1);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    bar.finish_and_clear();
    Ok(())
}

pub fn run_simulation(config: Config) -> Result<()> {
    let storage = Storage::build(&config.file_store);
    let mut simulation = prepare_simulation(&config, &storage)?;
    println!("reference sequence: {}", simulation.sequence());

    if config.compare {
        let comparison = compare(simulation.sequence(), simulation.frames().capacity())?;
        println!("{}", comparison);
        if let Some(best) = comparison.best() {
            println!("fewest faults: {}", best.policy.title());
        }
        return Ok(());
    }

    println!("policy: {}\n", simulation.kind().title());
    step_through(&mut simulation, Duration::from_millis(u64::from(config.delay_ms)))?;

    println!("final frames:");
    for (slot, detail) in simulation.frame_details().iter().enumerate() {
        println!("  frame {}: {}", slot, detail);
    }
    println!("{}", simulation.stats());

    if config.save {
        storage.put(SNAPSHOT_KEY, &simulation.save()?)?;
        println!("saved run to {:?}", storage.path());
    }
    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;
    use clap::Parser;

    fn config_for(store: &std::path::Path, args: &[&str]) -> Config {
        let mut argv = vec![
            "page_replacement_sim",
            "--file-store",
            store.to_str().unwrap(),
        ];
        argv.extend_from_slice(args);
        Config::parse_from(argv)
    }

    #[cfg(test)]
    mod runner_tests {

        use super::*;

        #[test]
        fn save_then_load() {
            let dir = tempfile::tempdir().unwrap();
            let store = dir.path().join("store.json");

            let config = config_for(&store, &["--sequence", "1,2,3,1", "--algorithm", "lru", "--save"]);
            run_simulation(config).unwrap();

            let blob = Storage::build(&store).get(SNAPSHOT_KEY).unwrap().unwrap();
            let saved = Simulation::from_blob(&blob).unwrap();
            assert!(saved.is_finished());
            assert_eq!(saved.kind(), PolicyKind::Lru);
            assert_eq!(saved.stats(), StatTracker { hits: 1, faults: 3 });

            let config = config_for(&store, &["--load", "--compare"]);
            assert!(run_simulation(config).is_ok());
        }

        #[test]
        fn load_without_saved_run() {
            let dir = tempfile::tempdir().unwrap();
            let config = config_for(&dir.path().join("missing.json"), &["--load"]);
            assert!(matches!(
                run_simulation(config),
                Err(Error::MalformedSnapshot(_))
            ));
        }

        #[test]
        fn rejects_bad_sequence() {
            let dir = tempfile::tempdir().unwrap();
            let config = config_for(&dir.path().join("store.json"), &["--sequence", ","]);
            assert!(matches!(
                run_simulation(config),
                Err(Error::InvalidSequence(_))
            ));
        }
    }
}
