use page_replacement_sim::compare::run_policy;
use page_replacement_sim::{
    compare, Error, Outcome, PageId, PolicyKind, ReferenceSequence, Result, Simulation,
    MAX_FRAMES,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

const CASES: usize = 300;

fn random_workload(rng: &mut StdRng) -> (ReferenceSequence, usize) {
    let length = rng.gen_range(1..60);
    let pages = (0..length)
        .map(|_| rng.gen_range(0..12))
        .collect::<Vec<PageId>>();
    let capacity = rng.gen_range(1..=MAX_FRAMES);
    (ReferenceSequence::build(pages).unwrap(), capacity)
}

#[test]
fn test_frames_never_overflow_or_duplicate() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..CASES {
        let (sequence, capacity) = random_workload(&mut rng);
        for kind in PolicyKind::ALL {
            let mut simulation = Simulation::build(sequence.clone(), capacity, kind)?;
            while !simulation.is_finished() {
                let report = simulation.step()?;
                assert!(report.frames.len() <= capacity);
                let distinct = report.frames.iter().collect::<HashSet<_>>();
                assert_eq!(distinct.len(), report.frames.len(), "{} duplicated a page", kind);
                assert!(report.frames.contains(report.page));
            }
        }
    }
    Ok(())
}

#[test]
fn test_resident_page_always_hits() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..CASES {
        let (sequence, capacity) = random_workload(&mut rng);
        for kind in PolicyKind::ALL {
            let mut simulation = Simulation::build(sequence.clone(), capacity, kind)?;
            while !simulation.is_finished() {
                let before = simulation.frames().clone();
                let report = simulation.step()?;
                match before.contains(report.page) {
                    true => {
                        assert_eq!(report.outcome, Outcome::Hit);
                        assert_eq!(report.frames, before);
                    }
                    false => assert!(report.outcome.is_fault()),
                }
                // a fault only evicts once every frame is taken
                if let Some(evicted) = report.outcome.evicted() {
                    assert!(before.is_full());
                    assert!(before.contains(evicted));
                    assert!(!report.frames.contains(evicted));
                }
            }
        }
    }
    Ok(())
}

#[test]
fn test_statistics_add_up() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..CASES {
        let (sequence, capacity) = random_workload(&mut rng);
        let distinct = sequence.as_slice().iter().collect::<HashSet<_>>().len();
        for kind in PolicyKind::ALL {
            let entry = run_policy(&sequence, capacity, kind)?;
            assert_eq!(entry.stats.total(), sequence.len());
            assert!(entry.stats.faults >= distinct);
        }
    }
    Ok(())
}

#[test]
fn test_optimal_never_loses() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..CASES {
        let (sequence, capacity) = random_workload(&mut rng);
        let comparison = compare(&sequence, capacity)?;
        let optimal = comparison.get(PolicyKind::Optimal).unwrap().stats.faults;
        for entry in &comparison.entries {
            assert!(
                optimal <= entry.stats.faults,
                "optimal {} > {} {} on {}",
                optimal,
                entry.policy,
                entry.stats.faults,
                sequence
            );
        }
    }
    Ok(())
}

#[test]
fn test_comparison_runs_are_isolated() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(19);
    for _ in 0..50 {
        let (sequence, capacity) = random_workload(&mut rng);
        let comparison = compare(&sequence, capacity)?;
        for kind in PolicyKind::ALL {
            assert_eq!(comparison.get(kind), Some(&run_policy(&sequence, capacity, kind)?));
        }
    }
    Ok(())
}

#[test]
fn test_single_frame_hits_only_on_repeats() -> Result<()> {
    let sequence = ReferenceSequence::parse("1,1,2,1,1,3,3")?;
    let expected = [false, true, false, false, true, false, true];
    for kind in PolicyKind::ALL {
        let mut simulation = Simulation::build(sequence.clone(), 1, kind)?;
        let hits = (0..sequence.len())
            .map(|_| simulation.step().map(|report| report.outcome.is_hit()))
            .collect::<Result<Vec<bool>>>()?;
        assert_eq!(hits, expected, "{}", kind);
    }
    Ok(())
}

#[test]
fn test_fifo_anomaly() -> Result<()> {
    let sequence = ReferenceSequence::parse("1,2,3,4,1,2,5,1,2,3,4,5")?;
    assert_eq!(run_policy(&sequence, 3, PolicyKind::Fifo)?.stats.faults, 9);
    assert_eq!(run_policy(&sequence, 4, PolicyKind::Fifo)?.stats.faults, 10);
    Ok(())
}

#[test]
fn test_resumed_run_matches_uninterrupted_run() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..100 {
        let (sequence, capacity) = random_workload(&mut rng);
        let pause = rng.gen_range(0..=sequence.len());
        for kind in PolicyKind::ALL {
            let mut uninterrupted = Simulation::build(sequence.clone(), capacity, kind)?;
            uninterrupted.run();

            let mut first = Simulation::build(sequence.clone(), capacity, kind)?;
            for _ in 0..pause {
                first.step()?;
            }
            let mut resumed = Simulation::from_blob(&first.save()?)?;
            assert_eq!(resumed, first);
            resumed.run();
            assert_eq!(resumed, uninterrupted);
        }
    }
    Ok(())
}

#[test]
fn test_exhausted_sequence_changes_nothing() -> Result<()> {
    let sequence = ReferenceSequence::parse("3,1,3")?;
    let mut simulation = Simulation::build(sequence, 2, PolicyKind::Clock)?;
    simulation.run();
    let finished = simulation.clone();
    assert!(matches!(
        simulation.step(),
        Err(Error::SequenceExhausted(3))
    ));
    assert_eq!(simulation, finished);
    Ok(())
}
