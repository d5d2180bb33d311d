//! Concurrency behavior of timestamp generation through the public API.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use metronome::{
    clock_for, AtomicTimestampGenerator, Clock, ClockConfig, ContextTimestampGenerator,
    SystemClock, TimestampGenerator,
};
use tokio::sync::Barrier;

/// Clock pinned to a settable instant, for forcing contention on the
/// increment path.
struct FrozenClock(AtomicI64);

impl Clock for FrozenClock {
    fn now_micros(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

async fn collect_concurrent_timestamps(
    generator: Arc<dyn TimestampGenerator>,
    tasks: usize,
    per_task: usize,
) -> Vec<Vec<i64>> {
    let barrier = Arc::new(Barrier::new(tasks));
    let mut handles = Vec::with_capacity(tasks);
    for _ in 0..tasks {
        let generator = Arc::clone(&generator);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            let mut seen = Vec::with_capacity(per_task);
            for _ in 0..per_task {
                seen.push(generator.next());
            }
            seen
        }));
    }

    let mut sequences = Vec::with_capacity(tasks);
    for handle in handles {
        sequences.push(handle.await.expect("generator task panicked"));
    }
    sequences
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_generator_is_unique_and_increasing_under_contention() {
    const TASKS: usize = 8;
    const PER_TASK: usize = 500;

    // A frozen clock maximizes contention: every call takes the
    // last + 1 path.
    let clock = Arc::new(FrozenClock(AtomicI64::new(1_000_000)));
    let generator: Arc<dyn TimestampGenerator> =
        Arc::new(AtomicTimestampGenerator::new(clock));

    let sequences = collect_concurrent_timestamps(generator, TASKS, PER_TASK).await;

    let mut all = Vec::with_capacity(TASKS * PER_TASK);
    for seen in &sequences {
        assert!(
            seen.windows(2).all(|w| w[0] < w[1]),
            "per-task sequence must be strictly increasing"
        );
        all.extend_from_slice(seen);
    }

    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len(), TASKS * PER_TASK, "every timestamp must be unique");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_generator_is_unique_on_the_real_clock() {
    const TASKS: usize = 4;
    const PER_TASK: usize = 250;

    let generator: Arc<dyn TimestampGenerator> =
        Arc::new(AtomicTimestampGenerator::new(Arc::new(SystemClock)));

    let sequences = collect_concurrent_timestamps(generator, TASKS, PER_TASK).await;

    let mut all: Vec<i64> = sequences.into_iter().flatten().collect();
    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len(), TASKS * PER_TASK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_contexts_overlap_but_stay_individually_ordered() {
    const TASKS: usize = 4;
    const PER_TASK: usize = 200;

    let clock = Arc::new(FrozenClock(AtomicI64::new(5_000_000)));
    let factory = Arc::new(ContextTimestampGenerator::new(clock));

    let mut handles = Vec::with_capacity(TASKS);
    for _ in 0..TASKS {
        let factory = Arc::clone(&factory);
        handles.push(tokio::spawn(async move {
            // One context per task; it moves with the task.
            let context = factory.context();
            let mut seen = Vec::with_capacity(PER_TASK);
            for _ in 0..PER_TASK {
                seen.push(context.next());
            }
            seen
        }));
    }

    let mut sequences = Vec::with_capacity(TASKS);
    for handle in handles {
        sequences.push(handle.await.expect("context task panicked"));
    }

    // Each context produces the same dense range from the frozen clock:
    // ordered within, overlapping across.
    for seen in &sequences {
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen.first().copied(), Some(5_000_000));
    }
}

#[tokio::test]
async fn test_clock_for_falls_back_to_the_system_clock() {
    let clock = clock_for(&ClockConfig::default().with_native_clock(false));
    let generator = AtomicTimestampGenerator::new(clock);
    let first = generator.next();
    // Coarse clock output starts on a whole millisecond.
    assert_eq!(first % 1000, 0);
    assert!(generator.next() > first);
}

#[cfg(unix)]
#[tokio::test]
async fn test_calibrated_clock_feeds_the_generator() {
    let clock = clock_for(&ClockConfig::default());
    let generator = AtomicTimestampGenerator::new(clock);
    let first = generator.next();
    // Sane wall-clock reading (later than 2020-01-01).
    assert!(first > 1_577_836_800_000_000);
    assert!(generator.next() > first);
}
