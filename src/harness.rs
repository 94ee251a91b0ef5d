use std::hint::black_box;
use std::time::Instant;

use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::alloc::TrackingWindow;
use crate::error::Result;

/// Throughput reported when a measured window closed in zero time.
///
/// This is the largest finite `f64` rather than infinity so that it survives
/// JSON encoding as a number.
pub const UNBOUNDED: f64 = f64::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }

    /// Scale a benchmark's construction-time size for this profile.
    pub fn scale(&self, default_iterations: u64) -> u64 {
        match self {
            Profile::Quick => (default_iterations / 10).max(1),
            Profile::Full => default_iterations.max(1),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub profile: Profile,
    pub seed: u64,
}

impl BenchConfig {
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            profile: Profile::Full,
            seed: 0,
        }
    }
}

/// Options that shape the measurement itself rather than the workload.
#[derive(Clone, Copy, Debug)]
pub struct HarnessOptions {
    /// Open an allocation-tracking window around each trial. Tracking adds
    /// atomic bookkeeping to every allocation; disable it for pure timing.
    pub track_memory: bool,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self { track_memory: true }
    }
}

/// Explicit per-invocation overrides. Each takes precedence over the
/// benchmark's default when present.
#[derive(Clone, Copy, Debug, Default)]
pub struct Overrides {
    pub runs: Option<i64>,
    pub iterations: Option<i64>,
}

/// Resolved, immutable per-benchmark configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Number of trials.
    pub runs: usize,
    /// Requested size of one trial. Each workload interprets and caps it.
    pub iterations: u64,
}

impl RunConfig {
    /// Build a config from possibly invalid requested values. Anything below
    /// one is clamped to one.
    pub fn new(runs: i64, iterations: i64) -> Self {
        Self {
            runs: clamp_positive("runs", runs) as usize,
            iterations: clamp_positive("iterations", iterations),
        }
    }

    pub fn with_overrides(self, overrides: Overrides) -> Self {
        Self {
            runs: overrides
                .runs
                .map(|r| clamp_positive("runs", r) as usize)
                .unwrap_or(self.runs),
            iterations: overrides
                .iterations
                .map(|i| clamp_positive("iterations", i))
                .unwrap_or(self.iterations),
        }
    }
}

fn clamp_positive(field: &str, requested: i64) -> u64 {
    if requested < 1 {
        tracing::warn!(field, requested, "invalid {field}; clamping to 1");
        1
    } else {
        requested as u64
    }
}

/// Clamp a requested size to a workload's safety cap.
pub fn cap(workload: &str, requested: u64, safety_cap: u64) -> u64 {
    if requested > safety_cap {
        tracing::debug!(workload, requested, safety_cap, "request exceeds safety cap; clamping");
        safety_cap
    } else {
        requested
    }
}

/// `units / seconds`, or [`UNBOUNDED`] for a zero-length window.
pub fn throughput(units: f64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        units / seconds
    } else {
        UNBOUNDED
    }
}

/// Monotonic clock with optional allocation tracking.
#[derive(Clone, Copy, Debug)]
pub struct Probe {
    track_memory: bool,
}

impl Probe {
    pub fn new(track_memory: bool) -> Self {
        Self { track_memory }
    }

    /// A probe that never opens an allocation-tracking window.
    pub fn timing_only() -> Self {
        Self::new(false)
    }

    pub fn tracks_memory(&self) -> bool {
        self.track_memory
    }

    pub fn start(&self) -> ProbeWindow {
        let tracking = if self.track_memory {
            TrackingWindow::open()
        } else {
            None
        };
        ProbeWindow {
            tracking,
            start: Instant::now(),
        }
    }
}

/// An open measurement window.
#[derive(Debug)]
pub struct ProbeWindow {
    tracking: Option<TrackingWindow>,
    start: Instant,
}

impl ProbeWindow {
    pub fn stop(self) -> ProbeReading {
        let elapsed_seconds = self.start.elapsed().as_secs_f64();
        let (current_bytes, peak_bytes) = match self.tracking.map(TrackingWindow::close) {
            Some((current, peak)) => (Some(current), Some(peak)),
            None => (None, None),
        };
        ProbeReading {
            elapsed_seconds,
            current_bytes,
            peak_bytes,
        }
    }
}

/// What a closed window observed. Memory fields are `None` when tracking was
/// disabled or the host has no allocation statistics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeReading {
    pub elapsed_seconds: f64,
    pub current_bytes: Option<u64>,
    pub peak_bytes: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct Measured {
    pub reps: u64,
    pub reading: ProbeReading,
}

impl Measured {
    pub fn seconds(&self) -> f64 {
        self.reading.elapsed_seconds
    }
}

/// Effective repetition count for a workload whose unit of work covers
/// `unit_size` requested iterations: at least one, at most `max_reps`.
pub fn reps_for(workload: &str, iterations: u64, unit_size: u64, max_reps: u64) -> u64 {
    cap(workload, (iterations / unit_size.max(1)).max(1), max_reps)
}

/// Run `f` `reps` times inside one probe window.
pub fn measure_fn<T>(probe: &Probe, reps: u64, mut f: impl FnMut() -> Result<T>) -> Result<Measured> {
    let window = probe.start();
    for _ in 0..reps {
        black_box(f()?);
    }
    let reading = window.stop();

    Ok(Measured { reps, reading })
}
