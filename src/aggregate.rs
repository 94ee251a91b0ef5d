//! Median-of-runs aggregation.
//!
//! The [`Aggregator`] owns every piece of state that outlives a single trial:
//! the seeded RNG workloads draw their inputs from, the probe configuration,
//! and the quiesce hook run between trials. It is created once per harness
//! session and dropped when the session ends.

use rand_chacha::ChaCha8Rng;

use crate::error::Result;
use crate::harness::{BenchConfig, HarnessOptions, Overrides, Probe, RunConfig};
use crate::schema::{AggregateResult, Annotation, Median, Metric, TrialRecord};

/// Per-trial view of the harness state handed to a workload.
pub struct TrialContext<'a> {
    pub probe: Probe,
    pub rng: &'a mut ChaCha8Rng,
}

/// A benchmark: one workload plus the metrics it reports.
pub trait Benchmark {
    /// Display name written to the result's `name` field.
    fn name(&self) -> &str;

    /// Construction-time run count and size.
    fn default_config(&self) -> RunConfig;

    /// `(output key, metric)` pairs, in output order.
    fn medians(&self) -> &'static [(&'static str, Metric)];

    /// Extra top-level fields describing the resolved configuration.
    fn annotations(&self, _cfg: &RunConfig) -> Vec<Annotation> {
        Vec::new()
    }

    /// Execute one trial.
    fn run_once(&mut self, cfg: &RunConfig, ctx: &mut TrialContext<'_>) -> Result<TrialRecord>;

    /// Run a complete invocation on a fresh default harness session.
    fn run(&mut self, overrides: Overrides) -> Result<AggregateResult>
    where
        Self: Sized,
    {
        Aggregator::new(BenchConfig::default(), HarnessOptions::default()).run(self, overrides)
    }
}

/// Hook run after every trial to release what the trial left behind, so the
/// next trial's peak-memory reading starts clean.
pub trait Quiesce {
    fn quiesce(&mut self);
}

/// Default hook. Trial data is dropped deterministically, so there is
/// nothing further to reclaim.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopQuiesce;

impl Quiesce for NoopQuiesce {
    fn quiesce(&mut self) {}
}

impl<F: FnMut()> Quiesce for F {
    fn quiesce(&mut self) {
        self()
    }
}

pub struct Aggregator {
    config: BenchConfig,
    probe: Probe,
    rng: ChaCha8Rng,
    quiesce: Box<dyn Quiesce>,
}

impl Aggregator {
    pub fn new(config: BenchConfig, options: HarnessOptions) -> Self {
        Self {
            rng: config.rng(),
            probe: Probe::new(options.track_memory),
            config,
            quiesce: Box::new(NoopQuiesce),
        }
    }

    pub fn with_quiesce(mut self, hook: impl Quiesce + 'static) -> Self {
        self.quiesce = Box::new(hook);
        self
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Resolve the effective config: explicit overrides, then the benchmark's
    /// defaults scaled by the session profile.
    pub fn resolve(&self, bench: &dyn Benchmark, overrides: Overrides) -> RunConfig {
        let defaults = bench.default_config();
        RunConfig {
            runs: defaults.runs,
            iterations: self.config.profile.scale(defaults.iterations),
        }
        .with_overrides(overrides)
    }

    pub fn run(&mut self, bench: &mut dyn Benchmark, overrides: Overrides) -> Result<AggregateResult> {
        let cfg = self.resolve(bench, overrides);
        self.run_with_config(bench, &cfg)
    }

    /// Execute `cfg.runs` trials strictly in sequence and aggregate them. A
    /// failing trial aborts the invocation; no partial aggregate is returned.
    pub fn run_with_config(&mut self, bench: &mut dyn Benchmark, cfg: &RunConfig) -> Result<AggregateResult> {
        let runs = cfg.runs.max(1);
        let mut raw = Vec::with_capacity(runs);

        for index in 0..runs {
            let mut ctx = TrialContext {
                probe: self.probe,
                rng: &mut self.rng,
            };
            let trial = bench.run_once(cfg, &mut ctx)?;
            tracing::debug!(
                benchmark = bench.name(),
                trial = index,
                duration_s = trial.duration_seconds(),
                throughput = trial.throughput(),
                "trial complete"
            );
            raw.push(trial);
            self.quiesce.quiesce();
        }

        let medians = bench
            .medians()
            .iter()
            .filter_map(|&(key, metric)| {
                let values: Option<Vec<f64>> = raw.iter().map(|t| t.metric(metric)).collect();
                values.map(|mut v| Median {
                    key,
                    value: lower_median(&mut v),
                })
            })
            .collect::<Vec<_>>();

        tracing::info!(
            benchmark = bench.name(),
            runs,
            medians = ?medians.iter().map(|m| (m.key, m.value)).collect::<Vec<_>>(),
            "benchmark complete"
        );

        Ok(AggregateResult {
            name: bench.name().to_string(),
            runs,
            annotations: bench.annotations(cfg),
            medians,
            raw,
        })
    }
}

/// Sort `values` ascending and return the element at index `len / 2`.
///
/// Even counts are not interpolated: historical results were produced with
/// this exact index and must stay comparable.
pub fn lower_median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    values[values.len() / 2]
}
