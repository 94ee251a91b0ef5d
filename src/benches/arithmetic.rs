//! Arithmetic, branching and recursion workloads.

use std::hint::black_box;

use crate::aggregate::{Benchmark, TrialContext};
use crate::error::Result;
use crate::harness::{cap, measure_fn, reps_for, throughput, RunConfig};
use crate::schema::{Metric, OpsTrial, TrialRecord};

const ARITH_UNIT: u64 = 1_000;
const ARITH_MAX_REPS: u64 = 100_000;

fn arithmetic_unit() -> (i64, f64) {
    let mut s_int: i64 = 0;
    let mut s_float = 0.0f64;
    for i in 1..1_000i64 {
        s_int += i * (i & 1);
        let x = i as f64;
        s_float += x.sin() * x.sqrt();
    }
    (s_int, s_float)
}

/// Integer and floating-point accumulation loop.
#[derive(Clone, Debug)]
pub struct Arithmetic {
    pub ops_per_iter: u64,
    pub runs: usize,
}

impl Default for Arithmetic {
    fn default() -> Self {
        Self {
            ops_per_iter: 10_000_000,
            runs: 5,
        }
    }
}

impl Benchmark for Arithmetic {
    fn name(&self) -> &str {
        "Arithmetic"
    }

    fn default_config(&self) -> RunConfig {
        RunConfig {
            runs: self.runs,
            iterations: self.ops_per_iter,
        }
    }

    fn medians(&self) -> &'static [(&'static str, Metric)] {
        &[
            ("median_time_sec", Metric::TimeS),
            ("median_ops_per_sec", Metric::OpsPerSec),
            ("median_peak_mem_bytes", Metric::PeakMemBytes),
        ]
    }

    fn run_once(&mut self, cfg: &RunConfig, ctx: &mut TrialContext<'_>) -> Result<TrialRecord> {
        let reps = reps_for(self.name(), cfg.iterations, ARITH_UNIT, ARITH_MAX_REPS);
        let mut acc_int: i64 = 0;
        let mut acc_float = 0.0f64;

        let m = measure_fn(&ctx.probe, reps, || {
            let (i, f) = arithmetic_unit();
            acc_int = acc_int.wrapping_add(i);
            acc_float += f;
            Ok(())
        })?;

        let ops = reps * ARITH_UNIT;
        Ok(TrialRecord::Ops(OpsTrial {
            time_s: m.seconds(),
            ops,
            ops_per_sec: throughput(ops as f64, m.seconds()),
            mem_current_bytes: m.reading.current_bytes,
            mem_peak_bytes: m.reading.peak_bytes,
            checksum: Some(acc_int as f64 + acc_float),
        }))
    }
}

fn logic_unit() -> i64 {
    let mut acc: i64 = 0;
    for i in 1..500i64 {
        if i % 15 == 0 {
            acc += i * 2;
        } else if i % 5 == 0 {
            acc -= i;
        } else if i % 3 == 0 {
            acc += i / 2;
        } else {
            acc += i & 1;
        }
    }
    acc
}

/// Branch-heavy control-flow loop.
#[derive(Clone, Debug)]
pub struct LogicControl {
    pub ops_per_iter: u64,
    pub runs: usize,
}

impl Default for LogicControl {
    fn default() -> Self {
        Self {
            ops_per_iter: 10_000_000,
            runs: 5,
        }
    }
}

impl Benchmark for LogicControl {
    fn name(&self) -> &str {
        "LogicControl"
    }

    fn default_config(&self) -> RunConfig {
        RunConfig {
            runs: self.runs,
            iterations: self.ops_per_iter,
        }
    }

    fn medians(&self) -> &'static [(&'static str, Metric)] {
        &[
            ("median_time_s", Metric::TimeS),
            ("median_ops_per_sec", Metric::OpsPerSec),
        ]
    }

    fn run_once(&mut self, cfg: &RunConfig, ctx: &mut TrialContext<'_>) -> Result<TrialRecord> {
        let reps = reps_for(self.name(), cfg.iterations, ARITH_UNIT, ARITH_MAX_REPS);
        let mut acc: i64 = 0;

        let m = measure_fn(&ctx.probe, reps, || {
            acc = acc.wrapping_add(logic_unit());
            Ok(())
        })?;

        let ops = reps * ARITH_UNIT;
        Ok(TrialRecord::Ops(OpsTrial {
            time_s: m.seconds(),
            ops,
            ops_per_sec: throughput(ops as f64, m.seconds()),
            mem_current_bytes: m.reading.current_bytes,
            mem_peak_bytes: m.reading.peak_bytes,
            checksum: Some(acc as f64),
        }))
    }
}

/// Largest `n` computed; beyond 93 the result overflows `u64`.
const FIB_MAX_N: u64 = 90;
/// Above this `n` the naive recursion is replaced by iteration.
const FIB_RECURSIVE_LIMIT: u64 = 40;

fn fib(n: u64) -> u64 {
    if n > FIB_RECURSIVE_LIMIT {
        let (mut a, mut b) = (0u64, 1u64);
        for _ in 0..n {
            let next = a.wrapping_add(b);
            a = b;
            b = next;
        }
        return a;
    }
    if n < 2 {
        return n;
    }
    fib(n - 1) + fib(n - 2)
}

/// Naive recursive Fibonacci. One trial is one evaluation of `fib(n)`.
#[derive(Clone, Debug)]
pub struct RecursiveFib {
    pub n: u64,
    pub runs: usize,
}

impl Default for RecursiveFib {
    fn default() -> Self {
        Self { n: 24, runs: 3 }
    }
}

impl Benchmark for RecursiveFib {
    fn name(&self) -> &str {
        "RecursiveFibonacci"
    }

    fn default_config(&self) -> RunConfig {
        RunConfig {
            runs: self.runs,
            iterations: self.n,
        }
    }

    fn medians(&self) -> &'static [(&'static str, Metric)] {
        &[
            ("median_time_sec", Metric::TimeS),
            ("median_ops_per_sec", Metric::OpsPerSec),
            ("median_peak_mem_bytes", Metric::PeakMemBytes),
        ]
    }

    fn run_once(&mut self, cfg: &RunConfig, ctx: &mut TrialContext<'_>) -> Result<TrialRecord> {
        let n = cap(self.name(), cfg.iterations, FIB_MAX_N);
        let mut result = 0u64;

        let m = measure_fn(&ctx.probe, 1, || {
            result = fib(black_box(n));
            Ok(())
        })?;

        Ok(TrialRecord::Ops(OpsTrial {
            time_s: m.seconds(),
            ops: 1,
            ops_per_sec: throughput(1.0, m.seconds()),
            mem_current_bytes: m.reading.current_bytes,
            mem_peak_bytes: m.reading.peak_bytes,
            checksum: Some(result as f64),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregator;
    use crate::harness::{BenchConfig, HarnessOptions, Overrides, Probe};

    fn ops_trial(t: TrialRecord) -> OpsTrial {
        match t {
            TrialRecord::Ops(o) => o,
            other => panic!("unexpected trial {other:?}"),
        }
    }

    #[test]
    fn fib_matches_known_values() {
        assert_eq!(fib(0), 0);
        assert_eq!(fib(1), 1);
        assert_eq!(fib(24), 46_368);
        assert_eq!(fib(50), 12_586_269_025);
        assert_eq!(fib(90), 2_880_067_194_370_816_120);
    }

    #[test]
    fn arithmetic_unit_is_deterministic() {
        assert_eq!(arithmetic_unit().0, arithmetic_unit().0);
        // Sum of odd numbers below 1000.
        assert_eq!(arithmetic_unit().0, 250_000);
    }

    #[test]
    fn small_request_still_runs_one_unit() {
        let mut rng = BenchConfig::default().rng();
        let mut ctx = TrialContext {
            probe: Probe::timing_only(),
            rng: &mut rng,
        };
        let t = ops_trial(
            Arithmetic::default()
                .run_once(&RunConfig::new(1, 10), &mut ctx)
                .unwrap(),
        );
        assert_eq!(t.ops, ARITH_UNIT);
        assert!(t.time_s >= 0.0);
    }

    #[test]
    fn arithmetic_scenario_five_runs() {
        let mut agg = Aggregator::new(
            BenchConfig::default(),
            HarnessOptions { track_memory: false },
        );
        let result = agg
            .run(
                &mut Arithmetic::default(),
                Overrides {
                    runs: Some(5),
                    iterations: Some(20_000),
                },
            )
            .unwrap();

        assert_eq!(result.runs, 5);
        assert_eq!(result.raw.len(), 5);

        let mut times: Vec<f64> = result.raw.iter().map(TrialRecord::duration_seconds).collect();
        times.sort_by(f64::total_cmp);
        assert_eq!(result.median("median_time_sec"), Some(times[2]));
    }

    #[test]
    fn logic_control_reports_ops() {
        let mut rng = BenchConfig::default().rng();
        let mut ctx = TrialContext {
            probe: Probe::timing_only(),
            rng: &mut rng,
        };
        let t = ops_trial(
            LogicControl::default()
                .run_once(&RunConfig::new(1, 3_000), &mut ctx)
                .unwrap(),
        );
        assert_eq!(t.ops, 3_000);
        assert_eq!(t.checksum, Some((logic_unit() * 3) as f64));
    }

    #[test]
    fn fib_request_is_capped() {
        let mut rng = BenchConfig::default().rng();
        let mut ctx = TrialContext {
            probe: Probe::timing_only(),
            rng: &mut rng,
        };
        let t = ops_trial(
            RecursiveFib::default()
                .run_once(&RunConfig::new(1, 10_000_000), &mut ctx)
                .unwrap(),
        );
        assert_eq!(t.checksum, Some(fib(FIB_MAX_N) as f64));
    }
}
