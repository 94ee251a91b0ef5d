use clap::ValueEnum;

pub mod aggregate;
pub mod alloc;
pub mod benches;
pub mod error;
pub mod harness;
pub mod report;
pub mod schema;

pub use aggregate::{Aggregator, Benchmark, NoopQuiesce, Quiesce, TrialContext};
pub use alloc::TrackingAllocator;
pub use error::{BenchError, Result};
pub use harness::{BenchConfig, HarnessOptions, Overrides, Probe, Profile, RunConfig, UNBOUNDED};
pub use schema::{AggregateResult, Metric, TrialRecord};

use benches::{arithmetic, compute, file_io, memory, serialization, strings, threading};

/// Workload to benchmark.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum Workload {
    /// Integer and floating-point accumulation loop.
    Arithmetic,
    /// Branch-heavy control flow.
    LogicControl,
    /// Naive recursive Fibonacci.
    RecursiveFib,
    /// Random integer generation and sort.
    Sorting,
    /// Naive dense matrix product.
    Matrix,
    /// Arithmetic, recursion, search and a JSON file round-trip.
    AlgorithmicMix,
    /// Append/reverse/replace/find on a growing string.
    StringOps,
    /// Per-character append versus join.
    StringConcat,
    /// Vec append, insert, delete and random access.
    ListOps,
    /// Sequential write, shuffled read-back.
    MemoryAccess,
    /// Fixed-document JSON decode and re-encode.
    Serialization,
    /// Nested-document JSON encode and decode.
    JsonSerialization,
    /// zlib compress and decompress.
    Compression,
    /// Sequential file write and read.
    FileIo,
    /// CPU work split across a thread pool.
    Threading,
}

/// Workload-specific knobs that have no generic `iterations` mapping.
#[derive(Clone, Copy, Debug, Default)]
pub struct Knobs {
    pub threads: Option<usize>,
    pub depth: Option<u32>,
}

impl Workload {
    pub const ALL: [Workload; 15] = [
        Workload::Arithmetic,
        Workload::LogicControl,
        Workload::RecursiveFib,
        Workload::Sorting,
        Workload::Matrix,
        Workload::AlgorithmicMix,
        Workload::StringOps,
        Workload::StringConcat,
        Workload::ListOps,
        Workload::MemoryAccess,
        Workload::Serialization,
        Workload::JsonSerialization,
        Workload::Compression,
        Workload::FileIo,
        Workload::Threading,
    ];

    /// Stable identifier used for result file names. Matches the script
    /// names of the other language suites so `compare` can pair them.
    pub fn slug(&self) -> &'static str {
        match self {
            Workload::Arithmetic => "arithmetic",
            Workload::LogicControl => "logic_control",
            Workload::RecursiveFib => "recursive_fib",
            Workload::Sorting => "sorting_benchmark",
            Workload::Matrix => "matrix_multiplication_test",
            Workload::AlgorithmicMix => "algorithmic_mix_test",
            Workload::StringOps => "string_ops",
            Workload::StringConcat => "string_concat",
            Workload::ListOps => "list_ops",
            Workload::MemoryAccess => "memory_access",
            Workload::Serialization => "serialization_test",
            Workload::JsonSerialization => "json_serialization_test",
            Workload::Compression => "compression_test",
            Workload::FileIo => "file_io",
            Workload::Threading => "threading_test",
        }
    }

    /// Construct the benchmark with its default configuration.
    pub fn build(&self, knobs: Knobs) -> Result<Box<dyn Benchmark>> {
        let bench: Box<dyn Benchmark> = match self {
            Workload::Arithmetic => Box::new(arithmetic::Arithmetic::default()),
            Workload::LogicControl => Box::new(arithmetic::LogicControl::default()),
            Workload::RecursiveFib => Box::new(arithmetic::RecursiveFib::default()),
            Workload::Sorting => Box::new(compute::Sorting::default()),
            Workload::Matrix => Box::new(compute::MatrixMultiplication::default()),
            Workload::AlgorithmicMix => Box::new(compute::AlgorithmicMix::default()),
            Workload::StringOps => Box::new(strings::StringOps::default()),
            Workload::StringConcat => Box::new(strings::StringConcat::default()),
            Workload::ListOps => Box::new(memory::ListOps::default()),
            Workload::MemoryAccess => Box::new(memory::MemoryAccess::default()),
            Workload::Serialization => Box::new(serialization::Serialization::new(1_000, 3)?),
            Workload::JsonSerialization => {
                let mut bench = serialization::JsonSerialization::default();
                if let Some(depth) = knobs.depth {
                    bench.depth = depth;
                }
                Box::new(bench)
            }
            Workload::Compression => Box::new(serialization::Compression::default()),
            Workload::FileIo => Box::new(file_io::FileIo::default()),
            Workload::Threading => {
                let mut bench = threading::Threading::default();
                if let Some(threads) = knobs.threads {
                    bench.threads = threads;
                }
                Box::new(bench)
            }
        };
        Ok(bench)
    }
}
