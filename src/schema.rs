//! Canonical result schema.
//!
//! One [`AggregateResult`] per benchmark invocation:
//!
//! ```text
//! {
//!   "name": "Arithmetic",
//!   "runs": 5,
//!   "median_time_sec": 0.0123,
//!   "median_ops_per_sec": 812000.0,
//!   "raw": [ { "time_s": ..., "ops_per_sec": ... }, ... ]
//! }
//! ```
//!
//! Key names are shared with result files produced by other language
//! implementations of the same suite, so they are spelled out exactly here.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A numeric series a median can be taken over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    TimeS,
    OpsPerSec,
    PeakMemBytes,
    TotalTimeS,
    AvgThreadTimeS,
    PlusTimeS,
    JoinTimeS,
    WriteMbps,
    ReadMbps,
}

/// Counted-operations trial: compute, memory and most serialization
/// workloads.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OpsTrial {
    pub time_s: f64,
    /// Effective units of work executed, after safety-cap clamping.
    pub ops: u64,
    pub ops_per_sec: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_current_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_peak_bytes: Option<u64>,
    /// Sanity value derived from the work (accumulator, checksum, length).
    /// Never used for scoring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<f64>,
}

/// Separately timed write and read phases.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileIoTrial {
    pub write_time_s: f64,
    pub read_time_s: f64,
    #[serde(rename = "write_MBps")]
    pub write_mbps: f64,
    #[serde(rename = "read_MBps")]
    pub read_mbps: f64,
    pub size_mb: u64,
}

/// Work split across a pool of threads.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ThreadedTrial {
    /// Wall-clock from first dispatch to last completion.
    pub total_time_s: f64,
    pub avg_thread_time_s: f64,
    pub ops_per_s: f64,
    pub thread_times_s: Vec<f64>,
}

/// Two construction strategies timed back to back.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConcatTrial {
    pub plus_time_s: f64,
    pub join_time_s: f64,
    pub total_time_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_peak_bytes: Option<u64>,
    pub length_plus: u64,
    pub length_join: u64,
    pub ops_per_sec_plus: f64,
    pub ops_per_sec_join: f64,
}

/// Encode and decode timed separately; throughput is encoded bytes per
/// second over both phases.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CodecTrial {
    pub encode_s: f64,
    pub decode_s: f64,
    pub total_s: f64,
    pub ops_per_s: f64,
    pub encoded_bytes: u64,
}

/// One trial's measurements, one variant per metric category.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TrialRecord {
    Ops(OpsTrial),
    FileIo(FileIoTrial),
    Threaded(ThreadedTrial),
    Concat(ConcatTrial),
    Codec(CodecTrial),
}

impl TrialRecord {
    /// The trial's headline duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        match self {
            TrialRecord::Ops(t) => t.time_s,
            TrialRecord::FileIo(t) => t.write_time_s + t.read_time_s,
            TrialRecord::Threaded(t) => t.total_time_s,
            TrialRecord::Concat(t) => t.total_time_s,
            TrialRecord::Codec(t) => t.total_s,
        }
    }

    /// The trial's headline throughput.
    pub fn throughput(&self) -> f64 {
        match self {
            TrialRecord::Ops(t) => t.ops_per_sec,
            TrialRecord::FileIo(t) => t.write_mbps,
            TrialRecord::Threaded(t) => t.ops_per_s,
            TrialRecord::Concat(t) => t.ops_per_sec_plus,
            TrialRecord::Codec(t) => t.ops_per_s,
        }
    }

    /// Value of `metric` in this trial, if the category carries it and it
    /// was measured.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match (self, metric) {
            (TrialRecord::Ops(t), Metric::TimeS) => Some(t.time_s),
            (TrialRecord::Ops(t), Metric::OpsPerSec) => Some(t.ops_per_sec),
            (TrialRecord::Ops(t), Metric::PeakMemBytes) => t.mem_peak_bytes.map(|b| b as f64),

            (TrialRecord::FileIo(t), Metric::WriteMbps) => Some(t.write_mbps),
            (TrialRecord::FileIo(t), Metric::ReadMbps) => Some(t.read_mbps),
            (TrialRecord::FileIo(t), Metric::TimeS) => Some(t.write_time_s + t.read_time_s),

            (TrialRecord::Threaded(t), Metric::TotalTimeS | Metric::TimeS) => Some(t.total_time_s),
            (TrialRecord::Threaded(t), Metric::AvgThreadTimeS) => Some(t.avg_thread_time_s),
            (TrialRecord::Threaded(t), Metric::OpsPerSec) => Some(t.ops_per_s),

            (TrialRecord::Concat(t), Metric::TotalTimeS | Metric::TimeS) => Some(t.total_time_s),
            (TrialRecord::Concat(t), Metric::PlusTimeS) => Some(t.plus_time_s),
            (TrialRecord::Concat(t), Metric::JoinTimeS) => Some(t.join_time_s),
            (TrialRecord::Concat(t), Metric::PeakMemBytes) => t.mem_peak_bytes.map(|b| b as f64),

            (TrialRecord::Codec(t), Metric::TotalTimeS | Metric::TimeS) => Some(t.total_s),
            (TrialRecord::Codec(t), Metric::OpsPerSec) => Some(t.ops_per_s),

            _ => None,
        }
    }
}

/// A benchmark-level value written between `runs` and the medians, such as
/// the thread count of a concurrency benchmark.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub key: &'static str,
    pub value: u64,
}

/// Median of one metric across all trials.
#[derive(Clone, Debug, PartialEq)]
pub struct Median {
    /// Full output key, e.g. `median_ops_per_sec`.
    pub key: &'static str,
    pub value: f64,
}

/// Read-only view over one invocation's trials.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateResult {
    pub name: String,
    pub runs: usize,
    pub annotations: Vec<Annotation>,
    pub medians: Vec<Median>,
    /// Trials in execution order.
    pub raw: Vec<TrialRecord>,
}

impl AggregateResult {
    pub fn median(&self, key: &str) -> Option<f64> {
        self.medians.iter().find(|m| m.key == key).map(|m| m.value)
    }
}

impl Serialize for AggregateResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(
            3 + self.annotations.len() + self.medians.len(),
        ))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("runs", &self.runs)?;
        for a in &self.annotations {
            map.serialize_entry(a.key, &a.value)?;
        }
        for m in &self.medians {
            map.serialize_entry(m.key, &m.value)?;
        }
        map.serialize_entry("raw", &self.raw)?;
        map.end()
    }
}
