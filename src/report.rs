//! Result persistence and cross-run comparison.
//!
//! Each benchmark invocation is written as one standalone JSON file,
//! truncated and rewritten on every run. Comparison reads two directories of
//! such files (from this crate or any other implementation of the same
//! schema) and pairs them by file name.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;
use crate::schema::AggregateResult;

/// Ratio at which one side is declared the winner.
pub const WIN_RATIO: f64 = 1.2;

/// Throughput keys tried in order before falling back to the first median.
const HEADLINE_KEYS: [&str; 2] = ["median_ops_per_sec", "median_ops_per_s"];

pub fn to_json_pretty(result: &AggregateResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// `results_rust_<slug>.json`
pub fn result_file_name(slug: &str) -> String {
    format!("results_rust_{slug}.json")
}

/// Write `result` to `path`, replacing any previous file.
pub fn write_result(path: &Path, result: &AggregateResult) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_json_pretty(result)?)?;
    tracing::info!(path = %path.display(), benchmark = %result.name, "wrote result");
    Ok(())
}

/// The headline throughput of a result document. The fallback relies on
/// objects keeping their document key order.
pub fn headline_throughput(doc: &Value) -> Option<f64> {
    let obj = doc.as_object()?;
    HEADLINE_KEYS
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_f64))
        .or_else(|| {
            obj.iter()
                .find(|(k, _)| k.starts_with("median_"))
                .and_then(|(_, v)| v.as_f64())
        })
}

/// Strip a `results_<lang>_` prefix and the extension, leaving the benchmark
/// slug.
fn benchmark_key(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let rest = stem.strip_prefix("results_")?;
    let key = rest.split_once('_').map(|(_, slug)| slug).unwrap_or(rest);
    Some(key.to_string())
}

/// Headline throughput per benchmark slug for every result file under `dir`.
/// Unreadable or malformed files are skipped with a warning.
pub fn load_headlines(dir: &Path) -> Result<BTreeMap<String, f64>> {
    let mut out = BTreeMap::new();
    for entry in walkdir::WalkDir::new(dir).max_depth(1).follow_links(false) {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(key) = benchmark_key(path) else {
            continue;
        };
        match read_headline(path) {
            Some(ops) => {
                out.insert(key, ops);
            }
            None => tracing::warn!(path = %path.display(), "no headline throughput; skipping"),
        }
    }
    Ok(out)
}

fn read_headline(path: &Path) -> Option<f64> {
    let text = fs::read_to_string(path).ok()?;
    let doc: Value = serde_json::from_str(&text).ok()?;
    headline_throughput(&doc)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Verdict {
    /// Side A is faster by the given percentage.
    A(f64),
    /// Side B is faster by the given percentage.
    B(f64),
    Close,
    OnlyA,
    OnlyB,
    NoResults,
}

pub fn verdict(a: Option<f64>, b: Option<f64>) -> Verdict {
    match (a, b) {
        (None, None) => Verdict::NoResults,
        (Some(_), None) => Verdict::OnlyA,
        (None, Some(_)) => Verdict::OnlyB,
        (Some(a), Some(b)) => {
            if b > 0.0 && a / b >= WIN_RATIO {
                Verdict::A((a - b) / b * 100.0)
            } else if a > 0.0 && b / a >= WIN_RATIO {
                Verdict::B((b - a) / a * 100.0)
            } else {
                Verdict::Close
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonRow {
    pub benchmark: String,
    pub a: Option<f64>,
    pub b: Option<f64>,
    pub verdict: Verdict,
}

/// Pair the result files of two directories by benchmark slug.
pub fn compare_dirs(dir_a: &Path, dir_b: &Path) -> Result<Vec<ComparisonRow>> {
    let a = load_headlines(dir_a)?;
    let b = load_headlines(dir_b)?;
    let mut keys: Vec<&String> = a.keys().chain(b.keys()).collect();
    keys.sort();
    keys.dedup();

    Ok(keys
        .into_iter()
        .map(|k| {
            let (va, vb) = (a.get(k).copied(), b.get(k).copied());
            ComparisonRow {
                benchmark: k.clone(),
                a: va,
                b: vb,
                verdict: verdict(va, vb),
            }
        })
        .collect())
}

/// Render comparison rows as a plain-text table.
pub fn render_table(rows: &[ComparisonRow], label_a: &str, label_b: &str) -> String {
    let fmt = |v: Option<f64>| v.map(|x| format!("{x:.0}")).unwrap_or_else(|| "Missing".to_string());
    let rule = "=".repeat(72);

    let mut out = String::new();
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!(
        "{:<24} | {:<16} | {:<16} | Winner\n",
        "Category",
        format!("{label_a} (ops/s)"),
        format!("{label_b} (ops/s)")
    ));
    out.push_str(&rule);
    out.push('\n');
    for row in rows {
        let winner = match row.verdict {
            Verdict::A(pct) => format!("{label_a} ({pct:.1}% faster)"),
            Verdict::B(pct) => format!("{label_b} ({pct:.1}% faster)"),
            Verdict::Close => "Close".to_string(),
            Verdict::OnlyA => format!("{label_a} only"),
            Verdict::OnlyB => format!("{label_b} only"),
            Verdict::NoResults => "No results".to_string(),
        };
        out.push_str(&format!(
            "{:<24} | {:<16} | {:<16} | {}\n",
            row.benchmark,
            fmt(row.a),
            fmt(row.b),
            winner
        ));
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

/// Output path for a suite member.
pub fn suite_path(dir: &Path, slug: &str) -> PathBuf {
    dir.join(result_file_name(slug))
}
