use clap::{Parser, Subcommand, ValueEnum};
use crossbench::harness::{BenchConfig, HarnessOptions, Overrides, Profile};
use crossbench::report;
use crossbench::{Aggregator, AggregateResult, Knobs, TrackingAllocator, Workload};
use std::error::Error;
use std::path::PathBuf;

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

const DEFAULT_FILTER: &str = "crossbench=info";
const VERBOSE_FILTER: &str = "crossbench=debug";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Quick,
    Full,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Quick => Profile::Quick,
            ProfileArg::Full => Profile::Full,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one workload and emit its aggregate result.
    Run {
        #[arg(value_enum)]
        workload: Workload,

        /// Number of trials. Values below 1 are treated as 1.
        #[arg(long, allow_negative_numbers = true)]
        runs: Option<i64>,

        /// Workload size (operations, elements, or MB depending on the workload).
        #[arg(long, allow_negative_numbers = true)]
        iterations: Option<i64>,

        /// Worker count for the threading workload.
        #[arg(long)]
        threads: Option<usize>,

        /// Nesting depth for the JSON serialization workload.
        #[arg(long)]
        depth: Option<u32>,

        /// Where to write the JSON result. If omitted, prints to stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Run every workload in sequence.
    Suite {
        #[arg(long, allow_negative_numbers = true)]
        runs: Option<i64>,

        #[arg(long, allow_negative_numbers = true)]
        iterations: Option<i64>,

        /// Write one `results_rust_<workload>.json` per workload here.
        /// If omitted, prints a JSON array to stdout.
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },

    /// List workloads with their default run counts and sizes.
    List,

    /// Compare headline throughput across two result directories.
    Compare {
        #[arg(value_name = "DIR_A")]
        dir_a: PathBuf,

        #[arg(value_name = "DIR_B")]
        dir_b: PathBuf,

        #[arg(long, default_value = "A")]
        label_a: String,

        #[arg(long, default_value = "B")]
        label_b: String,
    },
}

#[derive(Parser, Debug)]
#[command(name = "crossbench")]
#[command(about = "Median-of-runs micro-benchmark harness (JSON output)")]
struct Args {
    #[arg(long, value_enum, default_value_t = ProfileArg::Full, global = true)]
    profile: ProfileArg,

    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    /// Disable allocation tracking; memory fields are omitted.
    #[arg(long, global = true)]
    no_memory: bool,

    /// Log every trial.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let builder = fmt().with_writer(std::io::stderr);
    let builder = match std::env::var("RUST_LOG")
        .ok()
        .and_then(|expr| EnvFilter::try_new(expr).ok())
    {
        Some(filter) => builder.with_env_filter(filter),
        None => builder.with_env_filter(default),
    };
    let _ = builder.try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let cfg = BenchConfig {
        profile: args.profile.into(),
        seed: args.seed,
    };
    let options = HarnessOptions {
        track_memory: !args.no_memory,
    };

    match &args.cmd {
        Command::Run {
            workload,
            runs,
            iterations,
            threads,
            depth,
            out,
        } => {
            let knobs = Knobs {
                threads: *threads,
                depth: *depth,
            };
            let mut bench = workload.build(knobs)?;
            let mut aggregator = Aggregator::new(cfg, options);
            let result = aggregator.run(
                bench.as_mut(),
                Overrides {
                    runs: *runs,
                    iterations: *iterations,
                },
            )?;
            // Serialized only after every trial succeeded.
            match out {
                Some(path) => report::write_result(path, &result)?,
                None => println!("{}", report::to_json_pretty(&result)?),
            }
        }
        Command::Suite {
            runs,
            iterations,
            out_dir,
        } => {
            let overrides = Overrides {
                runs: *runs,
                iterations: *iterations,
            };
            let mut aggregator = Aggregator::new(cfg, options);
            let mut results: Vec<AggregateResult> = Vec::with_capacity(Workload::ALL.len());
            for workload in Workload::ALL {
                let mut bench = workload.build(Knobs::default())?;
                let result = aggregator.run(bench.as_mut(), overrides)?;
                if let Some(dir) = out_dir {
                    report::write_result(&report::suite_path(dir, workload.slug()), &result)?;
                } else {
                    results.push(result);
                }
            }
            if out_dir.is_none() {
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
        }
        Command::List => {
            for workload in Workload::ALL {
                let bench = workload.build(Knobs::default())?;
                let defaults = bench.default_config();
                println!(
                    "{:<20} {:<28} runs={:<3} iterations={}",
                    workload.slug(),
                    bench.name(),
                    defaults.runs,
                    cfg.profile.scale(defaults.iterations)
                );
            }
        }
        Command::Compare {
            dir_a,
            dir_b,
            label_a,
            label_b,
        } => {
            let rows = report::compare_dirs(dir_a, dir_b)?;
            print!("{}", report::render_table(&rows, label_a, label_b));
        }
    }

    Ok(())
}
