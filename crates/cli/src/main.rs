//! Set-associative cache model CLI.
//!
//! This binary runs the reference scenario against a configurable cache. It performs:
//! 1. **Setup:** Build the cache from a JSON config and command-line overrides, then reset it.
//! 2. **Fuzz run:** Run the seeded harness and print its report tree.
//! 3. **Dump:** Flush the dirty lines left behind, then flush again to show nothing remains.
//!
//! Exits with code 0 when the harness passes and 1 otherwise.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use std::{fs, process};

use clap::{ArgAction, Parser, ValueEnum};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use waycache_core::config::{Config, ReplacementPolicy, WriteBackKind};
use waycache_core::core::{policies, writeback};
use waycache_core::{Bulk, Cache, CacheBuilder, CacheError, CacheTest, Verdict};

#[derive(Parser, Debug)]
#[command(
    name = "waycache",
    author,
    version,
    about = "Set-associative cache model",
    long_about = "Build a cache, fuzz it with a seeded write/read/replace run and dump the dirty lines.\n\nWithout options the reference geometry is used: 48-bit addresses, 4 sets, 2-byte lines, 2 ways.\n\nExamples:\n  waycache\n  waycache --ways 4 --index-bits 3 --policy lru --seed 42\n  waycache --writeback discard --stats\n  waycache --config cache.json -v"
)]
struct Cli {
    /// JSON configuration file; command-line options override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address width in bits.
    #[arg(long)]
    address_bits: Option<u32>,

    /// Block offset width in bits.
    #[arg(long)]
    offset_bits: Option<u32>,

    /// Set index width in bits.
    #[arg(long)]
    index_bits: Option<u32>,

    /// Associativity (power of two).
    #[arg(short, long)]
    ways: Option<usize>,

    /// Replacement policy.
    #[arg(short, long, value_enum)]
    policy: Option<PolicyArg>,

    /// Where flushed lines go.
    #[arg(short = 'f', long, value_enum)]
    writeback: Option<WriteBackArg>,

    /// Harness seed; defaults to the current time.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print statistics after the run.
    #[arg(long)]
    stats: bool,

    /// Suppress the report and the flush dump.
    #[arg(short, long)]
    quiet: bool,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Replacement policies selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    Refcount,
    Lru,
    Mru,
    Fifo,
    Plru,
    Random,
}

impl From<PolicyArg> for ReplacementPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Refcount => Self::RefCount,
            PolicyArg::Lru => Self::Lru,
            PolicyArg::Mru => Self::Mru,
            PolicyArg::Fifo => Self::Fifo,
            PolicyArg::Plru => Self::Plru,
            PolicyArg::Random => Self::Random,
        }
    }
}

/// Write-back sinks selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum WriteBackArg {
    Dump,
    Memory,
    Discard,
}

impl From<WriteBackArg> for WriteBackKind {
    fn from(arg: WriteBackArg) -> Self {
        match arg {
            WriteBackArg::Dump => Self::Dump,
            WriteBackArg::Memory => Self::Memory,
            WriteBackArg::Discard => Self::Discard,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(Verdict::Passed) => {}
        Ok(verdict) => {
            debug!(?verdict, "harness did not pass");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Installs a stderr subscriber; `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Loads the configuration file, if any, and applies the command-line overrides.
fn load_config(cli: &Cli) -> Result<Config, CacheError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };

    let cache = &mut config.cache;
    if let Some(bits) = cli.address_bits {
        cache.address_bits = bits;
    }
    if let Some(bits) = cli.offset_bits {
        cache.offset_bits = bits;
    }
    if let Some(bits) = cli.index_bits {
        cache.index_bits = bits;
    }
    if let Some(ways) = cli.ways {
        cache.ways = ways;
    }
    if let Some(policy) = cli.policy {
        cache.policy = policy.into();
    }
    if let Some(writeback) = cli.writeback {
        cache.writeback = writeback.into();
    }
    if cli.seed.is_some() {
        config.harness.seed = cli.seed;
    }
    if cli.quiet {
        config.harness.report = false;
        if config.cache.writeback == WriteBackKind::Dump {
            config.cache.writeback = WriteBackKind::Discard;
        }
    }

    Ok(config)
}

/// Runs the reference scenario: reset, flush, fuzz, dump flush, empty flush, teardown.
fn run(cli: &Cli) -> Result<Verdict, CacheError> {
    let config = load_config(cli)?;
    let geometry = config.cache.geometry()?;
    let seed = config.harness.seed.unwrap_or_else(clock_seed);

    if !cli.quiet {
        println!(
            "HEADER: {} BYTES, {} BITS",
            geometry.header_bytes(),
            geometry.tag_bits() + 8
        );
    }

    let policy = policies::build(
        config.cache.policy,
        &geometry,
        config.cache.random_seed.unwrap_or(seed),
    );
    let sink = writeback::build(config.cache.writeback);
    let mut cache = CacheBuilder::new(geometry, policy, sink).build_boxed()?;

    settle(cache.reset_all()?, "reset");
    settle(cache.flush_all()?, "flush");

    let mut test = CacheTest::new(&geometry, seed);
    let mut stdout = io::stdout();
    let report = config
        .harness
        .report
        .then_some(&mut stdout as &mut dyn Write);
    let verdict = test.run(&mut *cache, report)?;

    settle(cache.flush_all()?, "flush");
    settle(cache.flush_all()?, "flush");
    stdout.flush()?;

    if cli.stats {
        cache.stats().print();
    }

    let released = Cache::destroy(Some(cache));
    debug!(?released, seed, "done");
    Ok(verdict)
}

/// The supplied policies and sinks never yield; a suspension here is only reported.
fn settle(bulk: Bulk, op: &str) {
    if bulk == Bulk::Suspended {
        warn!(op, "bulk operation left pending");
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
