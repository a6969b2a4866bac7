//! crossscan CLI: scan a universe for golden-cross pullback signals.
//!
//! Commands:
//! - `scan`: run the pipeline over the universe, write tables and manifest
//! - `explain`: trace one symbol through every stage

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crossscan_core::data::{BarSource, CsvBarStore, RetryingSource, Universe};
use crossscan_core::{Pipeline, Segment, Series, Symbol, SymbolState};
use crossscan_runner::{run_scan_from_config, write_outputs, LogProgress, ScanConfig, ScanReport};

#[derive(Parser)]
#[command(
    name = "crossscan",
    about = "crossscan: golden-cross pullback equity scanner"
)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the universe and write ranked tables plus a run manifest.
    Scan {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbols per segment by market cap (0 = all).
        #[arg(long)]
        top_n: Option<usize>,

        /// Ignore bars after this date (YYYY-MM-DD).
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Directory of per-symbol CSV files.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Universe TOML file.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Output directory for tables and manifest.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Worker threads (0 = available parallelism).
        #[arg(long)]
        concurrency: Option<usize>,

        /// Stop starting new symbols after this many seconds (0 = no limit).
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Trace one symbol through every scan stage.
    Explain {
        symbol: String,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory of per-symbol CSV files.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Ignore bars after this date (YYYY-MM-DD).
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command {
        Commands::Scan {
            config,
            top_n,
            as_of,
            data_dir,
            universe,
            output_dir,
            concurrency,
            timeout_secs,
        } => {
            let mut cfg = load_config(config.as_ref())?;
            if let Some(n) = top_n {
                cfg.top_n = n;
            }
            if as_of.is_some() {
                cfg.as_of = as_of;
            }
            if let Some(dir) = data_dir {
                cfg.data_dir = dir;
            }
            if let Some(path) = universe {
                cfg.universe = path;
            }
            if let Some(dir) = output_dir {
                cfg.output_dir = dir;
            }
            if let Some(n) = concurrency {
                cfg.concurrency = n;
            }
            if let Some(secs) = timeout_secs {
                cfg.timeout_secs = secs;
            }
            cmd_scan(&cfg)
        }
        Commands::Explain {
            symbol,
            config,
            data_dir,
            as_of,
        } => {
            let mut cfg = load_config(config.as_ref())?;
            if let Some(dir) = data_dir {
                cfg.data_dir = dir;
            }
            if as_of.is_some() {
                cfg.as_of = as_of;
            }
            cmd_explain(&cfg, Symbol::new(symbol))
        }
    }
}

/// Logs go to stderr so stdout carries only command output.
fn init_logging(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ScanConfig> {
    match path {
        Some(p) => ScanConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(ScanConfig::default()),
    }
}

fn cmd_scan(cfg: &ScanConfig) -> Result<()> {
    cfg.validate()?;
    let report = run_scan_from_config(cfg, &LogProgress::default())?;
    let paths = write_outputs(&report, &cfg.output_dir)?;

    print_summary(&report);
    println!();
    for path in &paths {
        println!("  wrote {}", path.display());
    }
    Ok(())
}

fn print_summary(report: &ScanReport) {
    let tables = report.tables();
    println!(
        "Scanned {} of {} symbols in {} ms (as of {})",
        report.scans.len(),
        report.universe_size,
        report.elapsed_ms,
        report
            .as_of
            .map(|d| d.to_string())
            .unwrap_or_else(|| "latest".into()),
    );

    for seg in &tables.segments {
        println!();
        println!(
            "[{}] {} signal(s), {} pending cross(es), {} price / {} volume cross(es)",
            seg.label,
            seg.signals.len(),
            seg.crosses.len(),
            seg.price_crosses.len(),
            seg.volume_crosses.len()
        );
        for s in &seg.signals {
            println!(
                "  {:<10} cross {}  touch {}  signal {}  close {}",
                s.symbol, s.cross_date, s.touch_date, s.signal_date, s.signal_close
            );
        }
    }

    let skipped: Vec<String> = report
        .skip_counts()
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .map(|(reason, n)| format!("{reason}={n}"))
        .collect();
    if !skipped.is_empty() {
        println!();
        println!("Skipped: {}", skipped.join(", "));
    }
}

fn cmd_explain(cfg: &ScanConfig, symbol: Symbol) -> Result<()> {
    let pipeline = Pipeline::new(cfg.params)?;

    let segment = match Universe::from_file(&cfg.universe) {
        Ok(universe) => universe.segment_of(&symbol).unwrap_or(Segment::Primary),
        Err(e) => {
            tracing::warn!(error = %e, "universe unavailable, assuming primary segment");
            Segment::Primary
        }
    };

    let source = RetryingSource::new(CsvBarStore::new(&cfg.data_dir), cfg.retry);
    let bars = source.fetch(&symbol)?;
    let mut series = Series::new(symbol.clone(), segment, bars)
        .with_context(|| format!("{symbol} has invalid bars"))?;
    if let Some(date) = cfg.as_of {
        series = series.truncated(date);
    }
    let Some(last) = series.last() else {
        bail!("{symbol} has no bars on or before the cutoff");
    };

    let bars = series.bars();
    let indicators = pipeline.engine().compute(bars);
    let scan = pipeline.evaluate(&series);

    println!("{symbol} [{segment}]");
    println!("  bars         {} (last {} close {})", bars.len(), last.date, last.close);
    println!("  required     {}", cfg.params.min_history());

    match (indicators.points().first(), indicators.points().last()) {
        (Some(first), Some(latest)) => {
            println!("  indicators   {} .. {}", first.date, latest.date);
            println!(
                "  latest       price {} / {}  volume {} / {}",
                latest.fast_price_ma, latest.slow_price_ma, latest.fast_vol_ma, latest.slow_vol_ma
            );
        }
        _ => println!("  indicators   none"),
    }

    let describe = |c: Option<crossscan_core::scan::Cross>| {
        c.map(|c| format!("{} (bar {})", c.date, c.index))
            .unwrap_or_else(|| "none".into())
    };
    println!("  price cross  {}", describe(scan.price_cross));
    println!("  volume cross {}", describe(scan.volume_cross));
    println!("  both         {}", describe(scan.state.cross().copied()));

    if let Some(touch) = scan.state.touch() {
        println!(
            "  touch        {} (bar {}) close {} <= slow {}",
            touch.date, touch.index, touch.close, touch.slow_price_ma
        );
    }
    if let Some(breakout) = scan.state.breakout() {
        println!(
            "  breakout     {} (bar {}) close {}",
            breakout.date, breakout.index, breakout.close
        );
    }

    let state = match &scan.state {
        SymbolState::NoData { bars, required } => format!("no_data ({bars} of {required} bars)"),
        other => other.label().to_string(),
    };
    println!("  state        {state}");
    Ok(())
}
