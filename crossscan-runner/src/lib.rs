//! crossscan runner: universe scan orchestration, ranking, and export.
//!
//! This crate builds on `crossscan-core` to provide:
//! - TOML scan configuration
//! - Parallel per-symbol scanning on a bounded rayon pool, with a run deadline
//! - Skip accounting by reason
//! - Per-segment ranked signal, pending-cross, price-cross and volume-cross
//!   tables
//! - CSV tables and a JSON run manifest

pub mod config;
pub mod export;
pub mod progress;
pub mod ranking;
pub mod runner;

pub use config::{ConfigError, ScanConfig};
pub use export::{
    export_crosses_csv, export_signals_csv, export_single_crosses_csv, import_manifest,
    write_outputs, Manifest,
};
pub use progress::{LogProgress, NoProgress, ScanProgress};
pub use ranking::{CrossRow, RankedTables, SegmentTables, SignalRow, SingleCrossRow};
pub use runner::{
    run_scan, run_scan_from_config, scan_symbol, RunError, ScanReport, Skip, SkipReason,
    SymbolOutcome, SCHEMA_VERSION,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_is_send_sync() {
        assert_send::<ScanConfig>();
        assert_sync::<ScanConfig>();
    }

    #[test]
    fn report_is_send_sync() {
        assert_send::<ScanReport>();
        assert_sync::<ScanReport>();
        assert_send::<SymbolOutcome>();
        assert_sync::<SymbolOutcome>();
    }

    #[test]
    fn tables_are_send_sync() {
        assert_send::<RankedTables>();
        assert_sync::<RankedTables>();
        assert_send::<Manifest>();
        assert_sync::<Manifest>();
    }

    #[test]
    fn progress_reporters_are_send_sync() {
        assert_send::<LogProgress>();
        assert_sync::<LogProgress>();
        assert_send::<NoProgress>();
        assert_sync::<NoProgress>();
    }
}
