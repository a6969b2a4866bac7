//! crossscan core: domain types, indicators and the golden-cross pullback
//! scan.
//!
//! - Domain types (bars, validated series, symbols, segments, events)
//! - Simple moving averages of close and volume
//! - The per-symbol stage chain: cross → pullback touch → breakout
//! - Data sources (CSV store, retry wrapper) and the ranked universe
//! - BLAKE3 fingerprints for data and configuration

pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod indicators;
pub mod params;
pub mod scan;

pub use domain::{Bar, BarError, CrossEvent, Segment, Series, SeriesError, Signal, Symbol};
pub use params::{ParamError, ScanParams};
pub use scan::{Pipeline, SymbolScan, SymbolState};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn domain_types_are_send_sync() {
        assert_send::<Bar>();
        assert_sync::<Bar>();
        assert_send::<Series>();
        assert_sync::<Series>();
        assert_send::<Signal>();
        assert_sync::<Signal>();
    }

    #[test]
    fn pipeline_is_send_sync() {
        assert_send::<Pipeline>();
        assert_sync::<Pipeline>();
        assert_send::<SymbolScan>();
        assert_sync::<SymbolScan>();
    }

    #[test]
    fn sources_are_send_sync() {
        assert_send::<data::CsvBarStore>();
        assert_sync::<data::CsvBarStore>();
        assert_send::<data::RetryingSource<data::CsvBarStore>>();
        assert_sync::<data::RetryingSource<data::CsvBarStore>>();
        assert_send::<data::SourceError>();
        assert_sync::<data::SourceError>();
    }
}
