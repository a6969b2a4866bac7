//! Data layer: where bars and the symbol universe come from.
//!
//! `BarSource` is the seam between the scan and storage. The scan only ever
//! sees `Vec<Bar>`; validation into a `Series` happens in the runner so a bad
//! file becomes a skip, not an abort.

pub mod csv_store;
pub mod provider;
pub mod retry;
pub mod universe;

pub use csv_store::CsvBarStore;
pub use provider::{BarSource, InMemorySource, SourceError};
pub use retry::{RetryPolicy, RetryingSource};
pub use universe::{Listing, Universe, UniverseEntry, UniverseError};
