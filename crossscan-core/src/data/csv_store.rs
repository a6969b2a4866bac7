//! Flat-file bar store.
//!
//! Layout: `{data_dir}/{SYMBOL}.csv` with header
//! `date,open,high,low,close,volume` and ISO dates.
//!
//! Rows are returned in file order. Ordering and value checks are left to
//! `Series::new` so a bad file surfaces as a `DataGap` or `MalformedBar`
//! skip rather than a read failure.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::provider::{BarSource, SourceError};
use crate::domain::{Bar, Symbol};

#[derive(Debug, Clone)]
pub struct CsvBarStore {
    data_dir: PathBuf,
}

impl CsvBarStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file holding `symbol`'s bars.
    pub fn path_for(&self, symbol: &Symbol) -> PathBuf {
        self.data_dir.join(format!("{symbol}.csv"))
    }

    /// Write `bars` for `symbol`, replacing any existing file.
    ///
    /// Writes go to a `.tmp` sibling first and are renamed into place.
    pub fn write(&self, symbol: &Symbol, bars: &[Bar]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.path_for(symbol);
        let tmp = path.with_extension("csv.tmp");

        let mut writer = csv::Writer::from_path(&tmp)?;
        for bar in bars {
            writer.serialize(bar)?;
        }
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp, &path)?;
        Ok(path)
    }
}

impl BarSource for CsvBarStore {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, symbol: &Symbol) -> Result<Vec<Bar>, SourceError> {
        let path = self.path_for(symbol);
        let mut reader = match csv::Reader::from_path(&path) {
            Ok(reader) => reader,
            Err(e) => {
                return Err(match e.kind() {
                    csv::ErrorKind::Io(io) if io.kind() == io::ErrorKind::NotFound => {
                        SourceError::NotFound {
                            symbol: symbol.clone(),
                        }
                    }
                    _ => SourceError::Unavailable {
                        symbol: symbol.clone(),
                        reason: format!("{}: {e}", path.display()),
                    },
                })
            }
        };

        reader
            .deserialize::<Bar>()
            .enumerate()
            .map(|(row, result)| {
                result.map_err(|e| match e.kind() {
                    csv::ErrorKind::Io(_) => SourceError::Unavailable {
                        symbol: symbol.clone(),
                        reason: e.to_string(),
                    },
                    _ => SourceError::Malformed {
                        symbol: symbol.clone(),
                        reason: format!("row {}: {e}", row + 1),
                    },
                })
            })
            .collect()
    }
}
