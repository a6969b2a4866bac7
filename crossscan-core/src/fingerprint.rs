//! Run fingerprinting: content hashes for the scanned data and the scan
//! configuration.
//!
//! Both are BLAKE3 hex digests. The dataset hash is independent of the order
//! in which symbols finished, so parallel runs over the same files agree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Series;

/// Content hash of every series scanned in a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetHash(pub String);

/// Hash of the canonical JSON form of a configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigHash(pub String);

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digest of one series: symbol, segment and every bar field.
pub fn series_digest(series: &Series) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(series.symbol().as_str().as_bytes());
    hasher.update(&[0]);
    hasher.update(series.segment().as_str().as_bytes());
    for bar in series.bars() {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize()
}

/// Combine per-series digests. Order of `digests` does not matter.
pub fn dataset_hash(digests: impl IntoIterator<Item = blake3::Hash>) -> DatasetHash {
    let mut sorted: Vec<[u8; 32]> = digests.into_iter().map(|d| *d.as_bytes()).collect();
    sorted.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for digest in &sorted {
        hasher.update(digest);
    }
    DatasetHash(hasher.finalize().to_hex().to_string())
}

/// Hash of `value`'s JSON serialization.
///
/// Struct fields serialize in declaration order, so the JSON is canonical for
/// a given type.
pub fn config_hash<T: Serialize>(value: &T) -> Result<ConfigHash, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    Ok(ConfigHash(blake3::hash(json.as_bytes()).to_hex().to_string()))
}
