//! Universe configuration: market-cap ranked listings per segment.
//!
//! Stored as TOML:
//!
//! ```toml
//! [labels]
//! primary = "KOSPI"
//! secondary = "KOSDAQ"
//!
//! [[primary]]
//! symbol = "005930"
//! name = "Samsung Electronics"
//! market_cap = 4.1e14
//!
//! [[secondary]]
//! symbol = "247540"
//! market_cap = 5.2e12
//! ```
//!
//! Selection ranks each segment by market cap descending (ties by symbol) and
//! keeps the top N.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Segment, Symbol};

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("symbol {0} is listed more than once")]
    DuplicateSymbol(Symbol),

    #[error("universe has no symbols to scan")]
    Empty,

    #[error("segment label {0:?} must be a plain file-name stem")]
    InvalidLabel(String),

    #[error("both segments are labelled {0:?}")]
    DuplicateLabel(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UniverseEntry {
    pub symbol: Symbol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub market_cap: f64,
}

/// Display labels for the two segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentLabels {
    pub primary: String,
    pub secondary: String,
}

impl Default for SegmentLabels {
    fn default() -> Self {
        Self {
            primary: Segment::Primary.as_str().to_string(),
            secondary: Segment::Secondary.as_str().to_string(),
        }
    }
}

impl SegmentLabels {
    pub fn get(&self, segment: Segment) -> &str {
        match segment {
            Segment::Primary => &self.primary,
            Segment::Secondary => &self.secondary,
        }
    }

    /// Labels name output files, so each must be a plain file-name stem and
    /// the two must differ (ignoring case).
    pub fn validate(&self) -> Result<(), UniverseError> {
        for label in [&self.primary, &self.secondary] {
            let plain = label
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'));
            if label.is_empty() || label.starts_with('.') || !plain {
                return Err(UniverseError::InvalidLabel(label.clone()));
            }
        }
        if self.primary.to_lowercase() == self.secondary.to_lowercase() {
            return Err(UniverseError::DuplicateLabel(self.secondary.clone()));
        }
        Ok(())
    }
}

/// A selected symbol with its rank inside its segment (1 = largest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub symbol: Symbol,
    pub segment: Segment,
    pub name: Option<String>,
    pub market_cap: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Universe {
    #[serde(default)]
    pub labels: SegmentLabels,
    #[serde(default)]
    pub primary: Vec<UniverseEntry>,
    #[serde(default)]
    pub secondary: Vec<UniverseEntry>,
}

impl Universe {
    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse, then check the labels and reject duplicate symbols across both
    /// segments.
    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        let universe: Self = toml::from_str(content)?;
        universe.labels.validate()?;
        universe.check_unique()?;
        Ok(universe)
    }

    pub fn entries(&self, segment: Segment) -> &[UniverseEntry] {
        match segment {
            Segment::Primary => &self.primary,
            Segment::Secondary => &self.secondary,
        }
    }

    pub fn symbol_count(&self) -> usize {
        self.primary.len() + self.secondary.len()
    }

    /// Segment a symbol is listed on.
    pub fn segment_of(&self, symbol: &Symbol) -> Option<Segment> {
        Segment::ALL
            .into_iter()
            .find(|&seg| self.entries(seg).iter().any(|e| &e.symbol == symbol))
    }

    /// Top `top_n` per segment by market cap (0 = all), primary first.
    ///
    /// Fails with `Empty` when nothing is selected.
    pub fn select(&self, top_n: usize) -> Result<Vec<Listing>, UniverseError> {
        let mut listings = Vec::new();
        for segment in Segment::ALL {
            let mut ranked: Vec<&UniverseEntry> = self.entries(segment).iter().collect();
            ranked.sort_by(|a, b| {
                b.market_cap
                    .total_cmp(&a.market_cap)
                    .then_with(|| a.symbol.cmp(&b.symbol))
            });
            let keep = if top_n == 0 { ranked.len() } else { top_n };

            listings.extend(ranked.into_iter().take(keep).enumerate().map(|(i, e)| Listing {
                symbol: e.symbol.clone(),
                segment,
                name: e.name.clone(),
                market_cap: e.market_cap,
                rank: i + 1,
            }));
        }

        if listings.is_empty() {
            return Err(UniverseError::Empty);
        }
        Ok(listings)
    }

    fn check_unique(&self) -> Result<(), UniverseError> {
        let mut seen = HashSet::new();
        for entry in self.primary.iter().chain(&self.secondary) {
            if !seen.insert(&entry.symbol) {
                return Err(UniverseError::DuplicateSymbol(entry.symbol.clone()));
            }
        }
        Ok(())
    }
}
