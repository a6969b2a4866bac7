//! Bar source trait and its error type.
//!
//! A `BarSource` hands back the full daily history for one symbol. Sources are
//! shared across worker threads, so implementations must be `Send + Sync`.

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::{Bar, Symbol};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no data for symbol {symbol}")]
    NotFound { symbol: Symbol },

    #[error("source unavailable for {symbol}: {reason}")]
    Unavailable { symbol: Symbol, reason: String },

    #[error("malformed data for {symbol}: {reason}")]
    Malformed { symbol: Symbol, reason: String },
}

impl SourceError {
    /// Only transient failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::Unavailable { .. })
    }

    pub fn symbol(&self) -> &Symbol {
        match self {
            SourceError::NotFound { symbol }
            | SourceError::Unavailable { symbol, .. }
            | SourceError::Malformed { symbol, .. } => symbol,
        }
    }
}

pub trait BarSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Daily bars for `symbol`, ascending by date as stored.
    fn fetch(&self, symbol: &Symbol) -> Result<Vec<Bar>, SourceError>;
}

impl<S: BarSource + ?Sized> BarSource for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, symbol: &Symbol) -> Result<Vec<Bar>, SourceError> {
        (**self).fetch(symbol)
    }
}

impl<S: BarSource + ?Sized> BarSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, symbol: &Symbol) -> Result<Vec<Bar>, SourceError> {
        (**self).fetch(symbol)
    }
}

/// Fixed in-memory bars, keyed by symbol. Used by tests and benchmarks.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    series: HashMap<Symbol, Vec<Bar>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<Symbol>, bars: Vec<Bar>) {
        self.series.insert(symbol.into(), bars);
    }

    pub fn with(mut self, symbol: impl Into<Symbol>, bars: Vec<Bar>) -> Self {
        self.insert(symbol, bars);
        self
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl BarSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(&self, symbol: &Symbol) -> Result<Vec<Bar>, SourceError> {
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                symbol: symbol.clone(),
            })
    }
}
