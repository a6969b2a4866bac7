//! Series: the validated bar history of one symbol.

use chrono::NaiveDate;
use thiserror::Error;

use super::{Bar, BarError, Segment, Symbol};

/// Bars for one symbol, ascending by date with no duplicates.
///
/// The constructor is the only way in, so every `Series` in the system has
/// already passed bar validation and the strict date ordering check.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    symbol: Symbol,
    segment: Segment,
    bars: Vec<Bar>,
}

impl Series {
    pub fn new(symbol: Symbol, segment: Segment, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            bar.validate().map_err(|source| SeriesError::MalformedBar {
                index,
                date: bar.date,
                source,
            })?;
        }

        if let Some(index) = bars.windows(2).position(|w| w[1].date <= w[0].date) {
            return Err(SeriesError::DataGap {
                index: index + 1,
                previous: bars[index].date,
                date: bars[index + 1].date,
            });
        }

        Ok(Self {
            symbol,
            segment,
            bars,
        })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn segment(&self) -> Segment {
        self.segment
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Drop every bar dated after `as_of`.
    pub fn truncated(mut self, as_of: NaiveDate) -> Self {
        let keep = self.bars.partition_point(|bar| bar.date <= as_of);
        self.bars.truncate(keep);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("bar {index} ({date}) is malformed: {source}")]
    MalformedBar {
        index: usize,
        date: NaiveDate,
        #[source]
        source: BarError,
    },

    #[error("dates not strictly increasing at bar {index}: {previous} then {date}")]
    DataGap {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },
}
