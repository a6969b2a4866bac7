use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque symbol token.
///
/// No provider format is assumed: "005930", "AAPL" and "BRK.B" are all just
/// strings compared byte-wise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Market segment (index board) a symbol is listed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    /// Large-cap index board.
    Primary,
    /// Secondary board.
    Secondary,
}

impl Segment {
    pub const ALL: [Segment; 2] = [Segment::Primary, Segment::Secondary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Primary => "primary",
            Segment::Secondary => "secondary",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
