//! Domain types for the cross scan.

pub mod bar;
pub mod events;
pub mod series;
pub mod symbol;

pub use bar::{Bar, BarError};
pub use events::{CrossEvent, Signal};
pub use series::{Series, SeriesError};
pub use symbol::{Segment, Symbol};
