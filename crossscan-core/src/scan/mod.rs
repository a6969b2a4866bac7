//! The scan stages and the per-symbol pipeline that chains them.

pub mod breakout;
pub mod cross;
pub mod pipeline;
pub mod pullback;

pub use breakout::{is_breakout_bar, Breakout, BreakoutConfirmer};
pub use cross::{price_crossed, volume_crossed, Cross, CrossDetector};
pub use pipeline::{Pipeline, SymbolScan, SymbolState};
pub use pullback::{PullbackScanner, Touch};
