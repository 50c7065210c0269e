//! Exhaustive search for the discrete logarithm `x` such that `g^x = h mod p`.
//!
//! See [the notes on DLP](crate::notes::dlp) for the exponent space layout.

pub mod partition;
pub mod search;

pub use partition::partition;
pub use search::{CancelToken, Powers, ScanMode, Searcher, State};
