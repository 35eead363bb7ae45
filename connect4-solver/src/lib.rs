//! Connect Four solver: exhaustive memoized negamax over packed boards.

pub mod engine;
pub mod error;
pub mod stats;

pub use engine::{Recommendation, SearchContext, SearchEngine};
pub use error::SearchError;
pub use stats::SearchStats;
