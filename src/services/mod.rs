pub mod aggregation;
pub mod providers;
pub mod ranking;
pub mod recommendations;

pub use aggregation::{ProfileAggregator, Sources};
pub use ranking::{Ranker, RankingError};
