pub mod baseline;
pub mod completions;
pub mod export;
pub mod rank;
pub mod stats;
