//! Statistics
//!
//! Message and node metrics of each run, and their mean across runs.

mod collector;
mod report;

pub use collector::StatsCollector;
pub use report::{
    CategoryStatistics, ComputerStatistics, MessageCategory, MessageStatistics,
    SimulationStatistics,
};
