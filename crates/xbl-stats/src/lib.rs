// Aggregation of league spreadsheets into season and career stats.
//
// Sheet rows become `GameResult`s (`game`), which fold into per-entity
// accumulators and derived rate stats (`aggregate`). `season` and `career`
// put the pieces together for the output files.

pub mod aggregate;
pub mod career;
pub mod error;
pub mod game;
pub mod query;
pub mod roster;
pub mod season;
pub mod standings;

mod row;

pub use career::{build_career_stats, CareerStats};
pub use error::{RowError, StatsError};
pub use game::{GameResult, Phase, Side, Stage};
pub use season::{build_season_stats, SeasonStats};
