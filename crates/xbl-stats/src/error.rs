// Error types for sheet parsing and stat building.

use thiserror::Error;
use xbl_core::sheets::SheetError;

/// Fatal errors: a collaborator is missing, so aggregation cannot proceed.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("no sheet layout configured for league {0}")]
    UnknownLeague(String),
}

/// A single row that could not be turned into a record. Never fatal: the
/// caller logs it and moves on to the next row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("missing {field} (column {column})")]
    MissingCell { field: &'static str, column: usize },

    #[error("invalid {field} (column {column}): {value:?}")]
    InvalidCell {
        field: &'static str,
        column: usize,
        value: String,
    },
}
