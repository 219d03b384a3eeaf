// Typed access to the cells of one ragged sheet row.

use xbl_core::SafeNum;

use crate::error::RowError;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Row<'a> {
    cells: &'a [String],
}

impl<'a> Row<'a> {
    pub(crate) fn new(cells: &'a [String]) -> Self {
        Self { cells }
    }

    /// Trimmed cell text; `None` when the cell is absent or blank.
    pub(crate) fn raw(&self, column: usize) -> Option<&'a str> {
        self.cells
            .get(column)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }

    /// Optional numeric cell. Absent, blank, or non-numeric cells are missing.
    pub(crate) fn num(&self, column: usize) -> SafeNum {
        self.raw(column).map_or(SafeNum::Missing, SafeNum::parse)
    }

    pub(crate) fn text(&self, column: usize, field: &'static str) -> Result<&'a str, RowError> {
        self.raw(column)
            .ok_or(RowError::MissingCell { field, column })
    }

    pub(crate) fn count(&self, column: usize, field: &'static str) -> Result<u32, RowError> {
        let text = self.text(column, field)?;
        match SafeNum::parse(text) {
            SafeNum::Int(v) => u32::try_from(v).map_err(|_| invalid(field, column, text)),
            _ => Err(invalid(field, column, text)),
        }
    }

    /// Signed integer; thousands separators (`1,024`) are accepted.
    pub(crate) fn int(&self, column: usize, field: &'static str) -> Result<i64, RowError> {
        let text = self.text(column, field)?;
        match SafeNum::parse(&text.replace(',', "")) {
            SafeNum::Int(v) => Ok(v),
            _ => Err(invalid(field, column, text)),
        }
    }

    pub(crate) fn real(&self, column: usize, field: &'static str) -> Result<f64, RowError> {
        let text = self.text(column, field)?;
        SafeNum::parse(text)
            .value()
            .ok_or_else(|| invalid(field, column, text))
    }
}

fn invalid(field: &'static str, column: usize, value: &str) -> RowError {
    RowError::InvalidCell {
        field,
        column,
        value: value.to_string(),
    }
}
