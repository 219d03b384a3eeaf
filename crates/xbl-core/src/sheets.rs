// Raw spreadsheet tabs as written to disk by the fetch step.
//
// Each tab is stored as `<book>__<tab>.json` (the spreadsheet API's
// `{"range": ..., "values": [[...]]}` payload) or as a plain CSV export with
// the same stem. Spaces in tab names are percent-encoded, matching the URLs
// the fetch step requested.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("sheet {book}/{tab} not found in {dir}")]
    NotFound {
        book: String,
        tab: String,
        dir: PathBuf,
    },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid sheet JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

/// One spreadsheet tab: a header row followed by data rows. Rows may be
/// ragged because the API omits trailing empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ValuesPayload {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl Sheet {
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Parse the spreadsheet API payload. Non-string cells are stringified.
    pub fn from_json_reader<R: Read>(rdr: R) -> Result<Self, serde_json::Error> {
        let payload: ValuesPayload = serde_json::from_reader(rdr)?;
        let rows = payload
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        Ok(Self { rows })
    }

    /// Parse a CSV export. The header row is kept as row 0, like the JSON form.
    pub fn from_csv_reader<R: Read>(rdr: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(rdr);
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Every row after the header.
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Where sheets come from. Aggregation never fetches; it only asks a source
/// for tabs that have already been downloaded.
pub trait SheetSource {
    fn sheet(&self, book: &str, tab: &str) -> Result<Sheet, SheetError>;
}

/// Sheets stored as files in one directory.
#[derive(Debug, Clone)]
pub struct SheetStore {
    dir: PathBuf,
}

impl SheetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File stem for a tab, e.g. `XBL__Box%20Scores`.
    pub fn file_stem(book: &str, tab: &str) -> String {
        format!("{book}__{}", tab.replace(' ', "%20"))
    }
}

impl SheetSource for SheetStore {
    fn sheet(&self, book: &str, tab: &str) -> Result<Sheet, SheetError> {
        let stem = Self::file_stem(book, tab);

        let json_path = self.dir.join(format!("{stem}.json"));
        if json_path.is_file() {
            debug!("loading sheet {}", json_path.display());
            let file = std::fs::File::open(&json_path).map_err(|e| SheetError::Io {
                path: json_path.clone(),
                source: e,
            })?;
            return Sheet::from_json_reader(std::io::BufReader::new(file)).map_err(|e| {
                SheetError::Json {
                    path: json_path,
                    source: e,
                }
            });
        }

        let csv_path = self.dir.join(format!("{stem}.csv"));
        if csv_path.is_file() {
            debug!("loading sheet {}", csv_path.display());
            let file = std::fs::File::open(&csv_path).map_err(|e| SheetError::Io {
                path: csv_path.clone(),
                source: e,
            })?;
            return Sheet::from_csv_reader(file).map_err(|e| SheetError::Csv {
                path: csv_path,
                source: e,
            });
        }

        Err(SheetError::NotFound {
            book: book.to_string(),
            tab: tab.to_string(),
            dir: self.dir.clone(),
        })
    }
}

/// In-memory sheets keyed by `(book, tab)`.
#[derive(Debug, Clone, Default)]
pub struct MemorySheets {
    sheets: BTreeMap<(String, String), Sheet>,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, book: &str, tab: &str, sheet: Sheet) {
        self.sheets.insert((book.to_string(), tab.to_string()), sheet);
    }

    /// Builder-style `insert` taking string-slice rows.
    pub fn with(mut self, book: &str, tab: &str, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
        self.insert(book, tab, Sheet::from_rows(rows));
        self
    }
}

impl SheetSource for MemorySheets {
    fn sheet(&self, book: &str, tab: &str) -> Result<Sheet, SheetError> {
        self.sheets
            .get(&(book.to_string(), tab.to_string()))
            .cloned()
            .ok_or_else(|| SheetError::NotFound {
                book: book.to_string(),
                tab: tab.to_string(),
                dir: PathBuf::from("<memory>"),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn json_payload_with_ragged_rows() {
        let json = r#"{
            "range": "Standings!A1:Z100",
            "majorDimension": "ROWS",
            "values": [["Rank", "Team", "W"], ["1", "Bears", "10"], ["2", "Cats"]]
        }"#;
        let sheet = Sheet::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(sheet.rows().len(), 3);
        assert_eq!(sheet.data_rows().len(), 2);
        assert_eq!(sheet.data_rows()[1], vec!["2", "Cats"]);
    }

    #[test]
    fn json_non_string_cells_are_stringified() {
        let json = r#"{"values": [["h"], [1, 2.5, null, "x"]]}"#;
        let sheet = Sheet::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(sheet.data_rows()[0], vec!["1", "2.5", "", "x"]);
    }

    #[test]
    fn json_without_values_is_empty() {
        let sheet = Sheet::from_json_reader(r#"{"range": "A1:A1"}"#.as_bytes()).unwrap();
        assert!(sheet.rows().is_empty());
        assert!(sheet.data_rows().is_empty());
    }

    #[test]
    fn csv_export_keeps_header_and_allows_ragged_rows() {
        let csv_data = "Week,Away,AS,HS,Home\n1,Bears,5,3,Cats\n2,Cats,1\n";
        let sheet = Sheet::from_csv_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(sheet.rows()[0][0], "Week");
        assert_eq!(sheet.data_rows().len(), 2);
        assert_eq!(sheet.data_rows()[1].len(), 3);
    }

    #[test]
    fn file_stem_encodes_spaces() {
        assert_eq!(SheetStore::file_stem("XBL", "Box Scores"), "XBL__Box%20Scores");
        assert_eq!(
            SheetStore::file_stem("CAREER_STATS", "AA Head to Head"),
            "CAREER_STATS__AA%20Head%20to%20Head"
        );
    }

    #[test]
    fn store_prefers_json_then_csv() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("XBL__Standings.json"),
            r#"{"values": [["h"], ["json"]]}"#,
        )
        .unwrap();
        fs::write(tmp.path().join("XBL__Standings.csv"), "h\ncsv\n").unwrap();
        fs::write(tmp.path().join("XBL__Box%20Scores.csv"), "h\ncsv\n").unwrap();

        let store = SheetStore::new(tmp.path());
        assert_eq!(store.sheet("XBL", "Standings").unwrap().data_rows()[0][0], "json");
        assert_eq!(store.sheet("XBL", "Box Scores").unwrap().data_rows()[0][0], "csv");
    }

    #[test]
    fn store_missing_tab_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = SheetStore::new(tmp.path()).sheet("XBL", "Playoffs").unwrap_err();
        match err {
            SheetError::NotFound { book, tab, .. } => {
                assert_eq!(book, "XBL");
                assert_eq!(tab, "Playoffs");
            }
            other => panic!("expected NotFound, got: {other}"),
        }
    }

    #[test]
    fn store_bad_json_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("XBL__Standings.json"), "{not json").unwrap();
        let err = SheetStore::new(tmp.path()).sheet("XBL", "Standings").unwrap_err();
        assert!(matches!(err, SheetError::Json { .. }));
    }

    #[test]
    fn memory_sheets() {
        let sheets = MemorySheets::new().with("AA", "Standings", &[&["Rank"], &["1"]]);
        assert_eq!(sheets.sheet("AA", "Standings").unwrap().data_rows().len(), 1);
        assert!(sheets.sheet("AA", "Playoffs").is_err());
    }
}
