// Path lookups into the aggregated output, e.g. `season XBL season_team_stats Bears ba`.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query is empty")]
    Empty,

    #[error("query must begin with either 'season' or 'career', not {0:?}")]
    InvalidRoot(String),

    #[error("query `{path}' cannot be found")]
    NotFound { path: String },
}

/// Walk `value` by `keys`. Object members are looked up by name; array
/// elements by index.
pub fn lookup<'a, S: AsRef<str>>(value: &'a Value, keys: &[S]) -> Option<&'a Value> {
    keys.iter().try_fold(value, |current, key| {
        let key = key.as_ref();
        match current {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    })
}

/// Resolve a full query path. `season` is the per-league season output and
/// `career` the career output; the rest of the path is walked with [`lookup`].
pub fn query<'a, S: AsRef<str>>(
    season: &'a Value,
    career: &'a Value,
    path: &[S],
) -> Result<&'a Value, QueryError> {
    let (root, rest) = path.split_first().ok_or(QueryError::Empty)?;
    let start = match root.as_ref() {
        "season" => season,
        "career" => career,
        other => return Err(QueryError::InvalidRoot(other.to_string())),
    };
    lookup(start, rest).ok_or_else(|| QueryError::NotFound {
        path: path.iter().map(|k| k.as_ref()).collect::<Vec<&str>>().join(", "),
    })
}
