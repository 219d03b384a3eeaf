// Game results parsed from the box-score, playoffs, and head-to-head tabs.
//
// Box-score sheet layout (regular season, with error columns):
//   0 week | 1 away | 2 away score | 3 home score | 4 home | 5 away E | 6 home E
//   | 7 innings | 8..=14 away AB R H HR RBI BB SO | 15..=21 home AB R H HR RBI BB SO
// Playoff sheets put the round name in column 0 and have no error columns, so
// everything from innings on sits two columns to the left.
//
// Head-to-head sheet layout:
//   0 season | 1 week or round | 2 away player | 4 away score | 5 home score
//   | 7 home player | 8 away E | 9 home E | 10 innings | 11..=17 away line
//   | 18..=24 home line

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use xbl_core::config::LeagueLayout;
use xbl_core::sheets::Sheet;
use xbl_core::SafeNum;

use crate::error::RowError;
use crate::row::Row;

/// Games of this many innings or fewer ended early on the run rule.
pub const RUN_RULE_MAX_INNINGS: f64 = 8.0;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Away,
    Home,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Away => Side::Home,
            Side::Home => Side::Away,
        }
    }
}

/// Regular season or playoffs; decides which sheet layout applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    RegularSeason,
    Playoffs,
}

/// One side's counting stats for a single game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingLine {
    pub ab: u32,
    pub r: u32,
    pub h: u32,
    pub hr: u32,
    pub rbi: u32,
    pub bb: u32,
    pub so: u32,
    /// Fielding errors. Missing where the sheet has no error columns.
    pub e: SafeNum,
}

/// Per-side box score. Either the whole block is present or none of it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxScore {
    pub away: BattingLine,
    pub home: BattingLine,
}

impl BoxScore {
    pub fn line(&self, side: Side) -> &BattingLine {
        match side {
            Side::Away => &self.away,
            Side::Home => &self.home,
        }
    }
}

/// When the game was played: a regular-season week or a playoff round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Week(u32),
    Round(String),
}

/// One completed game between two teams or two players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub away: String,
    pub home: String,
    pub away_score: u32,
    pub home_score: u32,
    /// Innings played. Head-to-head logs sometimes leave this blank.
    pub innings: Option<f64>,
    pub run_rule: bool,
    pub winner: String,
    #[serde(flatten)]
    pub stage: Stage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    pub box_score: Option<BoxScore>,
}

impl GameResult {
    /// Build a result, deriving `winner` and `run_rule`. Ties go to the home
    /// side; the sheets never record them.
    pub fn new(
        away: impl Into<String>,
        home: impl Into<String>,
        away_score: u32,
        home_score: u32,
        innings: Option<f64>,
        stage: Stage,
    ) -> Self {
        let away = away.into();
        let home = home.into();
        let winner = if away_score > home_score {
            away.clone()
        } else {
            home.clone()
        };
        Self {
            away,
            home,
            away_score,
            home_score,
            innings,
            run_rule: innings.is_some_and(|i| i <= RUN_RULE_MAX_INNINGS),
            winner,
            stage,
            season: None,
            box_score: None,
        }
    }

    pub fn with_box_score(mut self, box_score: BoxScore) -> Self {
        self.box_score = Some(box_score);
        self
    }

    pub fn with_season(mut self, season: impl Into<String>) -> Self {
        self.season = Some(season.into());
        self
    }

    pub fn id(&self, side: Side) -> &str {
        match side {
            Side::Away => &self.away,
            Side::Home => &self.home,
        }
    }

    pub fn winning_side(&self) -> Side {
        if self.away_score > self.home_score {
            Side::Away
        } else {
            Side::Home
        }
    }

    pub fn round(&self) -> Option<&str> {
        match &self.stage {
            Stage::Round(round) => Some(round),
            Stage::Week(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Column maps
// ---------------------------------------------------------------------------

struct Columns {
    stage: usize,
    away: usize,
    away_score: usize,
    home_score: usize,
    home: usize,
    errors: Option<(usize, usize)>,
    innings: usize,
    /// First column of the away line; the home line follows directly.
    lines: usize,
    innings_required: bool,
    season: Option<usize>,
}

/// Counting columns of a batting line, in sheet order.
const LINE_FIELDS: [&str; 7] = ["ab", "r", "h", "hr", "rbi", "bb", "so"];

fn box_score_columns(phase: Phase, layout: &LeagueLayout) -> Columns {
    let errors = phase == Phase::RegularSeason && layout.box_score_errors;
    let shift = if errors { 2 } else { 0 };
    Columns {
        stage: 0,
        away: 1,
        away_score: 2,
        home_score: 3,
        home: 4,
        errors: errors.then_some((5, 6)),
        innings: 5 + shift,
        lines: 6 + shift,
        innings_required: true,
        season: None,
    }
}

fn head_to_head_columns(phase: Phase) -> Columns {
    Columns {
        stage: 1,
        away: 2,
        away_score: 4,
        home_score: 5,
        home: 7,
        errors: (phase == Phase::RegularSeason).then_some((8, 9)),
        innings: 10,
        lines: 11,
        innings_required: false,
        season: Some(0),
    }
}

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

fn parse_stage(row: &Row<'_>, column: usize, phase: Phase) -> Result<Stage, RowError> {
    match phase {
        Phase::RegularSeason => Ok(Stage::Week(row.count(column, "week")?)),
        Phase::Playoffs => Ok(Stage::Round(row.text(column, "round")?.to_string())),
    }
}

fn parse_line(row: &Row<'_>, start: usize, e: Option<usize>) -> Result<BattingLine, RowError> {
    let mut counts = [0u32; 7];
    for (i, field) in LINE_FIELDS.into_iter().enumerate() {
        counts[i] = row.count(start + i, field)?;
    }
    let e = match e {
        Some(column) => match row.raw(column) {
            None => SafeNum::Missing,
            Some(text) => {
                let e = SafeNum::parse(text);
                if e.as_count().is_none() {
                    return Err(RowError::InvalidCell {
                        field: "e",
                        column,
                        value: text.to_string(),
                    });
                }
                e
            }
        },
        None => SafeNum::Missing,
    };
    let [ab, r, h, hr, rbi, bb, so] = counts;
    Ok(BattingLine { ab, r, h, hr, rbi, bb, so, e })
}

/// The optional stats block. A blank away at-bat cell means the box score
/// was never recorded (`Ok(None)`); any other gap or bad value is an error
/// that drops the whole block.
fn parse_box_score(row: &Row<'_>, cols: &Columns) -> Result<Option<BoxScore>, RowError> {
    if row.raw(cols.lines).is_none() {
        return Ok(None);
    }
    let (away_e, home_e) = cols.errors.unzip();
    let away = parse_line(row, cols.lines, away_e)?;
    let home = parse_line(row, cols.lines + LINE_FIELDS.len(), home_e)?;
    Ok(Some(BoxScore { away, home }))
}

fn parse_game(cells: &[String], cols: &Columns, phase: Phase) -> Result<GameResult, RowError> {
    let row = Row::new(cells);

    let stage = parse_stage(&row, cols.stage, phase)?;
    let away = row.text(cols.away, "away")?;
    let home = row.text(cols.home, "home")?;
    let away_score = row.count(cols.away_score, "away score")?;
    let home_score = row.count(cols.home_score, "home score")?;
    let innings = if cols.innings_required {
        Some(row.real(cols.innings, "innings")?)
    } else {
        row.num(cols.innings).value()
    };

    let mut game = GameResult::new(away, home, away_score, home_score, innings, stage);
    if let Some(column) = cols.season {
        game = game.with_season(row.text(column, "season")?);
    }

    match parse_box_score(&row, cols) {
        Ok(Some(box_score)) => game = game.with_box_score(box_score),
        Ok(None) => {}
        Err(e) => warn!(
            "dropping box score for {} @ {}: {}",
            game.away, game.home, e
        ),
    }

    Ok(game)
}

fn parse_rows(sheet: &Sheet, cols: &Columns, phase: Phase, label: &str) -> Vec<GameResult> {
    let mut games = Vec::new();
    for (i, cells) in sheet.data_rows().iter().enumerate() {
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        match parse_game(cells, cols, phase) {
            Ok(game) => games.push(game),
            // +2: one for the header, one for 1-based sheet rows
            Err(e) => warn!("skipping malformed {} row {}: {}", label, i + 2, e),
        }
    }
    debug!("parsed {} games from {}", games.len(), label);
    games
}

/// Parse a league's `Box Scores` (regular season) or `Playoffs` tab.
pub fn parse_box_score_sheet(sheet: &Sheet, phase: Phase, layout: &LeagueLayout) -> Vec<GameResult> {
    let label = match phase {
        Phase::RegularSeason => "box score",
        Phase::Playoffs => "playoffs",
    };
    parse_rows(sheet, &box_score_columns(phase, layout), phase, label)
}

/// Parse a career `Head to Head` tab.
pub fn parse_head_to_head_sheet(sheet: &Sheet, phase: Phase) -> Vec<GameResult> {
    parse_rows(sheet, &head_to_head_columns(phase), phase, "head-to-head")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[&str]]) -> Sheet {
        Sheet::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    const HEADER: &[&str] = &["Week", "Away", "AS", "HS", "Home"];

    // -- Regular season box scores --

    #[test]
    fn regular_season_row_with_box_score() {
        let s = sheet(&[
            HEADER,
            &[
                "3", "Bears", "10", "2", "Cats", "1", "0", "7", "30", "10", "10", "2", "9", "4", "5",
                "28", "2", "6", "0", "2", "1", "8",
            ],
        ]);
        let games = parse_box_score_sheet(&s, Phase::RegularSeason, &LeagueLayout::default());
        assert_eq!(games.len(), 1);

        let g = &games[0];
        assert_eq!(g.stage, Stage::Week(3));
        assert_eq!(g.winner, "Bears");
        assert_eq!(g.winning_side(), Side::Away);
        assert!(g.run_rule);
        assert_eq!(g.innings, Some(7.0));

        let bs = g.box_score.as_ref().unwrap();
        assert_eq!(bs.away.ab, 30);
        assert_eq!(bs.away.h, 10);
        assert_eq!(bs.away.hr, 2);
        assert_eq!(bs.away.so, 5);
        assert_eq!(bs.away.e, 1_i64);
        assert_eq!(bs.home.ab, 28);
        assert_eq!(bs.home.so, 8);
        assert_eq!(bs.home.e, 0_i64);
    }

    #[test]
    fn missing_at_bats_means_no_box_score() {
        let s = sheet(&[HEADER, &["1", "Bears", "3", "4", "Cats", "0", "1", "9"]]);
        let games = parse_box_score_sheet(&s, Phase::RegularSeason, &LeagueLayout::default());
        assert_eq!(games.len(), 1);
        assert!(games[0].box_score.is_none());
        assert_eq!(games[0].winner, "Cats");
        assert!(!games[0].run_rule);
    }

    #[test]
    fn partial_box_score_is_dropped_but_game_kept() {
        // home line stops after AB
        let s = sheet(&[
            HEADER,
            &[
                "1", "Bears", "3", "4", "Cats", "0", "1", "9", "30", "3", "8", "1", "3", "2", "4",
                "31",
            ],
        ]);
        let games = parse_box_score_sheet(&s, Phase::RegularSeason, &LeagueLayout::default());
        assert_eq!(games.len(), 1);
        assert!(games[0].box_score.is_none());
    }

    #[test]
    fn malformed_error_cell_drops_box_score() {
        let s = sheet(&[
            HEADER,
            &[
                "1", "Bears", "3", "4", "Cats", "two", "1", "9", "30", "3", "8", "1", "3", "2", "4",
                "31", "4", "9", "0", "4", "3", "6",
            ],
        ]);
        let games = parse_box_score_sheet(&s, Phase::RegularSeason, &LeagueLayout::default());
        assert_eq!(games.len(), 1);
        assert!(games[0].box_score.is_none());
    }

    #[test]
    fn malformed_required_cells_skip_the_row() {
        let s = sheet(&[
            HEADER,
            &["1", "Bears", "three", "4", "Cats", "0", "1", "9"],
            &["2", "Bears", "3", "4", "Cats", "0", "1", ""],
            &["x", "Bears", "3", "4", "Cats", "0", "1", "9"],
            &["3", "Bears", "3", "4", "Cats", "0", "1", "9"],
            &["", "", ""],
        ]);
        let games = parse_box_score_sheet(&s, Phase::RegularSeason, &LeagueLayout::default());
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].stage, Stage::Week(3));
    }

    #[test]
    fn fractional_innings_and_ties() {
        let s = sheet(&[HEADER, &["1", "Bears", "4", "4", "Cats", "0", "0", "8.5"]]);
        let games = parse_box_score_sheet(&s, Phase::RegularSeason, &LeagueLayout::default());
        assert_eq!(games[0].innings, Some(8.5));
        assert!(!games[0].run_rule);
        assert_eq!(games[0].winner, "Cats");
    }

    // -- Playoffs --

    #[test]
    fn playoff_row_has_round_and_no_errors() {
        let s = sheet(&[
            &["Round", "Away", "AS", "HS", "Home"],
            &[
                "Finals", "Bears", "1", "6", "Cats", "9", "33", "1", "7", "0", "1", "2", "9", "31",
                "6", "11", "2", "6", "3", "4",
            ],
        ]);
        let games = parse_box_score_sheet(&s, Phase::Playoffs, &LeagueLayout::default());
        assert_eq!(games.len(), 1);

        let g = &games[0];
        assert_eq!(g.round(), Some("Finals"));
        assert_eq!(g.innings, Some(9.0));
        let bs = g.box_score.as_ref().unwrap();
        assert_eq!(bs.away.ab, 33);
        assert_eq!(bs.home.hr, 2);
        assert!(bs.away.e.is_missing());
        assert!(bs.home.e.is_missing());
    }

    #[test]
    fn layout_without_error_columns() {
        let layout = LeagueLayout {
            box_score_errors: false,
            ..LeagueLayout::default()
        };
        let s = sheet(&[
            HEADER,
            &[
                "2", "Bears", "1", "6", "Cats", "9", "33", "1", "7", "0", "1", "2", "9", "31", "6",
                "11", "2", "6", "3", "4",
            ],
        ]);
        let games = parse_box_score_sheet(&s, Phase::RegularSeason, &layout);
        assert_eq!(games[0].innings, Some(9.0));
        assert_eq!(games[0].box_score.as_ref().unwrap().away.ab, 33);
    }

    // -- Head to head --

    #[test]
    fn head_to_head_row() {
        let s = sheet(&[
            &["Season", "Week", "Away"],
            &[
                "17", "4", "zed", "ZZZ", "2", "5", "AAA", "amy", "0", "1", "", "25", "2", "5", "0",
                "2", "1", "6", "27", "5", "9", "1", "5", "2", "3",
            ],
        ]);
        let games = parse_head_to_head_sheet(&s, Phase::RegularSeason);
        assert_eq!(games.len(), 1);

        let g = &games[0];
        assert_eq!(g.season.as_deref(), Some("17"));
        assert_eq!(g.stage, Stage::Week(4));
        assert_eq!(g.away, "zed");
        assert_eq!(g.home, "amy");
        assert_eq!(g.winner, "amy");
        assert_eq!(g.innings, None);
        assert!(!g.run_rule);
        let bs = g.box_score.as_ref().unwrap();
        assert_eq!(bs.away.ab, 25);
        assert_eq!(bs.home.ab, 27);
        assert_eq!(bs.home.e, 1_i64);
    }

    #[test]
    fn serializes_stage_inline() {
        let g = GameResult::new("a", "b", 1, 2, Some(9.0), Stage::Round("Semis".into()));
        let v = serde_json::to_value(&g).unwrap();
        assert_eq!(v["round"], "Semis");
        assert_eq!(v["winner"], "b");
        assert!(v.get("season").is_none());
        assert!(v["box_score"].is_null());
    }
}
