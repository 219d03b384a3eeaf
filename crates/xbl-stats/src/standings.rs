// Regular-season standings transcribed from the `Standings` tab, and
// per-round playoff records built from playoff game results.
//
// Standings columns (before the league's offset is applied to 2..):
//   0 rank | 1 team | [2 ego starting | 3 ego current] | 2 W | 3 L | 4 GB
//   | 5 win% | 6 win% vs .500 | 7 sweeps W | 8 splits | 9 sweeps L | 10 SOS
//   | 19 elo

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use xbl_core::config::LeagueLayout;
use xbl_core::sheets::Sheet;

use crate::error::RowError;
use crate::game::{GameResult, Side};
use crate::row::Row;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonTeamRecord {
    pub team: String,
    pub rank: u32,
    pub ego_starting: Option<i64>,
    pub ego_current: Option<i64>,
    pub wins: u32,
    pub losses: u32,
    pub remaining: u32,
    pub gb: f64,
    pub win_pct: f64,
    pub win_pct_vs_500: f64,
    pub sweeps_w: u32,
    pub splits: u32,
    pub sweeps_l: u32,
    pub sos: i64,
    pub elo: i64,
}

/// Games each team plays in a double round robin of `team_count` teams,
/// less those already played. Never negative.
pub fn remaining_games(team_count: usize, wins: u32, losses: u32) -> u32 {
    let per_team = 2 * team_count.saturating_sub(1) as u64;
    per_team.saturating_sub(u64::from(wins) + u64::from(losses)) as u32
}

fn parse_record(cells: &[String], layout: &LeagueLayout) -> Result<SeasonTeamRecord, RowError> {
    let row = Row::new(cells);
    let col = |c: usize| c + layout.standings_offset;

    let (ego_starting, ego_current) = if layout.ego_columns {
        (Some(row.int(2, "ego starting")?), Some(row.int(3, "ego current")?))
    } else {
        (None, None)
    };
    let gb = match row.text(col(4), "gb")? {
        "-" => 0.0,
        _ => row.real(col(4), "gb")?,
    };

    Ok(SeasonTeamRecord {
        team: row.text(1, "team")?.to_string(),
        rank: row.count(0, "rank")?,
        ego_starting,
        ego_current,
        wins: row.count(col(2), "wins")?,
        losses: row.count(col(3), "losses")?,
        remaining: 0,
        gb,
        win_pct: row.real(col(5), "win pct")?,
        win_pct_vs_500: row.real(col(6), "win pct vs .500")?,
        sweeps_w: row.count(col(7), "sweeps won")?,
        splits: row.count(col(8), "splits")?,
        sweeps_l: row.count(col(9), "sweeps lost")?,
        sos: row.int(col(10), "sos")?,
        elo: row.int(col(19), "elo")?,
    })
}

/// Every team on the standings tab, keyed by team name. Rows that don't
/// parse are skipped with a warning.
pub fn collect_team_records(layout: &LeagueLayout, sheet: &Sheet) -> BTreeMap<String, SeasonTeamRecord> {
    let mut records = BTreeMap::new();
    for (i, cells) in sheet.data_rows().iter().enumerate() {
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        match parse_record(cells, layout) {
            Ok(record) => {
                records.insert(record.team.clone(), record);
            }
            Err(e) => warn!("skipping malformed standings row {}: {}", i + 2, e),
        }
    }

    let team_count = records.len();
    for record in records.values_mut() {
        record.remaining = remaining_games(team_count, record.wins, record.losses);
    }
    debug!("collected standings for {} teams", team_count);
    records
}

// ---------------------------------------------------------------------------
// Playoffs
// ---------------------------------------------------------------------------

/// One team's series in one playoff round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffsRound {
    pub team: String,
    pub round: String,
    pub opponent: String,
    pub wins: u32,
    pub losses: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffsTeamRecord {
    pub team: String,
    pub rounds: BTreeMap<String, PlayoffsRound>,
}

/// Per-team, per-round series records. The opponent of a round is whoever
/// the team met in its first game of that round.
pub fn collect_playoffs_team_records(games: &[GameResult]) -> BTreeMap<String, PlayoffsTeamRecord> {
    let mut records: BTreeMap<String, PlayoffsTeamRecord> = BTreeMap::new();
    for game in games {
        let Some(round) = game.round() else {
            continue;
        };
        let winner = game.winning_side();
        for side in [Side::Away, Side::Home] {
            let team = game.id(side);
            let record = records
                .entry(team.to_string())
                .or_insert_with(|| PlayoffsTeamRecord {
                    team: team.to_string(),
                    rounds: BTreeMap::new(),
                });
            let series = record
                .rounds
                .entry(round.to_string())
                .or_insert_with(|| PlayoffsRound {
                    team: team.to_string(),
                    round: round.to_string(),
                    opponent: game.id(side.other()).to_string(),
                    wins: 0,
                    losses: 0,
                });
            if side == winner {
                series.wins += 1;
            } else {
                series.losses += 1;
            }
        }
    }
    records
}
