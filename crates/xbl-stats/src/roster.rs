// Who played for which team, and who is active in a given season.
//
// Built from each league's `Team Abbreviations` tab:
//   0 season | 1 team name | 2 team abbreviation | 3 player

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use xbl_core::sheets::Sheet;

use crate::error::RowError;
use crate::row::Row;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSeason {
    pub team_name: String,
    pub team_abbrev: String,
    pub league: String,
    pub season: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub player: String,
    pub teams: Vec<TeamSeason>,
}

fn parse_team_season(cells: &[String], league: &str) -> Result<(String, TeamSeason), RowError> {
    let row = Row::new(cells);
    let team = TeamSeason {
        season: row.count(0, "season")?,
        team_name: row.text(1, "team name")?.to_string(),
        team_abbrev: row.text(2, "team abbreviation")?.to_string(),
        league: league.to_string(),
    };
    Ok((row.text(3, "player")?.to_string(), team))
}

/// Everyone who ever played in any of the given leagues, with every team
/// they played for. `tables` pairs a league name with its roster sheet.
pub fn collect_players(tables: &[(&str, &Sheet)]) -> BTreeMap<String, Player> {
    let mut players: BTreeMap<String, Player> = BTreeMap::new();
    for (league, sheet) in tables {
        for (i, cells) in sheet.data_rows().iter().enumerate() {
            if cells.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            match parse_team_season(cells, league) {
                Ok((name, team)) => players
                    .entry(name.clone())
                    .or_insert_with(|| Player {
                        player: name,
                        teams: Vec::new(),
                    })
                    .teams
                    .push(team),
                Err(e) => warn!("skipping malformed {} roster row {}: {}", league, i + 2, e),
            }
        }
    }
    for player in players.values_mut() {
        player.teams.sort_by_key(|t| t.season);
    }
    debug!("collected {} players", players.len());
    players
}

/// Players with a team in `season`, grouped by league. A player is counted
/// in the first league found for that season only.
pub fn active_players(
    players: &BTreeMap<String, Player>,
    season: u32,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut active: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (name, player) in players {
        if let Some(team) = player.teams.iter().find(|t| t.season == season) {
            active
                .entry(team.league.clone())
                .or_default()
                .insert(name.clone());
        }
    }
    active
}

/// Every player active in the season being aggregated, across leagues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveRoster {
    players: BTreeSet<String>,
}

impl ActiveRoster {
    pub fn new(by_league: &BTreeMap<String, BTreeSet<String>>) -> Self {
        Self {
            players: by_league.values().flatten().cloned().collect(),
        }
    }

    pub fn is_active(&self, player: &str) -> bool {
        self.players.contains(player)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ActiveRoster {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            players: iter.into_iter().map(Into::into).collect(),
        }
    }
}
