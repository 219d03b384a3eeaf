// Career stats for the players active in the current season, across every
// league's head-to-head log.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};
use xbl_core::config::Config;
use xbl_core::sheets::{Sheet, SheetSource};

use crate::aggregate::{
    accumulate_head_to_head, accumulate_tracked, derive_all, DerivedStats, EntityKind, HeadToHead,
};
use crate::error::StatsError;
use crate::game::{parse_head_to_head_sheet, GameResult, Phase};
use crate::roster::{active_players, collect_players, ActiveRoster, Player};

/// `player_a → player_z → record`, with `player_a < player_z`.
pub type HeadToHeadMap = BTreeMap<String, BTreeMap<String, HeadToHead>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerStats {
    pub players: BTreeMap<String, Player>,
    pub season_performances: BTreeMap<String, DerivedStats>,
    pub season_head_to_head: HeadToHeadMap,
    pub playoffs_performances: BTreeMap<String, DerivedStats>,
    pub playoffs_head_to_head: HeadToHeadMap,
}

pub fn roster_tab(league: &str) -> String {
    format!("{league} Team Abbreviations")
}

pub fn head_to_head_tab(league: &str, phase: Phase) -> String {
    match phase {
        Phase::RegularSeason => format!("{league} Head to Head"),
        Phase::Playoffs => format!("{league} Playoffs Head to Head"),
    }
}

/// Per-player career lines and head-to-head records for the active roster.
///
/// A game counts toward a player's career line whenever that player is
/// active; it only counts head-to-head when both players are. Both use the
/// league constant of every game touching an active player.
pub fn career_performances(
    games: &[GameResult],
    roster: &ActiveRoster,
) -> (BTreeMap<String, DerivedStats>, HeadToHeadMap) {
    let is_active = |id: &str| roster.is_active(id);

    let acc = accumulate_tracked(games, is_active);
    let context = acc.league_context();
    let performances = derive_all(&acc.by_entity, context, EntityKind::Player);

    let head_to_head = accumulate_head_to_head(games, is_active).derive(context);
    debug!(
        "career: {} players, {} head-to-head pairs",
        performances.len(),
        head_to_head.values().map(BTreeMap::len).sum::<usize>()
    );
    (performances, head_to_head)
}

fn load_head_to_head<S: SheetSource + ?Sized>(
    source: &S,
    config: &Config,
    phase: Phase,
) -> Result<Vec<GameResult>, StatsError> {
    let mut games = Vec::new();
    for league in &config.stats.leagues {
        let sheet = source.sheet(&config.career.book, &head_to_head_tab(league, phase))?;
        games.extend(parse_head_to_head_sheet(&sheet, phase));
    }
    Ok(games)
}

/// Build career stats for `season`'s active players from the career book.
pub fn build_career_stats<S: SheetSource + ?Sized>(
    source: &S,
    config: &Config,
    season: u32,
) -> Result<CareerStats, StatsError> {
    info!("Running career stats...");
    let book = &config.career.book;

    let leagues = &config.stats.leagues;

    let rosters = leagues
        .iter()
        .map(|league| source.sheet(book, &roster_tab(league)))
        .collect::<Result<Vec<Sheet>, _>>()?;
    let tables: Vec<(&str, &Sheet)> = leagues.iter().map(String::as_str).zip(&rosters).collect();

    info!("Finding who played which season...");
    let players = collect_players(&tables);
    let roster = ActiveRoster::new(&active_players(&players, season));
    info!("{} players active in season {}", roster.len(), season);

    let season_games = load_head_to_head(source, config, Phase::RegularSeason)?;
    let (season_performances, season_head_to_head) = career_performances(&season_games, &roster);

    let (playoffs_performances, playoffs_head_to_head) = if config.career.playoffs_head_to_head {
        let playoffs_games = load_head_to_head(source, config, Phase::Playoffs)?;
        career_performances(&playoffs_games, &roster)
    } else {
        (BTreeMap::new(), BTreeMap::new())
    };

    Ok(CareerStats {
        players,
        season_performances,
        season_head_to_head,
        playoffs_performances,
        playoffs_head_to_head,
    })
}
