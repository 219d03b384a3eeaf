// One league's season: standings, team stats, and playoff progress.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;
use xbl_core::config::LeagueLayout;
use xbl_core::sheets::SheetSource;

use crate::aggregate::{accumulate, derive_all, DerivedStats, EntityKind};
use crate::error::StatsError;
use crate::game::{parse_box_score_sheet, GameResult, Phase};
use crate::standings::{
    collect_playoffs_team_records, collect_team_records, PlayoffsTeamRecord, SeasonTeamRecord,
};

pub const STANDINGS_TAB: &str = "Standings";
pub const BOX_SCORES_TAB: &str = "Box Scores";
pub const PLAYOFFS_TAB: &str = "Playoffs";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonStats {
    pub current_season: u32,
    pub season_team_records: BTreeMap<String, SeasonTeamRecord>,
    pub season_team_stats: BTreeMap<String, DerivedStats>,
    pub season_game_results: Vec<GameResult>,
    pub playoffs_team_records: BTreeMap<String, PlayoffsTeamRecord>,
    pub playoffs_team_stats: BTreeMap<String, DerivedStats>,
    pub playoffs_game_results: Vec<GameResult>,
}

/// Team stat lines over `games`, derived against the league constant of
/// those same games.
pub fn team_stats(games: &[GameResult]) -> BTreeMap<String, DerivedStats> {
    let acc = accumulate(games);
    derive_all(&acc.by_entity, acc.league_context(), EntityKind::Team)
}

/// Build a league's season from its spreadsheet (book named after the
/// league). Any missing tab is fatal.
pub fn build_season_stats<S: SheetSource + ?Sized>(
    source: &S,
    league: &str,
    layout: &LeagueLayout,
    season: u32,
) -> Result<SeasonStats, StatsError> {
    info!("Running season {} {}...", season, league);

    let standings = source.sheet(league, STANDINGS_TAB)?;
    let box_scores = source.sheet(league, BOX_SCORES_TAB)?;
    let playoffs = source.sheet(league, PLAYOFFS_TAB)?;

    let season_game_results = parse_box_score_sheet(&box_scores, Phase::RegularSeason, layout);
    let playoffs_game_results = parse_box_score_sheet(&playoffs, Phase::Playoffs, layout);

    Ok(SeasonStats {
        current_season: season,
        season_team_records: collect_team_records(layout, &standings),
        season_team_stats: team_stats(&season_game_results),
        playoffs_team_records: collect_playoffs_team_records(&playoffs_game_results),
        playoffs_team_stats: team_stats(&playoffs_game_results),
        season_game_results,
        playoffs_game_results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use xbl_core::sheets::{MemorySheets, SheetError};

    #[test]
    fn missing_tab_is_fatal() {
        let source = MemorySheets::new()
            .with("XBL", "Standings", &[&["Rank"]])
            .with("XBL", "Box Scores", &[&["Week"]]);
        let err = build_season_stats(&source, "XBL", &LeagueLayout::default(), 18).unwrap_err();
        assert!(matches!(
            err,
            StatsError::Sheet(SheetError::NotFound { ref tab, .. }) if tab == "Playoffs"
        ));
    }

    #[test]
    fn empty_tabs_give_an_empty_season() {
        let source = MemorySheets::new()
            .with("AA", "Standings", &[&["Rank"]])
            .with("AA", "Box Scores", &[&["Week"]])
            .with("AA", "Playoffs", &[&["Round"]]);
        let stats = build_season_stats(&source, "AA", &LeagueLayout::default(), 18).unwrap();
        assert_eq!(stats.current_season, 18);
        assert!(stats.season_team_records.is_empty());
        assert!(stats.season_team_stats.is_empty());
        assert!(stats.playoffs_game_results.is_empty());
    }
}
