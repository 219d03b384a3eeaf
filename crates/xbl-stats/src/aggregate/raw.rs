// Per-entity counting-stat accumulators and the fold that fills them.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use xbl_core::SafeNum;

use crate::game::{GameResult, Side};

/// Everything one team or player did across the games folded so far.
///
/// `opp*` counters hold what opponents did *against* this entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawStats {
    pub innings_pitching: u32,
    pub innings_hitting: u32,
    pub wins: u32,
    pub losses: u32,
    pub wins_by_run_rule: u32,
    pub losses_by_run_rule: u32,
    pub ab: u32,
    pub r: u32,
    pub h: u32,
    pub hr: u32,
    pub rbi: u32,
    pub bb: u32,
    pub so: u32,
    /// Errors committed. Goes missing once any game without error data is folded in.
    pub e: SafeNum,
    pub oppab: u32,
    pub oppr: u32,
    pub opph: u32,
    pub opphr: u32,
    pub opprbi: u32,
    pub oppbb: u32,
    pub oppso: u32,
    pub games_played: u32,
    /// Distinct seasons the entity appeared in. Only reported as a count.
    pub seasons_played: BTreeSet<String>,
}

impl Default for RawStats {
    fn default() -> Self {
        Self {
            innings_pitching: 0,
            innings_hitting: 0,
            wins: 0,
            losses: 0,
            wins_by_run_rule: 0,
            losses_by_run_rule: 0,
            ab: 0,
            r: 0,
            h: 0,
            hr: 0,
            rbi: 0,
            bb: 0,
            so: 0,
            e: SafeNum::ZERO,
            oppab: 0,
            oppr: 0,
            opph: 0,
            opphr: 0,
            opprbi: 0,
            oppbb: 0,
            oppso: 0,
            games_played: 0,
            seasons_played: BTreeSet::new(),
        }
    }
}

/// Innings credited as (hitting, pitching) to one side of a game. The away
/// side always bats in the last inning; the home side may not need to, so it
/// gets the floor for hitting and the ceiling for pitching.
pub fn split_innings(innings: f64, side: Side) -> (u32, u32) {
    let innings = innings.max(0.0);
    let (ceil, floor) = (innings.ceil() as u32, innings.floor() as u32);
    match side {
        Side::Away => (ceil, floor),
        Side::Home => (floor, ceil),
    }
}

impl RawStats {
    /// Fold one game in from `side`'s point of view.
    ///
    /// Wins, losses, run-rule results, and seasons always count. Innings and
    /// counting stats only count when the game has a box score.
    pub fn record(&mut self, game: &GameResult, side: Side) {
        let won = game.winning_side() == side;
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        if game.run_rule {
            if won {
                self.wins_by_run_rule += 1;
            } else {
                self.losses_by_run_rule += 1;
            }
        }
        if let Some(season) = &game.season {
            self.seasons_played.insert(season.clone());
        }

        let Some(box_score) = &game.box_score else {
            return;
        };

        if let Some(innings) = game.innings {
            let (hitting, pitching) = split_innings(innings, side);
            self.innings_hitting += hitting;
            self.innings_pitching += pitching;
        }

        let own = box_score.line(side);
        let opp = box_score.line(side.other());

        self.games_played += 1;
        self.ab += own.ab;
        self.r += own.r;
        self.h += own.h;
        self.hr += own.hr;
        self.rbi += own.rbi;
        self.bb += own.bb;
        self.so += own.so;
        self.e += own.e;

        self.oppab += opp.ab;
        self.oppr += opp.r;
        self.opph += opp.h;
        self.opphr += opp.hr;
        self.opprbi += opp.rbi;
        self.oppbb += opp.bb;
        self.oppso += opp.so;
    }
}

// ---------------------------------------------------------------------------
// Fold
// ---------------------------------------------------------------------------

/// Result of folding a game sequence: one accumulator per entity plus the
/// league-wide totals behind the league context constant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulation {
    pub by_entity: BTreeMap<String, RawStats>,
    pub league_runs: u64,
    pub league_innings_hitting: u64,
}

impl Accumulation {
    /// League runs per nine hitting innings for this fold.
    pub fn league_context(&self) -> SafeNum {
        league_context(self.league_runs, self.league_innings_hitting)
    }

    fn add_league_totals(&mut self, game: &GameResult) {
        if let Some((runs, innings)) = league_totals(game) {
            self.league_runs += runs;
            self.league_innings_hitting += innings;
        }
    }
}

/// Runs scored and hitting innings by both sides, for games that have a
/// box score and a known inning count.
fn league_totals(game: &GameResult) -> Option<(u64, u64)> {
    let (Some(box_score), Some(innings)) = (&game.box_score, game.innings) else {
        return None;
    };
    let (away_hitting, _) = split_innings(innings, Side::Away);
    let (home_hitting, _) = split_innings(innings, Side::Home);
    Some((
        u64::from(box_score.away.r) + u64::from(box_score.home.r),
        u64::from(away_hitting) + u64::from(home_hitting),
    ))
}

/// `round(9 × runs ÷ hitting innings, 3)`; missing when no innings were played.
pub fn league_context(total_runs: u64, total_innings_hitting: u64) -> SafeNum {
    (9_i64 * SafeNum::from(total_runs) / SafeNum::from(total_innings_hitting)).round3()
}

/// Fold every game into per-entity accumulators. Order does not matter.
pub fn accumulate<'a, I>(games: I) -> Accumulation
where
    I: IntoIterator<Item = &'a GameResult>,
{
    accumulate_tracked(games, |_| true)
}

/// Like [`accumulate`], but only entities for which `is_tracked` holds get
/// an accumulator. Games where neither side is tracked are skipped entirely,
/// including from the league totals.
pub fn accumulate_tracked<'a, I, F>(games: I, is_tracked: F) -> Accumulation
where
    I: IntoIterator<Item = &'a GameResult>,
    F: Fn(&str) -> bool,
{
    let mut acc = Accumulation::default();
    for game in games {
        let tracked: Vec<Side> = [Side::Away, Side::Home]
            .into_iter()
            .filter(|&side| is_tracked(game.id(side)))
            .collect();
        if tracked.is_empty() {
            continue;
        }
        for side in tracked {
            acc.by_entity
                .entry(game.id(side).to_string())
                .or_default()
                .record(game, side);
        }
        acc.add_league_totals(game);
    }
    acc
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
