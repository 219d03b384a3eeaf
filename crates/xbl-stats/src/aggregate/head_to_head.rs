// Head-to-head records between pairs of active players.
//
// A pair is stored once, under its alphabetically smaller id (`player_a`),
// whichever of the two was the away side in a given game.

use std::collections::BTreeMap;

use serde::Serialize;
use xbl_core::SafeNum;

use super::derive::{derive, DerivedStats, EntityKind};
use super::raw::RawStats;
use crate::game::{GameResult, Side};

/// Order two ids so the lexicographically smaller one comes first.
pub fn canonical_pair<'a>(x: &'a str, y: &'a str) -> (&'a str, &'a str) {
    if x <= y {
        (x, y)
    } else {
        (y, x)
    }
}

/// Raw accumulators for both members of one pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairRecord {
    pub player_a: RawStats,
    pub player_z: RawStats,
}

/// Derived output for one pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadToHead {
    pub player_a: String,
    pub player_z: String,
    pub player_a_stats: DerivedStats,
    pub player_z_stats: DerivedStats,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadToHeadTable {
    pairs: BTreeMap<String, BTreeMap<String, PairRecord>>,
}

impl HeadToHeadTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one game into its pair. Both sides' accumulators are updated
    /// with the same rules as the per-entity fold.
    pub fn record(&mut self, game: &GameResult) {
        let (a, z) = canonical_pair(&game.away, &game.home);
        let a_side = if game.away == a { Side::Away } else { Side::Home };

        let pair = self
            .pairs
            .entry(a.to_string())
            .or_default()
            .entry(z.to_string())
            .or_default();
        pair.player_a.record(game, a_side);
        pair.player_z.record(game, a_side.other());
    }

    /// The pair record, whichever order the ids are given in.
    pub fn lookup(&self, x: &str, y: &str) -> Option<&PairRecord> {
        let (a, z) = canonical_pair(x, y);
        self.pairs.get(a)?.get(z)
    }

    pub fn len(&self) -> usize {
        self.pairs.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Derive every pair against the league constant of the run the games
    /// came from. Keyed `player_a → player_z`.
    pub fn derive(&self, context: SafeNum) -> BTreeMap<String, BTreeMap<String, HeadToHead>> {
        self.pairs
            .iter()
            .map(|(a, opponents)| {
                let derived = opponents
                    .iter()
                    .map(|(z, pair)| {
                        let h2h = HeadToHead {
                            player_a: a.clone(),
                            player_z: z.clone(),
                            player_a_stats: derive(&pair.player_a, context, EntityKind::Player, a),
                            player_z_stats: derive(&pair.player_z, context, EntityKind::Player, z),
                        };
                        (z.clone(), h2h)
                    })
                    .collect();
                (a.clone(), derived)
            })
            .collect()
    }
}

/// Build the table from a game log. Games with an inactive participant are
/// skipped, as are games a player somehow played against themselves.
pub fn accumulate_head_to_head<'a, I, F>(games: I, is_active: F) -> HeadToHeadTable
where
    I: IntoIterator<Item = &'a GameResult>,
    F: Fn(&str) -> bool,
{
    let mut table = HeadToHeadTable::new();
    for game in games {
        if game.away == game.home || !is_active(&game.away) || !is_active(&game.home) {
            continue;
        }
        table.record(game);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{BattingLine, BoxScore, Stage};

    fn line(ab: u32, r: u32, h: u32, hr: u32) -> BattingLine {
        BattingLine {
            ab,
            r,
            h,
            hr,
            rbi: r,
            bb: 0,
            so: 3,
            e: SafeNum::from(0_i64),
        }
    }

    fn game(away: &str, home: &str, away_score: u32, home_score: u32) -> GameResult {
        GameResult::new(away, home, away_score, home_score, Some(9.0), Stage::Week(1))
            .with_season("17")
            .with_box_score(BoxScore {
                away: line(30, away_score, 8, 1),
                home: line(31, home_score, 9, 0),
            })
    }

    #[test]
    fn canonical_order_is_lexicographic() {
        assert_eq!(canonical_pair("zed", "amy"), ("amy", "zed"));
        assert_eq!(canonical_pair("amy", "zed"), ("amy", "zed"));
        assert_eq!(canonical_pair("Zed", "amy"), ("Zed", "amy"));
    }

    #[test]
    fn stats_land_on_the_canonical_side() {
        // zed is away but amy is player_a
        let games = [game("zed", "amy", 2, 5), game("amy", "zed", 7, 1)];
        let table = accumulate_head_to_head(&games, |_| true);

        assert_eq!(table.len(), 1);
        let pair = table.lookup("zed", "amy").unwrap();
        assert_eq!(pair, table.lookup("amy", "zed").unwrap());

        assert_eq!(pair.player_a.wins, 2);
        assert_eq!(pair.player_a.losses, 0);
        assert_eq!(pair.player_a.ab, 31 + 30);
        assert_eq!(pair.player_a.r, 5 + 7);
        assert_eq!(pair.player_a.oppr, 2 + 1);
        assert_eq!(pair.player_z.losses, 2);
        assert_eq!(pair.player_z.r, 3);
        assert_eq!(pair.player_a.seasons_played.len(), 1);
    }

    #[test]
    fn inactive_participant_excludes_the_game() {
        let games = [game("p1", "p2", 3, 1), game("p1", "p3", 3, 1)];
        let table = accumulate_head_to_head(&games, |id| id != "p2");

        assert!(table.lookup("p1", "p2").is_none());
        assert!(table.lookup("p1", "p3").is_some());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn derive_keys_by_canonical_pair() {
        let games = [game("zed", "amy", 2, 5)];
        let derived = accumulate_head_to_head(&games, |_| true).derive(SafeNum::from(5.0));

        let h2h = &derived["amy"]["zed"];
        assert_eq!(h2h.player_a, "amy");
        assert_eq!(h2h.player_z, "zed");
        assert_eq!(h2h.player_a_stats.player, "amy");
        assert_eq!(h2h.player_a_stats.wins, 1);
        assert_eq!(h2h.player_z_stats.losses, 1);
        assert_eq!(h2h.player_a_stats.num_seasons, Some(1));
        // 5.0 - (1 * 13 + 0 - 2 * 3) / 9
        assert_eq!(h2h.player_a_stats.fip, 4.222);
    }

    #[test]
    fn empty_table() {
        let table = accumulate_head_to_head(std::iter::empty::<&GameResult>(), |_| true);
        assert!(table.is_empty());
        assert!(table.derive(SafeNum::Missing).is_empty());
    }
}
