// Rate statistics computed from a finished accumulator.
//
// Every division goes through `SafeNum`, so an empty denominator shows up
// as `null` in the output instead of an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use xbl_core::SafeNum;

use super::raw::RawStats;

/// Whether the entity being derived is a team or a player. Decides which
/// identifier field is filled and whether the season count is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Team,
    Player,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub team: String,
    pub player: String,

    // hitting
    pub rs: u32,
    pub rs9: SafeNum,
    pub ba: SafeNum,
    pub ab: u32,
    pub ab9: SafeNum,
    pub h: u32,
    pub h9: SafeNum,
    pub hr: u32,
    pub hr9: SafeNum,
    pub abhr: SafeNum,
    pub so: u32,
    pub so9: SafeNum,
    pub bb: u32,
    pub bb9: SafeNum,
    pub obp: SafeNum,
    pub rc: SafeNum,
    pub babip: SafeNum,

    // pitching
    pub ra: u32,
    pub ra9: SafeNum,
    pub oppba: SafeNum,
    pub oppab9: SafeNum,
    pub opph: u32,
    pub opph9: SafeNum,
    pub opphr: u32,
    pub opphr9: SafeNum,
    pub oppabhr: SafeNum,
    pub oppk: u32,
    pub oppk9: SafeNum,
    pub oppbb: u32,
    pub oppbb9: SafeNum,
    pub whip: SafeNum,
    pub lob: SafeNum,
    pub e: SafeNum,
    pub fip: SafeNum,

    // mixed
    pub rd: i64,
    pub rd9: SafeNum,
    pub innings_played: SafeNum,
    pub innings_game: SafeNum,
    pub wins: u32,
    pub losses: u32,
    pub wins_by_run_rule: u32,
    pub losses_by_run_rule: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_seasons: Option<usize>,
}

fn n(v: u32) -> SafeNum {
    SafeNum::from(v)
}

fn ratio(num: impl Into<SafeNum>, den: impl Into<SafeNum>) -> SafeNum {
    (num.into() / den.into()).round3()
}

/// `ratio` for rates whose divisor can go negative; anything not positive
/// gives `Missing`.
fn positive_ratio(num: impl Into<SafeNum>, den: impl Into<SafeNum>) -> SafeNum {
    let den = den.into();
    match den.value() {
        Some(v) if v > 0.0 => ratio(num, den),
        _ => SafeNum::Missing,
    }
}

/// Derive the stat line for one entity. `league_context` is the league
/// runs-per-nine constant for the same aggregation run.
pub fn derive(raw: &RawStats, league_context: SafeNum, kind: EntityKind, id: &str) -> DerivedStats {
    let hitting = n(raw.innings_hitting);
    let pitching = n(raw.innings_pitching);
    let per_9_hitting = |count: u32| (n(count) / hitting * 9_i64).round3();
    let per_9_pitching = |count: u32| (n(count) / pitching * 9_i64).round3();

    let on_base = n(raw.h) + n(raw.bb);
    let balls_in_play = n(raw.ab) - n(raw.so) - n(raw.hr);
    let opp_on_base = n(raw.opph) + n(raw.oppbb);
    let fip_core = (n(raw.opphr) * 13_i64 + 3_i64 * n(raw.oppbb) - 2_i64 * n(raw.oppso)) / pitching;
    let innings_played = (hitting + pitching) / 2_i64;

    let (team, player) = match kind {
        EntityKind::Team => (id.to_string(), String::new()),
        EntityKind::Player => (String::new(), id.to_string()),
    };

    DerivedStats {
        team,
        player,

        rs: raw.r,
        rs9: per_9_hitting(raw.r),
        ba: ratio(raw.h, raw.ab),
        ab: raw.ab,
        ab9: per_9_hitting(raw.ab),
        h: raw.h,
        h9: per_9_hitting(raw.h),
        hr: raw.hr,
        hr9: per_9_hitting(raw.hr),
        abhr: ratio(raw.ab, raw.hr),
        so: raw.so,
        so9: per_9_hitting(raw.so),
        bb: raw.bb,
        bb9: per_9_hitting(raw.bb),
        obp: ratio(on_base, n(raw.ab) + n(raw.bb)),
        rc: ratio(raw.h, raw.r),
        babip: positive_ratio(n(raw.h) - n(raw.hr), balls_in_play),

        ra: raw.oppr,
        ra9: per_9_pitching(raw.oppr),
        oppba: ratio(raw.opph, raw.oppab),
        oppab9: per_9_pitching(raw.oppab),
        opph: raw.opph,
        opph9: per_9_pitching(raw.opph),
        opphr: raw.opphr,
        opphr9: per_9_pitching(raw.opphr),
        oppabhr: ratio(raw.oppab, raw.opphr),
        oppk: raw.oppso,
        oppk9: per_9_pitching(raw.oppso),
        oppbb: raw.oppbb,
        oppbb9: per_9_pitching(raw.oppbb),
        whip: ratio(opp_on_base, pitching),
        lob: positive_ratio(opp_on_base - n(raw.oppr), opp_on_base - 1.4 * n(raw.opphr)),
        e: raw.e,
        fip: (league_context - fip_core).round3(),

        rd: i64::from(raw.r) - i64::from(raw.oppr),
        rd9: (per_9_hitting(raw.r) - per_9_pitching(raw.oppr)).round3(),
        innings_played,
        innings_game: ratio(innings_played, raw.games_played),
        wins: raw.wins,
        losses: raw.losses,
        wins_by_run_rule: raw.wins_by_run_rule,
        losses_by_run_rule: raw.losses_by_run_rule,
        num_seasons: match kind {
            EntityKind::Player => Some(raw.seasons_played.len()),
            EntityKind::Team => None,
        },
    }
}

/// Derive every entity of an accumulation against one league constant.
pub fn derive_all(
    by_entity: &BTreeMap<String, RawStats>,
    league_context: SafeNum,
    kind: EntityKind,
) -> BTreeMap<String, DerivedStats> {
    by_entity
        .iter()
        .map(|(id, raw)| (id.clone(), derive(raw, league_context, kind, id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawStats {
        RawStats {
            innings_pitching: 6,
            innings_hitting: 7,
            wins: 1,
            wins_by_run_rule: 1,
            ab: 30,
            r: 10,
            h: 10,
            hr: 2,
            rbi: 9,
            bb: 4,
            so: 5,
            e: SafeNum::from(1_i64),
            oppab: 28,
            oppr: 2,
            opph: 6,
            opphr: 0,
            opprbi: 2,
            oppbb: 1,
            oppso: 8,
            games_played: 1,
            ..RawStats::default()
        }
    }

    #[test]
    fn hitting_rates() {
        let d = derive(&sample(), SafeNum::from(8.308), EntityKind::Team, "X");
        assert_eq!(d.team, "X");
        assert_eq!(d.player, "");
        assert_eq!(d.rs, 10);
        assert_eq!(d.rs9, 12.857);
        assert_eq!(d.ba, 0.333);
        assert_eq!(d.ab9, 38.571);
        assert_eq!(d.abhr, 15.0);
        assert_eq!(d.obp, 0.412);
        assert_eq!(d.rc, 1.0);
        assert_eq!(d.babip, 0.348);
    }

    #[test]
    fn pitching_rates() {
        let d = derive(&sample(), SafeNum::from(8.308), EntityKind::Team, "X");
        assert_eq!(d.ra, 2);
        assert_eq!(d.ra9, 3.0);
        assert_eq!(d.oppba, 0.214);
        assert_eq!(d.opph9, 9.0);
        assert_eq!(d.oppk, 8);
        assert_eq!(d.oppk9, 12.0);
        assert_eq!(d.whip, 1.167);
        assert_eq!(d.lob, 0.714);
        // 8.308 - (0 + 3 - 16) / 6
        assert_eq!(d.fip, 10.475);
        assert_eq!(d.e, 1_i64);
    }

    #[test]
    fn mixed_stats() {
        let d = derive(&sample(), SafeNum::from(8.308), EntityKind::Team, "X");
        assert_eq!(d.rd, 8);
        assert_eq!(d.rd9, 9.857);
        assert_eq!(d.innings_played, 6.5);
        assert_eq!(d.innings_game, 6.5);
        assert_eq!(d.wins, 1);
        assert_eq!(d.wins_by_run_rule, 1);
        assert_eq!(d.num_seasons, None);
    }

    #[test]
    fn zero_home_runs_leave_home_run_ratios_missing() {
        let raw = RawStats {
            hr: 0,
            opphr: 0,
            ..sample()
        };
        let d = derive(&raw, SafeNum::Missing, EntityKind::Team, "X");
        assert!(d.abhr.is_missing());
        assert!(d.oppabhr.is_missing());
        assert_eq!(d.hr9, 0.0);
    }

    #[test]
    fn empty_accumulator_is_all_missing_rates() {
        let d = derive(&RawStats::default(), SafeNum::from(5.0), EntityKind::Team, "Y");
        for rate in [
            d.rs9, d.ba, d.ab9, d.abhr, d.obp, d.rc, d.babip, d.ra9, d.oppba, d.whip, d.lob,
            d.fip, d.rd9, d.innings_game,
        ] {
            assert!(rate.is_missing());
        }
        assert_eq!(d.rd, 0);
        assert_eq!(d.innings_played, 0.0);
        assert_eq!(d.e, 0_i64);
    }

    #[test]
    fn non_positive_divisors_leave_lob_and_babip_missing() {
        // every hit allowed left the park and nobody walked: 2 - 1.4 * 2 < 0
        let raw = RawStats {
            opph: 2,
            opphr: 2,
            oppbb: 0,
            oppr: 3,
            ..sample()
        };
        let d = derive(&raw, SafeNum::Missing, EntityKind::Team, "X");
        assert!(d.lob.is_missing());

        let d = derive(&RawStats { oppr: 2, ..raw }, SafeNum::Missing, EntityKind::Team, "X");
        assert!(d.lob.is_missing());
        assert!(serde_json::to_value(&d).unwrap()["lob"].is_null());

        // more strikeouts and homers than at-bats leaves a negative ball-in-play count
        let raw = RawStats {
            ab: 5,
            so: 4,
            hr: 2,
            h: 3,
            ..sample()
        };
        let d = derive(&raw, SafeNum::Missing, EntityKind::Team, "X");
        assert!(d.babip.is_missing());
    }

    #[test]
    fn missing_league_context_only_affects_fip() {
        let d = derive(&sample(), SafeNum::Missing, EntityKind::Team, "X");
        assert!(d.fip.is_missing());
        assert_eq!(d.whip, 1.167);
    }

    #[test]
    fn player_kind_reports_seasons() {
        let mut raw = sample();
        raw.seasons_played.insert("16".into());
        raw.seasons_played.insert("17".into());
        let d = derive(&raw, SafeNum::Missing, EntityKind::Player, "amy");
        assert_eq!(d.player, "amy");
        assert_eq!(d.team, "");
        assert_eq!(d.num_seasons, Some(2));

        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["num_seasons"], 2);
        assert!(v["fip"].is_null());
    }

    #[test]
    fn team_output_omits_season_count() {
        let d = derive(&sample(), SafeNum::Missing, EntityKind::Team, "X");
        let v = serde_json::to_value(&d).unwrap();
        assert!(v.get("num_seasons").is_none());
        assert_eq!(v["ba"], 0.333);
        assert_eq!(v["rd"], 8);
    }

    #[test]
    fn derive_all_keeps_keys() {
        let mut by_entity = BTreeMap::new();
        by_entity.insert("A".to_string(), sample());
        by_entity.insert("B".to_string(), RawStats::default());
        let all = derive_all(&by_entity, SafeNum::Missing, EntityKind::Team);
        assert_eq!(all.keys().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(all["A"].team, "A");
    }
}
