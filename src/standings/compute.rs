//! Builds the league table from finalized group-phase matches. The table is
//! recomputed from scratch on every request.

use std::{cmp::Ordering, collections::HashMap};

use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use itertools::Itertools;
use serde::Serialize;

use crate::{
    config::ScoringConfig,
    matches::{
        Match, MatchStatus,
        outcome::{MatchOutcome, Side},
    },
    schema::matches,
    teams::Team,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingRow {
    pub team_id: String,
    pub team_name: String,
    pub played: i64,
    pub won: i64,
    pub drawn: i64,
    pub lost: i64,
    pub goals_for: i64,
    pub goals_against: i64,
    pub points: i64,
    /// 1-based. Teams level on points, goal difference and goals scored
    /// share a rank.
    pub rank: usize,
    pub shared_rank: bool,
}

impl StandingRow {
    fn new(team: &Team) -> Self {
        Self {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            points: 0,
            rank: 0,
            shared_rank: false,
        }
    }

    pub fn goal_difference(&self) -> i64 {
        self.goals_for - self.goals_against
    }

    /// `3` or `=3`.
    pub fn rank_label(&self) -> String {
        if self.shared_rank {
            format!("={}", self.rank)
        } else {
            self.rank.to_string()
        }
    }

    fn tiebreak_key(&self) -> (i64, i64, i64) {
        (self.points, self.goal_difference(), self.goals_for)
    }

    fn record(
        &mut self,
        scored: i64,
        conceded: i64,
        result: Ordering,
        scoring: &ScoringConfig,
    ) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        match result {
            Ordering::Greater => {
                self.won += 1;
                self.points += scoring.points_win;
            }
            Ordering::Equal => {
                self.drawn += 1;
                self.points += scoring.points_draw;
            }
            Ordering::Less => {
                self.lost += 1;
                self.points += scoring.points_loss;
            }
        }
    }
}

/// Every team of `teams` gets a row, whether or not it has played.
///
/// Only finalized matches assigned to a matchday count, and only when both
/// teams are in `teams`. The score stored on the match is used as is; for
/// awarded results that is the awarded score.
pub fn compute(
    teams: &[Team],
    matches: &[Match],
    scoring: &ScoringConfig,
) -> Vec<StandingRow> {
    let mut rows: HashMap<&str, StandingRow> = teams
        .iter()
        .map(|team| (team.id.as_str(), StandingRow::new(team)))
        .collect();

    for m in matches {
        if m.status() != MatchStatus::Finalized || m.matchday_id.is_none() {
            continue;
        }
        if !rows.contains_key(m.team_1_id.as_str())
            || !rows.contains_key(m.team_2_id.as_str())
        {
            tracing::warn!(match_id = %m.id, "match refers to a team outside the table");
            continue;
        }
        let Some(outcome) = m.outcome() else {
            tracing::warn!(match_id = %m.id, "finalized match has no readable outcome");
            continue;
        };
        let (Some(goals_1), Some(goals_2)) = (m.goals_1, m.goals_2) else {
            continue;
        };

        // awarded results ignore the score; penalties never count in the table
        let result_1 = match &outcome {
            MatchOutcome::Awarded { .. } => {
                match outcome.winner() {
                    Some(Side::Team1) => Ordering::Greater,
                    _ => Ordering::Less,
                }
            }
            MatchOutcome::Regular { .. } | MatchOutcome::Shootout { .. } => {
                goals_1.cmp(&goals_2)
            }
        };

        if let Some(row) = rows.get_mut(m.team_1_id.as_str()) {
            row.record(goals_1, goals_2, result_1, scoring);
        }
        if let Some(row) = rows.get_mut(m.team_2_id.as_str()) {
            row.record(goals_2, goals_1, result_1.reverse(), scoring);
        }
    }

    let mut rows: Vec<StandingRow> = rows.into_values().collect();
    rows.sort_by(|a, b| {
        b.tiebreak_key()
            .cmp(&a.tiebreak_key())
            .then_with(|| a.team_name.cmp(&b.team_name))
            .then_with(|| a.team_id.cmp(&b.team_id))
    });

    let mut ranks = Vec::with_capacity(rows.len());
    let mut position = 1;
    for (_, tied) in &rows.iter().chunk_by(|row| row.tiebreak_key()) {
        let n = tied.count();
        ranks.extend(std::iter::repeat_n((position, n > 1), n));
        position += n;
    }
    for (row, (rank, shared_rank)) in rows.iter_mut().zip(ranks) {
        row.rank = rank;
        row.shared_rank = shared_rank;
    }

    rows
}

/// Loads the teams and group-phase results of `tid` and builds its table.
#[tracing::instrument(skip(scoring, conn))]
pub fn fetch_standings(
    tid: &str,
    scoring: &ScoringConfig,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> QueryResult<Vec<StandingRow>> {
    let teams = Team::of_tournament(tid, conn)?;
    let played = matches::table
        .filter(matches::tournament_id.eq(tid))
        .filter(matches::status.eq(MatchStatus::Finalized.as_str()))
        .filter(matches::matchday_id.is_not_null())
        .load::<Match>(conn)?;
    Ok(compute(&teams, &played, scoring))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::matches::outcome::AwardKind;

    fn team(id: &str, name: &str) -> Team {
        Team {
            id: id.to_string(),
            tournament_id: "t".to_string(),
            name: name.to_string(),
            category: "Senior".to_string(),
            primary_color: "#ffffff".to_string(),
            secondary_color: None,
            level: 3,
            director_id: None,
            logo_url: None,
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn result(id: &str, home: &str, away: &str, outcome: MatchOutcome) -> Match {
        let mut m = Match::test_fixture(id, home, away);
        let (g1, g2) = outcome.goals(3);
        m.status = MatchStatus::Finalized.as_str().to_string();
        m.matchday_id = Some("md1".to_string());
        m.outcome = Some(outcome.column().to_string());
        m.goals_1 = Some(g1);
        m.goals_2 = Some(g2);
        if let Some((p1, p2)) = outcome.penalties() {
            m.penalties_1 = Some(p1);
            m.penalties_2 = Some(p2);
        }
        if let MatchOutcome::Awarded { against, .. } = outcome {
            m.affected_team_id = Some(against.team_id(&m).to_string());
        }
        m
    }

    fn score(id: &str, home: &str, away: &str, g1: i64, g2: i64) -> Match {
        result(
            id,
            home,
            away,
            MatchOutcome::Regular {
                goals_1: g1,
                goals_2: g2,
            },
        )
    }

    fn row<'a>(rows: &'a [StandingRow], id: &str) -> &'a StandingRow {
        rows.iter().find(|r| r.team_id == id).unwrap()
    }

    #[test]
    fn a_win_and_a_draw_make_four_points() {
        let teams = [team("a", "Atlético"), team("b", "Boca"), team("c", "Cerro")];
        let matches = [score("m1", "a", "b", 2, 1), score("m2", "c", "a", 1, 1)];

        let rows = compute(&teams, &matches, &ScoringConfig::default());

        let a = row(&rows, "a");
        assert_eq!((a.played, a.won, a.drawn, a.lost), (2, 1, 1, 0));
        assert_eq!((a.goals_for, a.goals_against), (3, 2));
        assert_eq!(a.points, 4);
        assert_eq!(a.rank, 1);
        assert_eq!(row(&rows, "b").points, 0);
        assert_eq!(row(&rows, "c").points, 1);
    }

    #[test]
    fn teams_without_matches_are_listed() {
        let teams = [team("a", "Atlético"), team("z", "Zapla")];
        let rows = compute(&teams, &[], &ScoringConfig::default());
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.played == 0 && r.rank == 1 && r.shared_rank));
        // level teams are listed alphabetically
        assert_eq!(rows[0].team_name, "Atlético");
        assert_eq!(rows[1].rank_label(), "=1");
    }

    #[test]
    fn tiebreaks_are_goal_difference_then_goals_for() {
        let teams = [
            team("a", "A"),
            team("b", "B"),
            team("c", "C"),
            team("d", "D"),
        ];
        let matches = [
            score("m1", "a", "b", 4, 0),
            score("m2", "c", "d", 1, 0),
            score("m3", "b", "d", 3, 3),
        ];
        let rows = compute(&teams, &matches, &ScoringConfig::default());
        let order: Vec<&str> = rows.iter().map(|r| r.team_id.as_str()).collect();
        assert_eq!(order, vec!["a", "c", "d", "b"]);
        assert_eq!(
            rows.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn forfeits_award_the_match_to_the_opponent() {
        let teams = [team("a", "A"), team("b", "B")];
        let matches = [result(
            "m1",
            "a",
            "b",
            MatchOutcome::Awarded {
                kind: AwardKind::Forfeit,
                against: Side::Team1,
            },
        )];
        let rows = compute(&teams, &matches, &ScoringConfig::default());
        let b = row(&rows, "b");
        assert_eq!((b.won, b.points, b.goals_for), (1, 3, 3));
        let a = row(&rows, "a");
        assert_eq!((a.lost, a.points, a.goals_against), (1, 0, 3));
    }

    #[test]
    fn only_finalized_group_matches_count() {
        let teams = [team("a", "A"), team("b", "B")];
        let mut knockout = score("m1", "a", "b", 5, 0);
        knockout.matchday_id = None;
        knockout.knockout_stage_id = Some("final".to_string());
        let scheduled = Match::test_fixture("m2", "a", "b");

        let rows = compute(&teams, &[knockout, scheduled], &ScoringConfig::default());
        assert!(rows.iter().all(|r| r.played == 0));
    }

    #[test]
    fn recomputation_is_idempotent() {
        let teams = [team("b", "Same"), team("a", "Same"), team("c", "Other")];
        let matches = [score("m1", "a", "c", 1, 1), score("m2", "b", "c", 1, 1)];
        let scoring = ScoringConfig::default();

        let first = compute(&teams, &matches, &scoring);
        let mut reversed = matches.to_vec();
        reversed.reverse();
        let mut shuffled_teams = teams.to_vec();
        shuffled_teams.rotate_left(1);
        let second = compute(&shuffled_teams, &reversed, &scoring);

        assert_eq!(first, second);
        let order: Vec<(&str, String)> = first
            .iter()
            .map(|r| (r.team_id.as_str(), r.rank_label()))
            .collect();
        // a and b are level on everything including their name
        assert_eq!(
            order,
            vec![
                ("c", "1".to_string()),
                ("a", "=2".to_string()),
                ("b", "=2".to_string())
            ]
        );
    }

    #[test]
    fn scoring_is_configurable() {
        let teams = [team("a", "A"), team("b", "B")];
        let matches = [score("m1", "a", "b", 0, 0)];
        let scoring = ScoringConfig {
            points_draw: 2,
            ..Default::default()
        };
        let rows = compute(&teams, &matches, &scoring);
        assert!(rows.iter().all(|r| r.points == 2));
    }
}
