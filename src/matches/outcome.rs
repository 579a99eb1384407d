//! The three shapes a match result can take, and how each is read from the
//! result form and from the `matches` table.

use serde::Deserialize;

use crate::{
    matches::Match,
    validation::{FormErrors, non_empty, parse_count},
};

/// Results decided off the pitch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AwardKind {
    /// The team withdrew from the match.
    Forfeit,
    /// The team did not turn up.
    Walkover,
    /// The team was penalised by the organisers.
    Sanction,
}

impl AwardKind {
    pub const ALL: [AwardKind; 3] =
        [AwardKind::Forfeit, AwardKind::Walkover, AwardKind::Sanction];

    pub fn as_str(self) -> &'static str {
        match self {
            AwardKind::Forfeit => "forfeit",
            AwardKind::Walkover => "walkover",
            AwardKind::Sanction => "sanction",
        }
    }

    pub fn parse(s: &str) -> Option<AwardKind> {
        AwardKind::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Team1,
    Team2,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Team1 => Side::Team2,
            Side::Team2 => Side::Team1,
        }
    }

    pub fn team_id(self, m: &Match) -> &str {
        match self {
            Side::Team1 => &m.team_1_id,
            Side::Team2 => &m.team_2_id,
        }
    }

    pub fn of_team(m: &Match, team_id: &str) -> Option<Side> {
        if m.team_1_id == team_id {
            Some(Side::Team1)
        } else if m.team_2_id == team_id {
            Some(Side::Team2)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    Regular {
        goals_1: i64,
        goals_2: i64,
    },
    /// A drawn match decided on penalties. `goals_1 == goals_2`.
    Shootout {
        goals_1: i64,
        goals_2: i64,
        penalties_1: i64,
        penalties_2: i64,
    },
    /// The match is given to the opponent of `against`.
    Awarded {
        kind: AwardKind,
        against: Side,
    },
}

impl MatchOutcome {
    /// `None` on a regular draw.
    pub fn winner(&self) -> Option<Side> {
        match *self {
            MatchOutcome::Regular { goals_1, goals_2 } => {
                match goals_1.cmp(&goals_2) {
                    std::cmp::Ordering::Greater => Some(Side::Team1),
                    std::cmp::Ordering::Less => Some(Side::Team2),
                    std::cmp::Ordering::Equal => None,
                }
            }
            MatchOutcome::Shootout {
                penalties_1,
                penalties_2,
                ..
            } => {
                if penalties_1 > penalties_2 {
                    Some(Side::Team1)
                } else {
                    Some(Side::Team2)
                }
            }
            MatchOutcome::Awarded { against, .. } => Some(against.opponent()),
        }
    }

    /// The score which goes on record. Awarded results are
    /// `awarded_goals` to nil.
    pub fn goals(&self, awarded_goals: i64) -> (i64, i64) {
        match *self {
            MatchOutcome::Regular { goals_1, goals_2 }
            | MatchOutcome::Shootout {
                goals_1, goals_2, ..
            } => (goals_1, goals_2),
            MatchOutcome::Awarded {
                against: Side::Team1,
                ..
            } => (0, awarded_goals),
            MatchOutcome::Awarded {
                against: Side::Team2,
                ..
            } => (awarded_goals, 0),
        }
    }

    pub fn penalties(&self) -> Option<(i64, i64)> {
        match *self {
            MatchOutcome::Shootout {
                penalties_1,
                penalties_2,
                ..
            } => Some((penalties_1, penalties_2)),
            _ => None,
        }
    }

    /// Value of the `outcome` column.
    pub fn column(&self) -> &'static str {
        match self {
            MatchOutcome::Regular { .. } | MatchOutcome::Shootout { .. } => {
                "regular"
            }
            MatchOutcome::Awarded { kind, .. } => kind.as_str(),
        }
    }

    /// Reads back the outcome columns of a match. Returns `None` if they are
    /// missing or inconsistent.
    pub fn from_match(m: &Match) -> Option<MatchOutcome> {
        match m.outcome.as_deref()? {
            "regular" => {
                let (goals_1, goals_2) = (m.goals_1?, m.goals_2?);
                match (m.penalties_1, m.penalties_2) {
                    (Some(penalties_1), Some(penalties_2))
                        if goals_1 == goals_2 && penalties_1 != penalties_2 =>
                    {
                        Some(MatchOutcome::Shootout {
                            goals_1,
                            goals_2,
                            penalties_1,
                            penalties_2,
                        })
                    }
                    _ => Some(MatchOutcome::Regular { goals_1, goals_2 }),
                }
            }
            other => {
                let kind = AwardKind::parse(other)?;
                let against = Side::of_team(m, m.affected_team_id.as_deref()?)?;
                Some(MatchOutcome::Awarded { kind, against })
            }
        }
    }
}

/// The raw contents of the result form.
#[derive(Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct ResultForm {
    /// `regular`, or one of the [`AwardKind`]s.
    pub outcome: String,
    pub goals_1: String,
    pub goals_2: String,
    pub penalties_1: String,
    pub penalties_2: String,
    /// Id of the team the award goes against.
    pub affected_team_id: String,
}

impl ResultForm {
    pub fn of_match(m: &Match) -> ResultForm {
        let show = |n: Option<i64>| n.map(|n| n.to_string()).unwrap_or_default();
        ResultForm {
            outcome: m.outcome.clone().unwrap_or_else(|| "regular".to_string()),
            goals_1: show(m.goals_1),
            goals_2: show(m.goals_2),
            penalties_1: show(m.penalties_1),
            penalties_2: show(m.penalties_2),
            affected_team_id: m.affected_team_id.clone().unwrap_or_default(),
        }
    }

    /// Shootouts are refused for group-phase matches, where a draw stands.
    pub fn parse(
        &self,
        m: &Match,
        is_group_match: bool,
    ) -> Result<MatchOutcome, FormErrors> {
        let mut errors = FormErrors::new();

        if let Some(kind) = AwardKind::parse(self.outcome.trim()) {
            return match Side::of_team(m, self.affected_team_id.trim()) {
                Some(against) => Ok(MatchOutcome::Awarded { kind, against }),
                None => {
                    errors.add(
                        "affected_team_id",
                        "choose which of the two teams the result is awarded against",
                    );
                    Err(errors)
                }
            };
        }

        if self.outcome.trim() != "regular" {
            errors.add("outcome", "unknown kind of result");
            return Err(errors);
        }

        let goals_1 = errors.take("goals_1", parse_count(&self.goals_1));
        let goals_2 = errors.take("goals_2", parse_count(&self.goals_2));

        let penalties = match (
            non_empty(&self.penalties_1),
            non_empty(&self.penalties_2),
        ) {
            (None, None) => None,
            (Some(p1), Some(p2)) => {
                let p1 = errors.take("penalties_1", parse_count(p1));
                let p2 = errors.take("penalties_2", parse_count(p2));
                p1.zip(p2)
            }
            (Some(_), None) => {
                errors.add("penalties_2", "enter both shootout scores");
                None
            }
            (None, Some(_)) => {
                errors.add("penalties_1", "enter both shootout scores");
                None
            }
        };

        let (Some(goals_1), Some(goals_2)) = (goals_1, goals_2) else {
            return Err(errors);
        };

        let outcome = match penalties {
            None => MatchOutcome::Regular { goals_1, goals_2 },
            Some((penalties_1, penalties_2)) => {
                if is_group_match {
                    errors.add(
                        FormErrors::GENERAL,
                        "group matches cannot go to a penalty shootout",
                    );
                } else if goals_1 != goals_2 {
                    errors.add(
                        FormErrors::GENERAL,
                        "a penalty shootout only follows a drawn match",
                    );
                } else if penalties_1 == penalties_2 {
                    errors.add(
                        FormErrors::GENERAL,
                        "a penalty shootout must have a winner",
                    );
                }
                MatchOutcome::Shootout {
                    goals_1,
                    goals_2,
                    penalties_1,
                    penalties_2,
                }
            }
        };

        if errors.is_empty() {
            Ok(outcome)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Match {
        Match::test_fixture("m", "home", "away")
    }

    fn form(outcome: &str, g1: &str, g2: &str) -> ResultForm {
        ResultForm {
            outcome: outcome.to_string(),
            goals_1: g1.to_string(),
            goals_2: g2.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn regular_scores() {
        let outcome = form("regular", "2", "1").parse(&fixture(), true).unwrap();
        assert_eq!(
            outcome,
            MatchOutcome::Regular {
                goals_1: 2,
                goals_2: 1
            }
        );
        assert_eq!(outcome.winner(), Some(Side::Team1));

        let draw = form("regular", "1", "1").parse(&fixture(), true).unwrap();
        assert_eq!(draw.winner(), None);
    }

    #[test]
    fn negative_and_fractional_goals_are_field_errors() {
        let errors = form("regular", "-1", "2.5")
            .parse(&fixture(), false)
            .unwrap_err();
        assert_eq!(errors.get("goals_1"), Some("cannot be negative"));
        assert!(errors.contains("goals_2"));
    }

    #[test]
    fn oversized_scores_are_field_errors() {
        let mut f = form("regular", "9223372036854775807", "100");
        f.penalties_1 = "5".to_string();
        f.penalties_2 = "1000".to_string();
        let errors = f.parse(&fixture(), false).unwrap_err();
        assert_eq!(errors.get("goals_1"), Some("cannot be more than 99"));
        assert_eq!(errors.get("goals_2"), Some("cannot be more than 99"));
        assert_eq!(errors.get("penalties_2"), Some("cannot be more than 99"));
    }

    #[test]
    fn awarded_results_go_to_the_opponent() {
        let mut f = form("forfeit", "", "");
        f.affected_team_id = "home".to_string();
        let outcome = f.parse(&fixture(), true).unwrap();
        assert_eq!(
            outcome,
            MatchOutcome::Awarded {
                kind: AwardKind::Forfeit,
                against: Side::Team1
            }
        );
        assert_eq!(outcome.winner(), Some(Side::Team2));
        assert_eq!(outcome.goals(3), (0, 3));
        assert_eq!(outcome.column(), "forfeit");
    }

    #[test]
    fn awards_need_a_participant() {
        let mut f = form("walkover", "", "");
        f.affected_team_id = "someone-else".to_string();
        let errors = f.parse(&fixture(), false).unwrap_err();
        assert!(errors.contains("affected_team_id"));
    }

    #[test]
    fn shootouts_follow_a_draw_outside_the_group_phase() {
        let mut f = form("regular", "2", "2");
        f.penalties_1 = "4".to_string();
        f.penalties_2 = "5".to_string();

        let outcome = f.parse(&fixture(), false).unwrap();
        assert_eq!(outcome.winner(), Some(Side::Team2));
        assert_eq!(outcome.penalties(), Some((4, 5)));
        assert_eq!(outcome.column(), "regular");

        let errors = f.parse(&fixture(), true).unwrap_err();
        assert!(errors.contains(FormErrors::GENERAL));

        f.goals_1 = "3".to_string();
        assert!(f.parse(&fixture(), false).is_err());

        f.goals_1 = "2".to_string();
        f.penalties_2 = "4".to_string();
        assert!(f.parse(&fixture(), false).is_err());
    }

    #[test]
    fn half_a_shootout_is_rejected() {
        let mut f = form("regular", "0", "0");
        f.penalties_1 = "3".to_string();
        let errors = f.parse(&fixture(), false).unwrap_err();
        assert!(errors.contains("penalties_2"));
    }

    #[test]
    fn stored_outcomes_read_back() {
        let mut m = fixture();
        m.outcome = Some("regular".to_string());
        m.goals_1 = Some(1);
        m.goals_2 = Some(1);
        m.penalties_1 = Some(3);
        m.penalties_2 = Some(2);
        assert_eq!(
            MatchOutcome::from_match(&m).and_then(|o| o.winner()),
            Some(Side::Team1)
        );

        m.outcome = Some("sanction".to_string());
        m.affected_team_id = Some("away".to_string());
        assert_eq!(
            MatchOutcome::from_match(&m),
            Some(MatchOutcome::Awarded {
                kind: AwardKind::Sanction,
                against: Side::Team2
            })
        );

        m.affected_team_id = None;
        assert_eq!(MatchOutcome::from_match(&m), None);
    }
}
