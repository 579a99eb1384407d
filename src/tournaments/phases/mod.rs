//! The two phases a tournament can have, and the rule that a match belongs to
//! at most one of them.
//!
//! The group phase is divided into matchdays (jornadas), the knockout phase
//! into stages (fases eliminatorias: quarter-finals, semi-finals, ...). A
//! match with neither is a scheduling placeholder.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::Serialize;

use crate::{
    matches::Match,
    schema::{knockout_stages, matchdays},
    tournaments::Tournament,
};

pub mod manage;

#[derive(Queryable, Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Matchday {
    pub id: String,
    pub tournament_id: String,
    pub number: i64,
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
}

impl Matchday {
    pub fn of_tournament(
        tid: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Matchday>> {
        matchdays::table
            .filter(matchdays::tournament_id.eq(tid))
            .order_by(matchdays::number.asc())
            .load::<Matchday>(conn)
    }

    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("Matchday {} ({name})", self.number),
            None => format!("Matchday {}", self.number),
        }
    }
}

#[derive(Queryable, Clone, Debug, Serialize, PartialEq, Eq)]
pub struct KnockoutStage {
    pub id: String,
    pub tournament_id: String,
    pub name: String,
    pub position: i64,
}

impl KnockoutStage {
    pub fn of_tournament(
        tid: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<KnockoutStage>> {
        knockout_stages::table
            .filter(knockout_stages::tournament_id.eq(tid))
            .order_by(knockout_stages::position.asc())
            .load::<KnockoutStage>(conn)
    }
}

/// Where a match sits in its tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseRef {
    Group { matchday_id: String },
    Knockout { stage_id: String },
    Unassigned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseError {
    BothPhases,
    UnknownMatchday,
    UnknownStage,
    GroupPhaseDisabled,
    KnockoutPhaseDisabled,
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PhaseError::BothPhases => {
                "a match belongs to either a matchday or a knockout stage, not both"
            }
            PhaseError::UnknownMatchday => {
                "that matchday does not belong to this tournament"
            }
            PhaseError::UnknownStage => {
                "that knockout stage does not belong to this tournament"
            }
            PhaseError::GroupPhaseDisabled => {
                "this tournament does not have a group phase"
            }
            PhaseError::KnockoutPhaseDisabled => {
                "this tournament does not have a knockout phase"
            }
        };
        f.write_str(msg)
    }
}

impl PhaseRef {
    pub fn from_refs(
        matchday_id: Option<String>,
        stage_id: Option<String>,
    ) -> Result<PhaseRef, PhaseError> {
        match (matchday_id, stage_id) {
            (Some(_), Some(_)) => Err(PhaseError::BothPhases),
            (Some(matchday_id), None) => Ok(PhaseRef::Group { matchday_id }),
            (None, Some(stage_id)) => Ok(PhaseRef::Knockout { stage_id }),
            (None, None) => Ok(PhaseRef::Unassigned),
        }
    }

    pub fn of_match(m: &Match) -> PhaseRef {
        match (&m.matchday_id, &m.knockout_stage_id) {
            (Some(matchday_id), _) => PhaseRef::Group {
                matchday_id: matchday_id.clone(),
            },
            (None, Some(stage_id)) => PhaseRef::Knockout {
                stage_id: stage_id.clone(),
            },
            (None, None) => PhaseRef::Unassigned,
        }
    }

    /// Checks the reference against the phases of `tournament`.
    pub fn check(
        &self,
        tournament: &Tournament,
        matchdays: &[Matchday],
        stages: &[KnockoutStage],
    ) -> Result<(), PhaseError> {
        match self {
            PhaseRef::Group { matchday_id } => {
                if !tournament.has_group_phase {
                    return Err(PhaseError::GroupPhaseDisabled);
                }
                matchdays
                    .iter()
                    .any(|md| {
                        &md.id == matchday_id
                            && md.tournament_id == tournament.id
                    })
                    .then_some(())
                    .ok_or(PhaseError::UnknownMatchday)
            }
            PhaseRef::Knockout { stage_id } => {
                if !tournament.has_knockout_phase {
                    return Err(PhaseError::KnockoutPhaseDisabled);
                }
                stages
                    .iter()
                    .any(|s| &s.id == stage_id && s.tournament_id == tournament.id)
                    .then_some(())
                    .ok_or(PhaseError::UnknownStage)
            }
            PhaseRef::Unassigned => Ok(()),
        }
    }

    pub fn matchday_id(&self) -> Option<&str> {
        match self {
            PhaseRef::Group { matchday_id } => Some(matchday_id),
            _ => None,
        }
    }

    pub fn stage_id(&self) -> Option<&str> {
        match self {
            PhaseRef::Knockout { stage_id } => Some(stage_id),
            _ => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, PhaseRef::Group { .. })
    }
}

/// A tournament's matches, split for display.
#[derive(Debug, Default)]
pub struct PartitionedMatches {
    /// In matchday order; matchdays without matches are kept.
    pub group: Vec<(Matchday, Vec<Match>)>,
    /// In stage order; stages without matches are kept.
    pub knockout: Vec<(KnockoutStage, Vec<Match>)>,
    pub unassigned: Vec<Match>,
}

pub fn partition(
    matches: Vec<Match>,
    matchdays: &[Matchday],
    stages: &[KnockoutStage],
) -> PartitionedMatches {
    let mut by_matchday: HashMap<String, Vec<Match>> = HashMap::new();
    let mut by_stage: HashMap<String, Vec<Match>> = HashMap::new();
    let mut unassigned = Vec::new();

    for m in matches {
        match PhaseRef::of_match(&m) {
            PhaseRef::Group { matchday_id }
                if matchdays.iter().any(|md| md.id == matchday_id) =>
            {
                by_matchday.entry(matchday_id).or_default().push(m)
            }
            PhaseRef::Knockout { stage_id }
                if stages.iter().any(|s| s.id == stage_id) =>
            {
                by_stage.entry(stage_id).or_default().push(m)
            }
            _ => unassigned.push(m),
        }
    }

    let chronological = |a: &Match, b: &Match| {
        a.scheduled_at
            .cmp(&b.scheduled_at)
            .then_with(|| a.id.cmp(&b.id))
    };

    let mut sorted_matchdays = matchdays.to_vec();
    sorted_matchdays.sort_by_key(|md| md.number);
    let group = sorted_matchdays
        .into_iter()
        .map(|md| {
            let mut ms = by_matchday.remove(&md.id).unwrap_or_default();
            ms.sort_by(chronological);
            (md, ms)
        })
        .collect();

    let mut sorted_stages = stages.to_vec();
    sorted_stages.sort_by_key(|s| s.position);
    let knockout = sorted_stages
        .into_iter()
        .map(|s| {
            let mut ms = by_stage.remove(&s.id).unwrap_or_default();
            ms.sort_by(chronological);
            (s, ms)
        })
        .collect();

    unassigned.sort_by(chronological);

    PartitionedMatches {
        group,
        knockout,
        unassigned,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::matches::MatchStatus;

    fn tournament(group: bool, knockout: bool) -> Tournament {
        Tournament {
            id: "t".to_string(),
            name: "Copa".to_string(),
            category: "Senior".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: None,
            has_group_phase: group,
            has_knockout_phase: knockout,
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn matchday(id: &str, number: i64) -> Matchday {
        Matchday {
            id: id.to_string(),
            tournament_id: "t".to_string(),
            number,
            name: None,
            date: None,
        }
    }

    fn stage(id: &str, position: i64) -> KnockoutStage {
        KnockoutStage {
            id: id.to_string(),
            tournament_id: "t".to_string(),
            name: id.to_string(),
            position,
        }
    }

    fn scheduled(id: &str, matchday: Option<&str>, stage: Option<&str>) -> Match {
        let mut m = Match::test_fixture(id, "a", "b");
        m.matchday_id = matchday.map(str::to_string);
        m.knockout_stage_id = stage.map(str::to_string);
        assert_eq!(m.status(), MatchStatus::Scheduled);
        m
    }

    #[test]
    fn both_references_are_rejected() {
        assert_eq!(
            PhaseRef::from_refs(Some("md".into()), Some("ko".into())),
            Err(PhaseError::BothPhases)
        );
        assert_eq!(
            PhaseRef::from_refs(None, None),
            Ok(PhaseRef::Unassigned)
        );
        assert_eq!(
            PhaseRef::from_refs(Some("md".into()), None),
            Ok(PhaseRef::Group {
                matchday_id: "md".into()
            })
        );
    }

    #[test]
    fn references_must_match_the_tournament() {
        let t = tournament(true, false);
        let mds = [matchday("md1", 1)];
        let stages = [stage("final", 1)];

        let group = PhaseRef::Group {
            matchday_id: "md1".into(),
        };
        assert_eq!(group.check(&t, &mds, &stages), Ok(()));

        let missing = PhaseRef::Group {
            matchday_id: "md9".into(),
        };
        assert_eq!(
            missing.check(&t, &mds, &stages),
            Err(PhaseError::UnknownMatchday)
        );

        let knockout = PhaseRef::Knockout {
            stage_id: "final".into(),
        };
        assert_eq!(
            knockout.check(&t, &mds, &stages),
            Err(PhaseError::KnockoutPhaseDisabled)
        );
        assert_eq!(
            knockout.check(&tournament(true, true), &mds, &stages),
            Ok(())
        );
    }

    #[test]
    fn partition_orders_phases() {
        let mds = [matchday("md2", 2), matchday("md1", 1)];
        let stages = [stage("final", 2), stage("semi", 1)];
        let matches = vec![
            scheduled("m1", Some("md2"), None),
            scheduled("m2", None, Some("final")),
            scheduled("m3", None, None),
            scheduled("m4", Some("md1"), None),
            scheduled("m5", Some("gone"), None),
        ];

        let p = partition(matches, &mds, &stages);

        let group: Vec<(i64, Vec<&str>)> = p
            .group
            .iter()
            .map(|(md, ms)| (md.number, ms.iter().map(|m| m.id.as_str()).collect()))
            .collect();
        assert_eq!(group, vec![(1, vec!["m4"]), (2, vec!["m1"])]);

        let knockout: Vec<(&str, usize)> = p
            .knockout
            .iter()
            .map(|(s, ms)| (s.name.as_str(), ms.len()))
            .collect();
        assert_eq!(knockout, vec![("semi", 0), ("final", 1)]);

        let unassigned: Vec<&str> =
            p.unassigned.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(unassigned, vec!["m3", "m5"]);
    }
}
