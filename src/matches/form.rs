use chrono::NaiveDateTime;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    matches::Match,
    teams::Team,
    template::form::{FormErrorSummary, Select, TextInput},
    tournaments::{
        Tournament,
        phases::{KnockoutStage, Matchday, PhaseRef},
    },
    util_resp::FailureResponse,
    validation::{
        DATETIME_INPUT_FORMAT, FormErrors, has_length, non_empty,
        parse_datetime, parse_optional,
    },
};

#[derive(Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct MatchForm {
    pub tournament_id: String,
    pub team_1_id: String,
    pub team_2_id: String,
    pub matchday_id: String,
    pub knockout_stage_id: String,
    pub referee: String,
    pub scheduled_at: String,
    pub venue: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchInput {
    pub tournament_id: String,
    pub team_1_id: String,
    pub team_2_id: String,
    pub phase: PhaseRef,
    pub referee: Option<String>,
    pub scheduled_at: Option<NaiveDateTime>,
    pub venue: Option<String>,
}

impl MatchForm {
    pub fn new(tournament_id: String) -> Self {
        Self {
            tournament_id,
            ..Default::default()
        }
    }

    pub fn of_match(m: &Match) -> Self {
        Self {
            tournament_id: m.tournament_id.clone(),
            team_1_id: m.team_1_id.clone(),
            team_2_id: m.team_2_id.clone(),
            matchday_id: m.matchday_id.clone().unwrap_or_default(),
            knockout_stage_id: m.knockout_stage_id.clone().unwrap_or_default(),
            referee: m.referee.clone().unwrap_or_default(),
            scheduled_at: m
                .scheduled_at
                .map(|at| at.format(DATETIME_INPUT_FORMAT).to_string())
                .unwrap_or_default(),
            venue: m.venue.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<MatchInput, FormErrors> {
        let mut errors = FormErrors::new();

        let team_1_id = self.team_1_id.trim();
        let team_2_id = self.team_2_id.trim();
        if team_1_id.is_empty() {
            errors.add("team_1_id", "choose the home team");
        }
        if team_2_id.is_empty() {
            errors.add("team_2_id", "choose the away team");
        }
        if !team_1_id.is_empty() && team_1_id == team_2_id {
            errors.add(FormErrors::GENERAL, "a team cannot play against itself");
        }

        let phase = PhaseRef::from_refs(
            non_empty(&self.matchday_id).map(str::to_string),
            non_empty(&self.knockout_stage_id).map(str::to_string),
        )
        .map_err(|e| errors.add(FormErrors::GENERAL, e.to_string()))
        .ok();

        let referee = non_empty(&self.referee);
        if let Some(referee) = referee {
            errors.check("referee", has_length(referee, 1..=64));
        }
        let venue = non_empty(&self.venue);
        if let Some(venue) = venue {
            errors.check("venue", has_length(venue, 1..=64));
        }
        let scheduled_at = errors.take(
            "scheduled_at",
            parse_optional(&self.scheduled_at, parse_datetime),
        );

        match (phase, scheduled_at, errors.is_empty()) {
            (Some(phase), Some(scheduled_at), true) => Ok(MatchInput {
                tournament_id: self.tournament_id.trim().to_string(),
                team_1_id: team_1_id.to_string(),
                team_2_id: team_2_id.to_string(),
                phase,
                referee: referee.map(str::to_string),
                scheduled_at,
                venue: venue.map(str::to_string),
            }),
            _ => Err(errors),
        }
    }
}

impl MatchInput {
    /// Both teams and the phase reference must belong to `tournament`.
    pub fn check_references(
        &self,
        tournament: &Tournament,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<FormErrors> {
        let mut errors = FormErrors::new();

        let teams = Team::of_tournament(&tournament.id, conn)?;
        for (field, team_id) in
            [("team_1_id", &self.team_1_id), ("team_2_id", &self.team_2_id)]
        {
            if !teams.iter().any(|t| &t.id == team_id) {
                errors.add(field, "that team is not part of this tournament");
            }
        }

        let matchdays = Matchday::of_tournament(&tournament.id, conn)?;
        let stages = KnockoutStage::of_tournament(&tournament.id, conn)?;
        if let Err(e) = self.phase.check(tournament, &matchdays, &stages) {
            let field = match self.phase {
                PhaseRef::Knockout { .. } => "knockout_stage_id",
                _ => "matchday_id",
            };
            errors.add(field, e.to_string());
        }

        Ok(errors)
    }
}

/// Options for the select inputs of a match form, all from one tournament.
#[derive(Default)]
pub struct MatchFormOptions {
    pub teams: Vec<(String, String)>,
    pub matchdays: Vec<(String, String)>,
    pub stages: Vec<(String, String)>,
}

impl MatchFormOptions {
    pub fn load(
        tournament: &Tournament,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self, FailureResponse> {
        let teams = Team::of_tournament(&tournament.id, conn)?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();
        let matchdays = if tournament.has_group_phase {
            Matchday::of_tournament(&tournament.id, conn)?
                .into_iter()
                .map(|md| {
                    let label = md.label();
                    (md.id, label)
                })
                .collect()
        } else {
            vec![]
        };
        let stages = if tournament.has_knockout_phase {
            KnockoutStage::of_tournament(&tournament.id, conn)?
                .into_iter()
                .map(|s| (s.id, s.name))
                .collect()
        } else {
            vec![]
        };
        Ok(Self {
            teams,
            matchdays,
            stages,
        })
    }
}

pub struct MatchFormFields<'r> {
    pub form: &'r MatchForm,
    pub errors: &'r FormErrors,
    pub tournament: &'r Tournament,
    pub options: &'r MatchFormOptions,
}

impl Renderable for MatchFormFields<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let form = self.form;
        let errors = self.errors;
        let options = self.options;
        maud! {
            FormErrorSummary errors=(errors);
            input type="hidden" name="tournament_id" value=(&form.tournament_id);
            div class="row" {
                div class="col-md-6" {
                    Select
                        label="Home team"
                        name="team_1_id"
                        options=(options.teams.as_slice())
                        selected=(&form.team_1_id)
                        errors=(errors)
                        allow_empty=(true);
                }
                div class="col-md-6" {
                    Select
                        label="Away team"
                        name="team_2_id"
                        options=(options.teams.as_slice())
                        selected=(&form.team_2_id)
                        errors=(errors)
                        allow_empty=(true);
                }
            }
            @if self.tournament.has_group_phase {
                Select
                    label="Matchday"
                    name="matchday_id"
                    options=(options.matchdays.as_slice())
                    selected=(&form.matchday_id)
                    errors=(errors)
                    allow_empty=(true);
            }
            @if self.tournament.has_knockout_phase {
                Select
                    label="Knockout stage"
                    name="knockout_stage_id"
                    options=(options.stages.as_slice())
                    selected=(&form.knockout_stage_id)
                    errors=(errors)
                    allow_empty=(true);
            }
            div class="form-text mb-3" {
                "A match belongs to a matchday or a knockout stage, or to neither while it is being arranged."
            }
            (TextInput::new("Kick-off", "scheduled_at", &form.scheduled_at, errors).kind("datetime-local"))
            div class="row" {
                div class="col-md-6" {
                    (TextInput::new("Venue", "venue", &form.venue, errors))
                }
                div class="col-md-6" {
                    (TextInput::new("Referee", "referee", &form.referee, errors))
                }
            }
        }
        .render_to(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournaments::phases::PhaseError;

    fn valid() -> MatchForm {
        MatchForm {
            tournament_id: "t".to_string(),
            team_1_id: "a".to_string(),
            team_2_id: "b".to_string(),
            matchday_id: "md1".to_string(),
            scheduled_at: "2026-03-07T19:30".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_a_group_fixture() {
        let input = valid().validate().unwrap();
        assert_eq!(
            input.phase,
            PhaseRef::Group {
                matchday_id: "md1".to_string()
            }
        );
        assert!(input.scheduled_at.is_some());
        assert_eq!(input.venue, None);
    }

    #[test]
    fn a_team_cannot_play_itself() {
        let form = MatchForm {
            team_2_id: "a".to_string(),
            ..valid()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get(FormErrors::GENERAL),
            Some("a team cannot play against itself")
        );
    }

    #[test]
    fn both_phases_are_rejected() {
        let form = MatchForm {
            knockout_stage_id: "final".to_string(),
            ..valid()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get(FormErrors::GENERAL),
            Some(PhaseError::BothPhases.to_string().as_str())
        );
    }
}
