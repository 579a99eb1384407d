use chrono::NaiveDate;
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    template::form::{Checkbox, FormErrorSummary, TextInput},
    tournaments::Tournament,
    validation::{FormErrors, has_length, non_empty, parse_date, parse_optional},
};

/// The raw contents of the create and edit forms.
#[derive(Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct TournamentForm {
    pub name: String,
    pub category: String,
    pub start_date: String,
    pub end_date: String,
    /// Checkboxes are only submitted when ticked.
    pub has_group_phase: Option<String>,
    pub has_knockout_phase: Option<String>,
}

/// A validated [`TournamentForm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentInput {
    pub name: String,
    pub category: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub has_group_phase: bool,
    pub has_knockout_phase: bool,
}

impl TournamentForm {
    pub fn new() -> Self {
        Self {
            has_group_phase: Some("on".to_string()),
            ..Default::default()
        }
    }

    pub fn of_tournament(tournament: &Tournament) -> Self {
        Self {
            name: tournament.name.clone(),
            category: tournament.category.clone(),
            start_date: tournament.start_date.to_string(),
            end_date: tournament
                .end_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            has_group_phase: tournament.has_group_phase.then(|| "on".into()),
            has_knockout_phase: tournament
                .has_knockout_phase
                .then(|| "on".into()),
        }
    }

    pub fn validate(&self) -> Result<TournamentInput, FormErrors> {
        let mut errors = FormErrors::new();

        let name = self.name.trim();
        errors.check("name", has_length(name, 3..=64));
        let category = self.category.trim();
        errors.check("category", has_length(category, 1..=32));

        let start_date = errors.take("start_date", parse_date(&self.start_date));
        let end_date =
            errors.take("end_date", parse_optional(&self.end_date, parse_date));

        if let (Some(start), Some(Some(end))) = (start_date, end_date)
            && end < start
        {
            errors.add("end_date", "the tournament cannot end before it starts");
        }

        let has_group_phase = self.has_group_phase.as_deref().and_then(non_empty).is_some();
        let has_knockout_phase =
            self.has_knockout_phase.as_deref().and_then(non_empty).is_some();
        if !has_group_phase && !has_knockout_phase {
            errors.add(
                FormErrors::GENERAL,
                "a tournament needs a group phase, a knockout phase, or both",
            );
        }

        match (start_date, end_date, errors.is_empty()) {
            (Some(start_date), Some(end_date), true) => Ok(TournamentInput {
                name: name.to_string(),
                category: category.to_string(),
                start_date,
                end_date,
                has_group_phase,
                has_knockout_phase,
            }),
            _ => Err(errors),
        }
    }
}

pub struct TournamentFormFields<'r> {
    pub form: &'r TournamentForm,
    pub errors: &'r FormErrors,
}

impl Renderable for TournamentFormFields<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let form = self.form;
        let errors = self.errors;
        maud! {
            FormErrorSummary errors=(errors);
            (TextInput::new("Name", "name", &form.name, errors)
                .help("The full name of the tournament."))
            (TextInput::new("Category", "category", &form.category, errors)
                .help("For example \"U-12\", \"Senior\" or \"Women's open\"."))
            div class="row" {
                div class="col-md-6" {
                    (TextInput::new("Start date", "start_date", &form.start_date, errors).kind("date"))
                }
                div class="col-md-6" {
                    (TextInput::new("End date", "end_date", &form.end_date, errors).kind("date"))
                }
            }
            Checkbox
                label="Group phase (matchdays)"
                name="has_group_phase"
                checked=(form.has_group_phase.is_some());
            Checkbox
                label="Knockout phase"
                name="has_knockout_phase"
                checked=(form.has_knockout_phase.is_some());
        }
        .render_to(buffer);
    }
}
