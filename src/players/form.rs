use chrono::NaiveDate;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    players::{Player, Position},
    schema::{players, teams},
    template::form::{FormErrorSummary, Select, TextInput},
    validation::{
        FormErrors, has_length, parse_date, parse_int_in, parse_level,
        parse_optional,
    },
};

#[derive(Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct PlayerForm {
    pub team_id: String,
    pub first_name: String,
    pub last_name: String,
    pub jersey_number: String,
    pub position: String,
    pub level: String,
    pub birth_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInput {
    pub team_id: String,
    pub first_name: String,
    pub last_name: String,
    pub jersey_number: Option<i64>,
    pub position: Position,
    pub level: i64,
    pub birth_date: Option<NaiveDate>,
}

impl PlayerForm {
    pub fn new(team_id: Option<String>) -> Self {
        Self {
            team_id: team_id.unwrap_or_default(),
            position: Position::Winger.as_str().to_string(),
            level: "3".to_string(),
            ..Default::default()
        }
    }

    pub fn of_player(player: &Player) -> Self {
        Self {
            team_id: player.team_id.clone(),
            first_name: player.first_name.clone(),
            last_name: player.last_name.clone(),
            jersey_number: player
                .jersey_number
                .map(|n| n.to_string())
                .unwrap_or_default(),
            position: player.position.clone(),
            level: player.level.to_string(),
            birth_date: player
                .birth_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<PlayerInput, FormErrors> {
        let mut errors = FormErrors::new();

        let team_id = self.team_id.trim();
        if team_id.is_empty() {
            errors.add("team_id", "choose a team");
        }
        let first_name = self.first_name.trim();
        errors.check("first_name", has_length(first_name, 1..=64));
        let last_name = self.last_name.trim();
        errors.check("last_name", has_length(last_name, 1..=64));

        let jersey_number = errors.take(
            "jersey_number",
            parse_optional(&self.jersey_number, |s| parse_int_in(s, 1..=99)),
        );
        let position = Position::parse(self.position.trim());
        if position.is_none() {
            errors.add("position", "choose a position");
        }
        let level = errors.take("level", parse_level(&self.level));
        let birth_date =
            errors.take("birth_date", parse_optional(&self.birth_date, parse_date));

        match (jersey_number, position, level, birth_date, errors.is_empty()) {
            (
                Some(jersey_number),
                Some(position),
                Some(level),
                Some(birth_date),
                true,
            ) => Ok(PlayerInput {
                team_id: team_id.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                jersey_number,
                position,
                level,
                birth_date,
            }),
            _ => Err(errors),
        }
    }
}

impl PlayerInput {
    /// The team must exist and the shirt number must be free within it.
    pub fn check_references(
        &self,
        editing: Option<&str>,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<FormErrors> {
        let mut errors = FormErrors::new();

        let team_exists = teams::table
            .filter(teams::id.eq(&self.team_id))
            .count()
            .get_result::<i64>(conn)?
            > 0;
        if !team_exists {
            errors.add("team_id", "no such team");
        }

        if let Some(number) = self.jersey_number {
            let wearing = players::table
                .filter(players::team_id.eq(&self.team_id))
                .filter(players::jersey_number.eq(number))
                .select(players::id)
                .load::<String>(conn)?;
            if wearing.iter().any(|id| Some(id.as_str()) != editing) {
                errors.add(
                    "jersey_number",
                    format!("another player of this team already wears {number}"),
                );
            }
        }

        Ok(errors)
    }
}

pub struct PlayerFormFields<'r> {
    pub form: &'r PlayerForm,
    pub errors: &'r FormErrors,
    pub teams: &'r [(String, String)],
}

impl Renderable for PlayerFormFields<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let form = self.form;
        let errors = self.errors;
        let positions = Position::options();
        maud! {
            FormErrorSummary errors=(errors);
            Select
                label="Team"
                name="team_id"
                options=(self.teams)
                selected=(&form.team_id)
                errors=(errors)
                allow_empty=(true);
            div class="row" {
                div class="col-md-6" {
                    (TextInput::new("First name", "first_name", &form.first_name, errors))
                }
                div class="col-md-6" {
                    (TextInput::new("Last name", "last_name", &form.last_name, errors))
                }
            }
            div class="row" {
                div class="col-md-4" {
                    (TextInput::new("Shirt number", "jersey_number", &form.jersey_number, errors)
                        .kind("number")
                        .help("Optional, 1 to 99."))
                }
                div class="col-md-4" {
                    Select
                        label="Position"
                        name="position"
                        options=(positions.as_slice())
                        selected=(&form.position)
                        errors=(errors)
                        allow_empty=(false);
                }
                div class="col-md-4" {
                    (TextInput::new("Level", "level", &form.level, errors).kind("number"))
                }
            }
            (TextInput::new("Date of birth", "birth_date", &form.birth_date, errors).kind("date"))
        }
        .render_to(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> PlayerForm {
        PlayerForm {
            team_id: "team".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Rivas".to_string(),
            jersey_number: "10".to_string(),
            position: "pivot".to_string(),
            level: "5".to_string(),
            birth_date: "2001-03-14".to_string(),
        }
    }

    #[test]
    fn parses_a_player() {
        let input = valid().validate().unwrap();
        assert_eq!(input.jersey_number, Some(10));
        assert_eq!(input.position, Position::Pivot);
        assert_eq!(input.birth_date, NaiveDate::from_ymd_opt(2001, 3, 14));
    }

    #[test]
    fn shirt_numbers_are_optional_and_bounded() {
        let mut form = valid();
        form.jersey_number = String::new();
        assert_eq!(form.validate().unwrap().jersey_number, None);

        for bad in ["0", "100", "7a"] {
            form.jersey_number = bad.to_string();
            assert!(form.validate().unwrap_err().contains("jersey_number"));
        }
    }

    #[test]
    fn positions_must_be_known() {
        let form = PlayerForm {
            position: "striker".to_string(),
            ..valid()
        };
        assert!(form.validate().unwrap_err().contains("position"));
    }
}
