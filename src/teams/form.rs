use diesel::{
    connection::LoadConnection, dsl::exists, prelude::*, select, sqlite::Sqlite,
};
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    auth::User,
    schema::{teams, tournaments},
    teams::Team,
    template::form::{FormErrorSummary, Select, TextInput},
    validation::{
        FormErrors, has_length, is_valid_hex_color, is_valid_http_url,
        is_valid_uuid, non_empty, parse_level,
    },
};

#[derive(Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct TeamForm {
    pub tournament_id: String,
    pub name: String,
    pub category: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub level: String,
    pub director_id: String,
    pub logo_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamInput {
    pub tournament_id: String,
    pub name: String,
    /// Falls back to the tournament's category when blank.
    pub category: Option<String>,
    pub primary_color: String,
    pub secondary_color: Option<String>,
    pub level: i64,
    pub director_id: Option<String>,
    pub logo_url: Option<String>,
}

impl TeamForm {
    pub fn new(tournament_id: Option<String>) -> Self {
        Self {
            tournament_id: tournament_id.unwrap_or_default(),
            primary_color: "#ffffff".to_string(),
            level: "3".to_string(),
            ..Default::default()
        }
    }

    pub fn of_team(team: &Team) -> Self {
        Self {
            tournament_id: team.tournament_id.clone(),
            name: team.name.clone(),
            category: team.category.clone(),
            primary_color: team.primary_color.clone(),
            secondary_color: team.secondary_color.clone().unwrap_or_default(),
            level: team.level.to_string(),
            director_id: team.director_id.clone().unwrap_or_default(),
            logo_url: team.logo_url.clone().unwrap_or_default(),
        }
    }

    /// Checks the fields on their own. See [`TeamInput::check_references`]
    /// for the checks which need the database.
    pub fn validate(&self) -> Result<TeamInput, FormErrors> {
        let mut errors = FormErrors::new();

        let tournament_id = self.tournament_id.trim();
        if tournament_id.is_empty() {
            errors.add("tournament_id", "choose a tournament");
        }

        let name = self.name.trim();
        errors.check("name", has_length(name, 2..=64));

        let category = non_empty(&self.category);
        if let Some(category) = category {
            errors.check("category", has_length(category, 1..=32));
        }

        let primary_color = self.primary_color.trim();
        errors.check("primary_color", is_valid_hex_color(primary_color));
        let secondary_color = non_empty(&self.secondary_color);
        if let Some(color) = secondary_color {
            errors.check("secondary_color", is_valid_hex_color(color));
        }

        let level = errors.take("level", parse_level(&self.level));

        let director_id = non_empty(&self.director_id);
        if let Some(id) = director_id {
            errors.check("director_id", is_valid_uuid(id));
        }

        let logo_url = non_empty(&self.logo_url);
        if let Some(url) = logo_url {
            errors.check("logo_url", is_valid_http_url(url));
        }

        match (level, errors.is_empty()) {
            (Some(level), true) => Ok(TeamInput {
                tournament_id: tournament_id.to_string(),
                name: name.to_string(),
                category: category.map(str::to_string),
                primary_color: primary_color.to_lowercase(),
                secondary_color: secondary_color.map(str::to_lowercase),
                level,
                director_id: director_id.map(str::to_string),
                logo_url: logo_url.map(str::to_string),
            }),
            _ => Err(errors),
        }
    }
}

impl TeamInput {
    /// The tournament and director must exist, and no other team of the
    /// tournament may have the same name.
    pub fn check_references(
        &self,
        editing: Option<&str>,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<FormErrors> {
        let mut errors = FormErrors::new();

        let tournament_exists = select(exists(
            tournaments::table.filter(tournaments::id.eq(&self.tournament_id)),
        ))
        .get_result::<bool>(conn)?;
        if !tournament_exists {
            errors.add("tournament_id", "no such tournament");
        }

        if let Some(director) = &self.director_id
            && User::fetch(director, conn)?.is_none()
        {
            errors.add("director_id", "no such user");
        }

        let same_name = teams::table
            .filter(teams::tournament_id.eq(&self.tournament_id))
            .filter(teams::name.eq(&self.name))
            .select(teams::id)
            .load::<String>(conn)?;
        if same_name.iter().any(|id| Some(id.as_str()) != editing) {
            errors.add(
                "name",
                "another team in this tournament already has that name",
            );
        }

        Ok(errors)
    }
}

pub struct TeamFormFields<'r> {
    pub form: &'r TeamForm,
    pub errors: &'r FormErrors,
    /// `None` once the team exists; teams cannot move between tournaments.
    pub tournaments: Option<&'r [(String, String)]>,
    pub directors: &'r [(String, String)],
}

impl Renderable for TeamFormFields<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let form = self.form;
        let errors = self.errors;
        maud! {
            FormErrorSummary errors=(errors);
            @if let Some(tournaments) = self.tournaments {
                Select
                    label="Tournament"
                    name="tournament_id"
                    options=(tournaments)
                    selected=(&form.tournament_id)
                    errors=(errors)
                    allow_empty=(true);
            }
            (TextInput::new("Name", "name", &form.name, errors))
            (TextInput::new("Category", "category", &form.category, errors)
                .help("Leave blank to use the tournament's category."))
            div class="row" {
                div class="col-md-6" {
                    (TextInput::new("Primary colour", "primary_color", &form.primary_color, errors)
                        .kind("color"))
                }
                div class="col-md-6" {
                    (TextInput::new("Secondary colour", "secondary_color", &form.secondary_color, errors)
                        .help("Optional, e.g. #1a2b3c."))
                }
            }
            (TextInput::new("Level", "level", &form.level, errors)
                .kind("number")
                .help("From 1 (recreational) to 5 (competitive)."))
            Select
                label="Director"
                name="director_id"
                options=(self.directors)
                selected=(&form.director_id)
                errors=(errors)
                allow_empty=(true);
            (TextInput::new("Logo URL", "logo_url", &form.logo_url, errors)
                .kind("url"))
        }
        .render_to(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> TeamForm {
        TeamForm {
            tournament_id: "0192d5b0-0000-7000-8000-000000000000".to_string(),
            name: "Los Halcones".to_string(),
            category: String::new(),
            primary_color: "#00AA55".to_string(),
            secondary_color: " ".to_string(),
            level: "4".to_string(),
            director_id: String::new(),
            logo_url: "https://example.com/halcones.png".to_string(),
        }
    }

    #[test]
    fn blank_optional_fields_are_absent() {
        let input = valid().validate().unwrap();
        assert_eq!(input.category, None);
        assert_eq!(input.secondary_color, None);
        assert_eq!(input.director_id, None);
        assert_eq!(input.primary_color, "#00aa55");
    }

    #[test]
    fn rejects_bad_colours_levels_and_links() {
        let form = TeamForm {
            primary_color: "green".to_string(),
            secondary_color: "#12345".to_string(),
            level: "9".to_string(),
            logo_url: "javascript:alert(1)".to_string(),
            director_id: "nobody".to_string(),
            ..valid()
        };
        let errors = form.validate().unwrap_err();
        for field in [
            "primary_color",
            "secondary_color",
            "level",
            "logo_url",
            "director_id",
        ] {
            assert!(errors.contains(field), "{field} should be rejected");
        }
    }

    #[test]
    fn names_have_bounds() {
        let form = TeamForm {
            name: "X".to_string(),
            ..valid()
        };
        assert!(form.validate().unwrap_err().contains("name"));
    }
}
