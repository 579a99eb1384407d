use std::str::FromStr;

use chrono::NaiveDate;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use hypertext::prelude::*;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    finances::{Transaction, TransactionCategory, TransactionKind},
    teams::Team,
    template::form::{FormErrorSummary, Select, TextInput},
    tournaments::Tournament,
    validation::{FormErrors, has_length, non_empty, parse_date},
};

#[derive(Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct TransactionForm {
    pub kind: String,
    pub category: String,
    pub amount: String,
    pub description: String,
    pub occurred_on: String,
    pub tournament_id: String,
    pub team_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInput {
    pub kind: TransactionKind,
    pub category: TransactionCategory,
    pub amount: Decimal,
    pub description: String,
    pub occurred_on: NaiveDate,
    pub tournament_id: Option<String>,
    pub team_id: Option<String>,
}

/// Largest amount a single transaction may record.
pub const MAX_AMOUNT: i64 = 1_000_000_000;

/// A positive amount with at most two decimal places, stored with exactly
/// two.
pub fn parse_amount(string: &str) -> Result<Decimal, String> {
    let amount = Decimal::from_str(string.trim())
        .map_err(|_| "must be an amount such as 120.50".to_string())?;
    if amount <= Decimal::ZERO {
        return Err("must be greater than zero".to_string());
    }
    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(format!("cannot be more than {MAX_AMOUNT}"));
    }
    if amount.normalize().scale() > 2 {
        return Err("cannot have more than two decimal places".to_string());
    }
    let mut amount = amount;
    amount.rescale(2);
    Ok(amount)
}

impl TransactionForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            kind: TransactionKind::Income.as_str().to_string(),
            category: TransactionCategory::Registration.as_str().to_string(),
            occurred_on: today.to_string(),
            ..Default::default()
        }
    }

    pub fn of_transaction(t: &Transaction) -> Self {
        Self {
            kind: t.kind.clone(),
            category: t.category.clone(),
            amount: t.amount.clone(),
            description: t.description.clone(),
            occurred_on: t.occurred_on.to_string(),
            tournament_id: t.tournament_id.clone().unwrap_or_default(),
            team_id: t.team_id.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<TransactionInput, FormErrors> {
        let mut errors = FormErrors::new();

        let kind = TransactionKind::parse(self.kind.trim());
        if kind.is_none() {
            errors.add("kind", "choose income or expense");
        }
        let category = TransactionCategory::parse(self.category.trim());
        if category.is_none() {
            errors.add("category", "choose a category");
        }
        let amount = errors.take("amount", parse_amount(&self.amount));
        let description = self.description.trim();
        errors.check("description", has_length(description, 1..=200));
        let occurred_on = errors.take("occurred_on", parse_date(&self.occurred_on));

        match (kind, category, amount, occurred_on, errors.is_empty()) {
            (
                Some(kind),
                Some(category),
                Some(amount),
                Some(occurred_on),
                true,
            ) => Ok(TransactionInput {
                kind,
                category,
                amount,
                description: description.to_string(),
                occurred_on,
                tournament_id: non_empty(&self.tournament_id).map(str::to_string),
                team_id: non_empty(&self.team_id).map(str::to_string),
            }),
            _ => Err(errors),
        }
    }
}

impl TransactionInput {
    /// A team, if given, must exist; so must the tournament, and the team
    /// must be part of it. With only a team, the team's tournament is used.
    pub fn resolve_references(
        &mut self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<FormErrors> {
        let mut errors = FormErrors::new();

        let team = match &self.team_id {
            Some(id) => match Team::fetch(id, conn) {
                Ok(team) => Some(team),
                Err(_) => {
                    errors.add("team_id", "no such team");
                    None
                }
            },
            None => None,
        };

        match (self.tournament_id.clone(), team) {
            (Some(tid), team) => {
                let exists = Tournament::all(conn)?.iter().any(|t| t.id == tid);
                if !exists {
                    errors.add("tournament_id", "no such tournament");
                } else if team.is_some_and(|team| team.tournament_id != tid) {
                    errors.add(
                        "team_id",
                        "that team is not part of the chosen tournament",
                    );
                }
            }
            (None, Some(team)) => {
                self.tournament_id = Some(team.tournament_id);
            }
            (None, None) => {}
        }

        Ok(errors)
    }
}

pub struct TransactionFormFields<'r> {
    pub form: &'r TransactionForm,
    pub errors: &'r FormErrors,
    pub tournaments: &'r [(String, String)],
    pub teams: &'r [(String, String)],
}

impl Renderable for TransactionFormFields<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let form = self.form;
        let errors = self.errors;
        let kinds: Vec<(String, String)> = vec![
            ("income".to_string(), "Income".to_string()),
            ("expense".to_string(), "Expense".to_string()),
        ];
        let categories: Vec<(String, String)> = TransactionCategory::ALL
            .into_iter()
            .map(|c| (c.as_str().to_string(), c.label().to_string()))
            .collect();
        maud! {
            FormErrorSummary errors=(errors);
            div class="row" {
                div class="col-md-4" {
                    Select
                        label="Kind"
                        name="kind"
                        options=(kinds.as_slice())
                        selected=(&form.kind)
                        errors=(errors)
                        allow_empty=(false);
                }
                div class="col-md-4" {
                    Select
                        label="Category"
                        name="category"
                        options=(categories.as_slice())
                        selected=(&form.category)
                        errors=(errors)
                        allow_empty=(false);
                }
                div class="col-md-4" {
                    (TextInput::new("Amount", "amount", &form.amount, errors)
                        .help("Positive, up to two decimal places."))
                }
            }
            (TextInput::new("Description", "description", &form.description, errors))
            (TextInput::new("Date", "occurred_on", &form.occurred_on, errors).kind("date"))
            div class="row" {
                div class="col-md-6" {
                    Select
                        label="Tournament"
                        name="tournament_id"
                        options=(self.tournaments)
                        selected=(&form.tournament_id)
                        errors=(errors)
                        allow_empty=(true);
                }
                div class="col-md-6" {
                    Select
                        label="Team"
                        name="team_id"
                        options=(self.teams)
                        selected=(&form.team_id)
                        errors=(errors)
                        allow_empty=(true);
                }
            }
        }
        .render_to(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_are_positive_with_two_decimals() {
        assert_eq!(parse_amount("120.5").unwrap().to_string(), "120.50");
        assert_eq!(parse_amount(" 40 ").unwrap().to_string(), "40.00");
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-3").is_err());
        assert!(parse_amount("1.005").is_err());
        assert!(parse_amount("abc").is_err());
        // trailing zeros are not extra precision
        assert!(parse_amount("2.500").is_ok());
    }

    #[test]
    fn amounts_are_capped() {
        assert_eq!(
            parse_amount("1000000000").unwrap().to_string(),
            "1000000000.00"
        );
        assert_eq!(
            parse_amount("1000000000.01"),
            Err("cannot be more than 1000000000".to_string())
        );
        assert!(parse_amount("79228162514264337593543950335").is_err());
    }

    #[test]
    fn validates_each_field() {
        let form = TransactionForm {
            kind: "gift".to_string(),
            category: "snacks".to_string(),
            amount: "-1".to_string(),
            description: String::new(),
            occurred_on: "yesterday".to_string(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        for field in ["kind", "category", "amount", "description", "occurred_on"] {
            assert!(errors.contains(field), "{field} should be rejected");
        }
    }

    #[test]
    fn blank_references_are_absent() {
        let mut form =
            TransactionForm::new(NaiveDate::from_ymd_opt(2026, 4, 2).unwrap());
        form.amount = "75".to_string();
        form.description = "Court hire".to_string();
        let input = form.validate().unwrap();
        assert_eq!(input.tournament_id, None);
        assert_eq!(input.team_id, None);
        assert_eq!(input.kind, TransactionKind::Income);
    }
}
