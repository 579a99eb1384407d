//! Money in and out: registration fees, referees, venue hire and so on.
//! Amounts are stored as decimal strings and summed with [`Decimal`].

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{schema::transactions, util_resp::FailureResponse};

pub mod create;
pub mod edit;
pub mod export;
pub mod form;
pub mod list;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 2] =
        [TransactionKind::Income, TransactionKind::Expense];

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<TransactionKind> {
        TransactionKind::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionCategory {
    Registration,
    Referee,
    Venue,
    Equipment,
    Fine,
    Other,
}

impl TransactionCategory {
    pub const ALL: [TransactionCategory; 6] = [
        TransactionCategory::Registration,
        TransactionCategory::Referee,
        TransactionCategory::Venue,
        TransactionCategory::Equipment,
        TransactionCategory::Fine,
        TransactionCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionCategory::Registration => "registration",
            TransactionCategory::Referee => "referee",
            TransactionCategory::Venue => "venue",
            TransactionCategory::Equipment => "equipment",
            TransactionCategory::Fine => "fine",
            TransactionCategory::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionCategory::Registration => "Registration fee",
            TransactionCategory::Referee => "Referee",
            TransactionCategory::Venue => "Venue hire",
            TransactionCategory::Equipment => "Equipment",
            TransactionCategory::Fine => "Fine",
            TransactionCategory::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<TransactionCategory> {
        TransactionCategory::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

#[derive(Queryable, Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub tournament_id: Option<String>,
    pub team_id: Option<String>,
    pub kind: String,
    pub category: String,
    pub amount: String,
    pub description: String,
    pub occurred_on: NaiveDate,
    pub created_at: NaiveDateTime,
}

impl Transaction {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Transaction, FailureResponse> {
        transactions::table
            .filter(transactions::id.eq(id))
            .first::<Transaction>(conn)
            .optional()?
            .ok_or(FailureResponse::NotFound(()))
    }

    /// Newest first, optionally limited to one tournament.
    pub fn list(
        tournament_id: Option<&str>,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Transaction>> {
        let mut query = transactions::table
            .order_by((
                transactions::occurred_on.desc(),
                transactions::created_at.desc(),
            ))
            .into_boxed();
        if let Some(tid) = tournament_id {
            query = query.filter(transactions::tournament_id.eq(tid));
        }
        query.load::<Transaction>(conn)
    }

    pub fn kind(&self) -> TransactionKind {
        TransactionKind::parse(&self.kind).unwrap_or(TransactionKind::Expense)
    }

    pub fn category(&self) -> TransactionCategory {
        TransactionCategory::parse(&self.category)
            .unwrap_or(TransactionCategory::Other)
    }

    /// Rows with an unreadable amount count as zero.
    pub fn amount(&self) -> Decimal {
        Decimal::from_str(&self.amount).unwrap_or_else(|e| {
            tracing::warn!(transaction = %self.id, "unreadable amount: {e}");
            Decimal::ZERO
        })
    }

    /// Positive for income, negative for expenses.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind() {
            TransactionKind::Income => self.amount(),
            TransactionKind::Expense => -self.amount(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub income: Decimal,
    pub expenses: Decimal,
}

impl Summary {
    /// Rows whose amount would overflow a running total are left out.
    pub fn of(transactions: &[Transaction]) -> Summary {
        transactions.iter().fold(Summary::default(), |mut acc, t| {
            let total = match t.kind() {
                TransactionKind::Income => &mut acc.income,
                TransactionKind::Expense => &mut acc.expenses,
            };
            match total.checked_add(t.amount()) {
                Some(sum) => *total = sum,
                None => tracing::warn!(
                    transaction = %t.id,
                    "amount overflows the ledger total, leaving it out"
                ),
            }
            acc
        })
    }

    pub fn balance(&self) -> Decimal {
        self.income.saturating_sub(self.expenses)
    }
}

/// Two decimal places, e.g. `1250.00`.
pub fn format_money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction(kind: &str, amount: &str) -> Transaction {
        Transaction {
            id: "x".to_string(),
            tournament_id: None,
            team_id: None,
            kind: kind.to_string(),
            category: "other".to_string(),
            amount: amount.to_string(),
            description: String::new(),
            occurred_on: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            created_at: NaiveDate::from_ymd_opt(2026, 2, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn summary_balances_income_against_expenses() {
        let ts = [
            transaction("income", "150.50"),
            transaction("income", "49.50"),
            transaction("expense", "80.25"),
        ];
        let summary = Summary::of(&ts);
        assert_eq!(format_money(summary.income), "200.00");
        assert_eq!(format_money(summary.expenses), "80.25");
        assert_eq!(format_money(summary.balance()), "119.75");
        assert_eq!(format_money(ts[2].signed_amount()), "-80.25");
    }

    #[test]
    fn overflowing_amounts_are_left_out_of_the_totals() {
        let huge = Decimal::MAX.to_string();
        let summary = Summary::of(&[
            transaction("income", &huge),
            transaction("income", &huge),
            transaction("income", "10.00"),
            transaction("expense", &huge),
        ]);
        assert_eq!(summary.income, Decimal::MAX);
        assert_eq!(summary.expenses, Decimal::MAX);
        assert_eq!(summary.balance(), Decimal::ZERO);
    }

    #[test]
    fn unreadable_amounts_count_as_zero() {
        let summary = Summary::of(&[transaction("income", "lots")]);
        assert_eq!(summary.income, Decimal::ZERO);
    }
}
