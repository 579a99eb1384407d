use std::collections::HashMap;

use axum::extract::Query;
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    auth::User,
    finances::{Summary, Transaction, TransactionKind, format_money},
    permission::Permission,
    state::Conn,
    teams::Team,
    template::{Page, Section},
    tournaments::Tournament,
    util_resp::{StandardResponse, degrade, success},
    widgets::{actions::Actions, alert::InfoAlert, card::StatCard},
};

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LedgerQuery {
    pub tournament_id: Option<String>,
}

impl LedgerQuery {
    pub fn tournament_id(&self) -> Option<&str> {
        self.tournament_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

pub async fn list_transactions_page(
    user: User,
    mut conn: Conn,
    Query(query): Query<LedgerQuery>,
) -> StandardResponse {
    let tournament = match query.tournament_id() {
        Some(tid) => Some(Tournament::fetch(tid, &mut *conn)?),
        None => None,
    };

    let transactions = degrade(
        "transactions",
        Transaction::list(query.tournament_id(), &mut *conn),
    );
    let summary = Summary::of(&transactions);
    let tournaments = degrade("tournaments", Tournament::options(&mut *conn));
    let tournament_names: HashMap<String, String> =
        tournaments.iter().cloned().collect();
    let team_names = degrade("team names", Team::names(&mut *conn));

    let export_href = match query.tournament_id() {
        Some(tid) => format!("/finances/export.csv?tournament_id={tid}"),
        None => "/finances/export.csv".to_string(),
    };
    let mut actions = vec![(export_href.as_str(), "Export CSV")];
    if user.can(Permission::ManageFinances) {
        actions.insert(0, ("/finances/create", "Record a transaction"));
    }
    let can_edit = user.can(Permission::ManageFinances);

    let income = format_money(summary.income);
    let expenses = format_money(summary.expenses);
    let balance = format_money(summary.balance());
    let selected = query.tournament_id().unwrap_or("").to_string();

    success(
        Page::new()
            .user(user)
            .section(Section::Finances)
            .body(maud! {
                h1 {
                    "Finances"
                    @if let Some(t) = &tournament {
                        small class="text-muted" { " · " (t.name) }
                    }
                }
                Actions options=(actions.as_slice());
                form method="get" class="row g-2 mb-3" {
                    div class="col-auto" {
                        select class="form-select" name="tournament_id" {
                            option value="" selected[selected.is_empty()] { "All tournaments" }
                            @for (id, label) in &tournaments {
                                option value=(id) selected[id == &selected] { (label) }
                            }
                        }
                    }
                    div class="col-auto" {
                        button type="submit" class="btn btn-outline-secondary" { "Filter" }
                    }
                }
                div class="row" {
                    StatCard label="Income" value=(&income) href="#ledger";
                    StatCard label="Expenses" value=(&expenses) href="#ledger";
                    StatCard label="Balance" value=(&balance) href="#ledger";
                }
                @if transactions.is_empty() {
                    InfoAlert msg="No transactions recorded.";
                } @else {
                    table class="table table-sm" id="ledger" {
                        thead {
                            tr {
                                th scope="col" { "Date" }
                                th scope="col" { "Category" }
                                th scope="col" { "Description" }
                                th scope="col" { "Tournament" }
                                th scope="col" { "Team" }
                                th scope="col" class="text-end" { "Amount" }
                                @if can_edit { th scope="col" {} }
                            }
                        }
                        tbody {
                            @for t in &transactions {
                                tr {
                                    td { (t.occurred_on.to_string()) }
                                    td { (t.category().label()) }
                                    td { (t.description) }
                                    td {
                                        @if let Some(tid) = &t.tournament_id {
                                            (tournament_names.get(tid).map(String::as_str).unwrap_or("?"))
                                        }
                                    }
                                    td {
                                        @if let Some(team_id) = &t.team_id {
                                            (team_names.get(team_id).map(String::as_str).unwrap_or("?"))
                                        }
                                    }
                                    td class=(match t.kind() {
                                        TransactionKind::Income => "text-end text-success",
                                        TransactionKind::Expense => "text-end text-danger",
                                    }) {
                                        (format_money(t.signed_amount()))
                                    }
                                    @if can_edit {
                                        td {
                                            a href=(format!("/finances/{}/edit", t.id)) { "Edit" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}
