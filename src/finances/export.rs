use std::collections::HashMap;

use axum::extract::Query;

use crate::{
    auth::User,
    finances::{Transaction, format_money, list::LedgerQuery},
    state::Conn,
    teams::Team,
    tournaments::Tournament,
    util_resp::{FailureResponse, StandardResponse, SuccessResponse},
};

/// Writes the ledger as CSV, one row per transaction, with a signed amount
/// column so that a spreadsheet sum gives the balance.
pub fn write_csv(
    transactions: &[Transaction],
    tournament_names: &HashMap<String, String>,
    team_names: &HashMap<String, String>,
) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "date",
        "kind",
        "category",
        "description",
        "tournament",
        "team",
        "amount",
        "signed_amount",
    ])?;
    let name_of = |names: &HashMap<String, String>, id: &Option<String>| {
        id.as_ref()
            .map(|id| names.get(id).cloned().unwrap_or_else(|| id.clone()))
            .unwrap_or_default()
    };
    for t in transactions {
        writer.write_record([
            t.occurred_on.to_string(),
            t.kind().as_str().to_string(),
            t.category().as_str().to_string(),
            t.description.clone(),
            name_of(tournament_names, &t.tournament_id),
            name_of(team_names, &t.team_id),
            format_money(t.amount()),
            format_money(t.signed_amount()),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub async fn export_transactions_csv(
    _user: User,
    mut conn: Conn,
    Query(query): Query<LedgerQuery>,
) -> StandardResponse {
    let transactions = Transaction::list(query.tournament_id(), &mut *conn)?;
    let tournament_names: HashMap<String, String> = Tournament::all(&mut *conn)?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();
    let team_names = Team::names(&mut *conn)?;

    let body = write_csv(&transactions, &tournament_names, &team_names)
        .map_err(|e| {
            tracing::error!("could not write the ledger export: {e}");
            FailureResponse::ServerError(())
        })?;

    tracing::info!(rows = transactions.len(), "exported ledger");

    let filename = match query.tournament_id() {
        Some(tid) => format!("ledger-{tid}.csv"),
        None => "ledger.csv".to_string(),
    };
    Ok(SuccessResponse::Csv { filename, body })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn exports_signed_amounts_and_quotes_commas() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let t = Transaction {
            id: "t1".to_string(),
            tournament_id: Some("cup".to_string()),
            team_id: None,
            kind: "expense".to_string(),
            category: "venue".to_string(),
            amount: "60.00".to_string(),
            description: "Court hire, evening".to_string(),
            occurred_on: date,
            created_at: date.and_hms_opt(9, 0, 0).unwrap(),
        };
        let tournaments =
            HashMap::from([("cup".to_string(), "Winter Cup".to_string())]);

        let csv = write_csv(&[t], &tournaments, &HashMap::new()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("date,kind,category,description,tournament,team,amount,signed_amount")
        );
        assert_eq!(
            lines.next(),
            Some("2026-03-01,expense,venue,\"Court hire, evening\",Winter Cup,,60.00,-60.00")
        );
        assert_eq!(lines.next(), None);
    }
}
