//! Fills a database with a demonstration tournament: an administrator
//! account, a league with a full round-robin schedule, squads for every
//! team, some played matchdays and a few ledger entries.

use cancha::{
    MIGRATIONS,
    auth::hash_password,
    config::ScoringConfig,
    matches::{Match, outcome::MatchOutcome, result},
    schema::{
        matchdays, matches, players, teams, tournaments, transactions, users,
    },
};
use chrono::{Days, NaiveDate, Utc};
use clap::Parser;
use diesel::{SqliteConnection, prelude::*};
use diesel_migrations::MigrationHarness;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const TEAM_NAMES: [&str; 10] = [
    "Atlético Barrio",
    "Deportivo Azul",
    "Los Halcones",
    "Real Pista",
    "Sporting Norte",
    "Unión Sur",
    "Racing Central",
    "Estrella Roja",
    "Inter Plaza",
    "Olímpico Este",
];

const COLORS: [&str; 10] = [
    "#c0392b", "#2471a3", "#1e8449", "#d4ac0d", "#7d3c98", "#ca6f1e",
    "#17a589", "#922b21", "#212f3d", "#5d6d7e",
];

const FIRST_NAMES: [&str; 8] = [
    "Pablo", "Diego", "Mateo", "Lucas", "Iker", "Hugo", "Álvaro", "Javier",
];
const LAST_NAMES: [&str; 8] = [
    "García", "Martín", "López", "Sánchez", "Romero", "Navarro", "Torres",
    "Ruiz",
];
const POSITIONS: [&str; 8] = [
    "goalkeeper", "defender", "defender", "winger", "winger", "pivot",
    "pivot", "goalkeeper",
];

#[derive(Parser)]
struct Seed {
    /// Defaults to `DATABASE_URL`.
    #[arg(long)]
    database_url: Option<String>,
    /// Number of teams in the league (rounded down to an even number).
    #[arg(long, default_value_t = 6)]
    teams: usize,
    /// How many matchdays already have results.
    #[arg(long, default_value_t = 2)]
    played: usize,
}

/// Pairings for each matchday of a single round robin (circle method).
fn round_robin(n: usize) -> Vec<Vec<(usize, usize)>> {
    let mut ring: Vec<usize> = (0..n).collect();
    let mut rounds = Vec::with_capacity(n - 1);
    for _ in 0..n - 1 {
        rounds.push((0..n / 2).map(|i| (ring[i], ring[n - 1 - i])).collect());
        ring[1..].rotate_right(1);
    }
    rounds
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Seed::parse();
    let db_url = match args.database_url {
        Some(url) => url,
        None => std::env::var("DATABASE_URL").map_err(|_| {
            "please either set `DATABASE_URL` or pass `--database-url`"
        })?,
    };
    let n = (args.teams.clamp(2, TEAM_NAMES.len()) / 2) * 2;

    let mut conn = SqliteConnection::establish(&db_url)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| format!("could not run migrations: {e}"))?;

    conn.transaction::<_, Box<dyn std::error::Error>, _>(|conn| {
        let admin_exists = users::table
            .filter(users::username.eq("admin"))
            .count()
            .get_result::<i64>(conn)?
            > 0;
        if !admin_exists {
            diesel::insert_into(users::table)
                .values((
                    users::id.eq(Uuid::now_v7().to_string()),
                    users::email.eq("admin@example.com"),
                    users::username.eq("admin"),
                    users::password_hash.eq(hash_password("password")
                        .map_err(|e| format!("could not hash password: {e}"))?),
                    users::role.eq("admin"),
                    users::created_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;
            tracing::info!("created user `admin` with password `password`");
        }

        let start = NaiveDate::from_ymd_opt(2026, 1, 10).ok_or("bad date")?;
        let tid = Uuid::now_v7().to_string();
        diesel::insert_into(tournaments::table)
            .values((
                tournaments::id.eq(&tid),
                tournaments::name.eq("Liga de Invierno"),
                tournaments::category.eq("Senior"),
                tournaments::start_date.eq(start),
                tournaments::end_date.eq(None::<NaiveDate>),
                tournaments::has_group_phase.eq(true),
                tournaments::has_knockout_phase.eq(false),
                tournaments::created_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        let mut team_ids = Vec::with_capacity(n);
        for (i, name) in TEAM_NAMES.iter().take(n).enumerate() {
            let team_id = Uuid::now_v7().to_string();
            diesel::insert_into(teams::table)
                .values((
                    teams::id.eq(&team_id),
                    teams::tournament_id.eq(&tid),
                    teams::name.eq(*name),
                    teams::category.eq("Senior"),
                    teams::primary_color.eq(COLORS[i]),
                    teams::secondary_color.eq(None::<String>),
                    teams::level.eq((i % 5) as i64 + 1),
                    teams::director_id.eq(None::<String>),
                    teams::logo_url.eq(None::<String>),
                    teams::created_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;

            for (j, (first, position)) in
                FIRST_NAMES.iter().zip(POSITIONS).enumerate()
            {
                diesel::insert_into(players::table)
                    .values((
                        players::id.eq(Uuid::now_v7().to_string()),
                        players::team_id.eq(&team_id),
                        players::first_name.eq(*first),
                        players::last_name.eq(LAST_NAMES[(i + j) % LAST_NAMES.len()]),
                        players::jersey_number.eq(Some(j as i64 + 1)),
                        players::position.eq(position),
                        players::level.eq(((i + j) % 5) as i64 + 1),
                        players::birth_date.eq(None::<NaiveDate>),
                        players::created_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)?;
            }
            team_ids.push(team_id);
        }

        let scoring = ScoringConfig::default();
        for (round, pairings) in round_robin(n).into_iter().enumerate() {
            let date = start
                .checked_add_days(Days::new(7 * round as u64))
                .ok_or("date out of range")?;
            let matchday_id = Uuid::now_v7().to_string();
            diesel::insert_into(matchdays::table)
                .values((
                    matchdays::id.eq(&matchday_id),
                    matchdays::tournament_id.eq(&tid),
                    matchdays::number.eq(round as i64 + 1),
                    matchdays::name.eq(None::<String>),
                    matchdays::date.eq(Some(date)),
                ))
                .execute(conn)?;

            for (slot, (home, away)) in pairings.into_iter().enumerate() {
                let match_id = Uuid::now_v7().to_string();
                diesel::insert_into(matches::table)
                    .values((
                        matches::id.eq(&match_id),
                        matches::tournament_id.eq(&tid),
                        matches::team_1_id.eq(&team_ids[home]),
                        matches::team_2_id.eq(&team_ids[away]),
                        matches::matchday_id.eq(Some(matchday_id.clone())),
                        matches::scheduled_at
                            .eq(date.and_hms_opt(18 + slot as u32, 0, 0)),
                        matches::venue.eq(Some("Pabellón Municipal".to_string())),
                        matches::status.eq("scheduled"),
                        matches::created_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)?;

                if round < args.played {
                    let m = Match::fetch(&match_id, conn)
                        .map_err(|_| "the match just inserted is missing")?;
                    let outcome = MatchOutcome::Regular {
                        goals_1: ((home * 3 + round) % 5) as i64,
                        goals_2: ((away * 2 + slot) % 4) as i64,
                    };
                    result::record(&m, &outcome, &scoring, conn)?;
                }
            }
        }

        for (i, team_id) in team_ids.iter().enumerate() {
            diesel::insert_into(transactions::table)
                .values((
                    transactions::id.eq(Uuid::now_v7().to_string()),
                    transactions::tournament_id.eq(Some(tid.clone())),
                    transactions::team_id.eq(Some(team_id.clone())),
                    transactions::kind.eq("income"),
                    transactions::category.eq("registration"),
                    transactions::amount.eq("150.00"),
                    transactions::description
                        .eq(format!("Registration fee: {}", TEAM_NAMES[i])),
                    transactions::occurred_on.eq(start),
                    transactions::created_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;
        }
        diesel::insert_into(transactions::table)
            .values((
                transactions::id.eq(Uuid::now_v7().to_string()),
                transactions::tournament_id.eq(Some(tid.clone())),
                transactions::team_id.eq(None::<String>),
                transactions::kind.eq("expense"),
                transactions::category.eq("venue"),
                transactions::amount.eq("420.00"),
                transactions::description.eq("Court hire, first half of season"),
                transactions::occurred_on.eq(start),
                transactions::created_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;

        tracing::info!(tournament = %tid, teams = n, "seeded demonstration data");
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pair_meets_exactly_once() {
        let rounds = round_robin(6);
        assert_eq!(rounds.len(), 5);
        let mut pairs: Vec<(usize, usize)> = rounds
            .into_iter()
            .flatten()
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), 15);
    }
}
