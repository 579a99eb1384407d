use axum::extract::Form;
use chrono::Utc;
use diesel::prelude::*;
use hypertext::prelude::*;
use uuid::Uuid;

use crate::{
    auth::User,
    finances::form::{TransactionForm, TransactionFormFields},
    permission::Permission,
    schema::transactions,
    state::Conn,
    teams::Team,
    template::{Page, Section},
    tournaments::Tournament,
    util_resp::{StandardResponse, bad_request, degrade, see_other_ok, success},
    validation::FormErrors,
};

/// Shared by the create and edit pages.
pub(crate) fn transaction_form_page(
    user: User,
    heading: &str,
    form: &TransactionForm,
    errors: &FormErrors,
    conn: &mut Conn,
) -> Rendered<String> {
    let tournaments = degrade("tournaments", Tournament::options(&mut **conn));
    let teams = degrade("teams", Team::options(&mut **conn));

    Page::new()
        .user(user)
        .section(Section::Finances)
        .body(maud! {
            h1 { (heading) }
            form method="post" {
                TransactionFormFields
                    form=(form)
                    errors=(errors)
                    tournaments=(tournaments.as_slice())
                    teams=(teams.as_slice());
                button type="submit" class="btn btn-primary" { "Save" }
                a class="btn btn-link" href="/finances" { "Cancel" }
            }
        })
        .render()
}

pub async fn create_transaction_page(
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    user.check_permission(Permission::ManageFinances)?;
    let form = TransactionForm::new(Utc::now().date_naive());
    success(transaction_form_page(
        user,
        "Record a transaction",
        &form,
        &FormErrors::new(),
        &mut conn,
    ))
}

pub async fn do_create_transaction(
    user: User,
    mut conn: Conn,
    Form(form): Form<TransactionForm>,
) -> StandardResponse {
    user.check_permission(Permission::ManageFinances)?;

    let mut input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return bad_request(transaction_form_page(
                user,
                "Record a transaction",
                &form,
                &errors,
                &mut conn,
            ));
        }
    };
    let errors = input.resolve_references(&mut *conn)?;
    if !errors.is_empty() {
        return bad_request(transaction_form_page(
            user,
            "Record a transaction",
            &form,
            &errors,
            &mut conn,
        ));
    }

    let id = Uuid::now_v7().to_string();
    diesel::insert_into(transactions::table)
        .values((
            transactions::id.eq(&id),
            transactions::tournament_id.eq(&input.tournament_id),
            transactions::team_id.eq(&input.team_id),
            transactions::kind.eq(input.kind.as_str()),
            transactions::category.eq(input.category.as_str()),
            transactions::amount.eq(input.amount.to_string()),
            transactions::description.eq(&input.description),
            transactions::occurred_on.eq(input.occurred_on),
            transactions::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)?;

    tracing::info!(
        transaction = %id,
        kind = input.kind.as_str(),
        amount = %input.amount,
        "recorded transaction"
    );

    see_other_ok("/finances")
}
