use axum::extract::{Form, Path};
use diesel::prelude::*;

use crate::{
    auth::User,
    finances::{
        Transaction, create::transaction_form_page, form::TransactionForm,
    },
    permission::Permission,
    schema::transactions,
    state::Conn,
    util_resp::{StandardResponse, bad_request, see_other_ok, success},
    validation::FormErrors,
};

pub async fn edit_transaction_page(
    Path(transaction_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    user.check_permission(Permission::ManageFinances)?;
    let transaction = Transaction::fetch(&transaction_id, &mut *conn)?;
    let form = TransactionForm::of_transaction(&transaction);
    success(transaction_form_page(
        user,
        "Edit transaction",
        &form,
        &FormErrors::new(),
        &mut conn,
    ))
}

pub async fn do_edit_transaction(
    Path(transaction_id): Path<String>,
    user: User,
    mut conn: Conn,
    Form(form): Form<TransactionForm>,
) -> StandardResponse {
    user.check_permission(Permission::ManageFinances)?;
    let transaction = Transaction::fetch(&transaction_id, &mut *conn)?;

    let mut input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return bad_request(transaction_form_page(
                user,
                "Edit transaction",
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
            "Edit transaction",
            &form,
            &errors,
            &mut conn,
        ));
    }

    diesel::update(transactions::table.filter(transactions::id.eq(&transaction.id)))
        .set((
            transactions::tournament_id.eq(&input.tournament_id),
            transactions::team_id.eq(&input.team_id),
            transactions::kind.eq(input.kind.as_str()),
            transactions::category.eq(input.category.as_str()),
            transactions::amount.eq(input.amount.to_string()),
            transactions::description.eq(&input.description),
            transactions::occurred_on.eq(input.occurred_on),
        ))
        .execute(&mut *conn)?;

    tracing::info!(transaction = %transaction.id, "updated transaction");

    see_other_ok("/finances")
}
