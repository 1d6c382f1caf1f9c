//! Defines the endpoint for deleting a customer and its dependent rows.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior, params};
use serde::Serialize;

use crate::{
    AppState, Error,
    customer::{CustomerId, get_customer},
};

/// The state needed to delete a customer.
#[derive(Debug, Clone)]
pub struct DeleteCustomerState {
    /// The database connection for managing customers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCustomerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body returned after a customer is deleted.
#[derive(Debug, Serialize)]
pub struct DeleteCustomerResponse {
    /// A confirmation message.
    pub message: String,
}

/// A route handler for deleting a customer along with its accounts and the
/// transfers that reference them.
pub async fn delete_customer_endpoint(
    State(state): State<DeleteCustomerState>,
    Path(customer_id): Path<CustomerId>,
) -> Result<Json<DeleteCustomerResponse>, Error> {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Err(Error::DatabaseLockError);
        }
    };

    delete_customer(customer_id, &connection)?;

    Ok(Json(DeleteCustomerResponse {
        message: "Customer and associated data deleted successfully".to_owned(),
    }))
}

/// Delete the customer with `id`, its accounts, and the transfers that
/// reference those accounts.
///
/// The deletes run inside a single transaction so the ledger never observes
/// an account without its owner or a transfer without its accounts.
///
/// # Errors
/// Returns [Error::CustomerNotFound] if no customer has `id`, or
/// [Error::CustomerHasBalance] if any owned account still holds money. On
/// error no rows are deleted.
pub fn delete_customer(id: CustomerId, connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    get_customer(id, &transaction)?;

    let accounts_with_balance: i64 = transaction.query_one(
        "SELECT COUNT(*) FROM account WHERE customer_id = ?1 AND balance > 0",
        params![id],
        |row| row.get(0),
    )?;

    if accounts_with_balance > 0 {
        return Err(Error::CustomerHasBalance);
    }

    transaction.execute(
        "DELETE FROM transfer WHERE
            from_account_id IN (SELECT id FROM account WHERE customer_id = ?1)
            OR to_account_id IN (SELECT id FROM account WHERE customer_id = ?1)",
        params![id],
    )?;
    transaction.execute("DELETE FROM account WHERE customer_id = ?1", params![id])?;
    transaction.execute("DELETE FROM customer WHERE id = ?1", params![id])?;

    transaction.commit()?;

    Ok(())
}
