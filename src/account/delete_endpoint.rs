//! Defines the endpoint for deleting an account and its transfer history.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior, params};
use serde::Serialize;

use crate::{
    AppState, Error,
    account::{AccountId, get_account},
};

/// The state needed to delete an account.
#[derive(Debug, Clone)]
pub struct DeleteAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body returned after an account is deleted.
#[derive(Debug, Serialize)]
pub struct DeleteAccountResponse {
    /// A confirmation message.
    pub message: String,
}

/// A route handler for deleting an account along with the transfers that
/// reference it.
pub async fn delete_account_endpoint(
    State(state): State<DeleteAccountState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<DeleteAccountResponse>, Error> {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Err(Error::DatabaseLockError);
        }
    };

    delete_account(account_id, &connection)?;

    Ok(Json(DeleteAccountResponse {
        message: "Account deleted successfully".to_owned(),
    }))
}

/// Delete the account with `id` and the transfers that reference it on
/// either side.
///
/// The deletes run inside a single transaction so the transfer history never
/// references a missing account.
///
/// # Errors
/// Returns [Error::AccountNotFound] if no account has `id`, or
/// [Error::AccountHasBalance] if the account still holds money. On error no
/// rows are deleted.
pub fn delete_account(id: AccountId, connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let account = get_account(id, &transaction)?;

    if account.balance != 0.0 {
        return Err(Error::AccountHasBalance);
    }

    transaction.execute(
        "DELETE FROM transfer WHERE from_account_id = ?1 OR to_account_id = ?1",
        params![id],
    )?;
    transaction.execute("DELETE FROM account WHERE id = ?1", params![id])?;

    transaction.commit()?;

    Ok(())
}
