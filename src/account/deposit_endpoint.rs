//! Defines the endpoint for depositing money into an account.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior, params};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    account::{Account, AccountId, get_account},
};

/// The state needed to deposit money into an account.
#[derive(Debug, Clone)]
pub struct DepositState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DepositState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for a deposit.
#[derive(Debug, Deserialize)]
pub struct DepositData {
    /// The amount of money to add to the account, must be positive.
    pub amount: f64,
}

/// A route handler for depositing money into an account, responds with the
/// updated account as JSON.
pub async fn deposit_endpoint(
    State(state): State<DepositState>,
    Path(account_id): Path<AccountId>,
    Json(data): Json<DepositData>,
) -> Result<Json<Account>, Error> {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Err(Error::DatabaseLockError);
        }
    };

    let account = deposit(account_id, data.amount, &connection)?;

    Ok(Json(account))
}

/// Add `amount` to the balance of the account with `account_id`.
///
/// The balance update and the ledger row recording the deposit, a transfer
/// from the account to itself, are committed in a single transaction.
///
/// # Errors
/// Returns [Error::InvalidAmount] if `amount` is not positive, or
/// [Error::AccountNotFound] if no account has `account_id`. On error the
/// balance and the transfer history are unchanged.
pub fn deposit(
    account_id: AccountId,
    amount: f64,
    connection: &Connection,
) -> Result<Account, Error> {
    if amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    get_account(account_id, &transaction)?;

    transaction.execute(
        "UPDATE account SET balance = balance + ?1 WHERE id = ?2",
        params![amount, account_id],
    )?;
    transaction.execute(
        "INSERT INTO transfer (amount, from_account_id, to_account_id, created_at)
            VALUES (?1, ?2, ?2, ?3)",
        params![amount, account_id, OffsetDateTime::now_utc()],
    )?;

    let account = get_account(account_id, &transaction)?;

    transaction.commit()?;

    Ok(account)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{Error, account::get_account, db::initialize};

    use super::deposit;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_account(connection: &Connection, balance: f64) -> i64 {
        connection
            .execute(
                "INSERT INTO customer (name, email) VALUES (?1, ?2)",
                ("Alice", "alice@example.com"),
            )
            .unwrap();
        let customer_id = connection.last_insert_rowid();
        connection
            .execute(
                "INSERT INTO account (account_number, balance, customer_id)
                    VALUES (?1, ?2, ?3)",
                ("AAAA000011", balance, customer_id),
            )
            .unwrap();

        connection.last_insert_rowid()
    }

    fn count_transfers(connection: &Connection) -> i64 {
        connection
            .query_one("SELECT COUNT(*) FROM transfer", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn adds_amount_to_balance() {
        let connection = get_test_connection();
        let account_id = insert_account(&connection, 100.0);

        let account = deposit(account_id, 50.0, &connection).unwrap();

        assert_eq!(account.balance, 150.0);
        assert_eq!(get_account(account_id, &connection).unwrap().balance, 150.0);
    }

    #[test]
    fn records_deposit_as_self_transfer() {
        let connection = get_test_connection();
        let account_id = insert_account(&connection, 0.0);

        deposit(account_id, 25.0, &connection).unwrap();

        let (amount, from_account_id, to_account_id): (f64, i64, i64) = connection
            .query_one(
                "SELECT amount, from_account_id, to_account_id FROM transfer",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(amount, 25.0);
        assert_eq!(from_account_id, account_id);
        assert_eq!(to_account_id, account_id);
    }

    #[test]
    fn zero_amount_is_rejected() {
        let connection = get_test_connection();
        let account_id = insert_account(&connection, 100.0);

        let result = deposit(account_id, 0.0, &connection);

        assert_eq!(result, Err(Error::InvalidAmount));
        assert_eq!(get_account(account_id, &connection).unwrap().balance, 100.0);
        assert_eq!(count_transfers(&connection), 0);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let connection = get_test_connection();
        let account_id = insert_account(&connection, 100.0);

        let result = deposit(account_id, -10.0, &connection);

        assert_eq!(result, Err(Error::InvalidAmount));
        assert_eq!(get_account(account_id, &connection).unwrap().balance, 100.0);
        assert_eq!(count_transfers(&connection), 0);
    }

    #[test]
    fn missing_account_returns_account_not_found() {
        let connection = get_test_connection();

        let result = deposit(999, 10.0, &connection);

        assert_eq!(result, Err(Error::AccountNotFound));
        assert_eq!(count_transfers(&connection), 0);
    }
}
