//! Defines the endpoint for moving money between accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior, params};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    account::{AccountId, get_account},
    transfer::Transfer,
};

/// The state needed to create a transfer.
#[derive(Debug, Clone)]
pub struct CreateTransferState {
    /// The database connection for managing transfers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransferState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for creating a transfer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferData {
    /// The id of the account to take the money from.
    pub from_account_id: AccountId,
    /// The id of the account to give the money to.
    pub to_account_id: AccountId,
    /// The amount of money to move, must be positive.
    pub amount: f64,
}

/// A route handler for moving money between accounts, responds with the
/// created transfer as JSON.
pub async fn create_transfer_endpoint(
    State(state): State<CreateTransferState>,
    Json(data): Json<TransferData>,
) -> Result<Json<Transfer>, Error> {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Err(Error::DatabaseLockError);
        }
    };

    let transfer = create_transfer(&data, &connection)?;

    Ok(Json(transfer))
}

/// Move money from one account to another.
///
/// The debit, the credit, and the ledger row are committed in a single
/// transaction with the write lock taken up front, so the balance check
/// cannot interleave with another transfer's commit.
///
/// # Errors
/// Returns [Error::InvalidAmount] if the amount is not positive,
/// [Error::AccountsNotFound] if either account does not exist, or
/// [Error::InsufficientFunds] if the source balance does not cover the
/// amount. On error no balances change and no ledger row is written.
pub fn create_transfer(data: &TransferData, connection: &Connection) -> Result<Transfer, Error> {
    if data.amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let source = get_account(data.from_account_id, &transaction).map_err(missing_as_accounts)?;
    get_account(data.to_account_id, &transaction).map_err(missing_as_accounts)?;

    if source.balance < data.amount {
        return Err(Error::InsufficientFunds);
    }

    transaction.execute(
        "UPDATE account SET balance = balance - ?1 WHERE id = ?2",
        params![data.amount, data.from_account_id],
    )?;
    transaction.execute(
        "UPDATE account SET balance = balance + ?1 WHERE id = ?2",
        params![data.amount, data.to_account_id],
    )?;

    let created_at = OffsetDateTime::now_utc();
    transaction.execute(
        "INSERT INTO transfer (amount, from_account_id, to_account_id, created_at)
            VALUES (?1, ?2, ?3, ?4)",
        params![data.amount, data.from_account_id, data.to_account_id, created_at],
    )?;
    let id = transaction.last_insert_rowid();

    transaction.commit()?;

    Ok(Transfer {
        id,
        amount: data.amount,
        from_account_id: data.from_account_id,
        to_account_id: data.to_account_id,
        created_at,
    })
}

fn missing_as_accounts(error: Error) -> Error {
    match error {
        Error::AccountNotFound => Error::AccountsNotFound,
        error => error,
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        thread,
    };

    use rusqlite::{Connection, params};

    use crate::{
        Error,
        account::get_account,
        db::initialize,
        transfer::{Transfer, map_row_to_transfer},
    };

    use super::{TransferData, create_transfer};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_account(connection: &Connection, account_number: &str, balance: f64) -> i64 {
        connection
            .execute(
                "INSERT OR IGNORE INTO customer (id, name, email) VALUES (1, ?1, ?2)",
                ("Alice", "alice@example.com"),
            )
            .unwrap();
        connection
            .execute(
                "INSERT INTO account (account_number, balance, customer_id)
                    VALUES (?1, ?2, ?3)",
                (account_number, balance, 1),
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
    fn moves_money_and_records_transfer() {
        let connection = get_test_connection();
        let from_account_id = insert_account(&connection, "AAAA000011", 150.0);
        let to_account_id = insert_account(&connection, "BBBB000022", 0.0);

        let transfer = create_transfer(
            &TransferData {
                from_account_id,
                to_account_id,
                amount: 30.0,
            },
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_account(from_account_id, &connection).unwrap().balance,
            120.0
        );
        assert_eq!(
            get_account(to_account_id, &connection).unwrap().balance,
            30.0
        );

        let want_row: Transfer = connection
            .query_one(
                "SELECT id, amount, from_account_id, to_account_id, created_at
                    FROM transfer WHERE id = ?1",
                params![transfer.id],
                map_row_to_transfer,
            )
            .unwrap();
        assert_eq!(want_row, transfer);
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let connection = get_test_connection();
        let from_account_id = insert_account(&connection, "AAAA000011", 150.0);
        let to_account_id = insert_account(&connection, "BBBB000022", 0.0);

        for amount in [0.0, -5.0] {
            let result = create_transfer(
                &TransferData {
                    from_account_id,
                    to_account_id,
                    amount,
                },
                &connection,
            );

            assert_eq!(result, Err(Error::InvalidAmount));
        }

        assert_eq!(
            get_account(from_account_id, &connection).unwrap().balance,
            150.0
        );
        assert_eq!(count_transfers(&connection), 0);
    }

    #[test]
    fn missing_accounts_return_accounts_not_found() {
        let connection = get_test_connection();
        let account_id = insert_account(&connection, "AAAA000011", 150.0);

        for (from_account_id, to_account_id) in [(account_id, 999), (999, account_id)] {
            let result = create_transfer(
                &TransferData {
                    from_account_id,
                    to_account_id,
                    amount: 10.0,
                },
                &connection,
            );

            assert_eq!(result, Err(Error::AccountsNotFound));
        }

        assert_eq!(
            get_account(account_id, &connection).unwrap().balance,
            150.0
        );
        assert_eq!(count_transfers(&connection), 0);
    }

    #[test]
    fn insufficient_funds_leaves_balances_unchanged() {
        let connection = get_test_connection();
        let from_account_id = insert_account(&connection, "AAAA000011", 20.0);
        let to_account_id = insert_account(&connection, "BBBB000022", 0.0);

        let result = create_transfer(
            &TransferData {
                from_account_id,
                to_account_id,
                amount: 20.01,
            },
            &connection,
        );

        assert_eq!(result, Err(Error::InsufficientFunds));
        assert_eq!(
            get_account(from_account_id, &connection).unwrap().balance,
            20.0
        );
        assert_eq!(
            get_account(to_account_id, &connection).unwrap().balance,
            0.0
        );
        assert_eq!(count_transfers(&connection), 0);
    }

    #[test]
    fn concurrent_full_balance_transfers_debit_once() {
        const THREAD_COUNT: usize = 8;

        let connection = get_test_connection();
        let from_account_id = insert_account(&connection, "AAAA000011", 100.0);
        let to_account_id = insert_account(&connection, "BBBB000022", 0.0);
        let db_connection = Arc::new(Mutex::new(connection));

        let handles: Vec<_> = (0..THREAD_COUNT)
            .map(|_| {
                let db_connection = db_connection.clone();
                thread::spawn(move || {
                    let connection = db_connection.lock().unwrap();
                    create_transfer(
                        &TransferData {
                            from_account_id,
                            to_account_id,
                            amount: 100.0,
                        },
                        &connection,
                    )
                })
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        let successes = results.iter().filter(|result| result.is_ok()).count();
        let insufficient = results
            .iter()
            .filter(|result| **result == Err(Error::InsufficientFunds))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(insufficient, THREAD_COUNT - 1);

        let connection = db_connection.lock().unwrap();
        assert_eq!(
            get_account(from_account_id, &connection).unwrap().balance,
            0.0
        );
        assert_eq!(
            get_account(to_account_id, &connection).unwrap().balance,
            100.0
        );
        assert_eq!(count_transfers(&connection), 1);
    }
}
