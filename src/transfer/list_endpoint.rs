//! Defines the endpoint for listing the transfer history with account and
//! customer details.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{AppState, Error, transfer::TransferId};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for managing transfers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// One side of a transaction, the customer and account number involved.
#[derive(Debug, PartialEq, Serialize)]
pub struct TransactionParty {
    /// The name of the customer that owns the account.
    pub customer: String,
    /// The account number.
    pub account: String,
}

/// A transfer enriched with the customer and account on each side.
#[derive(Debug, PartialEq, Serialize)]
pub struct Transaction {
    /// The id of the underlying transfer.
    pub id: TransferId,
    /// The amount of money moved.
    pub amount: f64,
    /// When the transfer happened.
    #[serde(with = "time::serde::iso8601")]
    pub date: OffsetDateTime,
    /// The side the money came from.
    pub from: TransactionParty,
    /// The side the money went to.
    pub to: TransactionParty,
}

/// A route handler for listing all transfers, newest first, with the
/// customer and account details on both sides.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Err(Error::DatabaseLockError);
        }
    };

    let transactions = list_transactions(&connection)?;

    Ok(Json(transactions))
}

/// List all transfers joined with their accounts and owning customers,
/// newest first. The id breaks ties between transfers that share a
/// timestamp.
pub fn list_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    let transactions = connection
        .prepare(
            "SELECT t.id, t.amount, t.created_at,
                    from_customer.name, from_account.account_number,
                    to_customer.name, to_account.account_number
                FROM transfer t
                INNER JOIN account from_account ON t.from_account_id = from_account.id
                INNER JOIN customer from_customer ON from_account.customer_id = from_customer.id
                INNER JOIN account to_account ON t.to_account_id = to_account.id
                INNER JOIN customer to_customer ON to_account.customer_id = to_customer.id
                ORDER BY t.created_at DESC, t.id DESC",
        )?
        .query_map([], |row| {
            Ok(Transaction {
                id: row.get(0)?,
                amount: row.get(1)?,
                date: row.get(2)?,
                from: TransactionParty {
                    customer: row.get(3)?,
                    account: row.get(4)?,
                },
                to: TransactionParty {
                    customer: row.get(5)?,
                    account: row.get(6)?,
                },
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(transactions)
}
