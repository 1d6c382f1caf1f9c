use rusqlite::{Connection, params};
use serde::Serialize;
use uuid::Uuid;

use crate::{Error, customer::CustomerId};

/// The database id for an account row.
pub type AccountId = i64;

/// The number of characters in a generated account number.
pub const ACCOUNT_NUMBER_LENGTH: usize = 10;

/// A bank account owned by a customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The human-facing account number, unique across accounts.
    pub account_number: String,
    /// The amount of money the account holds.
    pub balance: f64,
    /// The id of the customer that owns the account.
    pub customer_id: CustomerId,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            account_number TEXT NOT NULL UNIQUE,
            balance REAL NOT NULL,
            customer_id INTEGER NOT NULL REFERENCES customer(id)
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &rusqlite::Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let account_number = row.get(1)?;
    let balance = row.get(2)?;
    let customer_id = row.get(3)?;

    Ok(Account {
        id,
        account_number,
        balance,
        customer_id,
    })
}

/// Get the account with `id`.
///
/// # Errors
/// Returns [Error::AccountNotFound] if no account has `id`, or an error if
/// the query fails.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .query_one(
            "SELECT id, account_number, balance, customer_id FROM account WHERE id = ?1",
            params![id],
            map_row_to_account,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::AccountNotFound,
            error => error,
        })
}

/// Generate a candidate account number.
///
/// The number is [ACCOUNT_NUMBER_LENGTH] uppercase hexadecimal characters
/// drawn from a v4 UUID. Uniqueness is enforced by the account table's UNIQUE
/// constraint, callers should retry on a collision.
pub fn generate_account_number() -> String {
    Uuid::new_v4().simple().to_string()[..ACCOUNT_NUMBER_LENGTH].to_uppercase()
}
