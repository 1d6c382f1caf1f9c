use rusqlite::Connection;
use serde::Serialize;
use time::OffsetDateTime;

use crate::account::AccountId;

/// The database id for a transfer row.
pub type TransferId = i64;

/// A movement of money between two accounts.
///
/// Deposits are recorded as a transfer from an account to itself, so the
/// transfer table is the complete ledger of every movement of money.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    /// The id for the transfer.
    pub id: TransferId,
    /// The amount of money moved.
    pub amount: f64,
    /// The id of the account the money came from.
    pub from_account_id: AccountId,
    /// The id of the account the money went to.
    pub to_account_id: AccountId,
    /// When the transfer happened.
    #[serde(with = "time::serde::iso8601")]
    pub created_at: OffsetDateTime,
}

pub fn create_transfer_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transfer (
            id INTEGER PRIMARY KEY,
            amount REAL NOT NULL,
            from_account_id INTEGER NOT NULL REFERENCES account(id),
            to_account_id INTEGER NOT NULL REFERENCES account(id),
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_transfer(row: &rusqlite::Row) -> Result<Transfer, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let from_account_id = row.get(2)?;
    let to_account_id = row.get(3)?;
    let created_at = row.get(4)?;

    Ok(Transfer {
        id,
        amount,
        from_account_id,
        to_account_id,
        created_at,
    })
}
