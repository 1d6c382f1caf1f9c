//! Database initialization for the application's SQLite schema.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error, account::create_account_table, customer::create_customer_table,
    transfer::create_transfer_table,
};

/// Create the application tables if they do not exist.
///
/// The tables are created inside a single exclusive transaction so that a
/// partially initialized schema is never observable. Foreign key enforcement
/// is switched on for the connection since the schema relies on it.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_customer_table(&transaction)?;
    create_account_table(&transaction)?;
    create_transfer_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
