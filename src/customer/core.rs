use rusqlite::{Connection, params};
use serde::Serialize;

use crate::Error;

/// The database id for a customer row.
pub type CustomerId = i64;

/// A person that can own bank accounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    /// The id for the customer.
    pub id: CustomerId,
    /// The customer's full name.
    pub name: String,
    /// The customer's email address, unique across customers.
    pub email: String,
}

pub fn create_customer_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS customer (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_customer(row: &rusqlite::Row) -> Result<Customer, rusqlite::Error> {
    let id = row.get(0)?;
    let name = row.get(1)?;
    let email = row.get(2)?;

    Ok(Customer { id, name, email })
}

/// Get the customer with `id`.
///
/// # Errors
/// Returns [Error::CustomerNotFound] if no customer has `id`, or an error if
/// the query fails.
pub fn get_customer(id: CustomerId, connection: &Connection) -> Result<Customer, Error> {
    connection
        .query_one(
            "SELECT id, name, email FROM customer WHERE id = ?1",
            params![id],
            map_row_to_customer,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::CustomerNotFound,
            error => error,
        })
}
