//! Defines the endpoint for listing customers along with their accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::{Connection, params};
use serde::Serialize;

use crate::{
    AppState, Error,
    account::{Account, map_row_to_account},
    customer::{CustomerId, map_row_to_customer},
};

/// The state needed to list customers.
#[derive(Debug, Clone)]
pub struct ListCustomersState {
    /// The database connection for managing customers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListCustomersState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A customer together with the accounts it owns.
#[derive(Debug, PartialEq, Serialize)]
pub struct CustomerWithAccounts {
    /// The id for the customer.
    pub id: CustomerId,
    /// The customer's full name.
    pub name: String,
    /// The customer's email address.
    pub email: String,
    /// The accounts owned by the customer, oldest first.
    pub accounts: Vec<Account>,
}

/// A route handler for listing all customers with their accounts nested.
pub async fn list_customers_endpoint(
    State(state): State<ListCustomersState>,
) -> Result<Json<Vec<CustomerWithAccounts>>, Error> {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Err(Error::DatabaseLockError);
        }
    };

    let customers = list_customers(&connection)?;

    Ok(Json(customers))
}

/// List all customers in insertion order, each with its accounts.
pub fn list_customers(connection: &Connection) -> Result<Vec<CustomerWithAccounts>, Error> {
    let customers = connection
        .prepare("SELECT id, name, email FROM customer ORDER BY id ASC")?
        .query_map([], map_row_to_customer)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut account_statement = connection.prepare(
        "SELECT id, account_number, balance, customer_id FROM account
            WHERE customer_id = ?1 ORDER BY id ASC",
    )?;

    customers
        .into_iter()
        .map(|customer| {
            let accounts = account_statement
                .query_map(params![customer.id], map_row_to_account)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(CustomerWithAccounts {
                id: customer.id,
                name: customer.name,
                email: customer.email,
                accounts,
            })
        })
        .collect()
}
