//! Defines the endpoint for creating a new customer.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::{Connection, params};
use serde::Deserialize;

use crate::{AppState, Error, customer::Customer};

/// The state needed to create a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomerState {
    /// The database connection for managing customers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCustomerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for creating a customer.
#[derive(Debug, Deserialize)]
pub struct CustomerData {
    /// The customer's full name.
    pub name: String,
    /// The customer's email address.
    pub email: String,
}

/// A route handler for creating a new customer, responds with the created
/// customer as JSON.
pub async fn create_customer_endpoint(
    State(state): State<CreateCustomerState>,
    Json(data): Json<CustomerData>,
) -> Result<Json<Customer>, Error> {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Err(Error::DatabaseLockError);
        }
    };

    let customer = create_customer(&data, &connection)?;

    Ok(Json(customer))
}

pub fn create_customer(data: &CustomerData, connection: &Connection) -> Result<Customer, Error> {
    connection.execute(
        "INSERT INTO customer (name, email) VALUES (?1, ?2)",
        params![data.name, data.email],
    )?;

    let id = connection.last_insert_rowid();

    Ok(Customer {
        id,
        name: data.name.clone(),
        email: data.email.clone(),
    })
}
