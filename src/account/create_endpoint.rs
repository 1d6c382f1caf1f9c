//! Defines the endpoint for opening a new account.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior, params};
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::{Account, generate_account_number},
    customer::{CustomerId, get_customer},
};

/// How many times account creation retries when a generated account number
/// collides with an existing one.
const ACCOUNT_NUMBER_ATTEMPTS: usize = 5;

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for opening an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountData {
    /// The id of the customer that will own the account.
    pub customer_id: CustomerId,
    /// The opening balance, must not be negative.
    pub initial_deposit: f64,
}

/// A route handler for opening a new account, responds with the created
/// account as JSON.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    Json(data): Json<AccountData>,
) -> Result<Json<Account>, Error> {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Err(Error::DatabaseLockError);
        }
    };

    let account = create_account(&data, &connection)?;

    Ok(Json(account))
}

/// Open a new account for the customer in `data` with a freshly allocated
/// account number.
///
/// # Errors
/// Returns [Error::NegativeInitialDeposit] if the opening balance is below
/// zero, [Error::CustomerNotFound] if the owning customer does not exist, or
/// [Error::DuplicateAccountNumber] if allocation keeps colliding after
/// several attempts.
pub fn create_account(data: &AccountData, connection: &Connection) -> Result<Account, Error> {
    if data.initial_deposit < 0.0 {
        return Err(Error::NegativeInitialDeposit);
    }

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    get_customer(data.customer_id, &transaction)?;

    for _ in 0..ACCOUNT_NUMBER_ATTEMPTS {
        let account_number = generate_account_number();

        match transaction.execute(
            "INSERT INTO account (account_number, balance, customer_id) VALUES (?1, ?2, ?3)",
            params![account_number, data.initial_deposit, data.customer_id],
        ) {
            Ok(_) => {
                let id = transaction.last_insert_rowid();
                transaction.commit()?;

                return Ok(Account {
                    id,
                    account_number,
                    balance: data.initial_deposit,
                    customer_id: data.customer_id,
                });
            }
            Err(error) => match Error::from(error) {
                Error::DuplicateAccountNumber => continue,
                error => return Err(error),
            },
        }
    }

    Err(Error::DuplicateAccountNumber)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use crate::{
        Error,
        account::{
            create_account_endpoint,
            create_endpoint::{AccountData, CreateAccountState, create_account},
            get_account,
        },
        db::initialize,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_customer(connection: &Connection) -> i64 {
        connection
            .execute(
                "INSERT INTO customer (name, email) VALUES (?1, ?2)",
                ("Alice", "alice@example.com"),
            )
            .unwrap();

        connection.last_insert_rowid()
    }

    #[tokio::test]
    async fn can_create_account() {
        let connection = get_test_connection();
        let customer_id = insert_customer(&connection);
        let state = CreateAccountState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let data = AccountData {
            customer_id,
            initial_deposit: 100.0,
        };

        let response = create_account_endpoint(State(state.clone()), Json(data))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        let account = get_account(1, &connection).unwrap();
        assert_eq!(account.balance, 100.0);
        assert_eq!(account.customer_id, customer_id);
        assert_eq!(account.account_number.len(), 10);
    }

    #[test]
    fn missing_customer_returns_customer_not_found() {
        let connection = get_test_connection();

        let result = create_account(
            &AccountData {
                customer_id: 999,
                initial_deposit: 0.0,
            },
            &connection,
        );

        assert_eq!(result, Err(Error::CustomerNotFound));
    }

    #[test]
    fn negative_initial_deposit_is_rejected() {
        let connection = get_test_connection();
        let customer_id = insert_customer(&connection);

        let result = create_account(
            &AccountData {
                customer_id,
                initial_deposit: -1.0,
            },
            &connection,
        );

        assert_eq!(result, Err(Error::NegativeInitialDeposit));
    }

    #[test]
    fn zero_initial_deposit_is_allowed() {
        let connection = get_test_connection();
        let customer_id = insert_customer(&connection);

        let account = create_account(
            &AccountData {
                customer_id,
                initial_deposit: 0.0,
            },
            &connection,
        )
        .unwrap();

        assert_eq!(account.balance, 0.0);
    }

    #[test]
    fn allocates_distinct_account_numbers() {
        let connection = get_test_connection();
        let customer_id = insert_customer(&connection);
        let data = AccountData {
            customer_id,
            initial_deposit: 0.0,
        };

        let first = create_account(&data, &connection).unwrap();
        let second = create_account(&data, &connection).unwrap();

        assert_ne!(first.account_number, second.account_number);
    }
}
