//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email used to create a customer already exists in the database.
    #[error("a customer with this email already exists")]
    DuplicateEmail,

    /// A generated account number clashed with an existing one.
    ///
    /// Callers allocating account numbers should generate a fresh number and
    /// try again.
    #[error("the generated account number already exists in the database")]
    DuplicateAccountNumber,

    /// The referenced customer does not exist.
    #[error("Customer not found")]
    CustomerNotFound,

    /// The referenced account does not exist.
    #[error("Account not found")]
    AccountNotFound,

    /// A transfer referenced at least one account that does not exist.
    #[error("One or both accounts not found")]
    AccountsNotFound,

    /// A non-positive amount was used for a deposit or transfer.
    #[error("amount must be greater than 0")]
    InvalidAmount,

    /// A negative initial deposit was used to open an account.
    #[error("initial deposit must not be negative")]
    NegativeInitialDeposit,

    /// The source account balance does not cover the transfer amount.
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// Tried to delete an account that still holds money.
    #[error("Cannot delete account with non-zero balance")]
    AccountHasBalance,

    /// Tried to delete a customer that owns an account holding money.
    #[error("Cannot delete customer with non-zero balance accounts")]
    CustomerHasBalance,

    /// A query was given an invalid foreign key.
    ///
    /// The client should check that the referenced ids are valid.
    #[error("a referenced row does not exist")]
    InvalidForeignKey,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows. Request
    /// handlers should map it to the specific missing resource where known.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::InvalidForeignKey
            }
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("customer.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("account.account_number") =>
            {
                Error::DuplicateAccountNumber
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body used for all error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// A user-facing message describing what went wrong.
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = match self {
            Error::DuplicateEmail
            | Error::InvalidAmount
            | Error::NegativeInitialDeposit
            | Error::InvalidForeignKey => StatusCode::BAD_REQUEST,
            Error::CustomerNotFound
            | Error::AccountNotFound
            | Error::AccountsNotFound
            | Error::NotFound => StatusCode::NOT_FOUND,
            Error::InsufficientFunds | Error::AccountHasBalance | Error::CustomerHasBalance => {
                StatusCode::CONFLICT
            }
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "An unexpected error occurred, check the server logs for more \
                                details."
                            .to_owned(),
                    }),
                )
                    .into_response();
            }
        };

        (
            status_code,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
