//! Application router configuration wiring the API routes.

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::{
    AppState,
    account::{create_account_endpoint, delete_account_endpoint, deposit_endpoint},
    customer::{create_customer_endpoint, delete_customer_endpoint, list_customers_endpoint},
    endpoints,
    logging::logging_middleware,
    transfer::{create_transfer_endpoint, list_transactions_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::CUSTOMERS,
            post(create_customer_endpoint).get(list_customers_endpoint),
        )
        .route(endpoints::DELETE_CUSTOMER, delete(delete_customer_endpoint))
        .route(endpoints::ACCOUNTS, post(create_account_endpoint))
        .route(endpoints::DEPOSIT, post(deposit_endpoint))
        .route(endpoints::DELETE_ACCOUNT, delete(delete_account_endpoint))
        .route(endpoints::TRANSFERS, post(create_transfer_endpoint))
        .route(endpoints::TRANSACTIONS, get(list_transactions_endpoint))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}
