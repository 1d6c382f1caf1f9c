//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/accounts/{account_id}/deposit',
//! use [format_endpoint].

/// The route to create or list customers.
pub const CUSTOMERS: &str = "/customers";
/// The route to delete a customer and its dependent rows.
pub const DELETE_CUSTOMER: &str = "/customers/{customer_id}/delete";
/// The route to open a new account.
pub const ACCOUNTS: &str = "/accounts";
/// The route to deposit money into an account.
pub const DEPOSIT: &str = "/accounts/{account_id}/deposit";
/// The route to delete an account and its dependent rows.
pub const DELETE_ACCOUNT: &str = "/accounts/{account_id}/delete";
/// The route to move money between accounts.
pub const TRANSFERS: &str = "/transfers";
/// The route to list all transfers with account and customer details.
pub const TRANSACTIONS: &str = "/transactions";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/customers/{customer_id}/delete',
/// '{customer_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
