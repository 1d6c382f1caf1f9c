mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;

pub use core::{Customer, CustomerId, create_customer_table, get_customer, map_row_to_customer};
pub use create_endpoint::create_customer_endpoint;
pub use delete_endpoint::delete_customer_endpoint;
pub use list_endpoint::list_customers_endpoint;
