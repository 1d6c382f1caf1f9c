mod core;
mod create_endpoint;
mod delete_endpoint;
mod deposit_endpoint;

pub use core::{
    Account, AccountId, create_account_table, generate_account_number, get_account,
    map_row_to_account,
};
pub use create_endpoint::create_account_endpoint;
pub use delete_endpoint::delete_account_endpoint;
pub use deposit_endpoint::deposit_endpoint;
