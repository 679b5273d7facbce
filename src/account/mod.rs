//! Saving and current accounts, and the admin pages for managing them.

mod accounts_page;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod provision;

pub use accounts_page::get_accounts_page;
pub use core::{
    Account, AccountId, AccountKind, AccountType, create_account_tables, delete_account,
    get_account, get_accounts_for_client, get_all_accounts,
};
pub use create_endpoint::create_account_endpoint;
pub use create_page::get_create_account_page;
pub use delete_endpoint::delete_account_endpoint;
pub use provision::{NewAccount, provision_account};

pub(crate) use core::account_number_exists;
