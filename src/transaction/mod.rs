//! Deposits and withdrawals, and how they change account balances.

mod core;
mod create_endpoint;
mod create_page;
mod transactions_page;

pub use core::{
    NewTransaction, Transaction, TransactionId, TransactionType, create_transaction,
    create_transaction_table, get_transactions_for_client,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_new_transaction_page;
pub use transactions_page::get_transactions_page;
