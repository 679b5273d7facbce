//! Clients of the bank and the admin pages for managing them.

mod core;
mod create;
mod delete;
mod edit;
mod form;

pub use core::{
    Client, ClientDetails, ClientId, NewClient, client_exists, create_client, create_client_table,
    delete_client, get_all_clients, get_client, get_clients_by_email, update_client,
};
pub use create::{create_client_endpoint, get_new_client_page};
pub use delete::delete_client_endpoint;
pub use edit::{get_edit_client_page, update_client_endpoint};

#[cfg(test)]
pub(crate) use core::test_support;
