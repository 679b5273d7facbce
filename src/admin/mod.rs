//! The admin landing page, the client listing with monthly activity and the
//! batch summary of selected clients.

mod activity;
mod clients_page;
mod index_page;
mod summary_endpoint;

pub use clients_page::get_clients_page;
pub use index_page::get_admin_index_page;
pub use summary_endpoint::summarise_clients_endpoint;

#[cfg(test)]
pub(crate) use activity::test_support;
