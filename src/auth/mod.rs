mod admin_log_in;
mod admin_user;
mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod token;

pub use admin_log_in::{get_admin_log_in_page, post_admin_log_in};
pub use admin_user::{create_admin_table, get_admin_password_hash, set_admin_password};
pub use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{admin_guard, admin_guard_hx, client_guard};
pub use password::{PasswordHash, ValidatedPassword};
pub use token::ClientSession;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
