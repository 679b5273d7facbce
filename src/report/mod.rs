//! Monthly account reports with transaction summaries for the month and year.

mod core;
mod create;
mod delete;
mod reports_page;

pub use core::{create_report, create_report_table};
pub use create::{create_report_endpoint, get_new_report_page};
pub use delete::delete_report_endpoint;
pub use reports_page::get_reports_page;
