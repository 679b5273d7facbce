//! Helpers shared by the handler tests: a seeded in-memory database and
//! assertions over the rendered HTML.

#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

use rusqlite::Connection;

use crate::db::initialize;

pub(crate) use form::{
    assert_form_input, assert_form_input_with_value, assert_form_submit_button,
    assert_form_submit_button_with_text, assert_hx_endpoint, must_get_form,
};
pub(crate) use html::{
    alert_text, assert_valid_html, parse_html_document, parse_html_fragment, table_cells,
};
pub(crate) use http::{assert_content_type, assert_hx_redirect};

/// An in-memory database with every table created.
#[track_caller]
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&connection).expect("Could not initialize database");

    connection
}
