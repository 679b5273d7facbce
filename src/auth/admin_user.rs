//! Storage for the single admin password.

use rusqlite::Connection;

use crate::{Error, auth::PasswordHash};

/// The admin table only ever holds the row with this ID.
const ADMIN_ID: i64 = 1;

pub fn create_admin_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS admin (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            password TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Get the hash of the admin password.
///
/// # Errors
/// Returns [Error::AdminPasswordNotSet] if the password has not been set yet.
pub fn get_admin_password_hash(connection: &Connection) -> Result<PasswordHash, Error> {
    connection
        .query_row(
            "SELECT password FROM admin WHERE id = ?1",
            [ADMIN_ID],
            |row| row.get::<_, String>(0),
        )
        .map(|hash| PasswordHash::new_unchecked(&hash))
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::AdminPasswordNotSet,
            error => error.into(),
        })
}

/// Set the admin password, replacing any existing password.
pub fn set_admin_password(password_hash: &PasswordHash, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO admin (id, password) VALUES (?1, ?2)
        ON CONFLICT(id) DO UPDATE SET password = excluded.password",
        (ADMIN_ID, password_hash.to_string()),
    )?;

    Ok(())
}
