//! The client model and the queries for storing clients.

use std::fmt::Display;

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::PasswordHash,
    db::{Timestamp, now_utc},
};

/// The ID of a client in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(i64);

impl ClientId {
    /// Create a new client ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw integer ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The contact details of a client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientDetails {
    /// The client's name, unique across all clients.
    pub name: String,
    /// The email address the client logs in with.
    pub email: String,
    /// The client's phone number.
    pub phone: String,
    /// The client's street address.
    pub address: String,
    /// The city part of the client's address.
    pub city: String,
    /// The state part of the client's address.
    pub state: String,
    /// The zip code part of the client's address.
    pub zip_code: String,
}

impl ClientDetails {
    /// Check that the name is not empty and that the email address is valid.
    ///
    /// # Errors
    /// Returns [Error::EmptyClientName] or [Error::InvalidEmail].
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::EmptyClientName);
        }

        if !EmailAddress::is_valid(&self.email) {
            return Err(Error::InvalidEmail(self.email.clone()));
        }

        Ok(())
    }
}

/// A client of the bank that owns zero or more accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    /// The client's ID in the database.
    pub id: ClientId,
    /// The client's contact details.
    pub details: ClientDetails,
    /// The hash of the password the client logs in with.
    pub password_hash: PasswordHash,
    /// When the client was created.
    pub created_at: OffsetDateTime,
    /// When the client was last updated.
    pub updated_at: OffsetDateTime,
}

impl Display for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} <{}> <{}> <{}>",
            self.details.name, self.details.email, self.details.phone, self.details.address
        )
    }
}

/// The data needed to create a client.
#[derive(Debug, Clone)]
pub struct NewClient {
    /// The client's contact details.
    pub details: ClientDetails,
    /// The already hashed password.
    pub password_hash: PasswordHash,
}

pub fn create_client_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS client (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL,
            password TEXT NOT NULL,
            phone TEXT NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            state TEXT NOT NULL DEFAULT '',
            zip_code TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_client_email ON client(email)",
        (),
    )?;

    Ok(())
}

const CLIENT_COLUMNS: &str =
    "id, name, email, password, phone, address, city, state, zip_code, created_at, updated_at";

pub fn map_row_to_client(row: &Row) -> Result<Client, rusqlite::Error> {
    let id = ClientId::new(row.get(0)?);
    let details = ClientDetails {
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        city: row.get(6)?,
        state: row.get(7)?,
        zip_code: row.get(8)?,
    };
    let password_hash = PasswordHash::new_unchecked(&row.get::<_, String>(3)?);
    let created_at: Timestamp = row.get(9)?;
    let updated_at: Timestamp = row.get(10)?;

    Ok(Client {
        id,
        details,
        password_hash,
        created_at: created_at.0,
        updated_at: updated_at.0,
    })
}

fn map_unique_name_error(error: rusqlite::Error, name: &str) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 2067 => {
            Error::DuplicateClientName(name.to_owned())
        }
        error => error.into(),
    }
}

/// Create a client and insert it into the database.
///
/// # Errors
/// Returns an error if the details are invalid, the name is already taken or
/// there was an unexpected SQL error.
pub fn create_client(new_client: NewClient, connection: &Connection) -> Result<Client, Error> {
    new_client.details.validate()?;

    let NewClient {
        details,
        password_hash,
    } = new_client;
    let now = now_utc();

    connection
        .execute(
            "INSERT INTO client (name, email, password, phone, address, city, state, zip_code, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            (
                details.name.trim(),
                &details.email,
                password_hash.to_string(),
                &details.phone,
                &details.address,
                &details.city,
                &details.state,
                &details.zip_code,
                Timestamp(now),
            ),
        )
        .map_err(|error| map_unique_name_error(error, details.name.trim()))?;

    let id = ClientId::new(connection.last_insert_rowid());

    Ok(Client {
        id,
        details: ClientDetails {
            name: details.name.trim().to_owned(),
            ..details
        },
        password_hash,
        created_at: now,
        updated_at: now,
    })
}

/// Get a client by their ID.
///
/// # Errors
/// Returns [Error::NotFound] if there is no client with the given ID.
pub fn get_client(id: ClientId, connection: &Connection) -> Result<Client, Error> {
    connection
        .query_row(
            &format!("SELECT {CLIENT_COLUMNS} FROM client WHERE id = :id"),
            &[(":id", &id.as_i64())],
            map_row_to_client,
        )
        .map_err(Error::from)
}

/// Get all clients in the order they were created.
pub fn get_all_clients(connection: &Connection) -> Result<Vec<Client>, Error> {
    connection
        .prepare(&format!("SELECT {CLIENT_COLUMNS} FROM client ORDER BY id ASC"))?
        .query_map([], map_row_to_client)?
        .map(|client_result| client_result.map_err(Error::from))
        .collect()
}

/// Get the clients with the email address `email`.
///
/// Email addresses are not unique, so more than one client may be returned.
pub fn get_clients_by_email(email: &str, connection: &Connection) -> Result<Vec<Client>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CLIENT_COLUMNS} FROM client WHERE email = :email ORDER BY id ASC"
        ))?
        .query_map(&[(":email", &email)], map_row_to_client)?
        .map(|client_result| client_result.map_err(Error::from))
        .collect()
}

/// Check whether a client with the given ID exists.
pub fn client_exists(id: ClientId, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM client WHERE id = ?1)",
            [id.as_i64()],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Update the details of a client, and the password if `password_hash` is set.
///
/// # Errors
/// Returns [Error::UpdateMissingClient] if the client does not exist, or an
/// error if the details are invalid or the new name is already taken.
pub fn update_client(
    id: ClientId,
    details: &ClientDetails,
    password_hash: Option<&PasswordHash>,
    connection: &Connection,
) -> Result<(), Error> {
    details.validate()?;

    let rows_affected = connection
        .execute(
            "UPDATE client SET
                name = ?1, email = ?2, phone = ?3, address = ?4, city = ?5,
                state = ?6, zip_code = ?7, updated_at = ?8,
                password = COALESCE(?9, password)
            WHERE id = ?10",
            (
                details.name.trim(),
                &details.email,
                &details.phone,
                &details.address,
                &details.city,
                &details.state,
                &details.zip_code,
                Timestamp(now_utc()),
                password_hash.map(|hash| hash.to_string()),
                id.as_i64(),
            ),
        )
        .map_err(|error| map_unique_name_error(error, details.name.trim()))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingClient);
    }

    Ok(())
}

type RowsAffected = usize;

/// Delete a client along with their accounts and transactions.
pub fn delete_client(id: ClientId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM client WHERE id = :id", &[(":id", &id.as_i64())])
        .map_err(Error::from)
}


#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::PasswordHash,
        client::{
            ClientDetails, ClientId, NewClient, create_client, delete_client, get_all_clients,
            get_client, get_clients_by_email, update_client,
        },
        db::initialize,
    };

    use super::test_support::must_create_client;

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn details(name: &str) -> ClientDetails {
        ClientDetails {
            name: name.to_owned(),
            email: "client@example.com".to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn create_client_stores_hash_not_password() {
        let connection = get_test_connection();
        let client = must_create_client("Ana", "ana@example.com", &connection);

        let stored: String = connection
            .query_row(
                "SELECT password FROM client WHERE id = ?1",
                [client.id.as_i64()],
                |row| row.get(0),
            )
            .unwrap();

        assert_ne!(stored, "password1234");
        assert!(client.password_hash.verify("password1234").unwrap());
    }

    #[test]
    fn get_client_returns_created_client() {
        let connection = get_test_connection();
        let want = must_create_client("Ana", "ana@example.com", &connection);

        let got = get_client(want.id, &connection);

        assert_eq!(Ok(want), got);
    }

    #[test]
    fn get_missing_client_returns_not_found() {
        let connection = get_test_connection();

        assert_eq!(
            get_client(ClientId::new(404), &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn create_client_rejects_empty_name() {
        let connection = get_test_connection();

        let result = create_client(
            NewClient {
                details: details("   "),
                password_hash: PasswordHash::new_unchecked("hash"),
            },
            &connection,
        );

        assert_eq!(result, Err(Error::EmptyClientName));
    }

    #[test]
    fn create_client_rejects_invalid_email() {
        let connection = get_test_connection();
        let mut details = details("Ana");
        details.email = "not an email".to_owned();

        let result = create_client(
            NewClient {
                details,
                password_hash: PasswordHash::new_unchecked("hash"),
            },
            &connection,
        );

        assert_eq!(
            result,
            Err(Error::InvalidEmail("not an email".to_owned()))
        );
    }

    #[test]
    fn create_client_rejects_duplicate_name() {
        let connection = get_test_connection();
        must_create_client("Ana", "ana@example.com", &connection);

        let result = create_client(
            NewClient {
                details: details("Ana"),
                password_hash: PasswordHash::new_unchecked("hash"),
            },
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateClientName("Ana".to_owned())));
    }

    #[test]
    fn get_clients_by_email_returns_all_matches() {
        let connection = get_test_connection();
        let first = must_create_client("Ana", "shared@example.com", &connection);
        must_create_client("Ben", "ben@example.com", &connection);
        let third = must_create_client("Cat", "shared@example.com", &connection);

        let got = get_clients_by_email("shared@example.com", &connection).unwrap();

        assert_eq!(got, vec![first, third]);
    }

    #[test]
    fn update_client_keeps_password_when_none() {
        let connection = get_test_connection();
        let client = must_create_client("Ana", "ana@example.com", &connection);
        let mut new_details = client.details.clone();
        new_details.city = "Auckland".to_owned();

        update_client(client.id, &new_details, None, &connection).unwrap();

        let got = get_client(client.id, &connection).unwrap();
        assert_eq!(got.details.city, "Auckland");
        assert_eq!(got.password_hash, client.password_hash);
    }

    #[test]
    fn update_client_replaces_password() {
        let connection = get_test_connection();
        let client = must_create_client("Ana", "ana@example.com", &connection);
        let new_hash = PasswordHash::new_unchecked("new-hash");

        update_client(client.id, &client.details, Some(&new_hash), &connection).unwrap();

        let got = get_client(client.id, &connection).unwrap();
        assert_eq!(got.password_hash, new_hash);
    }

    #[test]
    fn update_missing_client_returns_error() {
        let connection = get_test_connection();

        let result = update_client(ClientId::new(1), &details("Ana"), None, &connection);

        assert_eq!(result, Err(Error::UpdateMissingClient));
    }

    #[test]
    fn delete_client_removes_row() {
        let connection = get_test_connection();
        let client = must_create_client("Ana", "ana@example.com", &connection);

        let rows_affected = delete_client(client.id, &connection).unwrap();

        assert_eq!(rows_affected, 1);
        assert_eq!(get_all_clients(&connection), Ok(vec![]));
    }

    #[test]
    fn display_shows_contact_details() {
        let connection = get_test_connection();
        let client = must_create_client("Ana", "ana@example.com", &connection);

        assert_eq!(
            client.to_string(),
            "Ana <ana@example.com> <021 123 4567> <1 Queen Street>"
        );
    }
}
