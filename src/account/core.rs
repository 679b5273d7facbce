use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    Error,
    client::ClientId,
    db::{SqlDecimal, Timestamp},
};

pub type AccountId = i64;

/// The discriminator for the two kinds of account a client can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    /// An account that earns interest.
    Saving,
    /// An everyday account with an overdraft limit.
    Current,
}

impl AccountType {
    /// The lowercase name used in forms and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Saving => "saving",
            AccountType::Current => "current",
        }
    }
}

impl FromStr for AccountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "saving" => Ok(AccountType::Saving),
            "current" => Ok(AccountType::Current),
            _ => Err(Error::InvalidAccountType(s.to_owned())),
        }
    }
}

impl Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountType::Saving => write!(f, "Saving"),
            AccountType::Current => write!(f, "Current"),
        }
    }
}

/// The type specific data of an account.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AccountKind {
    /// A saving account and its interest rate.
    Saving {
        /// The interest rate, e.g. 2.5 for 2.5%.
        interest_rate: Decimal,
    },
    /// A current account and its overdraft limit.
    Current {
        /// How far the account may be overdrawn.
        limit: Decimal,
    },
}

impl AccountKind {
    /// The discriminator for this kind of account.
    pub fn account_type(&self) -> AccountType {
        match self {
            AccountKind::Saving { .. } => AccountType::Saving,
            AccountKind::Current { .. } => AccountType::Current,
        }
    }
}

/// A bank account owned by a client.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The generated 10 digit account number.
    pub number: String,
    /// The client that owns the account.
    pub client_id: ClientId,
    /// The balance, which may not have been set.
    pub balance: Option<Decimal>,
    /// Whether this is a saving or current account.
    ///
    /// This is `None` only for accounts created outside of
    /// [provision_account](crate::account::provision_account) without a
    /// specialization row.
    pub kind: Option<AccountKind>,
    /// When the account was opened.
    pub created_at: OffsetDateTime,
    /// When the account, or its balance, was last updated.
    pub updated_at: OffsetDateTime,
}

pub fn create_account_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            number TEXT NOT NULL UNIQUE CHECK (length(number) = 10),
            client_id INTEGER NOT NULL REFERENCES client(id) ON DELETE CASCADE,
            balance TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_account_client_id ON account(client_id)",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS account_saving (
            account_id INTEGER PRIMARY KEY REFERENCES account(id) ON DELETE CASCADE,
            interest_rate TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS account_current (
            account_id INTEGER PRIMARY KEY REFERENCES account(id) ON DELETE CASCADE,
            credit_limit TEXT NOT NULL
        )",
        (),
    )?;

    // An account may have a saving row or a current row, never both.
    connection.execute(
        "CREATE TRIGGER IF NOT EXISTS account_saving_excludes_current
        BEFORE INSERT ON account_saving
        WHEN EXISTS (SELECT 1 FROM account_current WHERE account_id = NEW.account_id)
        BEGIN
            SELECT RAISE(ABORT, 'account is already a current account');
        END",
        (),
    )?;

    connection.execute(
        "CREATE TRIGGER IF NOT EXISTS account_current_excludes_saving
        BEFORE INSERT ON account_current
        WHEN EXISTS (SELECT 1 FROM account_saving WHERE account_id = NEW.account_id)
        BEGIN
            SELECT RAISE(ABORT, 'account is already a saving account');
        END",
        (),
    )?;

    // The specialization row must directly follow the base row it belongs to.
    for table in ["account_saving", "account_current"] {
        connection.execute(
            &format!(
                "CREATE TRIGGER IF NOT EXISTS {table}_only_at_opening
                BEFORE INSERT ON {table}
                WHEN NEW.account_id <> last_insert_rowid()
                BEGIN
                    SELECT RAISE(ABORT, 'account type can only be set when the account is opened');
                END"
            ),
            (),
        )?;
    }

    Ok(())
}

pub(crate) const SELECT_ACCOUNT: &str = "SELECT
        account.id, account.number, account.client_id, account.balance,
        account.created_at, account.updated_at,
        account_saving.interest_rate, account_current.credit_limit
    FROM account
    LEFT JOIN account_saving ON account_saving.account_id = account.id
    LEFT JOIN account_current ON account_current.account_id = account.id";

pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    let balance: Option<SqlDecimal> = row.get(3)?;
    let created_at: Timestamp = row.get(4)?;
    let updated_at: Timestamp = row.get(5)?;
    let interest_rate: Option<SqlDecimal> = row.get(6)?;
    let limit: Option<SqlDecimal> = row.get(7)?;

    let kind = match (interest_rate, limit) {
        (Some(SqlDecimal(interest_rate)), _) => Some(AccountKind::Saving { interest_rate }),
        (None, Some(SqlDecimal(limit))) => Some(AccountKind::Current { limit }),
        (None, None) => None,
    };

    Ok(Account {
        id: row.get(0)?,
        number: row.get(1)?,
        client_id: ClientId::new(row.get(2)?),
        balance: balance.map(|SqlDecimal(balance)| balance),
        kind,
        created_at: created_at.0,
        updated_at: updated_at.0,
    })
}

/// Get an account by its ID.
///
/// # Errors
/// Returns [Error::NotFound] if there is no account with the given ID.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .query_row(
            &format!("{SELECT_ACCOUNT} WHERE account.id = :id"),
            &[(":id", &id)],
            map_row_to_account,
        )
        .map_err(Error::from)
}

/// Get the accounts owned by a client, oldest first.
pub fn get_accounts_for_client(
    client_id: ClientId,
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_ACCOUNT} WHERE account.client_id = :client_id ORDER BY account.id ASC"
        ))?
        .query_map(&[(":client_id", &client_id.as_i64())], map_row_to_account)?
        .map(|account_result| account_result.map_err(Error::from))
        .collect()
}

/// Get all accounts, oldest first.
pub fn get_all_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(&format!("{SELECT_ACCOUNT} ORDER BY account.id ASC"))?
        .query_map([], map_row_to_account)?
        .map(|account_result| account_result.map_err(Error::from))
        .collect()
}

/// Check whether `number` is already used by an account.
pub fn account_number_exists(number: &str, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM account WHERE number = ?1)",
            [number],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

type RowsAffected = usize;

/// Delete an account, its specialization and its transactions.
pub fn delete_account(id: AccountId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM account WHERE id = :id", &[(":id", &id)])
        .map_err(Error::from)
}

#[cfg(test)]
mod account_type_tests {
    use std::str::FromStr;

    use crate::{Error, account::AccountType};

    #[test]
    fn parses_known_types_ignoring_case() {
        assert_eq!(AccountType::from_str("saving"), Ok(AccountType::Saving));
        assert_eq!(AccountType::from_str("Current"), Ok(AccountType::Current));
        assert_eq!(AccountType::from_str(" SAVING "), Ok(AccountType::Saving));
    }

    #[test]
    fn rejects_unknown_type() {
        assert_eq!(
            AccountType::from_str("checking"),
            Err(Error::InvalidAccountType("checking".to_owned()))
        );
    }
}

#[cfg(test)]
mod account_table_tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;

    use crate::{
        Error,
        account::{
            AccountKind, AccountType, NewAccount, delete_account, get_account,
            get_accounts_for_client, provision_account,
        },
        client::test_support::must_create_client,
        db::initialize,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn account_cannot_have_both_specializations() {
        let connection = get_test_connection();
        let client = must_create_client("Ana", "ana@example.com", &connection);
        let account = provision_account(
            NewAccount {
                client_id: Some(client.id),
                account_type: AccountType::Saving,
                balance: None,
                interest_rate: Some(dec!(1.5)),
                limit: None,
            },
            &connection,
        )
        .unwrap();

        let result = connection.execute(
            "INSERT INTO account_current (account_id, credit_limit) VALUES (?1, '100')",
            [account.id],
        );

        assert!(result.is_err());
        assert_eq!(
            get_account(account.id, &connection).unwrap().kind,
            Some(AccountKind::Saving {
                interest_rate: dec!(1.5)
            })
        );
    }

    #[test]
    fn account_without_specialization_has_no_kind() {
        let connection = get_test_connection();
        let client = must_create_client("Ana", "ana@example.com", &connection);
        connection
            .execute(
                "INSERT INTO account (id, number, client_id, balance, created_at, updated_at)
                VALUES (1, '0123456789', ?1, NULL, '2024-03-01 00:00:00', '2024-03-01 00:00:00')",
                [client.id.as_i64()],
            )
            .unwrap();

        let account = get_account(1, &connection).unwrap();

        assert_eq!(account.kind, None);
        assert_eq!(account.balance, None);
    }

    #[test]
    fn existing_account_cannot_gain_specialization() {
        let connection = get_test_connection();
        let client = must_create_client("Ana", "ana@example.com", &connection);
        for (id, number) in [(1, "0123456789"), (2, "9876543210")] {
            connection
                .execute(
                    "INSERT INTO account (id, number, client_id, balance, created_at, updated_at)
                    VALUES (?1, ?2, ?3, NULL, '2024-03-01 00:00:00', '2024-03-01 00:00:00')",
                    (id, number, client.id.as_i64()),
                )
                .unwrap();
        }

        let saving = connection.execute(
            "INSERT INTO account_saving (account_id, interest_rate) VALUES (1, '1.5')",
            (),
        );
        let current = connection.execute(
            "INSERT INTO account_current (account_id, credit_limit) VALUES (1, '100')",
            (),
        );

        assert!(saving.is_err());
        assert!(current.is_err());
        assert_eq!(get_account(1, &connection).unwrap().kind, None);
    }

    #[test]
    fn deleting_client_deletes_accounts() {
        let connection = get_test_connection();
        let client = must_create_client("Ana", "ana@example.com", &connection);
        let account = provision_account(
            NewAccount {
                client_id: Some(client.id),
                account_type: AccountType::Current,
                balance: Some(dec!(10)),
                interest_rate: None,
                limit: Some(dec!(500)),
            },
            &connection,
        )
        .unwrap();

        connection
            .execute("DELETE FROM client WHERE id = ?1", [client.id.as_i64()])
            .unwrap();

        assert_eq!(get_account(account.id, &connection), Err(Error::NotFound));
        let current_rows: i64 = connection
            .query_row("SELECT COUNT(*) FROM account_current", [], |row| row.get(0))
            .unwrap();
        assert_eq!(current_rows, 0);
    }

    #[test]
    fn get_accounts_for_client_only_returns_their_accounts() {
        let connection = get_test_connection();
        let ana = must_create_client("Ana", "ana@example.com", &connection);
        let ben = must_create_client("Ben", "ben@example.com", &connection);
        let new_account = |client_id| NewAccount {
            client_id: Some(client_id),
            account_type: AccountType::Saving,
            balance: None,
            interest_rate: None,
            limit: None,
        };
        let want = provision_account(new_account(ana.id), &connection).unwrap();
        provision_account(new_account(ben.id), &connection).unwrap();

        let got = get_accounts_for_client(ana.id, &connection).unwrap();

        assert_eq!(got, vec![want]);
    }

    #[test]
    fn delete_account_removes_row() {
        let connection = get_test_connection();
        let client = must_create_client("Ana", "ana@example.com", &connection);
        let account = provision_account(
            NewAccount {
                client_id: Some(client.id),
                account_type: AccountType::Saving,
                balance: None,
                interest_rate: None,
                limit: None,
            },
            &connection,
        )
        .unwrap();

        assert_eq!(delete_account(account.id, &connection), Ok(1));
        assert_eq!(delete_account(account.id, &connection), Ok(0));
    }
}
