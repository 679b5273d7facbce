//! Transactions and how they change the balance of an account.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row, Transaction as SqlTransaction, TransactionBehavior};
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    Error,
    account::AccountId,
    client::ClientId,
    db::{SqlDecimal, Timestamp, now_utc},
};

pub type TransactionId = i64;

/// Whether a transaction adds money to or takes money from an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    /// Money paid into the account, type code `D`.
    Deposit,
    /// Money taken out of the account, type code `W`.
    Withdraw,
}

impl TransactionType {
    /// The one character code stored in the database.
    pub fn code(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "D",
            TransactionType::Withdraw => "W",
        }
    }

    /// Apply a transaction of this type for `value` to `balance`.
    ///
    /// Withdrawals are not checked against the balance, so the result may be
    /// negative.
    pub fn apply(&self, balance: Decimal, value: Decimal) -> Decimal {
        match self {
            TransactionType::Deposit => balance + value,
            TransactionType::Withdraw => balance - value,
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    /// Parse a type code, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "D" | "d" => Ok(TransactionType::Deposit),
            "W" | "w" => Ok(TransactionType::Withdraw),
            _ => Err(Error::InvalidTransactionType(s.to_owned())),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "Deposit"),
            TransactionType::Withdraw => write!(f, "Withdraw"),
        }
    }
}

/// A deposit into or withdrawal from an account.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The account the transaction was made against.
    pub account_id: AccountId,
    /// The amount of money.
    pub value: Decimal,
    /// Whether the money was deposited or withdrawn.
    pub transaction_type: TransactionType,
    /// When the transaction was made.
    pub created_at: OffsetDateTime,
}

/// The data needed to create a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The account the transaction is made against.
    pub account_id: AccountId,
    /// The amount of money.
    pub value: Decimal,
    /// Whether the money is deposited or withdrawn.
    pub transaction_type: TransactionType,
    /// When the transaction was made, defaults to now.
    pub created_at: Option<OffsetDateTime>,
}

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            account_id INTEGER NOT NULL REFERENCES account(id) ON DELETE CASCADE,
            value TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('D', 'W')),
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_account_created_at
        ON \"transaction\"(account_id, created_at)",
        (),
    )?;

    Ok(())
}

pub(crate) const SELECT_TRANSACTION: &str =
    "SELECT id, account_id, value, type, created_at FROM \"transaction\"";

pub fn map_row_to_transaction(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let value: SqlDecimal = row.get(2)?;
    let code: String = row.get(3)?;
    let transaction_type = TransactionType::from_str(&code).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(error))
    })?;
    let created_at: Timestamp = row.get(4)?;

    Ok(Transaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        value: value.0,
        transaction_type,
        created_at: created_at.0,
    })
}

/// Record a transaction and apply it to the balance of its account.
///
/// The balance is read, updated and the transaction inserted inside one
/// immediate SQLite transaction, so concurrent transactions against the same
/// account cannot overwrite each other's balance. The account balance is
/// updated before the transaction row is written. A `NULL` balance counts as
/// zero.
///
/// # Errors
/// Returns [Error::AccountNotFound] if the account does not exist. Nothing is
/// written if an error is returned.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let NewTransaction {
        account_id,
        value,
        transaction_type,
        created_at,
    } = new_transaction;
    let created_at = created_at.unwrap_or_else(now_utc);

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let balance: Option<SqlDecimal> = transaction
        .query_row(
            "SELECT balance FROM account WHERE id = ?1",
            [account_id],
            |row| row.get(0),
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::AccountNotFound(account_id),
            error => error.into(),
        })?;
    let balance = balance.map(|SqlDecimal(balance)| balance).unwrap_or(Decimal::ZERO);
    let new_balance = transaction_type.apply(balance, value);

    transaction.execute(
        "UPDATE account SET balance = ?1, updated_at = ?2 WHERE id = ?3",
        (SqlDecimal(new_balance), Timestamp(now_utc()), account_id),
    )?;

    transaction.execute(
        "INSERT INTO \"transaction\" (account_id, value, type, created_at) VALUES (?1, ?2, ?3, ?4)",
        (
            account_id,
            SqlDecimal(value),
            transaction_type.code(),
            Timestamp(created_at),
        ),
    )?;
    let id = transaction.last_insert_rowid();

    transaction.commit()?;

    tracing::debug!(
        "Applied {transaction_type} of {value} to account {account_id}, balance is now {new_balance}"
    );

    Ok(Transaction {
        id,
        account_id,
        value,
        transaction_type,
        created_at,
    })
}

/// Get a transaction by its ID.
#[cfg(test)]
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .query_row(
            &format!("{SELECT_TRANSACTION} WHERE id = :id"),
            &[(":id", &id)],
            map_row_to_transaction,
        )
        .map_err(Error::from)
}

/// Get the transactions made against any of a client's accounts, newest first.
pub fn get_transactions_for_client(
    client_id: ClientId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION}
            WHERE account_id IN (SELECT id FROM account WHERE client_id = :client_id)
            ORDER BY created_at DESC, id DESC"
        ))?
        .query_map(&[(":client_id", &client_id.as_i64())], map_row_to_transaction)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod transaction_type_tests {
    use std::str::FromStr;

    use rust_decimal_macros::dec;

    use crate::{Error, transaction::TransactionType};

    #[test]
    fn parses_codes_ignoring_case() {
        assert_eq!(TransactionType::from_str("D"), Ok(TransactionType::Deposit));
        assert_eq!(TransactionType::from_str("d"), Ok(TransactionType::Deposit));
        assert_eq!(TransactionType::from_str("W"), Ok(TransactionType::Withdraw));
        assert_eq!(TransactionType::from_str("w"), Ok(TransactionType::Withdraw));
    }

    #[test]
    fn rejects_unknown_codes() {
        for code in ["X", "", "DW", "deposit"] {
            assert_eq!(
                TransactionType::from_str(code),
                Err(Error::InvalidTransactionType(code.to_owned()))
            );
        }
    }

    #[test]
    fn deposit_adds_value() {
        assert_eq!(
            TransactionType::Deposit.apply(dec!(100), dec!(25.50)),
            dec!(125.50)
        );
    }

    #[test]
    fn withdraw_subtracts_value() {
        assert_eq!(
            TransactionType::Withdraw.apply(dec!(100), dec!(25.50)),
            dec!(74.50)
        );
    }

    #[test]
    fn withdraw_can_go_negative() {
        assert_eq!(
            TransactionType::Withdraw.apply(dec!(10), dec!(50)),
            dec!(-40)
        );
    }
}

#[cfg(test)]
mod create_transaction_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use crate::{
        Error,
        account::{Account, AccountType, NewAccount, get_account, provision_account},
        client::test_support::must_create_client,
        db::initialize,
        transaction::{
            NewTransaction, TransactionType, create_transaction, get_transactions_for_client,
        },
    };

    use super::get_transaction;

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn open_account(balance: Option<Decimal>, connection: &Connection) -> Account {
        let client = must_create_client("Ana", "ana@example.com", connection);

        provision_account(
            NewAccount {
                client_id: Some(client.id),
                account_type: AccountType::Current,
                balance,
                interest_rate: None,
                limit: None,
            },
            connection,
        )
        .unwrap()
    }

    fn new_transaction(
        account: &Account,
        value: Decimal,
        transaction_type: TransactionType,
    ) -> NewTransaction {
        NewTransaction {
            account_id: account.id,
            value,
            transaction_type,
            created_at: None,
        }
    }

    #[track_caller]
    fn balance_of(account: &Account, connection: &Connection) -> Option<Decimal> {
        get_account(account.id, connection).unwrap().balance
    }

    #[test]
    fn deposit_increases_balance() {
        let connection = get_test_connection();
        let account = open_account(Some(dec!(100)), &connection);

        create_transaction(
            new_transaction(&account, dec!(50), TransactionType::Deposit),
            &connection,
        )
        .unwrap();

        assert_eq!(balance_of(&account, &connection), Some(dec!(150)));
    }

    #[test]
    fn withdraw_decreases_balance_below_zero() {
        let connection = get_test_connection();
        let account = open_account(Some(dec!(100)), &connection);

        create_transaction(
            new_transaction(&account, dec!(130.25), TransactionType::Withdraw),
            &connection,
        )
        .unwrap();

        assert_eq!(balance_of(&account, &connection), Some(dec!(-30.25)));
    }

    #[test]
    fn null_balance_counts_as_zero() {
        let connection = get_test_connection();
        let account = open_account(None, &connection);

        create_transaction(
            new_transaction(&account, dec!(20), TransactionType::Deposit),
            &connection,
        )
        .unwrap();

        assert_eq!(balance_of(&account, &connection), Some(dec!(20)));
    }

    #[test]
    fn successive_transactions_accumulate() {
        let connection = get_test_connection();
        let account = open_account(Some(dec!(0)), &connection);

        for (value, transaction_type) in [
            (dec!(100), TransactionType::Deposit),
            (dec!(0.1), TransactionType::Deposit),
            (dec!(0.2), TransactionType::Deposit),
            (dec!(40), TransactionType::Withdraw),
        ] {
            create_transaction(new_transaction(&account, value, transaction_type), &connection)
                .unwrap();
        }

        assert_eq!(balance_of(&account, &connection), Some(dec!(60.3)));
    }

    #[test]
    fn transaction_is_stored() {
        let connection = get_test_connection();
        let account = open_account(Some(dec!(0)), &connection);
        let created_at = datetime!(2024-03-10 12:00:00 UTC);

        let transaction = create_transaction(
            NewTransaction {
                created_at: Some(created_at),
                ..new_transaction(&account, dec!(12.34), TransactionType::Withdraw)
            },
            &connection,
        )
        .unwrap();

        let got = get_transaction(transaction.id, &connection).unwrap();
        assert_eq!(got, transaction);
        assert_eq!(got.created_at, created_at);
    }

    #[test]
    fn unknown_account_writes_nothing() {
        let connection = get_test_connection();

        let result = create_transaction(
            NewTransaction {
                account_id: 42,
                value: dec!(1),
                transaction_type: TransactionType::Deposit,
                created_at: None,
            },
            &connection,
        );

        assert_eq!(result, Err(Error::AccountNotFound(42)));
        let count: i64 = connection
            .query_row("SELECT COUNT(*) FROM \"transaction\"", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn failed_insert_rolls_back_balance() {
        let connection = get_test_connection();
        let account = open_account(Some(dec!(100)), &connection);
        connection
            .execute(
                "CREATE TRIGGER fail_transaction BEFORE INSERT ON \"transaction\"
                BEGIN SELECT RAISE(ABORT, 'boom'); END",
                (),
            )
            .unwrap();

        let result = create_transaction(
            new_transaction(&account, dec!(50), TransactionType::Deposit),
            &connection,
        );

        assert!(result.is_err());
        assert_eq!(balance_of(&account, &connection), Some(dec!(100)));
    }

    #[test]
    fn get_transactions_for_client_is_newest_first() {
        let connection = get_test_connection();
        let account = open_account(Some(dec!(0)), &connection);
        let other_client = must_create_client("Ben", "ben@example.com", &connection);
        let other_account = provision_account(
            NewAccount {
                client_id: Some(other_client.id),
                account_type: AccountType::Saving,
                balance: None,
                interest_rate: None,
                limit: None,
            },
            &connection,
        )
        .unwrap();
        let older = create_transaction(
            NewTransaction {
                created_at: Some(datetime!(2024-03-01 09:00:00 UTC)),
                ..new_transaction(&account, dec!(5), TransactionType::Deposit)
            },
            &connection,
        )
        .unwrap();
        let newer = create_transaction(
            NewTransaction {
                created_at: Some(datetime!(2024-03-02 09:00:00 UTC)),
                ..new_transaction(&account, dec!(1), TransactionType::Withdraw)
            },
            &connection,
        )
        .unwrap();
        create_transaction(
            new_transaction(&other_account, dec!(7), TransactionType::Deposit),
            &connection,
        )
        .unwrap();

        let got = get_transactions_for_client(account.client_id, &connection).unwrap();

        assert_eq!(got, vec![newer, older]);
    }
}
