//! Opening new accounts.
//!
//! An account is created together with its saving or current row inside one
//! SQLite transaction so that a failure at any step leaves no rows behind.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    Error,
    account::{Account, AccountKind, AccountType, account_number_exists},
    client::{ClientId, client_exists},
    db::{SqlDecimal, Timestamp, now_utc},
};

/// The number of digits in an account number.
pub const ACCOUNT_NUMBER_LENGTH: usize = 10;

/// How many account numbers to try before giving up.
pub const MAX_ACCOUNT_NUMBER_ATTEMPTS: usize = 5;

/// The data needed to open an account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    /// The client that will own the account.
    pub client_id: Option<ClientId>,
    /// Whether to open a saving or current account.
    pub account_type: AccountType,
    /// The opening balance.
    pub balance: Option<Decimal>,
    /// The interest rate for a saving account, defaults to zero.
    pub interest_rate: Option<Decimal>,
    /// The overdraft limit for a current account, defaults to zero.
    pub limit: Option<Decimal>,
}

/// Generate a candidate account number from the leading decimal digits of a
/// random UUID.
pub fn generate_account_number() -> String {
    Uuid::new_v4()
        .as_u128()
        .to_string()
        .chars()
        .take(ACCOUNT_NUMBER_LENGTH)
        .collect()
}

/// Open an account for a client.
///
/// # Errors
/// Returns:
/// - [Error::MissingClientId] if no client was given,
/// - [Error::ClientNotFound] if the client does not exist,
/// - [Error::AccountNumberExhausted] if no unused account number was found,
/// - [Error::SqlError] for any other database error.
///
/// No rows are written if an error is returned.
pub fn provision_account(new_account: NewAccount, connection: &Connection) -> Result<Account, Error> {
    provision_account_with(new_account, connection, generate_account_number)
}

fn provision_account_with(
    new_account: NewAccount,
    connection: &Connection,
    mut generate_number: impl FnMut() -> String,
) -> Result<Account, Error> {
    let client_id = new_account.client_id.ok_or(Error::MissingClientId)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    if !client_exists(client_id, &transaction)? {
        return Err(Error::ClientNotFound(client_id));
    }

    let number = find_unused_account_number(&transaction, &mut generate_number)?;
    let now = now_utc();

    transaction.execute(
        "INSERT INTO account (number, client_id, balance, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?4)",
        (
            &number,
            client_id.as_i64(),
            new_account.balance.map(SqlDecimal),
            Timestamp(now),
        ),
    )?;
    let id = transaction.last_insert_rowid();

    let kind = match new_account.account_type {
        AccountType::Saving => {
            let interest_rate = new_account.interest_rate.unwrap_or(Decimal::ZERO);
            transaction.execute(
                "INSERT INTO account_saving (account_id, interest_rate) VALUES (?1, ?2)",
                (id, SqlDecimal(interest_rate)),
            )?;
            AccountKind::Saving { interest_rate }
        }
        AccountType::Current => {
            let limit = new_account.limit.unwrap_or(Decimal::ZERO);
            transaction.execute(
                "INSERT INTO account_current (account_id, credit_limit) VALUES (?1, ?2)",
                (id, SqlDecimal(limit)),
            )?;
            AccountKind::Current { limit }
        }
    };

    transaction.commit()?;

    tracing::info!("Opened {} account {number} for client {client_id}", kind.account_type());

    Ok(Account {
        id,
        number,
        client_id,
        balance: new_account.balance,
        kind: Some(kind),
        created_at: now,
        updated_at: now,
    })
}

fn find_unused_account_number(
    connection: &Connection,
    generate_number: &mut impl FnMut() -> String,
) -> Result<String, Error> {
    for attempt in 1..=MAX_ACCOUNT_NUMBER_ATTEMPTS {
        let number = generate_number();

        if !account_number_exists(&number, connection)? {
            return Ok(number);
        }

        tracing::warn!("Account number collision on attempt {attempt}, trying again");
    }

    Err(Error::AccountNumberExhausted(MAX_ACCOUNT_NUMBER_ATTEMPTS))
}
