//! Database initialization and the column types shared by the ledger tables.
//!
//! Decimals and timestamps are stored as TEXT so that balances keep their
//! exact value and so that SQLite's date functions can be used on
//! `created_at` columns.

use std::str::FromStr;

use rusqlite::{
    Connection, Transaction as SqlTransaction, TransactionBehavior,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{
    Error, account::create_account_tables, auth::create_admin_table,
    client::create_client_table, report::create_report_table,
    transaction::create_transaction_table,
};

/// Create all the tables used by the application.
///
/// Foreign key enforcement is enabled on `connection` before the tables are
/// created since SQLite ignores the pragma inside a transaction.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_admin_table(&transaction)?;
    create_client_table(&transaction)?;
    create_account_tables(&transaction)?;
    create_transaction_table(&transaction)?;
    create_report_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Timestamp format for stored datetimes, e.g. "2024-03-15 09:30:00".
///
/// Timestamps are always stored in UTC.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// The current UTC time truncated to whole seconds, the precision that
/// timestamps are stored with.
pub(crate) fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}

/// A datetime stored as UTC text in the database.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Timestamp(pub OffsetDateTime);

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let formatted = self
            .0
            .to_offset(UtcOffset::UTC)
            .format(TIMESTAMP_FORMAT)
            .map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))?;

        Ok(ToSqlOutput::from(formatted))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        PrimitiveDateTime::parse(text, TIMESTAMP_FORMAT)
            .map(|datetime| Timestamp(datetime.assume_utc()))
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An exact decimal stored as text in the database.
///
/// Integer and real values written by other tools are also accepted when
/// reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SqlDecimal(pub Decimal);

impl ToSql for SqlDecimal {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for SqlDecimal {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Text(_) => Decimal::from_str(value.as_str()?)
                .map(SqlDecimal)
                .map_err(|error| FromSqlError::Other(Box::new(error))),
            ValueRef::Integer(integer) => Ok(SqlDecimal(Decimal::from(integer))),
            ValueRef::Real(real) => Decimal::try_from(real)
                .map(SqlDecimal)
                .map_err(|error| FromSqlError::Other(Box::new(error))),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}
