//! Monthly account reports and the transaction summaries shown with them.

use rusqlite::{Connection, Row, named_params};
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    Error,
    account::AccountId,
    db::{SqlDecimal, Timestamp, now_utc},
    period::MonthOfYear,
    transaction::TransactionType,
};

pub type ReportId = i64;

/// A request to report on an account's transactions for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// The ID of the report.
    pub id: ReportId,
    /// The account being reported on.
    pub account_id: AccountId,
    /// The month the report covers.
    pub period: MonthOfYear,
    /// When the report was created.
    pub created_at: OffsetDateTime,
}

pub fn create_report_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS report (
            id INTEGER PRIMARY KEY,
            account_id INTEGER NOT NULL REFERENCES account(id) ON DELETE CASCADE,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            year INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_report(row: &Row) -> Result<Report, rusqlite::Error> {
    let year: i32 = row.get(2)?;
    let month: u8 = row.get(3)?;
    let period = MonthOfYear::new(year, month).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Integer, Box::new(error))
    })?;
    let created_at: Timestamp = row.get(4)?;

    Ok(Report {
        id: row.get(0)?,
        account_id: row.get(1)?,
        period,
        created_at: created_at.0,
    })
}

/// Create a report for an account.
///
/// # Errors
/// Returns [Error::AccountNotFound] if the account does not exist.
pub fn create_report(
    account_id: AccountId,
    period: MonthOfYear,
    connection: &Connection,
) -> Result<Report, Error> {
    let created_at = now_utc();

    connection
        .execute(
            "INSERT INTO report (account_id, year, month, created_at) VALUES (?1, ?2, ?3, ?4)",
            (account_id, period.year(), period.month(), Timestamp(created_at)),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(error, Some(_))
                if error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Error::AccountNotFound(account_id)
            }
            error => error.into(),
        })?;

    Ok(Report {
        id: connection.last_insert_rowid(),
        account_id,
        period,
        created_at,
    })
}

/// Get all reports, newest period first.
pub fn get_all_reports(connection: &Connection) -> Result<Vec<Report>, Error> {
    connection
        .prepare(
            "SELECT id, account_id, year, month, created_at FROM report
            ORDER BY year DESC, month DESC, id DESC",
        )?
        .query_map([], map_row_to_report)?
        .map(|report_result| report_result.map_err(Error::from))
        .collect()
}

type RowsAffected = usize;

pub fn delete_report(id: ReportId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM report WHERE id = :id", &[(":id", &id)])
        .map_err(Error::from)
}

/// Totals for the transactions of an account over a period.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransactionSummary {
    /// How many transactions were made.
    pub transaction_count: u64,
    /// The sum of all deposits.
    pub deposits: Decimal,
    /// The sum of all withdrawals.
    pub withdrawals: Decimal,
}

impl TransactionSummary {
    /// The change in balance over the period.
    pub fn net(&self) -> Decimal {
        self.deposits - self.withdrawals
    }

    fn add(mut self, value: Decimal, transaction_type: TransactionType) -> Self {
        self.transaction_count += 1;
        match transaction_type {
            TransactionType::Deposit => self.deposits += value,
            TransactionType::Withdraw => self.withdrawals += value,
        }
        self
    }
}

fn summarise(
    account_id: AccountId,
    year: i32,
    month: Option<u8>,
    connection: &Connection,
) -> Result<TransactionSummary, Error> {
    let mut statement = connection.prepare(
        "SELECT value, type FROM \"transaction\"
        WHERE account_id = :account_id
            AND CAST(strftime('%Y', created_at) AS INTEGER) = :year
            AND (:month IS NULL OR CAST(strftime('%m', created_at) AS INTEGER) = :month)",
    )?;

    let rows = statement.query_map(
        named_params! { ":account_id": account_id, ":year": year, ":month": month },
        |row| {
            let value: SqlDecimal = row.get(0)?;
            let code: String = row.get(1)?;
            Ok((value.0, code))
        },
    )?;

    let mut summary = TransactionSummary::default();
    for row in rows {
        let (value, code) = row?;
        summary = summary.add(value, code.parse()?);
    }

    Ok(summary)
}

/// Summarise the transactions of an account in one month.
pub fn summarise_month(
    account_id: AccountId,
    period: MonthOfYear,
    connection: &Connection,
) -> Result<TransactionSummary, Error> {
    summarise(account_id, period.year(), Some(period.month()), connection)
}

/// Summarise the transactions of an account over a whole year.
pub fn summarise_year(
    account_id: AccountId,
    year: i32,
    connection: &Connection,
) -> Result<TransactionSummary, Error> {
    summarise(account_id, year, None, connection)
}
