//! Counting the transactions each client made in a month.

use rusqlite::{Connection, named_params, types::Type};

use crate::{Error, client::ClientId, period::MonthOfYear};

/// A client and the number of transactions made against their accounts in a month.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientActivity {
    /// The client's ID.
    pub client_id: ClientId,
    /// The client's name.
    pub name: String,
    /// The client's email address.
    pub email: String,
    /// The client's phone number.
    pub phone: String,
    /// The client's street address.
    pub address: String,
    /// The number of transactions in the month.
    pub transaction_count: u64,
}

/// Count the transactions for every client in `period`.
///
/// Clients without any transactions in the period are included with a count
/// of zero. The result is sorted by the count, highest first, and clients
/// with the same count are kept in the order they were created.
pub fn count_transactions_per_client(
    period: MonthOfYear,
    connection: &Connection,
) -> Result<Vec<ClientActivity>, Error> {
    connection
        .prepare(
            "SELECT client.id, client.name, client.email, client.phone, client.address,
                COUNT(\"transaction\".id) AS transaction_count
            FROM client
            LEFT JOIN account ON account.client_id = client.id
            LEFT JOIN \"transaction\" ON \"transaction\".account_id = account.id
                AND CAST(strftime('%Y', \"transaction\".created_at) AS INTEGER) = :year
                AND CAST(strftime('%m', \"transaction\".created_at) AS INTEGER) = :month
            GROUP BY client.id
            ORDER BY transaction_count DESC, client.id ASC",
        )?
        .query_map(
            named_params! { ":year": period.year(), ":month": period.month() },
            |row| {
                let transaction_count: i64 = row.get(5)?;
                let transaction_count = u64::try_from(transaction_count).map_err(|error| {
                    rusqlite::Error::FromSqlConversionFailure(5, Type::Integer, Box::new(error))
                })?;

                Ok(ClientActivity {
                    client_id: ClientId::new(row.get(0)?),
                    name: row.get(1)?,
                    email: row.get(2)?,
                    phone: row.get(3)?,
                    address: row.get(4)?,
                    transaction_count,
                })
            },
        )?
        .map(|activity_result| activity_result.map_err(Error::from))
        .collect()
}

/// Count the transactions in `period` for the selected clients only.
///
/// Unknown IDs are ignored. The order is the same as [count_transactions_per_client].
pub fn count_transactions_for_clients(
    client_ids: &[ClientId],
    period: MonthOfYear,
    connection: &Connection,
) -> Result<Vec<ClientActivity>, Error> {
    let activity = count_transactions_per_client(period, connection)?;

    Ok(activity
        .into_iter()
        .filter(|activity| client_ids.contains(&activity.client_id))
        .collect())
}

/// Summarise client activity with one "{name} - Transacciones: {count}" line per client.
pub fn format_activity_summary(activity: &[ClientActivity]) -> String {
    activity
        .iter()
        .map(|activity| {
            format!(
                "{} - Transacciones: {}",
                activity.name, activity.transaction_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
