use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, macros::datetime};

use ledger_admin::{
    AccountType, ClientDetails, MonthOfYear, NewAccount, NewClient, NewTransaction, PasswordHash,
    TransactionType, ValidatedPassword, create_client, create_report, create_transaction,
    initialize_db, provision_account, set_admin_password,
};

/// A utility for creating a test database for the ledger admin server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Setting the admin password to \"test\"...");
    let admin_password = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    set_admin_password(&admin_password, &conn)?;

    println!("Creating test clients...");
    let clients = [
        ("Ana García", "ana@example.com", "555-0101", "12 High Street"),
        ("Ben Okafor", "ben@example.com", "555-0102", "4 Mill Lane"),
    ];

    for (index, (name, email, phone, address)) in clients.into_iter().enumerate() {
        let client = create_client(
            NewClient {
                details: ClientDetails {
                    name: name.to_owned(),
                    email: email.to_owned(),
                    phone: phone.to_owned(),
                    address: address.to_owned(),
                    ..Default::default()
                },
                password_hash: PasswordHash::new(
                    ValidatedPassword::new_unchecked("test"),
                    PasswordHash::DEFAULT_COST,
                )?,
            },
            &conn,
        )?;

        let (account_type, interest_rate, limit) = if index % 2 == 0 {
            (AccountType::Saving, Some(Decimal::new(25, 1)), None)
        } else {
            (AccountType::Current, None, Some(Decimal::new(500, 0)))
        };
        let account = provision_account(
            NewAccount {
                client_id: Some(client.id),
                account_type,
                balance: Some(Decimal::new(1000, 0)),
                interest_rate,
                limit,
            },
            &conn,
        )?;

        let start = datetime!(2024-03-01 09:00:00 UTC);
        for day in 0..(3 + index as i64 * 2) {
            let transaction_type = if day % 3 == 2 {
                TransactionType::Withdraw
            } else {
                TransactionType::Deposit
            };

            create_transaction(
                NewTransaction {
                    account_id: account.id,
                    value: Decimal::new(2550 + day * 100, 2),
                    transaction_type,
                    created_at: Some(start + Duration::days(day * 9)),
                },
                &conn,
            )?;
        }

        create_report(account.id, MonthOfYear::DEFAULT, &conn)?;
        println!("Created {client} with account {}", account.number);
    }

    println!("Success!");

    Ok(())
}
