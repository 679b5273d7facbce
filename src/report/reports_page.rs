//! The page listing reports with the monthly and yearly summaries of their accounts.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{AccountId, get_all_accounts},
    config::SiteConfig,
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        TABLE_STYLE, base, delete_action_button, format_currency,
    },
    navigation::NavBar,
    report::core::{Report, TransactionSummary, get_all_reports, summarise_month, summarise_year},
};

/// The state needed for the reports pages.
#[derive(Debug, Clone)]
pub struct ReportsPageState {
    pub site: SiteConfig,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            site: state.site.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

struct ReportRow {
    report: Report,
    account_number: String,
    month: TransactionSummary,
    year: TransactionSummary,
}

fn get_report_rows(connection: &Connection) -> Result<Vec<ReportRow>, Error> {
    let account_numbers: HashMap<AccountId, String> = get_all_accounts(connection)?
        .into_iter()
        .map(|account| (account.id, account.number))
        .collect();

    get_all_reports(connection)?
        .into_iter()
        .map(|report| {
            let month = summarise_month(report.account_id, report.period, connection)?;
            let year = summarise_year(report.account_id, report.period.year(), connection)?;

            Ok(ReportRow {
                account_number: account_numbers
                    .get(&report.account_id)
                    .cloned()
                    .unwrap_or_default(),
                report,
                month,
                year,
            })
        })
        .collect()
}

fn summary_cells(summary: &TransactionSummary) -> Markup {
    html! {
        td class="px-6 py-4 text-right tabular-nums" { (summary.transaction_count) }
        td class="px-6 py-4 text-right tabular-nums" { (format_currency(summary.deposits)) }
        td class="px-6 py-4 text-right tabular-nums" { (format_currency(summary.withdrawals)) }
        td class="px-6 py-4 text-right tabular-nums font-medium" { (format_currency(summary.net())) }
    }
}

fn reports_view(rows: &[ReportRow], site: &SiteConfig) -> Markup {
    let nav_bar = NavBar::admin(endpoints::REPORTS_VIEW, site).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Reports" }

                    a href=(endpoints::NEW_REPORT_VIEW) class=(LINK_STYLE) { "New Report" }
                }

                section class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class=(TABLE_STYLE)
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" rowspan="2" class=(TABLE_CELL_STYLE) { "Account" }
                                th scope="col" rowspan="2" class=(TABLE_CELL_STYLE) { "Period" }
                                th scope="colgroup" colspan="4" class="px-6 py-3 text-center" { "Month" }
                                th scope="colgroup" colspan="4" class="px-6 py-3 text-center" { "Year" }
                                th scope="col" rowspan="2" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                            tr
                            {
                                @for _ in 0..2 {
                                    th scope="col" class="px-6 py-3 text-right" { "Count" }
                                    th scope="col" class="px-6 py-3 text-right" { "Deposits" }
                                    th scope="col" class="px-6 py-3 text-right" { "Withdrawals" }
                                    th scope="col" class="px-6 py-3 text-right" { "Net" }
                                }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (row.account_number) }
                                    td class=(TABLE_CELL_STYLE) { (row.report.period) }
                                    (summary_cells(&row.month))
                                    (summary_cells(&row.year))
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        (delete_action_button(
                                            &format_endpoint(endpoints::DELETE_REPORT, row.report.id),
                                            "Are you sure you want to delete this report?",
                                            "closest tr",
                                            "delete",
                                        ))
                                    }
                                }
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td colspan="11" class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        "No reports yet."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base(&site.page_title("Reports"), &content)
}

/// Display all reports with their monthly and yearly summaries.
pub async fn get_reports_page(State(state): State<ReportsPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let rows = get_report_rows(&connection)
        .inspect_err(|error| tracing::error!("could not get reports: {error}"))?;

    Ok(reports_view(&rows, &state.site).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use crate::{
        admin::test_support::must_open_account,
        client::test_support::must_create_client,
        config::SiteConfig,
        period::MonthOfYear,
        report::{
            core::create_report,
            reports_page::{ReportsPageState, get_reports_page},
        },
        test_utils::{assert_valid_html, get_test_connection, parse_html_document, table_cells},
        transaction::{NewTransaction, TransactionType, create_transaction},
    };

    #[tokio::test]
    async fn shows_month_and_year_summaries() {
        let connection = get_test_connection();
        let ana = must_create_client("Ana", "ana@example.com", &connection);
        let account = must_open_account(ana.id, &connection);
        for (value, transaction_type, created_at) in [
            (dec!(100), TransactionType::Deposit, datetime!(2024-03-01 09:00:00 UTC)),
            (dec!(40), TransactionType::Withdraw, datetime!(2024-03-20 09:00:00 UTC)),
            (dec!(10), TransactionType::Deposit, datetime!(2024-07-01 09:00:00 UTC)),
        ] {
            create_transaction(
                NewTransaction {
                    account_id: account.id,
                    value,
                    transaction_type,
                    created_at: Some(created_at),
                },
                &connection,
            )
            .unwrap();
        }
        create_report(account.id, MonthOfYear::DEFAULT, &connection).unwrap();
        let state = ReportsPageState {
            site: SiteConfig::default(),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_reports_page(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let rows = table_cells(&html, "tbody tr");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0][..10],
            [
                account.number.as_str(),
                "March 2024",
                "2",
                "$100.00",
                "$40.00",
                "$60.00",
                "3",
                "$110.00",
                "$40.00",
                "$70.00",
            ]
        );
    }
}
