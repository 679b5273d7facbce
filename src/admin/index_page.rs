//! The landing page of the admin site.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    config::SiteConfig,
    endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
};

fn index_view(site: &SiteConfig) -> Markup {
    let nav_bar = NavBar::admin(endpoints::ADMIN_INDEX_VIEW, site).into_html();
    let sections = [
        (endpoints::CLIENTS_VIEW, "Clients", "Contact details and monthly activity."),
        (endpoints::ACCOUNTS_VIEW, "Accounts", "Saving and current accounts."),
        (endpoints::TRANSACTIONS_VIEW, "Transactions", "Deposits and withdrawals."),
        (endpoints::REPORTS_VIEW, "Reports", "Monthly and yearly account summaries."),
    ];

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-6" { (site.index_title) }

            ul class="grid gap-4 sm:grid-cols-2 w-full lg:max-w-3xl"
            {
                @for (url, title, description) in sections {
                    li class="p-4 rounded-lg border border-gray-200 dark:border-gray-700 bg-white dark:bg-gray-800"
                    {
                        a href=(url) class=(LINK_STYLE) { (title) }
                        p class="text-sm text-gray-500 dark:text-gray-400" { (description) }
                    }
                }
            }
        }
    };

    base(&site.page_title(&site.index_title), &content)
}

/// Display the admin index page.
pub async fn get_admin_index_page(State(site): State<SiteConfig>) -> Response {
    index_view(&site).into_response()
}
