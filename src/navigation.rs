//! The navigation bars for the admin site and the client dashboard.

use maud::{Markup, html};

use crate::{config::SiteConfig, endpoints};

/// Template for a link in the navigation bar.
///
/// It will change appearance if `is_current` is set to
/// `true`. Only one link should be set as active at any one time.
#[derive(Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl<'a> Link<'a> {
    fn new(url: &'a str, title: &'a str, active_endpoint: &str) -> Self {
        Self {
            url,
            title,
            is_current: active_endpoint == url,
        }
    }

    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-blue-700 rounded-sm lg:bg-transparent
        lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
        lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0
        dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700
        dark:hover:text-white lg:dark:hover:bg-transparent"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        )
    }
}

pub struct NavBar<'a> {
    brand: String,
    brand_url: &'a str,
    links: Vec<Link<'a>>,
}

impl<'a> NavBar<'a> {
    /// The navigation bar for the admin site, branded with the site header.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    pub fn admin(active_endpoint: &str, site: &SiteConfig) -> NavBar<'a> {
        let links = vec![
            Link::new(endpoints::CLIENTS_VIEW, "Clients", active_endpoint),
            Link::new(endpoints::ACCOUNTS_VIEW, "Accounts", active_endpoint),
            Link::new(endpoints::TRANSACTIONS_VIEW, "Transactions", active_endpoint),
            Link::new(endpoints::REPORTS_VIEW, "Reports", active_endpoint),
            Link {
                url: endpoints::LOG_OUT,
                title: "Log out",
                is_current: false,
            },
        ];

        NavBar {
            brand: site.site_header.clone(),
            brand_url: endpoints::ADMIN_INDEX_VIEW,
            links,
        }
    }

    /// The navigation bar for a logged in client.
    pub fn client(active_endpoint: &str, client_name: &str) -> NavBar<'a> {
        let links = vec![
            Link::new(endpoints::DASHBOARD_VIEW, "My accounts", active_endpoint),
            Link {
                url: endpoints::LOG_OUT,
                title: "Log out",
                is_current: false,
            },
        ];

        NavBar {
            brand: client_name.to_owned(),
            brand_url: endpoints::DASHBOARD_VIEW,
            links,
        }
    }

    pub fn into_html(self) -> Markup {
        // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(self.brand_url)
                        class="flex items-center space-x-3 rtl:space-x-reverse"
                    {
                        span
                            class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            (self.brand)
                        }
                    }

                    div class="w-full lg:block lg:w-auto"
                    {
                        ul
                            class="font-medium flex flex-col p-4 lg:p-0 mt-4
                            border border-gray-100 rounded bg-gray-50
                            lg:flex-row lg:space-x-8 rtl:space-x-reverse lg:mt-0
                            lg:border-0 lg:bg-white dark:bg-gray-800
                            lg:dark:bg-gray-900 dark:border-gray-700"
                        {
                            @for link in self.links {
                                li { (link.into_html()) }
                            }
                        }
                    }
                }
            }
        )
    }
}
