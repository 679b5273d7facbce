//! The display strings for the admin site.

use axum::extract::FromRef;

use crate::AppState;

/// The text shown in the header, page titles and index page of the admin site.
///
/// The defaults can be overridden from the command line of the server.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    /// The brand text shown in the navigation bar.
    pub site_header: String,
    /// The suffix added to the title of every admin page.
    pub site_title: String,
    /// The heading of the admin index page.
    pub index_title: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_header: "Administración de Mi Sitio".to_owned(),
            site_title: "Sitio de Admin".to_owned(),
            index_title: "Bienvenido al Portal de Administración".to_owned(),
        }
    }
}

impl SiteConfig {
    /// Format the HTML title for an admin page, e.g. "Clients | Sitio de Admin".
    pub fn page_title(&self, title: &str) -> String {
        format!("{title} | {}", self.site_title)
    }
}

impl FromRef<AppState> for SiteConfig {
    fn from_ref(state: &AppState) -> Self {
        state.site.clone()
    }
}
