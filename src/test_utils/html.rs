use axum::{body::Body, response::Response};
use scraper::{Html, Selector};

async fn body_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not get response body");

    String::from_utf8_lossy(&body).to_string()
}

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    Html::parse_document(&body_text(response).await)
}

pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    Html::parse_fragment(&body_text(response).await)
}

/// The text of an alert fragment returned by an HTMX endpoint.
pub(crate) async fn alert_text(response: Response<Body>) -> String {
    parse_html_fragment(response)
        .await
        .root_element()
        .text()
        .collect()
}

/// The trimmed text of each `td` in the rows matched by `row_selector`.
pub(crate) fn table_cells(html: &Html, row_selector: &str) -> Vec<Vec<String>> {
    let row_selector = Selector::parse(row_selector).unwrap();
    let cell_selector = Selector::parse("td").unwrap();

    html.select(&row_selector)
        .map(|row| {
            row.select(&cell_selector)
                .map(|cell| cell.text().collect::<String>().trim().to_owned())
                .collect()
        })
        .collect()
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}
