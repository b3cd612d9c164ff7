//! `X-Total-Count` and RFC 5988 `Link` headers for paged listings.

use crate::domain::Page;
use axum::http::{HeaderMap, HeaderValue};

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

fn page_uri(base_url: &str, page: u64, size: u32, query: Option<&str>) -> String {
    match query {
        Some(query) => format!(
            "{}?page={}&size={}&query={}",
            base_url, page, size, query
        ),
        None => format!("{}?page={}&size={}", base_url, page, size),
    }
}

/// Form-encodes a query the way `application/x-www-form-urlencoded` does:
/// spaces become `+`, `*` stays literal.
fn form_encode(query: &str) -> String {
    urlencoding::encode(query)
        .replace("%20", "+")
        .replace("%2A", "*")
        .replace('~', "%7E")
}

fn link_header<T>(page: &Page<T>, base_url: &str, query: Option<&str>) -> String {
    let number = page.number as u64;
    let size = page.size;
    let mut link = String::new();
    if page.has_next() {
        link.push_str(&format!(
            "<{}>; rel=\"next\",",
            page_uri(base_url, number + 1, size, query)
        ));
    }
    if page.has_previous() {
        link.push_str(&format!(
            "<{}>; rel=\"prev\",",
            page_uri(base_url, number - 1, size, query)
        ));
    }
    let last_page = page.total_pages().saturating_sub(1);
    link.push_str(&format!(
        "<{}>; rel=\"last\",",
        page_uri(base_url, last_page, size, query)
    ));
    link.push_str(&format!(
        "<{}>; rel=\"first\"",
        page_uri(base_url, 0, size, query)
    ));
    link
}

fn headers(total: u64, link: String) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(total));
    if let Ok(value) = HeaderValue::try_from(link) {
        headers.insert(axum::http::header::LINK, value);
    }
    headers
}

pub fn pagination_headers<T>(page: &Page<T>, base_url: &str) -> HeaderMap {
    headers(page.total_elements, link_header(page, base_url, None))
}

pub fn search_pagination_headers<T>(query: &str, page: &Page<T>, base_url: &str) -> HeaderMap {
    let encoded = form_encode(query);
    headers(
        page.total_elements,
        link_header(page, base_url, Some(&encoded)),
    )
}
