use log2::{debug, warn};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

use super::normalize::normalize;

/// Collect every `<a href>` on the page, normalized against the page url.
///
/// Broken markup never fails: html5ever recovers what it can, so a mangled page
/// just yields fewer (or zero) links. Scope filtering is left to the caller.
pub fn extract_links(base: &Url, body: &str) -> HashSet<Url> {
    let document = Html::parse_document(body);
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(e) => {
            warn!("Failed to parse <a> selector: {}", e);
            return HashSet::new();
        }
    };

    let mut found_urls = HashSet::new();
    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            match normalize(base, href) {
                Some(url) => {
                    found_urls.insert(url);
                }
                None => debug!("Rejected href {:?} on {}", href, base),
            }
        }
    }

    debug!("Found {} urls on page {}", found_urls.len(), base);

    found_urls
}
