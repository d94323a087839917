use url::Url;

/// Resolves `raw_href` against `base` into a comparable absolute URL.
///
/// Relative hrefs are joined onto `base`, unsafe characters are percent-encoded
/// by the WHATWG serializer (`: / ? = &` and existing `%XX` escapes are kept as-is)
/// and the fragment is dropped, so `/x#foo` and `/x#bar` collapse into `/x`.
///
/// Returns `None` for empty or malformed hrefs and for anything that doesn't
/// resolve to http(s): `mailto:`, `tel:`, `javascript:`, `data:` and friends.
pub fn normalize(base: &Url, raw_href: &str) -> Option<Url> {
    let href = raw_href.trim();
    if href.is_empty() {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.host_str()?;

    url.set_fragment(None);
    Some(url)
}

/// Lowercased `host[:port]` of `url`, the port only when it isn't the scheme default.
/// This is the key used for scope checks and the per-host robots cache.
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// True iff `link` lives on exactly `seed_host` (no subdomain matching),
/// or carries no host at all and therefore inherits the page's host.
pub fn in_scope(seed_host: &str, link: &Url) -> bool {
    match host_key(link) {
        Some(host) => host.eq_ignore_ascii_case(seed_host),
        None => true,
    }
}
