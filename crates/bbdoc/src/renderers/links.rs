use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

const SAFE_SCHEMES: &[&str] = &["http", "https", "ftp", "mailto", "irc", "ircs"];

lazy_static! {
    static ref EMBEDDED_URL: Regex =
        Regex::new(r"(?i)\bhttps?://\S+").expect("invalid regex expression");
}

/// Whether a link or image target may be emitted. Relative targets are always safe, absolute
/// ones need an allowed scheme. Whitespace and control characters are ignored, browsers do too.
pub fn is_safe_href(href: &str) -> bool {
    let cleaned: String = href
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    match cleaned.find(|c: char| matches!(c, ':' | '/' | '?' | '#')) {
        Some(i) if cleaned[i..].starts_with(':') => {
            let scheme = cleaned[..i].to_ascii_lowercase();
            SAFE_SCHEMES.contains(&scheme.as_str())
        }
        _ => true,
    }
}

/// Whether `href` points away from `site_host`. Subdomains of the site host count as the site.
pub fn is_external(href: &str, site_host: &str) -> bool {
    let href = href.trim();
    let absolute: Cow<str> = if href.starts_with("//") {
        format!("https:{href}").into()
    } else {
        href.into()
    };

    let Ok(url) = Url::parse(&absolute) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https" | "ftp" | "irc" | "ircs") {
        return false;
    }
    match url.host_str() {
        Some(host) => !is_site_host(host, site_host),
        None => false,
    }
}

fn is_site_host(host: &str, site_host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let site = site_host.trim_end_matches('.').to_ascii_lowercase();
    host == site || host.ends_with(&format!(".{site}"))
}

/// Strips `http(s)://` urls out of text.
pub fn remove_urls(text: &str) -> Cow<'_, str> {
    EMBEDDED_URL.replace_all(text, "")
}
