use url::Url;

/// One cookie from a replayed `Cookie` header, scoped to the listing's site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
}

/// Drop an optional leading `Cookie:` and surrounding whitespace.
pub fn normalize_header(header: &str) -> Option<&str> {
    let trimmed = header.trim();
    let body = match trimmed.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("cookie:") => trimmed[7..].trim(),
        _ => trimmed,
    };
    (!body.is_empty()).then_some(body)
}

/// `.example.com` for `https://www.example.com/...`.
pub fn cookie_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    Some(format!(".{host}"))
}

/// Split a raw header into cookies. Values may contain `=`; pairs without a name are dropped.
pub fn parse_cookie_header(header: &str, url: &Url) -> Vec<ReplayCookie> {
    let (Some(body), Some(domain)) = (normalize_header(header), cookie_domain(url)) else {
        return Vec::new();
    };
    body.split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(ReplayCookie {
                name: name.to_string(),
                value: value.trim().to_string(),
                domain: domain.clone(),
                path: "/".into(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://www.airbnb.fr/rooms/123").unwrap()
    }

    #[test]
    fn strips_cookie_prefix() {
        assert_eq!(normalize_header("Cookie: a=1"), Some("a=1"));
        assert_eq!(normalize_header("cookie:a=1"), Some("a=1"));
        assert_eq!(normalize_header("  a=1 "), Some("a=1"));
        assert_eq!(normalize_header("Cookie:   "), None);
    }

    #[test]
    fn domain_drops_www() {
        assert_eq!(cookie_domain(&url()).as_deref(), Some(".airbnb.fr"));
        let bare = Url::parse("https://example.com/x").unwrap();
        assert_eq!(cookie_domain(&bare).as_deref(), Some(".example.com"));
    }

    #[test]
    fn parses_pairs_and_keeps_equals_in_values() {
        let cookies = parse_cookie_header("Cookie: _sess=abc==; bev=1; ; novalue", &url());
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name, "_sess");
        assert_eq!(cookies[0].value, "abc==");
        assert_eq!(cookies[0].domain, ".airbnb.fr");
        assert_eq!(cookies[0].path, "/");
        assert_eq!(cookies[1].name, "bev");
    }

    #[test]
    fn empty_header_yields_nothing() {
        assert!(parse_cookie_header("", &url()).is_empty());
        assert!(parse_cookie_header("=orphan", &url()).is_empty());
    }
}
