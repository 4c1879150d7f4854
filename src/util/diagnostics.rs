use crate::route::PageToken;
use http::{HeaderMap, header::LINK};
use url::Url;

pub(crate) fn request_id(headers: &HeaderMap) -> Option<Box<str>> {
    for name in ["x-request-id", "x-github-request-id", "x-correlation-id"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string().into_boxed_str());
            }
        }
    }
    None
}

/// Query pairs of the `rel="next"` entry of an RFC 8288 `Link` header.
fn link_next_page(headers: &HeaderMap) -> Option<PageToken> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .find_map(|entry| {
            let mut pieces = entry.split(';').map(str::trim);
            let target = pieces.next()?.strip_prefix('<')?.strip_suffix('>')?;
            pieces
                .any(|p| p == r#"rel="next""# || p == "rel=next")
                .then_some(target)
        })
        .and_then(|target| Url::parse(target).ok())
        .and_then(|url| {
            PageToken::from_pairs(
                url.query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
            )
        })
}

/// Continuation marker from `Link` (`GitHub`, `GitLab`) or `X-Next-Page` (`GitLab`).
pub(crate) fn next_page(headers: &HeaderMap) -> Option<PageToken> {
    link_next_page(headers)
        .or_else(|| {
            headers
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .map(PageToken::page)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn github_link_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                r#"<https://api.github.com/repositories/1/commits?per_page=2&page=3>; rel="next", <https://api.github.com/repositories/1/commits?per_page=2&page=9>; rel="last""#,
            ),
        );
        let token = next_page(&headers).unwrap();
        assert_eq!(token.get("page"), Some("3"));
        assert_eq!(token.get("per_page"), Some("2"));
    }

    #[test]
    fn keyset_link_keeps_cursor_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                r#"<https://gitlab.example.com/api/v4/projects?id_after=42&pagination=keyset&per_page=20>; rel="next""#,
            ),
        );
        // Keyset links win over the offset header.
        headers.insert("x-next-page", HeaderValue::from_static("2"));

        let token = next_page(&headers).unwrap();
        assert_eq!(token.to_string(), "id_after=42&pagination=keyset&per_page=20");
        assert_eq!(token.get("page"), None);
    }

    #[test]
    fn link_next_without_query_falls_back_to_offset_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(r#"<https://gitlab.example.com/api/v4/projects>; rel="next""#),
        );
        headers.insert("x-next-page", HeaderValue::from_static("5"));
        assert_eq!(next_page(&headers).unwrap().get("page"), Some("5"));
    }

    #[test]
    fn link_without_next_is_last_page() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(r#"<https://api.github.com/x?page=1>; rel="first""#),
        );
        assert!(next_page(&headers).is_none());
    }

    #[test]
    fn gitlab_next_page_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-next-page", HeaderValue::from_static("4"));
        assert_eq!(next_page(&headers).unwrap().to_string(), "page=4");

        headers.insert("x-next-page", HeaderValue::from_static(""));
        assert!(next_page(&headers).is_none());
    }

    #[test]
    fn request_id_prefers_generic_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-github-request-id", HeaderValue::from_static("GH:1"));
        assert_eq!(request_id(&headers).as_deref(), Some("GH:1"));
        headers.insert("x-request-id", HeaderValue::from_static("01ABC"));
        assert_eq!(request_id(&headers).as_deref(), Some("01ABC"));
    }
}
