use crate::Error;
use url::Url;

pub(crate) fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url =
        Url::parse(raw).map_err(|err| Error::invalid_url("invalid base_url", Some(err)))?;

    if url.cannot_be_a_base() {
        return Err(Error::invalid_url("base_url must be a hierarchical URL", None));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::invalid_url(
            "base_url must not include query or fragment",
            None,
        ));
    }

    let path = url.path();
    if path != "/" && !path.ends_with('/') {
        url.set_path(&format!("{path}/"));
    }
    Ok(url)
}

/// Append percent-encoded path segments to `base_url`.
pub(crate) fn endpoint_url<'a, I>(base_url: &Url, segments: I) -> Result<Url, Error>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = base_url.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| Error::invalid_url("base_url must be a hierarchical URL", None))?;
        path.pop_if_empty();
        for seg in segments {
            if seg.is_empty() {
                return Err(Error::invalid_url("empty path segment", None));
            }
            path.push(seg);
        }
    }
    Ok(url)
}

/// Path of `url` relative to `base_url`, without a leading `/`.
pub(crate) fn relative_path<'a>(base_url: &Url, url: &'a Url) -> &'a str {
    url.path()
        .strip_prefix(base_url.path())
        .unwrap_or_else(|| url.path().trim_start_matches('/'))
}
