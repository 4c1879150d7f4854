//! Pure `Route -> Request` transformation.

use crate::route::{Encoding, PageToken, Part, Route};
use crate::util::url::{endpoint_url, relative_path};
use crate::{Error, Provider};
use http::{
    HeaderMap, HeaderName, HeaderValue, Method,
    header::{ACCEPT, CONTENT_TYPE},
};
use url::{Url, form_urlencoded};

const GITHUB_API_VERSION: HeaderName = HeaderName::from_static("x-github-api-version");

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestBody {
    /// Fully encoded body (form or JSON).
    Bytes {
        bytes: Vec<u8>,
        content_type: HeaderValue,
    },
    /// Multipart body; the transport picks the boundary.
    Multipart {
        fields: Vec<(String, String)>,
        parts: Vec<Part>,
    },
}

impl RequestBody {
    #[must_use]
    pub fn content_type(&self) -> Option<&HeaderValue> {
        match self {
            Self::Bytes { content_type, .. } => Some(content_type),
            Self::Multipart { .. } => None,
        }
    }
}

/// Transport-level descriptor built just in time from a route.
#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    /// Fully resolved URL, query string included.
    pub url: Url,
    /// Encoded path relative to the configured base URL.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl Request {
    /// Build the request for `route` without touching the network.
    pub fn from_route<R: Route + ?Sized>(route: &R) -> Result<Self, Error> {
        let config = route.configuration().ok_or(Error::ConfigurationMissing)?;
        let base = config.base_url();

        let segments = route.segments();
        let mut url = endpoint_url(base, segments.iter().map(|s| &**s))?;
        let path = relative_path(base, &url).to_owned();

        let mut headers = HeaderMap::new();
        match config.provider() {
            Provider::GitHub => {
                headers.insert(
                    ACCEPT,
                    HeaderValue::from_static("application/vnd.github+json"),
                );
                if let Some(version) = config.api_version() {
                    let value = HeaderValue::from_str(version).map_err(|err| Error::InvalidConfig {
                        message: "invalid api_version header value".into(),
                        source: Some(Box::new(err)),
                    })?;
                    headers.insert(GITHUB_API_VERSION, value);
                }
            }
            Provider::GitLab => {
                headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
            }
        }
        if let Some(credential) = config.credential() {
            credential.apply(config.provider(), &mut headers)?;
        }

        let params = route.params();
        let mut query = Vec::new();
        let body = match route.encoding() {
            Encoding::Query => {
                query = params
                    .iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                if let Some(token) = route.page_token() {
                    replay_page_token(&mut query, token);
                }
                if !query.is_empty() {
                    url.query_pairs_mut().extend_pairs(&query);
                }
                None
            }
            Encoding::Form => {
                let encoded = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(params.iter())
                    .finish();
                Some(RequestBody::Bytes {
                    bytes: encoded.into_bytes(),
                    content_type: HeaderValue::from_static("application/x-www-form-urlencoded"),
                })
            }
            Encoding::Json => {
                let value = route.json_body().unwrap_or_else(|| params.into_json());
                let bytes = serde_json::to_vec(&value).map_err(|err| Error::InvalidConfig {
                    message: "failed to encode JSON body".into(),
                    source: Some(Box::new(err)),
                })?;
                Some(RequestBody::Bytes {
                    bytes,
                    content_type: HeaderValue::from_static("application/json"),
                })
            }
            Encoding::Multipart => Some(RequestBody::Multipart {
                fields: params
                    .iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect(),
                parts: route.parts(),
            }),
        };

        if let Some(content_type) = body.as_ref().and_then(RequestBody::content_type) {
            headers.insert(CONTENT_TYPE, content_type.clone());
        }

        Ok(Self {
            method: route.method(),
            url,
            path,
            query,
            headers,
            body,
        })
    }

    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Token pairs override same-named route params; the rest are appended.
fn replay_page_token(query: &mut Vec<(String, String)>, token: &PageToken) {
    for (key, value) in token.pairs() {
        match query.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => value.clone_into(&mut slot.1),
            None => query.push((key.to_owned(), value.to_owned())),
        }
    }
}
