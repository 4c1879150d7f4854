//! Response dispatcher: raw transport outcome to domain object or normalized error.

use crate::route::{PageToken, Route};
use crate::transport::RawResponse;
use crate::util::diagnostics;
use crate::{ApiError, Error, Provider};
use http::{HeaderMap, StatusCode};
use serde_json::Value;

/// Successful, decoded response.
#[derive(Clone, Debug)]
pub struct Response<T> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Raw payload as received.
    pub body: Vec<u8>,
    pub data: T,
    /// Present when the provider advertised another page. Never followed automatically.
    pub next_page: Option<PageToken>,
    pub request_id: Option<Box<str>>,
}

impl<T> Response<T> {
    /// Keep the envelope, transform the decoded data.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
            data: f(self.data),
            next_page: self.next_page,
            request_id: self.request_id,
        }
    }
}

/// Decode `raw` for `route`, or normalize the failure.
///
/// Pure: no I/O, no retries, never follows pagination.
pub fn dispatch<R: Route + ?Sized>(
    route: &R,
    provider: Provider,
    raw: RawResponse,
) -> Result<Response<R::Output>, Error> {
    let request_id = diagnostics::request_id(&raw.headers);

    if !raw.status.is_success() {
        return Err(match parse_error_body(provider, &raw.body) {
            Some((message, details, documentation_url)) => Error::Api(ApiError {
                status: raw.status,
                message,
                details,
                documentation_url,
                request_id,
                body: String::from_utf8_lossy(&raw.body).into(),
            }),
            None => Error::Http {
                status: raw.status,
                body: raw.body.into_boxed_slice(),
            },
        });
    }

    let data = route.decode(raw.status, &raw.body)?;
    Ok(Response {
        status: raw.status,
        next_page: diagnostics::next_page(&raw.headers),
        headers: raw.headers,
        body: raw.body,
        data,
        request_id,
    })
}

type ParsedError = (Box<str>, Vec<Box<str>>, Option<Box<str>>);

fn parse_error_body(provider: Provider, body: &[u8]) -> Option<ParsedError> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;
    match provider {
        Provider::GitLab => parse_gitlab(object),
        Provider::GitHub => parse_github(object),
    }
}

fn text(value: &Value) -> Option<Box<str>> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Into::into)
}

/// `{"message": "..."}`, `{"message": {"field": ["problem", ..]}}` or
/// `{"error": "...", "error_description": "..."}`.
fn parse_gitlab(object: &serde_json::Map<String, Value>) -> Option<ParsedError> {
    if let Some(message) = object.get("message") {
        if let Some(message) = text(message) {
            return Some((message, Vec::new(), None));
        }
        if let Some(fields) = message.as_object() {
            let details = fields
                .iter()
                .flat_map(|(field, problems)| {
                    let problems: Vec<&str> = match problems {
                        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
                        Value::String(s) => vec![s.as_str()],
                        _ => Vec::new(),
                    };
                    problems
                        .into_iter()
                        .map(move |p| format!("{field} {p}").into_boxed_str())
                })
                .collect::<Vec<_>>();
            return Some(("validation failed".into(), details, None));
        }
    }

    let error = object.get("error").and_then(text)?;
    let details = object
        .get("error_description")
        .and_then(text)
        .into_iter()
        .collect();
    Some((error, details, None))
}

/// `{"message": "...", "documentation_url": "...", "errors": [..]}`.
fn parse_github(object: &serde_json::Map<String, Value>) -> Option<ParsedError> {
    let message = object.get("message").and_then(text)?;
    let documentation_url = object.get("documentation_url").and_then(text);
    let details = object
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| match e {
                    Value::String(_) => text(e),
                    Value::Object(o) => o.get("message").and_then(text).or_else(|| {
                        let field = o.get("field").and_then(Value::as_str)?;
                        let code = o.get("code").and_then(Value::as_str)?;
                        Some(format!("{field} {code}").into_boxed_str())
                    }),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    Some((message, details, documentation_url))
}
