//! Declarative route definitions shared by every resource family.

use crate::{Configuration, Error};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::{borrow::Cow, sync::Arc};

/// How a route's parameters travel on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// URL query string.
    Query,
    /// `application/x-www-form-urlencoded` body.
    Form,
    /// `application/json` body.
    Json,
    /// `multipart/form-data` body.
    Multipart,
}

/// Ordered parameter table keyed by stable literals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(&'static str, String)>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &'static str, value: impl Into<String>) -> &mut Self {
        self.0.push((key, value.into()));
        self
    }

    /// Absent values are omitted rather than sent empty.
    pub fn push_opt<V: ToString>(&mut self, key: &'static str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.0.push((key, value.to_string()));
        }
        self
    }

    pub fn push_bool(&mut self, key: &'static str, value: bool) -> &mut Self {
        self.push(key, if value { "true" } else { "false" })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub(crate) fn into_json(self) -> Value {
        Value::Object(
            self.0
                .into_iter()
                .map(|(k, v)| (k.to_owned(), Value::String(v)))
                .collect::<Map<_, _>>(),
        )
    }
}

/// One file part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: &'static str,
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Opaque pagination marker handed back by the dispatcher.
///
/// Holds every query pair of the provider's next-page link, so offset
/// (`page=3`) and keyset (`id_after=42&pagination=keyset`) continuations both
/// survive. Pass it to the `page` field of the same list route; the pairs are
/// replayed over the route's own query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageToken(Vec<(String, String)>);

impl PageToken {
    /// Offset continuation, as advertised by `X-Next-Page`.
    pub(crate) fn page(page: u32) -> Self {
        Self(vec![("page".to_owned(), page.to_string())])
    }

    /// `None` when there is nothing to replay.
    pub(crate) fn from_pairs(pairs: Vec<(String, String)>) -> Option<Self> {
        (!pairs.is_empty()).then_some(Self(pairs))
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Query-string form, e.g. `id_after=42&pagination=keyset`.
impl std::fmt::Display for PageToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.0)
            .finish();
        f.write_str(&query)
    }
}

/// Common trait implemented by every route family.
///
/// Implementations are enums; every method matches over all variants so a new
/// operation cannot be added without deciding its wire shape.
pub trait Route {
    type Output: Send + 'static;

    fn configuration(&self) -> Option<&Arc<Configuration>>;
    fn method(&self) -> Method;
    fn encoding(&self) -> Encoding;
    /// Unencoded path segments relative to the configured base URL.
    fn segments(&self) -> Vec<Cow<'_, str>>;
    fn params(&self) -> Params;
    /// Typed JSON body. Defaults to an object of the string params.
    fn json_body(&self) -> Option<Value> {
        (self.encoding() == Encoding::Json).then(|| self.params().into_json())
    }
    fn parts(&self) -> Vec<Part> {
        Vec::new()
    }
    /// Continuation from a previous page. Only list operations carry one.
    fn page_token(&self) -> Option<&PageToken> {
        None
    }
    fn decode(&self, status: StatusCode, body: &[u8]) -> Result<Self::Output, Error>;

    /// Segments joined with `/` without percent-encoding, for logs and
    /// assertions. A namespaced id such as `group/app` appears as two
    /// segments here; the wire path is [`crate::Request::path`], which encodes
    /// it as `group%2Fapp`.
    fn path(&self) -> String {
        self.segments().join("/")
    }
}

/// Strict JSON decode reporting the path of the first offending field.
pub fn decode_json<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, Error> {
    let de = &mut serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let field_path = err.path().to_string().into_boxed_str();
        Error::Decoding {
            status,
            field_path,
            source: err.into_inner(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Outer {
        author: Inner,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Inner {
        id: u64,
    }

    #[test]
    fn params_omit_absent_values_and_spell_booleans() {
        let mut params = Params::new();
        params
            .push("ref", "main")
            .push_opt::<&str>("stage", None)
            .push_opt("page", Some(2))
            .push_bool("all", true)
            .push_bool("archived", false);

        let collected: Vec<_> = params.iter().collect();
        assert_eq!(
            collected,
            [
                ("ref", "main"),
                ("page", "2"),
                ("all", "true"),
                ("archived", "false")
            ]
        );
        assert_eq!(params.get("stage"), None);
    }

    #[test]
    fn page_token_keeps_every_pair_in_order() {
        let token = PageToken::from_pairs(vec![
            ("id_after".into(), "42".into()),
            ("pagination".into(), "keyset".into()),
        ])
        .unwrap();
        assert_eq!(token.get("id_after"), Some("42"));
        assert_eq!(token.get("page"), None);
        assert_eq!(token.to_string(), "id_after=42&pagination=keyset");

        assert_eq!(PageToken::page(7).to_string(), "page=7");
        assert!(PageToken::from_pairs(Vec::new()).is_none());
    }

    #[test]
    fn decode_json_names_the_offending_field() {
        let err = decode_json::<Outer>(StatusCode::OK, br#"{"author":{"id":"x"}}"#).unwrap_err();
        match err {
            Error::Decoding { field_path, .. } => assert_eq!(&*field_path, "author.id"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_json_reports_missing_fields() {
        let err = decode_json::<Outer>(StatusCode::OK, br#"{"author":{}}"#).unwrap_err();
        match err {
            Error::Decoding { field_path, source, .. } => {
                assert_eq!(&*field_path, "author");
                assert!(source.to_string().contains("missing field `id`"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
