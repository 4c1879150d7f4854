use crate::{Error, Provider};
use base64::{Engine, engine::general_purpose::STANDARD as B64};
use http::{
    HeaderMap, HeaderName, HeaderValue,
    header::{AUTHORIZATION, InvalidHeaderValue},
};
use std::fmt;

const PRIVATE_TOKEN: HeaderName = HeaderName::from_static("private-token");

#[derive(Clone, Default, Eq, PartialEq)]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Already-obtained credential material for one account.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Credential {
    /// Provider-native personal access token.
    Token(SecretString),
    Basic { user: String, password: SecretString },
    /// OAuth access token, sent as a bearer token.
    OAuth(SecretString),
}

impl Credential {
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(SecretString::new(token))
    }

    #[must_use]
    pub fn basic(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            user: user.into(),
            password: SecretString::new(password),
        }
    }

    #[must_use]
    pub fn oauth(access_token: impl Into<String>) -> Self {
        Self::OAuth(SecretString::new(access_token))
    }

    pub(crate) fn apply(&self, provider: Provider, headers: &mut HeaderMap) -> Result<(), Error> {
        let (name, raw) = match (self, provider) {
            (Self::Token(token), Provider::GitLab) => (PRIVATE_TOKEN, token.expose().to_owned()),
            (Self::Token(token), Provider::GitHub) => {
                (AUTHORIZATION, format!("token {}", token.expose()))
            }
            (Self::Basic { user, password }, _) => (
                AUTHORIZATION,
                format!("Basic {}", B64.encode(format!("{user}:{}", password.expose()))),
            ),
            (Self::OAuth(token), _) => (AUTHORIZATION, format!("Bearer {}", token.expose())),
        };

        let mut value = HeaderValue::from_str(&raw).map_err(invalid_header)?;
        value.set_sensitive(true);
        headers.insert(name, value);
        Ok(())
    }
}

fn invalid_header(err: InvalidHeaderValue) -> Error {
    Error::InvalidConfig {
        message: "invalid credential header value".into(),
        source: Some(Box::new(err)),
    }
}
