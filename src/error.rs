use http::{Method, StatusCode};
use std::{borrow::Cow, error::Error as StdError, fmt};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    ConfigurationMissing,
    InvalidUrl,
    InvalidConfig,
    Transport,
    Cancelled,
    Http,
    Api,
    Decoding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Other,
}

/// Provider error body that could be parsed out of a non-2xx response.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    /// Human-oriented message from the provider, as sent.
    pub message: Box<str>,
    /// Field-level complaints (`GitLab` validation objects, `GitHub` `errors` array).
    pub details: Vec<Box<str>>,
    /// `GitHub` only.
    pub documentation_url: Option<Box<str>>,
    pub request_id: Option<Box<str>>,
    /// Raw body as received.
    pub body: Box<str>,
}

/// All errors returned by the SDK.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Route has no configuration attached")]
    ConfigurationMissing,

    #[error("Invalid URL: {message}")]
    InvalidUrl {
        message: Box<str>,
        #[source]
        source: Option<url::ParseError>,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: Box<str>,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    #[error("Transport error during {method} {path}: {source}")]
    Transport {
        method: Method,
        path: Box<str>,
        kind: TransportErrorKind,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Request cancelled")]
    Cancelled,

    #[error("HTTP {status}: {}", String::from_utf8_lossy(.body))]
    Http {
        status: StatusCode,
        /// Raw body bytes, not necessarily UTF-8.
        body: Box<[u8]>,
    },

    #[error("{0}")]
    Api(ApiError),

    #[error("Decoding error (HTTP {status}) at `{field_path}`: {source}")]
    Decoding {
        status: StatusCode,
        /// JSON path of the offending field, `.` for the document root.
        field_path: Box<str>,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationMissing => ErrorKind::ConfigurationMissing,
            Self::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Http { .. } => ErrorKind::Http,
            Self::Api(_) => ErrorKind::Api,
            Self::Decoding { .. } => ErrorKind::Decoding,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } | Self::Decoding { status, .. } => Some(*status),
            Self::Api(e) => Some(e.status),
            Self::ConfigurationMissing
            | Self::InvalidUrl { .. }
            | Self::InvalidConfig { .. }
            | Self::Transport { .. }
            | Self::Cancelled => None,
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Error body as text, lossily decoded. `None` when no response arrived.
    #[must_use]
    pub fn body_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Http { body, .. } => Some(String::from_utf8_lossy(body)),
            Self::Api(e) => Some(Cow::Borrowed(&*e.body)),
            Self::ConfigurationMissing
            | Self::InvalidUrl { .. }
            | Self::InvalidConfig { .. }
            | Self::Transport { .. }
            | Self::Cancelled
            | Self::Decoding { .. } => None,
        }
    }

    pub(crate) fn invalid_url(message: impl Into<Box<str>>, source: Option<url::ParseError>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
            source,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message)?;
        if !self.details.is_empty() {
            write!(f, " ({})", self.details.join("; "))?;
        }
        if let Some(request_id) = self.request_id.as_deref() {
            write!(f, " [request-id: {request_id}]")?;
        }
        Ok(())
    }
}
