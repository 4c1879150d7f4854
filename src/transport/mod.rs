//! Transport session abstraction.
//!
//! * [`Transport`] is the injectable seam: anything that can turn a
//!   [`Request`] into a [`RawResponse`].
//! * [`ReqwestTransport`] talks to the network.
//! * [`FakeTransport`] replays scripted outcomes in memory for tests.

pub mod fake;
#[cfg(feature = "metrics")]
pub(crate) mod metrics;
pub mod request;
pub mod reqwest_transport;

use crate::Error;
use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use std::sync::Arc;

pub use fake::{FakeTransport, Gate};
pub use request::{Request, RequestBody};
pub use reqwest_transport::ReqwestTransport;

/// Undecoded response as received from the transport.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Attach a header; handy when scripting fake responses.
    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
        self
    }
}

/// Trait implemented by any HTTP layer.
///
/// A call resolves exactly once. Dropping the returned future abandons the
/// request and must release whatever I/O resource it holds.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, req: Request) -> Result<RawResponse, Error>;
}

pub type DynTransport = Arc<dyn Transport>;

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, req: Request) -> Result<RawResponse, Error> {
        (**self).send(req).await
    }
}
