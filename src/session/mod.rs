//! Long-lived session executing routes over an injected transport.

mod call;

pub use call::{Call, CallHandle, CallState, CancelHandle};

use crate::{
    Error,
    dispatch::{Response, dispatch},
    route::Route,
    transport::{DynTransport, ReqwestTransport, Transport, request::Request},
};
use std::{sync::Arc, time::Duration};

#[cfg(feature = "tracing")]
use tracing::{Instrument, field};

const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Configures and constructs [`Session`].
pub struct SessionBuilder {
    insecure: bool,
    user_agent: String,
    timeout: Duration,
    connect_timeout: Duration,
    no_proxy: bool,
    transport: Option<DynTransport>,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self {
            insecure: false,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            no_proxy: false,
            transport: None,
        }
    }
}

impl SessionBuilder {
    /// Use a custom transport (e.g. [`crate::FakeTransport`]) instead of `reqwest`.
    ///
    /// Network settings on this builder are ignored when a transport is supplied.
    pub fn transport(mut self, transport: impl Transport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Ignore system proxy environment variables.
    pub fn no_system_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    /// Accept invalid TLS certificates (**dangerous**).
    pub fn danger_accept_invalid_certs(mut self, yes: bool) -> Self {
        self.insecure = yes;
        self
    }

    /// Override the default `User-Agent` header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Adjust the per-request timeout.
    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    /// Adjust the connection establishment timeout.
    pub fn connect_timeout(mut self, value: Duration) -> Self {
        self.connect_timeout = value;
        self
    }

    /// Finalise configuration and build the session.
    pub fn build(self) -> Result<Session, Error> {
        let transport: DynTransport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::try_new(
                self.insecure,
                &self.user_agent,
                self.timeout,
                self.connect_timeout,
                self.no_proxy,
            )?),
        };

        Ok(Session { transport })
    }
}

/// Executes routes against one shared transport.
///
/// Cheap to clone; holds no route-specific state between calls.
#[derive(Clone)]
pub struct Session {
    transport: DynTransport,
}

impl Session {
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Session over the default `reqwest` transport.
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    /// Session over an explicit transport.
    #[must_use]
    pub fn with_transport(transport: impl Transport) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Prepare a cancellable call. Nothing is sent until [`Call::send`] or
    /// [`Call::on_complete`].
    #[must_use]
    pub fn call<R: Route>(&self, route: R) -> Call<R> {
        Call::new(self.clone(), route)
    }

    /// Build, send and dispatch `route`, suspending until the single outcome.
    pub async fn execute<R>(&self, route: &R) -> Result<Response<R::Output>, Error>
    where
        R: Route + Sync + ?Sized,
    {
        self.run(route, &CancelHandle::new()).await
    }

    /// The one execution path behind every calling convention.
    pub(crate) async fn run<R>(
        &self,
        route: &R,
        cancel: &CancelHandle,
    ) -> Result<Response<R::Output>, Error>
    where
        R: Route + Sync + ?Sized,
    {
        #[cfg(feature = "metrics")]
        let provider = route.configuration().map(|config| config.provider());
        #[cfg(feature = "metrics")]
        let _inflight = crate::transport::metrics::InFlightGuard::new(provider);
        #[cfg(any(feature = "tracing", feature = "metrics"))]
        let start = std::time::Instant::now();

        let state = cancel.state_cell();
        state.begin();
        let result = self.run_inner(route, cancel).await;
        state.settle(&result);

        #[cfg(feature = "metrics")]
        crate::transport::metrics::record_outcome(&crate::transport::metrics::CallOutcome {
            provider,
            method: &route.method(),
            state: CallState::of(&result),
            status: match &result {
                Ok(resp) => Some(resp.status),
                Err(err) => err.status(),
            },
            error_kind: result.as_ref().err().map(Error::kind),
            latency: start.elapsed(),
        });

        #[cfg(feature = "tracing")]
        if let Err(err) = &result {
            if err.is_cancelled() {
                tracing::debug!(
                    http.method = %route.method(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "request cancelled"
                );
            }
        }

        result
    }

    async fn run_inner<R>(
        &self,
        route: &R,
        cancel: &CancelHandle,
    ) -> Result<Response<R::Output>, Error>
    where
        R: Route + Sync + ?Sized,
    {
        let request = Request::from_route(route)?;
        let provider = route
            .configuration()
            .ok_or(Error::ConfigurationMissing)?
            .provider();

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        #[cfg(feature = "tracing")]
        let start = std::time::Instant::now();
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "githost.request",
            http.method = %request.method,
            http.host = %request.url.host_str().unwrap_or_default(),
            http.path = %request.path,
            http.status = field::Empty,
            request_id = field::Empty,
            latency_ms = field::Empty,
            error_kind = field::Empty,
        );

        let send = async {
            tokio::select! {
                biased;
                () = cancel.cancelled() => Err(Error::Cancelled),
                outcome = self.transport.send(request) => outcome,
            }
        };
        #[cfg(feature = "tracing")]
        let send = send.instrument(span.clone());

        let result = send.await.and_then(|raw| dispatch(route, provider, raw));

        #[cfg(feature = "tracing")]
        {
            span.record("latency_ms", start.elapsed().as_millis() as u64);
            match &result {
                Ok(resp) => {
                    span.record("http.status", resp.status.as_u16());
                    if let Some(rid) = resp.request_id.as_deref() {
                        span.record("request_id", field::display(rid));
                    }
                }
                Err(err) => {
                    if let Some(status) = err.status() {
                        span.record("http.status", status.as_u16());
                    }
                    span.record("error_kind", field::debug(err.kind()));
                }
            }
        }

        result
    }
}
