use super::{RawResponse, Transport, request::{Request, RequestBody}};
use crate::error::{Error, TransportErrorKind};
use async_trait::async_trait;
use http::Method;
use reqwest::{Client, multipart};
use std::time::Duration;

#[cfg(feature = "rustls")]
fn ensure_rustls_provider() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

#[cfg(not(feature = "rustls"))]
fn ensure_rustls_provider() {}

fn transport_error(method: &Method, path: &str, err: reqwest::Error) -> Error {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else {
        TransportErrorKind::Other
    };
    Error::Transport {
        method: method.clone(),
        path: path.into(),
        kind,
        source: Box::new(err),
    }
}

fn multipart_form(
    fields: Vec<(String, String)>,
    parts: Vec<crate::route::Part>,
) -> Result<multipart::Form, Error> {
    let mut form = multipart::Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }
    for part in parts {
        let mut file = multipart::Part::bytes(part.bytes).file_name(part.file_name);
        if let Some(mime) = part.mime {
            file = file.mime_str(&mime).map_err(|err| Error::InvalidConfig {
                message: "invalid multipart mime type".into(),
                source: Some(Box::new(err)),
            })?;
        }
        form = form.part(part.name, file);
    }
    Ok(form)
}

/// Default transport built on `reqwest`.
///
/// The connection pool is shared across clones; no per-route state is kept.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Construct a new transport.
    ///
    /// * `insecure` – accept invalid TLS certificates.
    /// * `ua` – User-Agent header.
    /// * `timeout` – per-request timeout.
    /// * `connect_timeout` – connection establishment timeout.
    /// * `no_proxy` – ignore system proxy environment variables.
    pub fn try_new(
        insecure: bool,
        ua: &str,
        timeout: Duration,
        connect_timeout: Duration,
        no_proxy: bool,
    ) -> Result<Self, Error> {
        ensure_rustls_provider();

        let mut builder = Client::builder()
            .danger_accept_invalid_certs(insecure)
            .user_agent(ua)
            .connect_timeout(connect_timeout)
            .timeout(timeout);

        if no_proxy {
            builder = builder.no_proxy();
        }

        let client = builder.build().map_err(|err| Error::InvalidConfig {
            message: "failed to build HTTP client".into(),
            source: Some(Box::new(err)),
        })?;

        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest` client.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, req: Request) -> Result<RawResponse, Error> {
        let Request {
            method,
            url,
            path,
            headers,
            body,
            ..
        } = req;

        let mut builder = self.client.request(method.clone(), url).headers(headers);
        match body {
            Some(RequestBody::Bytes { bytes, .. }) => builder = builder.body(bytes),
            Some(RequestBody::Multipart { fields, parts }) => {
                builder = builder.multipart(multipart_form(fields, parts)?);
            }
            None => {}
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| transport_error(&method, &path, e))?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| transport_error(&method, &path, e))?;

        Ok(RawResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
