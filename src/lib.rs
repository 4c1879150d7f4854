//! Git hosting API access layer.
//!
//! A [`Route`] value describes one provider operation. [`Request::from_route`]
//! turns it into a transport request without any I/O, a [`Transport`] sends
//! it, and [`dispatch`] classifies the raw response into typed data or an
//! [`Error`]. [`Session`] ties the three together and adds cancellation.
//!
//! ```no_run
//! use githost_sdk::{
//!     Configuration, Session,
//!     api::gitlab::{CommitPayload, CommitRoute},
//! };
//!
//! # async fn run() -> Result<(), githost_sdk::Error> {
//! let config = Configuration::gitlab("glpat-...")?;
//! let session = Session::new()?;
//! let commits = session.execute(&CommitRoute::list(&config, "group/app")).await?;
//! if let CommitPayload::Commits(list) = commits.data {
//!     println!("{} commits, next page: {:?}", list.len(), commits.next_page);
//! }
//! # Ok(())
//! # }
//! ```

// compile-time guard: the network transport needs a TLS backend.
#[cfg(not(any(feature = "rustls", feature = "native-tls")))]
compile_error!("Enable at least one of: `rustls` (default) or `native-tls`.");

pub mod api;
pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod route;
pub mod session;
pub mod transport;
pub mod types;
mod util;

pub use auth::{Credential, SecretString};
pub use config::{Configuration, ConfigurationBuilder, Provider};
pub use dispatch::{Response, dispatch};
pub use error::{ApiError, Error, ErrorKind, Result, TransportErrorKind};
pub use route::{Encoding, PageToken, Params, Part, Route, decode_json};
pub use session::{Call, CallHandle, CallState, CancelHandle, Session, SessionBuilder};
pub use transport::{
    DynTransport, FakeTransport, Gate, RawResponse, Request, RequestBody, ReqwestTransport,
    Transport,
};
pub use types::{ProjectId, RepoSlug, Sha};
