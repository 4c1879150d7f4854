//! Deterministic in-memory transport for tests.
//!
//! Outcomes are scripted up front and consumed in FIFO order. Nothing here
//! sleeps or reads the clock: a held response stays pending until its
//! [`Gate`] is opened or the caller drops the future.

use super::{RawResponse, Transport, request::Request};
use crate::error::{Error, TransportErrorKind};
use async_trait::async_trait;
use http::StatusCode;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::sync::watch;

/// Manually opened latch releasing a held response.
#[derive(Clone, Debug)]
pub struct Gate {
    tx: Arc<watch::Sender<bool>>,
}

impl Gate {
    fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn open(&self) {
        self.tx.send_replace(true);
    }

    async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting.
        let _ = rx.wait_for(|open| *open).await;
    }
}

enum Outcome {
    Respond(RawResponse),
    Fail(TransportErrorKind, &'static str),
    Hold(Gate, RawResponse),
}

struct State {
    script: VecDeque<Outcome>,
    received: Vec<Request>,
    in_flight: usize,
    released: usize,
}

struct Inner {
    state: Mutex<State>,
    seen: watch::Sender<usize>,
}

/// Scripted transport double.
#[derive(Clone)]
pub struct FakeTransport {
    inner: Arc<Inner>,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeTransport {
    #[must_use]
    pub fn new() -> Self {
        let (seen, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    script: VecDeque::new(),
                    received: Vec::new(),
                    in_flight: 0,
                    released: 0,
                }),
                seen,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a response with the given status and body.
    pub fn respond(&self, status: StatusCode, body: impl Into<Vec<u8>>) -> &Self {
        self.respond_with(RawResponse::new(status, body))
    }

    /// Queue a fully specified response.
    pub fn respond_with(&self, response: RawResponse) -> &Self {
        self.state().script.push_back(Outcome::Respond(response));
        self
    }

    /// Queue a transport-level failure.
    pub fn fail(&self, kind: TransportErrorKind, message: &'static str) -> &Self {
        self.state().script.push_back(Outcome::Fail(kind, message));
        self
    }

    /// Queue a response that stays in flight until the returned gate opens.
    pub fn hold(&self, response: RawResponse) -> Gate {
        let gate = Gate::new();
        self.state()
            .script
            .push_back(Outcome::Hold(gate.clone(), response));
        gate
    }

    /// Requests received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.state().received.clone()
    }

    /// Requests currently inside `send`.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.state().in_flight
    }

    /// Requests whose `send` has ended, by completion or by being dropped.
    #[must_use]
    pub fn released(&self) -> usize {
        self.state().released
    }

    /// Resolve once at least `n` requests have reached the transport.
    pub async fn wait_for_requests(&self, n: usize) {
        let mut rx = self.inner.seen.subscribe();
        let _ = rx.wait_for(|seen| *seen >= n).await;
    }
}

/// Marks one request as in flight until dropped.
struct Slot {
    inner: Arc<Inner>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        state.in_flight -= 1;
        state.released += 1;
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, req: Request) -> Result<RawResponse, Error> {
        let (outcome, seen) = {
            let mut state = self.state();
            state.received.push(req.clone());
            state.in_flight += 1;
            (state.script.pop_front(), state.received.len())
        };
        let _slot = Slot {
            inner: Arc::clone(&self.inner),
        };
        self.inner.seen.send_replace(seen);

        let transport_error = |kind, message: &str| Error::Transport {
            method: req.method.clone(),
            path: req.path.clone().into_boxed_str(),
            kind,
            source: message.into(),
        };

        match outcome {
            Some(Outcome::Respond(resp)) => Ok(resp),
            Some(Outcome::Fail(kind, message)) => Err(transport_error(kind, message)),
            Some(Outcome::Hold(gate, resp)) => {
                gate.wait().await;
                Ok(resp)
            }
            None => Err(transport_error(
                TransportErrorKind::Other,
                "no scripted response left",
            )),
        }
    }
}
