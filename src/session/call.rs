use super::Session;
use crate::{Error, dispatch::Response, route::Route};
use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};
use tokio::{sync::watch, task::JoinHandle};

/// Lifecycle of a single call.
///
/// `Succeeded`, `Failed` and `Cancelled` are terminal: once reached, nothing
/// moves the call again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallState {
    Idle,
    InFlight,
    Succeeded,
    Failed,
    Cancelled,
}

impl CallState {
    const fn to_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::InFlight => 1,
            Self::Succeeded => 2,
            Self::Failed => 3,
            Self::Cancelled => 4,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Idle,
            1 => Self::InFlight,
            2 => Self::Succeeded,
            3 => Self::Failed,
            _ => Self::Cancelled,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// Shared, lock-free view of a call's state.
#[derive(Clone, Debug, Default)]
pub(crate) struct StateCell(Arc<AtomicU8>);

impl StateCell {
    pub(crate) fn get(&self) -> CallState {
        CallState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn begin(&self) {
        let _ = self.0.compare_exchange(
            CallState::Idle.to_u8(),
            CallState::InFlight.to_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Move to `target` unless the call already settled. Returns whether this
    /// transition won.
    pub(crate) fn finish(&self, target: CallState) -> bool {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                (!CallState::from_u8(raw).is_terminal()).then_some(target.to_u8())
            })
            .is_ok()
    }

    pub(crate) fn settle<T>(&self, result: &Result<T, Error>) -> bool {
        self.finish(CallState::of(result))
    }
}

impl CallState {
    /// Terminal state a finished result settles into.
    pub(crate) fn of<T>(result: &Result<T, Error>) -> Self {
        match result {
            Ok(_) => Self::Succeeded,
            Err(err) if err.is_cancelled() => Self::Cancelled,
            Err(_) => Self::Failed,
        }
    }
}

/// Requests cancellation of a call from anywhere and observes its state.
///
/// Clones share one call. Cancelling a call that has already settled does
/// nothing.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
    state: StateCell,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            state: StateCell::default(),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// State of the call this handle belongs to, readable after
    /// [`Call::send`] has consumed the call.
    #[must_use]
    pub fn state(&self) -> CallState {
        self.state.get()
    }

    pub(crate) fn state_cell(&self) -> &StateCell {
        &self.state
    }

    pub(crate) async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// A route bound to a session, not yet sent.
///
/// Consumed by exactly one of [`Call::send`] or [`Call::on_complete`], so a
/// call produces at most one outcome.
pub struct Call<R> {
    session: Session,
    route: R,
    cancel: CancelHandle,
}

impl<R: Route> Call<R> {
    pub(crate) fn new(session: Session, route: R) -> Self {
        Self {
            session,
            route,
            cancel: CancelHandle::new(),
        }
    }

    /// Handle that cancels this call, usable before or during the send.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    #[must_use]
    pub fn state(&self) -> CallState {
        self.cancel.state()
    }

    #[must_use]
    pub fn route(&self) -> &R {
        &self.route
    }
}

impl<R: Route + Sync> Call<R> {
    /// Send and wait for the outcome.
    pub async fn send(self) -> Result<Response<R::Output>, Error> {
        self.session.run(&self.route, &self.cancel).await
    }
}

impl<R> Call<R>
where
    R: Route + Send + Sync + 'static,
{
    /// Send on the current Tokio runtime and deliver the outcome to `callback`.
    ///
    /// The callback runs exactly once: with the result, with
    /// [`Error::Cancelled`] if the call is cancelled or its task is aborted,
    /// or immediately with [`Error::InvalidConfig`] when no runtime is
    /// available.
    pub fn on_complete<F>(self, callback: F) -> CallHandle
    where
        F: FnOnce(Result<Response<R::Output>, Error>) + Send + 'static,
    {
        let Self {
            session,
            route,
            cancel,
        } = self;

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                cancel.state_cell().finish(CallState::Failed);
                callback(Err(Error::InvalidConfig {
                    message: "on_complete requires a Tokio runtime".into(),
                    source: Some(Box::new(err)),
                }));
                return CallHandle { cancel, task: None };
            }
        };

        let completion = Completion {
            callback: Some(Box::new(callback)),
            state: cancel.state_cell().clone(),
        };
        let task = runtime.spawn({
            let cancel = cancel.clone();
            async move {
                let result = session.run(&route, &cancel).await;
                completion.fire(result);
            }
        });

        CallHandle {
            cancel,
            task: Some(task),
        }
    }
}

type Callback<T> = Box<dyn FnOnce(Result<T, Error>) + Send>;

/// Delivers the outcome once; reports cancellation if dropped undelivered.
struct Completion<T> {
    callback: Option<Callback<T>>,
    state: StateCell,
}

impl<T> Completion<T> {
    fn fire(mut self, result: Result<T, Error>) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            self.state.finish(CallState::Cancelled);
            callback(Err(Error::Cancelled));
        }
    }
}

/// Handle to a call started with [`Call::on_complete`].
#[derive(Debug)]
pub struct CallHandle {
    cancel: CancelHandle,
    task: Option<JoinHandle<()>>,
}

impl CallHandle {
    /// Cancel the call. The callback receives [`Error::Cancelled`] unless it
    /// has already run.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    #[must_use]
    pub fn state(&self) -> CallState {
        self.cancel.state()
    }

    /// Abort the background task outright.
    pub fn abort(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Wait until the callback has run.
    pub async fn join(self) {
        if let Some(task) = self.task {
            let _ = task.await;
        }
    }
}
