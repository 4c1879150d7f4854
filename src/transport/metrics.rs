use crate::{CallState, ErrorKind, Provider};
use http::{Method, StatusCode};
use std::time::Duration;

/// Counts a call as in flight per provider until dropped, whatever the outcome.
pub(crate) struct InFlightGuard {
    gauge: metrics::Gauge,
}

impl InFlightGuard {
    pub(crate) fn new(provider: Option<Provider>) -> Self {
        let gauge = metrics::gauge!("githost_sdk_calls_inflight", "provider" => provider_label(provider));
        gauge.increment(1.0);
        Self { gauge }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gauge.decrement(1.0);
    }
}

/// How one call ended, as reported to the metrics recorder.
pub(crate) struct CallOutcome<'a> {
    pub(crate) provider: Option<Provider>,
    pub(crate) method: &'a Method,
    pub(crate) state: CallState,
    pub(crate) status: Option<StatusCode>,
    pub(crate) error_kind: Option<ErrorKind>,
    pub(crate) latency: Duration,
}

fn provider_label(provider: Option<Provider>) -> &'static str {
    match provider {
        Some(Provider::GitLab) => "gitlab",
        Some(Provider::GitHub) => "github",
        None => "unconfigured",
    }
}

/// Cancellation is an outcome of its own, never folded into failures.
fn outcome_label(state: CallState) -> &'static str {
    match state {
        CallState::Succeeded => "succeeded",
        CallState::Failed => "failed",
        CallState::Cancelled => "cancelled",
        CallState::Idle | CallState::InFlight => "unsettled",
    }
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

fn failure_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::ConfigurationMissing => "configuration_missing",
        ErrorKind::InvalidUrl => "invalid_url",
        ErrorKind::InvalidConfig => "invalid_config",
        ErrorKind::Transport => "transport",
        ErrorKind::Cancelled => "cancelled",
        ErrorKind::Http => "http",
        ErrorKind::Api => "api",
        ErrorKind::Decoding => "decoding",
    }
}

pub(crate) fn record_outcome(outcome: &CallOutcome<'_>) {
    let provider = provider_label(outcome.provider);
    let method: metrics::SharedString = outcome.method.as_str().to_owned().into();
    let result = outcome_label(outcome.state);

    metrics::counter!(
        "githost_sdk_calls_total",
        "provider" => provider,
        "method" => method,
        "outcome" => result
    )
    .increment(1);
    metrics::histogram!(
        "githost_sdk_call_duration_seconds",
        "provider" => provider,
        "outcome" => result
    )
    .record(outcome.latency);

    // Only calls that got an answer have a status; cancelled ones never do.
    if let Some(status) = outcome.status {
        metrics::counter!(
            "githost_sdk_responses_total",
            "provider" => provider,
            "status_class" => status_class(status)
        )
        .increment(1);
    }

    if outcome.state == CallState::Failed {
        if let Some(kind) = outcome.error_kind {
            metrics::counter!(
                "githost_sdk_call_failures_total",
                "provider" => provider,
                "kind" => failure_label(kind)
            )
            .increment(1);
        }
    }
}
