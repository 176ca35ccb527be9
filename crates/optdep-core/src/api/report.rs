use std::fmt;

use crate::api::error::CallbackError;

/// Which notification path a subscriber callback ran on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyPhase {
    /// A provider was registered and existing subscribers were notified.
    Registration,
    /// A subscriber was added and replayed over existing providers.
    Replay,
}

impl fmt::Display for NotifyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyPhase::Registration => write!(f, "registration"),
            NotifyPhase::Replay => write!(f, "replay"),
        }
    }
}

/// A subscriber callback that failed while being notified.
#[derive(Debug)]
pub struct CallbackFailure {
    pub api_name: String,
    pub phase: NotifyPhase,
    /// Concrete type of the provider the callback was handed.
    pub provider_type: &'static str,
    pub error: CallbackError,
}

impl fmt::Display for CallbackFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error in {} callback for API '{}' (provider {}): {}",
            self.phase, self.api_name, self.provider_type, self.error
        )
    }
}

/// Hook receiving every callback failure, on both notification paths.
pub trait FailureReporter: Send + Sync {
    fn report(&self, failure: &CallbackFailure);
}

impl<F> FailureReporter for F
where
    F: Fn(&CallbackFailure) + Send + Sync,
{
    fn report(&self, failure: &CallbackFailure) {
        self(failure)
    }
}

/// Default reporter: logs through the `log` facade.
#[derive(Debug, Clone)]
pub struct LogReporter {
    report_replay_failures: bool,
}

impl LogReporter {
    pub fn new(report_replay_failures: bool) -> Self {
        Self { report_replay_failures }
    }
}

impl Default for LogReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FailureReporter for LogReporter {
    fn report(&self, failure: &CallbackFailure) {
        match failure.phase {
            NotifyPhase::Registration => log::error!("{}", failure),
            NotifyPhase::Replay if self.report_replay_failures => log::warn!("{}", failure),
            NotifyPhase::Replay => {}
        }
    }
}
