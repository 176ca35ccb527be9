use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::access::ApiAccess;
use crate::api::error::{ApiError, BoxError, CallbackError, InvokeError, panic_message};
use crate::api::provider::Provider;
use crate::api::report::{CallbackFailure, FailureReporter, LogReporter, NotifyPhase};

/// What a subscriber callback returns. An `Err` is reported, never propagated.
pub type CallbackResult = std::result::Result<(), BoxError>;

/// A subscriber waiting for providers of an API.
pub type ApiCallback = Arc<dyn Fn(ApiAccess) -> CallbackResult + Send + Sync>;

/// Outcome of the notifications run by a single `register` or `subscribe`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Callbacks that returned `Ok`.
    pub delivered: usize,
    /// Callbacks that returned `Err` or panicked.
    pub failed: usize,
}

impl DeliveryReport {
    pub fn total(&self) -> usize {
        self.delivered + self.failed
    }
}

#[derive(Default)]
struct RegistryState {
    /// API name -> providers, in registration order
    apis: HashMap<String, Vec<Arc<Provider>>>,
    /// API name -> subscribers, in subscription order
    callbacks: HashMap<String, Vec<ApiCallback>>,
}

/// Registry brokering optional APIs between plugins.
///
/// Providers are registered under a name and never removed; subscribers are
/// notified once per provider, whether the provider was registered before or
/// after they subscribed. All notifications run synchronously on the calling
/// thread. The internal lock is only held while the maps are read or
/// appended to, so callbacks may freely call back into the registry.
pub struct ApiRegistry {
    state: Mutex<RegistryState>,
    reporter: Arc<dyn FailureReporter>,
}

impl ApiRegistry {
    /// Creates an empty registry that logs callback failures.
    pub fn new() -> Self {
        Self::with_reporter(LogReporter::default())
    }

    /// Creates an empty registry sending callback failures to `reporter`.
    pub fn with_reporter(reporter: impl FailureReporter + 'static) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            reporter: Arc::new(reporter),
        }
    }

    // The maps are only ever appended to, so a poisoned lock still guards
    // consistent state.
    fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `provider` under `name` and notifies every current
    /// subscriber of `name`, in subscription order.
    pub fn register(&self, name: &str, provider: impl Into<Provider>) -> Result<DeliveryReport, ApiError> {
        self.register_shared(name, Arc::new(provider.into()))
    }

    /// Like [`register`](Self::register), for a provider that is already
    /// shared (for instance one registered under several names).
    pub fn register_shared(&self, name: &str, provider: Arc<Provider>) -> Result<DeliveryReport, ApiError> {
        validate_name(name)?;

        let waiting = {
            let mut state = self.state();
            state
                .apis
                .entry(name.to_string())
                .or_default()
                .push(Arc::clone(&provider));
            state.callbacks.get(name).cloned().unwrap_or_default()
        };
        log::debug!(
            "Registered provider {} for API '{}' ({} subscriber(s) waiting)",
            provider.type_name(),
            name,
            waiting.len()
        );

        let mut report = DeliveryReport::default();
        for callback in &waiting {
            let access = ApiAccess::new(name, Arc::clone(&provider));
            self.notify(callback, access, NotifyPhase::Registration, &mut report);
        }
        Ok(report)
    }

    /// Subscribes `callback` to `name`. The callback runs immediately once
    /// per provider already registered, in registration order, and again for
    /// every provider registered later.
    pub fn subscribe<F>(&self, name: &str, callback: F) -> Result<DeliveryReport, ApiError>
    where
        F: Fn(ApiAccess) -> CallbackResult + Send + Sync + 'static,
    {
        validate_name(name)?;
        let callback: ApiCallback = Arc::new(callback);

        let existing = {
            let mut state = self.state();
            state
                .callbacks
                .entry(name.to_string())
                .or_default()
                .push(Arc::clone(&callback));
            state.apis.get(name).cloned().unwrap_or_default()
        };
        log::debug!(
            "Subscribed to API '{}' ({} provider(s) already registered)",
            name,
            existing.len()
        );

        let mut report = DeliveryReport::default();
        for provider in existing {
            let access = ApiAccess::new(name, provider);
            self.notify(&callback, access, NotifyPhase::Replay, &mut report);
        }
        Ok(report)
    }

    /// Runs one callback and hands any error or panic to the reporter. The
    /// panic hook still fires for a contained panic; the default hook prints
    /// it to stderr.
    fn notify(&self, callback: &ApiCallback, access: ApiAccess, phase: NotifyPhase, report: &mut DeliveryReport) {
        let api_name = access.api_name().to_string();
        let provider_type = access.type_name();

        let error = match panic::catch_unwind(AssertUnwindSafe(|| callback(access))) {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(CallbackError::Failed(e)),
            Err(payload) => Some(CallbackError::Panicked(panic_message(&*payload))),
        };

        match error {
            None => report.delivered += 1,
            Some(error) => {
                report.failed += 1;
                self.reporter.report(&CallbackFailure {
                    api_name,
                    phase,
                    provider_type,
                    error,
                });
            }
        }
    }

    /// Calls `method` on every provider of `name`, one result per provider in
    /// registration order. Unknown names yield an empty list.
    pub fn invoke_all(&self, name: &str, method: &str, args: &[&dyn Any]) -> Vec<Result<(), InvokeError>> {
        self.providers(name)
            .iter()
            .map(|access| access.invoke(method, args))
            .collect()
    }

    /// Best-effort broadcast of `method` to every provider of `name`.
    /// Returns whether at least one call succeeded; individual failures are
    /// ignored and return values are dropped.
    pub fn try_invoke(&self, name: &str, method: &str, args: &[&dyn Any]) -> bool {
        let results = self.invoke_all(name, method, args);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            log::debug!("Broadcast to API '{}' skipped a provider: {}", name, err);
        }
        results.iter().any(Result::is_ok)
    }

    /// First provider of `name`, in registration order, that can be viewed
    /// as `T`.
    pub fn get_api<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        let state = self.state();
        state
            .apis
            .get(name)
            .and_then(|providers| providers.iter().find_map(|p| p.view::<T>()))
    }

    /// Every provider of `name` that can be viewed as `T`, in registration
    /// order.
    pub fn get_all_apis<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Vec<Arc<T>> {
        let state = self.state();
        state
            .apis
            .get(name)
            .map(|providers| providers.iter().filter_map(|p| p.view::<T>()).collect())
            .unwrap_or_default()
    }

    /// Access handles for every provider of `name`, in registration order.
    pub fn providers(&self, name: &str) -> Vec<ApiAccess> {
        let providers = self.state().apis.get(name).cloned().unwrap_or_default();
        providers
            .into_iter()
            .map(|provider| ApiAccess::new(name, provider))
            .collect()
    }

    pub fn has_api(&self, name: &str) -> bool {
        self.provider_count(name) > 0
    }

    pub fn provider_count(&self, name: &str) -> usize {
        self.state().apis.get(name).map_or(0, Vec::len)
    }

    pub fn subscriber_count(&self, name: &str) -> usize {
        self.state().callbacks.get(name).map_or(0, Vec::len)
    }

    /// Names with at least one provider, sorted.
    pub fn api_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state().apis.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ApiRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ApiRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        let providers: usize = state.apis.values().map(Vec::len).sum();
        let subscribers: usize = state.callbacks.values().map(Vec::len).sum();
        f.debug_struct("ApiRegistry")
            .field("apis", &state.apis.len())
            .field("providers", &providers)
            .field("subscribers", &subscribers)
            .finish_non_exhaustive()
    }
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::EmptyName);
    }
    Ok(())
}
