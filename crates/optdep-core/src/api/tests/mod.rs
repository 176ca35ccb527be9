// API broker test module
#[cfg(test)]
mod access_tests;

use std::sync::{Arc, Mutex};

use crate::api::{Provider, ProviderBuilder};

/// Interface shared by provider and consumer in tests.
pub(crate) trait Greeter: Send + Sync {
    fn greet(&self, who: &str) -> String;
}

/// Provider fixture recording every call made on it.
#[derive(Debug, Default)]
pub(crate) struct RecordingApi {
    pub label: String,
    pub calls: Mutex<Vec<String>>,
}

impl RecordingApi {
    pub(crate) fn new(label: &str) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Greeter for RecordingApi {
    fn greet(&self, who: &str) -> String {
        format!("{} greets {}", self.label, who)
    }
}

/// Builder exposing `Existing(u32, String)`, `Sum(i64, i64) -> i64`,
/// `Fail()` and `Boom()`, plus the `Greeter` interface.
pub(crate) fn recording_provider(api: &Arc<RecordingApi>) -> ProviderBuilder<RecordingApi> {
    Provider::builder(Arc::clone(api))
        .method("Existing", |api: &RecordingApi, (n, s): (u32, String)| {
            api.record(format!("Existing({n}, {s})"));
        })
        .method("Sum", |api: &RecordingApi, (a, b): (i64, i64)| {
            api.record(format!("Sum({a}, {b})"));
            a + b
        })
        .try_method("Fail", |api: &RecordingApi, (): ()| -> Result<(), String> {
            api.record("Fail()".to_string());
            Err(format!("{} refuses", api.label))
        })
        .method("Boom", |_api: &RecordingApi, (): ()| -> () { panic!("provider blew up") })
        .interface::<dyn Greeter>(Arc::clone(api) as Arc<dyn Greeter>)
}
