use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use optdep_core::kernel::error::Result as KernelResult;
use optdep_core::plugin_system::{Plugin, PluginContext, VersionRange};
use optdep_core::Provider;

/// Name consumers subscribe to
pub const IPSUM_API: &str = "IpsumClass";

/// State behind the `IpsumClass` API
pub struct IpsumApi {
    greeting: String,
    active: AtomicBool,
    received: Mutex<Vec<String>>,
}

impl IpsumApi {
    pub fn new(greeting: impl Into<String>, active: bool) -> Self {
        Self {
            greeting: greeting.into(),
            active: AtomicBool::new(active),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn ipsum_method(&self, first: &str, second: &str, third: &str) {
        let line = format!("{} {} {}", first, second, third);
        log::info!("IpsumMethod({})", line);
        self.received.lock().unwrap_or_else(PoisonError::into_inner).push(line);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    pub fn greet(&self, who: &str) -> String {
        format!("{}, {}!", self.greeting, who)
    }

    /// Lines passed to `IpsumMethod` so far
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Builds the provider with its method table
pub fn ipsum_provider(api: Arc<IpsumApi>) -> Provider {
    Provider::builder(api)
        .method("IpsumMethod", |api: &IpsumApi, (a, b, c): (String, String, String)| {
            api.ipsum_method(&a, &b, &c)
        })
        .method("IsIpsumActive", |api: &IpsumApi, (): ()| api.is_active())
        .try_method("Greet", |api: &IpsumApi, (who,): (String,)| {
            if who.trim().is_empty() {
                return Err("Greet needs a name");
            }
            Ok(api.greet(&who))
        })
        .build()
}

#[derive(Default)]
pub struct IpsumProviderPlugin {
    api: Mutex<Option<Arc<IpsumApi>>>,
}

impl IpsumProviderPlugin {
    /// The published API, once phase 2 has run
    pub fn api(&self) -> Option<Arc<IpsumApi>> {
        self.api.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Plugin for IpsumProviderPlugin {
    fn name(&self) -> &'static str {
        "ipsum-provider"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn compatible_api_versions(&self) -> Vec<VersionRange> {
        VersionRange::from_constraint("^0.1").map(|r| vec![r]).unwrap_or_default()
    }

    fn init(&self, ctx: &PluginContext) -> KernelResult<()> {
        let greeting = ctx.config().get_or("greeting", "Lorem ipsum".to_string());
        let active = ctx.config().get_or("active", true);
        *self.api.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(IpsumApi::new(greeting, active)));
        Ok(())
    }

    fn register_apis(&self, ctx: &PluginContext) -> KernelResult<()> {
        let api = self.api().ok_or("ipsum-provider was not initialized")?;
        let report = ctx.registry().register(IPSUM_API, ipsum_provider(api))?;
        log::debug!("{} delivered to {} subscribers", IPSUM_API, report.delivered);
        Ok(())
    }
}

#[cfg(test)]
mod tests;
