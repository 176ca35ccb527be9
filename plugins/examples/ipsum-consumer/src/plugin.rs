//! Consumes `IpsumClass` without depending on the crate that provides it.
//! The API name and method signatures are agreed on by convention only.
use std::sync::{Arc, Mutex, PoisonError, Weak};

use optdep_core::api::{ApiAccess, ApiRegistry, BoundMethod, CallbackResult};
use optdep_core::kernel::error::Result as KernelResult;
use optdep_core::plugin_system::{Plugin, PluginContext, VersionRange};

pub const IPSUM_API: &str = "IpsumClass";
const LOGGING_API: &str = "core-logging";

type IpsumMethod = BoundMethod<(String, String, String), ()>;

/// Typed handles resolved from one `IpsumClass` provider
struct IpsumBinding {
    provider_type: &'static str,
    ipsum_method: Option<IpsumMethod>,
    is_active: Option<BoundMethod<(), bool>>,
}

#[derive(Default)]
pub struct IpsumConsumerPlugin {
    bindings: Arc<Mutex<Vec<IpsumBinding>>>,
}

impl IpsumConsumerPlugin {
    /// Number of `IpsumClass` providers seen so far
    pub fn provider_count(&self) -> usize {
        self.lock_bindings().len()
    }

    /// Calls `IpsumMethod` on every active provider that has it. Returns
    /// how many providers were called.
    pub fn use_ipsum(&self, first: &str, second: &str, third: &str) -> usize {
        let bindings = self.lock_bindings();
        let mut called = 0;
        for binding in bindings.iter() {
            let active = binding.is_active.as_ref().map_or(true, |is_active| {
                is_active.try_call(()).unwrap_or(false)
            });
            let Some(method) = binding.ipsum_method.as_ref().filter(|_| active) else {
                continue;
            };
            match method.try_call((first.to_string(), second.to_string(), third.to_string())) {
                Ok(()) => called += 1,
                Err(e) => log::warn!("IpsumMethod on {} failed: {}", binding.provider_type, e),
            }
        }
        called
    }

    fn lock_bindings(&self) -> std::sync::MutexGuard<'_, Vec<IpsumBinding>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn on_ipsum_api(registry: &Weak<ApiRegistry>, bindings: &Mutex<Vec<IpsumBinding>>, api: ApiAccess) -> CallbackResult {
    let binding = IpsumBinding {
        provider_type: api.type_name(),
        ipsum_method: api.get_method("IpsumMethod"),
        is_active: api.get_method("IsIpsumActive"),
    };
    if binding.ipsum_method.is_none() {
        return Err(format!("{} has no IpsumMethod(String, String, String)", api.type_name()).into());
    }

    // Optional as well: only logs when the logging API is present
    let level = "info".to_string();
    let message = format!("ipsum-consumer bound {}", api.type_name());
    let logged = registry
        .upgrade()
        .is_some_and(|registry| registry.try_invoke(LOGGING_API, "Log", &[&level, &message]));
    if !logged {
        log::debug!("{}", message);
    }

    bindings.lock().unwrap_or_else(PoisonError::into_inner).push(binding);
    Ok(())
}

impl Plugin for IpsumConsumerPlugin {
    fn name(&self) -> &'static str {
        "ipsum-consumer"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn compatible_api_versions(&self) -> Vec<VersionRange> {
        VersionRange::from_constraint("^0.1").map(|r| vec![r]).unwrap_or_default()
    }

    fn init(&self, ctx: &PluginContext) -> KernelResult<()> {
        // The registry owns this callback, so it must not own the registry back
        let registry = Arc::downgrade(ctx.registry());
        let bindings = Arc::clone(&self.bindings);
        ctx.registry()
            .subscribe(IPSUM_API, move |api| on_ipsum_api(&registry, &bindings, api))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
