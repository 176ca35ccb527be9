use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::api::error::InvokeError;
use crate::api::method::{BoundMethod, Signature};
use crate::api::provider::Provider;

/// Handle over a single provider, handed to subscribers.
///
/// The handle lets a consumer call into a provider without naming the
/// provider's concrete type: either by method name with dynamically typed
/// arguments, or by binding a method once to a typed callable. A fresh handle
/// is created for every notification; it holds nothing besides the provider.
#[derive(Clone)]
pub struct ApiAccess {
    api_name: Arc<str>,
    provider: Arc<Provider>,
}

impl ApiAccess {
    pub fn new(api_name: impl Into<Arc<str>>, provider: Arc<Provider>) -> Self {
        Self {
            api_name: api_name.into(),
            provider,
        }
    }

    /// Name the provider was registered under.
    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    /// Type name of the provider's concrete object.
    pub fn type_name(&self) -> &'static str {
        self.provider.type_name()
    }

    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }

    /// Calls `method` with `args`. Any failure, including a panic inside the
    /// provider, comes back as an [`InvokeError`].
    pub fn invoke(&self, method: &str, args: &[&dyn Any]) -> Result<(), InvokeError> {
        match self.provider.method(method) {
            Some(m) => m.invoke(args),
            None => Err(InvokeError::MissingMethod {
                method: method.to_string(),
            }),
        }
    }

    /// Calls `method` with `args`, returning whether the call went through.
    pub fn try_invoke(&self, method: &str, args: &[&dyn Any]) -> bool {
        match self.invoke(method, args) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Invocation of '{}' on API '{}' failed: {}", method, self.api_name, e);
                false
            }
        }
    }

    /// Resolves `method` to a typed callable. Returns `None` if the method is
    /// missing or was declared with a signature other than `fn(A) -> R`.
    pub fn get_method<A: 'static, R: 'static>(&self, method: &str) -> Option<BoundMethod<A, R>> {
        self.provider.method(method).and_then(|m| m.bind::<A, R>())
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.provider.methods().contains(method)
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.provider.methods().iter().map(|m| m.name()).collect()
    }

    /// Method names with their declared signatures, in declaration order.
    pub fn signatures(&self) -> Vec<(&str, &Signature)> {
        self.provider
            .methods()
            .iter()
            .map(|m| (m.name(), m.signature()))
            .collect()
    }

    /// Returns the provider as `T` (its concrete type or a declared interface).
    pub fn get_api<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.provider.view::<T>()
    }
}

impl fmt::Debug for ApiAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiAccess")
            .field("api_name", &self.api_name)
            .field("provider", &self.provider)
            .finish()
    }
}
