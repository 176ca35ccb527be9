//! # Optional API Broker
//!
//! Lets plugins depend on each other optionally. A provider plugin registers
//! an object under an agreed name; consumer plugins subscribe to that name and
//! are handed an [`ApiAccess`] for every provider, whenever it shows up. A
//! consumer never needs the provider's crate at compile time: it calls
//! methods by name, binds them to typed callables, or queries interfaces
//! both sides share.
//!
//! ## Key Submodules
//!
//! - **[`registry`]**: the shared [`ApiRegistry`] (register, subscribe,
//!   broadcast invocation, typed lookups).
//! - **[`access`]**: [`ApiAccess`], the per-provider handle given to
//!   subscribers.
//! - **[`provider`]**: [`Provider`] and its builder, which declare the
//!   method table and interface views of a registered object.
//! - **[`method`]**: erased and typed method storage, [`BoundMethod`].
//! - **[`args`]**: decoding of `&[&dyn Any]` arguments into typed tuples.
//! - **[`report`]**: the [`FailureReporter`] hook for failing callbacks.
//! - **[`error`]**: [`ApiError`], [`InvokeError`], [`CallbackError`].
//!
//! ```
//! use optdep_core::api::{ApiRegistry, Provider};
//!
//! struct Ipsum;
//!
//! let registry = ApiRegistry::new();
//! registry
//!     .subscribe("IpsumClass", |api| {
//!         let greet = api.get_method::<(String,), String>("Greet");
//!         assert!(greet.is_some());
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! registry
//!     .register(
//!         "IpsumClass",
//!         Provider::new(Ipsum).method("Greet", |_api: &Ipsum, (who,): (String,)| format!("hello {who}")),
//!     )
//!     .unwrap();
//!
//! assert!(registry.try_invoke("IpsumClass", "Greet", &[&"world".to_string()]));
//! ```
pub mod access;
pub mod args;
pub mod error;
pub mod method;
pub mod provider;
pub mod registry;
pub mod report;

pub use access::ApiAccess;
pub use args::FromArgs;
pub use error::{ApiError, BoxError, CallbackError, InvokeError};
pub use method::{BoundMethod, Method, MethodTable, Signature};
pub use provider::{Provider, ProviderBuilder};
pub use registry::{ApiCallback, ApiRegistry, CallbackResult, DeliveryReport};
pub use report::{CallbackFailure, FailureReporter, LogReporter, NotifyPhase};

#[cfg(test)]
mod tests;
