//! # Kernel
//!
//! Bootstrapping and crate-wide definitions.
//!
//! - [`Application`](bootstrap::Application) wires configuration, the shared
//!   API registry and the plugin host together.
//! - `constants` holds application-wide names and versions.
//! - [`Error`](error::Error) and the `Result` alias unify subsystem errors.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::Application;
pub use error::{Error, Result};
