use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::api::args::FromArgs;
use crate::api::error::BoxError;
use crate::api::method::{Method, MethodTable, TypedFn};

/// An object registered under an API name.
///
/// A provider bundles the concrete object with what consumers may discover
/// about it at runtime: a table of named methods and the set of views
/// (the concrete type plus any interfaces it declared) that typed lookups can
/// query.
pub struct Provider {
    type_name: &'static str,
    views: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    methods: MethodTable,
}

impl Provider {
    /// Starts a provider around a freshly owned object.
    pub fn new<P: Send + Sync + 'static>(api: P) -> ProviderBuilder<P> {
        Self::builder(Arc::new(api))
    }

    /// Starts a provider around a shared object. Keep a clone of `api` to
    /// declare interface views with [`ProviderBuilder::interface`].
    pub fn builder<P: Send + Sync + 'static>(api: Arc<P>) -> ProviderBuilder<P> {
        ProviderBuilder {
            target: api,
            views: HashMap::new(),
            methods: MethodTable::new(),
        }
    }

    /// Type name of the concrete object, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Returns the provider as `T`, where `T` is either its concrete type or
    /// an interface (`dyn Trait`) it declared.
    pub fn view<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.views
            .get(&TypeId::of::<T>())
            .and_then(|view| view.downcast_ref::<Arc<T>>())
            .cloned()
    }

    pub fn implements<T: ?Sized + 'static>(&self) -> bool {
        self.views.contains_key(&TypeId::of::<T>())
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<&str> = self.methods.iter().map(|m| m.name()).collect();
        f.debug_struct("Provider")
            .field("type_name", &self.type_name)
            .field("views", &self.views.len())
            .field("methods", &methods)
            .finish()
    }
}

/// Builder declaring the methods and interfaces of a [`Provider`].
pub struct ProviderBuilder<P> {
    target: Arc<P>,
    views: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    methods: MethodTable,
}

impl<P: Send + Sync + 'static> ProviderBuilder<P> {
    /// Exposes an infallible method under `name`.
    pub fn method<A, R, F>(mut self, name: &str, f: F) -> Self
    where
        A: FromArgs,
        R: 'static,
        F: Fn(&P, A) -> R + Send + Sync + 'static,
    {
        let target = Arc::clone(&self.target);
        let typed: TypedFn<A, R> = Arc::new(move |args| f(&target, args));
        self.methods.insert(Method::new(name, typed));
        self
    }

    /// Exposes a fallible method under `name`. Typed consumers bind it as
    /// `fn(A) -> Result<T, BoxError>`.
    pub fn try_method<A, T, E, F>(mut self, name: &str, f: F) -> Self
    where
        A: FromArgs,
        T: 'static,
        E: Into<BoxError>,
        F: Fn(&P, A) -> Result<T, E> + Send + Sync + 'static,
    {
        let target = Arc::clone(&self.target);
        let typed: TypedFn<A, Result<T, BoxError>> =
            Arc::new(move |args| f(&target, args).map_err(Into::<BoxError>::into));
        self.methods.insert(Method::fallible(name, typed));
        self
    }

    /// Declares that the provider can be looked up as `T`, typically a
    /// `dyn Trait` the object implements.
    pub fn interface<T: ?Sized + Send + Sync + 'static>(mut self, view: Arc<T>) -> Self {
        self.views.insert(TypeId::of::<T>(), Box::new(view));
        self
    }

    pub fn build(self) -> Provider {
        let ProviderBuilder { target, mut views, methods } = self;
        let concrete: Box<dyn Any + Send + Sync> = Box::new(target);
        views.entry(TypeId::of::<P>()).or_insert(concrete);
        Provider {
            type_name: type_name::<P>(),
            views,
            methods,
        }
    }
}

impl<P: Send + Sync + 'static> From<ProviderBuilder<P>> for Provider {
    fn from(builder: ProviderBuilder<P>) -> Self {
        builder.build()
    }
}
