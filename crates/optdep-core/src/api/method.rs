use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::api::args::FromArgs;
use crate::api::error::{BoxError, InvokeError, panic_message};

/// Type-erased entry point used by name-based invocation.
type ErasedFn = dyn Fn(&[&dyn Any]) -> Result<(), InvokeError> + Send + Sync;

/// Typed form of a method as stored in the table and handed out by
/// [`Method::bind`].
pub type TypedFn<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

/// Declared shape of a method: its argument tuple and return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    args: TypeId,
    ret: TypeId,
    arity: usize,
    args_name: &'static str,
    ret_name: &'static str,
}

impl Signature {
    /// Signature of a method taking the tuple `A` and returning `R`.
    pub fn of<A: FromArgs, R: 'static>() -> Self {
        Self {
            args: TypeId::of::<A>(),
            ret: TypeId::of::<R>(),
            arity: A::arity(),
            args_name: type_name::<A>(),
            ret_name: type_name::<R>(),
        }
    }

    /// Whether a caller expecting `fn(A) -> R` can bind to this method.
    pub fn matches<A: 'static, R: 'static>(&self) -> bool {
        self.args == TypeId::of::<A>() && self.ret == TypeId::of::<R>()
    }

    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.args_name, self.ret_name)
    }
}

/// Runs `f`, turning a panic into [`InvokeError::Panicked`].
///
/// The panic hook still runs first, so with the default hook a contained
/// panic is printed to stderr.
fn guarded<T>(method: &str, f: impl FnOnce() -> T) -> Result<T, InvokeError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| InvokeError::Panicked {
        method: method.to_string(),
        message: panic_message(&*payload),
    })
}

/// A named method exposed by a provider.
///
/// Each method is stored twice: once behind an erased entry point that decodes
/// `&[&dyn Any]` arguments, and once in its typed form so consumers can bind
/// to it without going through the name lookup and decoding on every call.
pub struct Method {
    name: String,
    signature: Signature,
    erased: Arc<ErasedFn>,
    typed: Arc<dyn Any + Send + Sync>,
}

impl Method {
    /// Wraps an infallible method. The return value is dropped on the
    /// name-based path.
    pub fn new<A, R>(name: &str, f: TypedFn<A, R>) -> Self
    where
        A: FromArgs,
        R: 'static,
    {
        let target = Arc::clone(&f);
        let method_name = name.to_string();
        let erased: Arc<ErasedFn> = Arc::new(move |args: &[&dyn Any]| {
            let decoded = A::from_args(&method_name, args)?;
            guarded(&method_name, || {
                target(decoded);
            })
        });
        Self {
            name: name.to_string(),
            signature: Signature::of::<A, R>(),
            erased,
            typed: Arc::new(f),
        }
    }

    /// Wraps a fallible method. An `Err` counts as a failed invocation on the
    /// name-based path; typed callers bind with `R = Result<T, BoxError>`.
    pub fn fallible<A, T>(name: &str, f: TypedFn<A, Result<T, BoxError>>) -> Self
    where
        A: FromArgs,
        T: 'static,
    {
        let target = Arc::clone(&f);
        let method_name = name.to_string();
        let erased: Arc<ErasedFn> = Arc::new(move |args: &[&dyn Any]| {
            let decoded = A::from_args(&method_name, args)?;
            guarded(&method_name, || target(decoded))?
                .map(|_| ())
                .map_err(|source| InvokeError::Failed {
                    method: method_name.clone(),
                    source,
                })
        });
        Self {
            name: name.to_string(),
            signature: Signature::of::<A, Result<T, BoxError>>(),
            erased,
            typed: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Calls the method with dynamically typed arguments.
    pub fn invoke(&self, args: &[&dyn Any]) -> Result<(), InvokeError> {
        (self.erased)(args)
    }

    /// Returns the typed callable if the declared signature is exactly
    /// `fn(A) -> R`.
    pub fn bind<A: 'static, R: 'static>(&self) -> Option<BoundMethod<A, R>> {
        if !self.signature.matches::<A, R>() {
            return None;
        }
        self.typed
            .downcast_ref::<TypedFn<A, R>>()
            .map(|f| BoundMethod {
                name: self.name.clone(),
                f: Arc::clone(f),
            })
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("signature", &self.signature.to_string())
            .finish_non_exhaustive()
    }
}

/// A method resolved once and callable directly with its typed arguments.
pub struct BoundMethod<A, R> {
    name: String,
    f: TypedFn<A, R>,
}

impl<A, R> Clone for BoundMethod<A, R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            f: Arc::clone(&self.f),
        }
    }
}

impl<A, R> fmt::Debug for BoundMethod<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<A, R> BoundMethod<A, R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls the method. A panic in the provider unwinds into the caller.
    pub fn call(&self, args: A) -> R {
        (self.f)(args)
    }

    /// Calls the method, reporting a provider panic as an error.
    pub fn try_call(&self, args: A) -> Result<R, InvokeError> {
        guarded(&self.name, || (self.f)(args))
    }
}

/// Name-indexed methods of one provider, kept in declaration order.
#[derive(Debug, Default)]
pub struct MethodTable {
    methods: Vec<Method>,
    index: HashMap<String, usize>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a method. A method with the same name is replaced in place.
    pub fn insert(&mut self, method: Method) {
        match self.index.get(method.name()) {
            Some(&slot) => self.methods[slot] = method,
            None => {
                self.index.insert(method.name().to_string(), self.methods.len());
                self.methods.push(method);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Method> {
        self.index.get(name).map(|&slot| &self.methods[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }
}
