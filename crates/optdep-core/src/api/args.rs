use std::any::{Any, type_name};

use crate::api::error::InvokeError;

/// Conversion from a dynamically typed argument slice (`&[&dyn Any]`) into
/// the typed argument tuple a method was declared with.
///
/// Arguments are borrowed and cloned out, so one slice can be broadcast to
/// every provider of an API. Implemented for tuples of up to eight
/// `Clone + 'static` elements. The dynamic type of each argument must match
/// the tuple element exactly; there is no numeric widening or `&str`/`String`
/// coercion.
pub trait FromArgs: Sized + 'static {
    /// Number of arguments the tuple expects.
    fn arity() -> usize;

    /// Decodes `args` for the method named `method`.
    fn from_args(method: &str, args: &[&dyn Any]) -> Result<Self, InvokeError>;
}

fn arg<T: Clone + 'static>(method: &str, args: &[&dyn Any], index: usize) -> Result<T, InvokeError> {
    args[index]
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| InvokeError::ArgumentType {
            method: method.to_string(),
            index,
            expected: type_name::<T>(),
        })
}

macro_rules! impl_from_args {
    ($len:expr; $($T:ident => $idx:tt),*) => {
        impl<$($T: Clone + 'static),*> FromArgs for ($($T,)*) {
            fn arity() -> usize {
                $len
            }

            #[allow(unused_variables)]
            fn from_args(method: &str, args: &[&dyn Any]) -> Result<Self, InvokeError> {
                if args.len() != $len {
                    return Err(InvokeError::ArgumentCount {
                        method: method.to_string(),
                        expected: $len,
                        found: args.len(),
                    });
                }
                Ok(($(arg::<$T>(method, args, $idx)?,)*))
            }
        }
    };
}

impl_from_args!(0;);
impl_from_args!(1; A => 0);
impl_from_args!(2; A => 0, B => 1);
impl_from_args!(3; A => 0, B => 1, C => 2);
impl_from_args!(4; A => 0, B => 1, C => 2, D => 3);
impl_from_args!(5; A => 0, B => 1, C => 2, D => 3, E => 4);
impl_from_args!(6; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
impl_from_args!(7; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6);
impl_from_args!(8; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7);
