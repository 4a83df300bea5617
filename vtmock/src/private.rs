// vim: tw=80
//! Support code for the vtmock_derive generated mocks.  Not a public API.
//!
//! The generated code can't know whether an argument type implements `Debug`
//! or whether a return type implements `Default`.  It asks anyway, by method
//! call on a reference: the trait implemented for the value itself wins when
//! its bound holds, and the one implemented for the reference catches
//! everything else.

use std::{any, fmt, marker::PhantomData};

use crate::method::MethodId;

pub use predicates::ord::EqPredicate;
pub use predicates_tree::CaseTreeExt;

/// Produces a method's default return value, if its type has one
pub struct DefaultReturner<O>(PhantomData<fn() -> O>);

impl<O> DefaultReturner<O> {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        DefaultReturner(PhantomData)
    }
}

pub trait ViaDefault {
    type Output;

    fn maybe_default(&self) -> Option<Self::Output>;
}

impl<O: Default> ViaDefault for DefaultReturner<O> {
    type Output = O;

    fn maybe_default(&self) -> Option<O> {
        Some(O::default())
    }
}

pub trait NoDefault {
    type Output;

    fn maybe_default(&self) -> Option<Self::Output>;
}

impl<O> NoDefault for &DefaultReturner<O> {
    type Output = O;

    fn maybe_default(&self) -> Option<O> {
        None
    }
}

/// Formats a call argument for diagnostics
pub struct ArgFmt<'a, T: ?Sized>(pub &'a T);

pub trait ViaDebug {
    fn describe(&self) -> String;
}

impl<T: fmt::Debug + ?Sized> ViaDebug for ArgFmt<'_, T> {
    fn describe(&self) -> String {
        format!("{:?}", self.0)
    }
}

pub trait NoDebug {
    fn describe(&self) -> String;
}

impl<T: ?Sized> NoDebug for &ArgFmt<'_, T> {
    fn describe(&self) -> String {
        "?".to_owned()
    }
}

/// Called when a matched expectation has no action and the method's return
/// type has no default
#[cold]
pub fn no_default(method: MethodId, ty: &str) -> ! {
    panic!("{}: expectation matched but has no action, and {} has no default value",
        method, ty)
}

/// `std::any::type_name`, reachable from generated code without naming `std`
pub fn type_name<T: ?Sized>() -> &'static str {
    any::type_name::<T>()
}
