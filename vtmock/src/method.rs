// vim: tw=80
//! Method identities

use std::fmt;

use crate::{Expect, Mock};

/// Identity of one mocked method.
///
/// The derive macros number the methods of a mock in declaration order,
/// across every trait the mock implements.  That number is the method's
/// *slot*.  The remaining fields only exist for diagnostics, except that they
/// also take part in equality, so a method's argument types are part of its
/// identity.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct MethodId {
    slot: usize,
    interface: &'static str,
    name: &'static str,
    signature: &'static str,
}

impl MethodId {
    // Should only be called from the vtmock_derive generated code
    #[doc(hidden)]
    pub const fn new(slot: usize,
                     interface: &'static str,
                     name: &'static str,
                     signature: &'static str) -> Self
    {
        MethodId { slot, interface, name, signature }
    }

    /// Position of the method among all methods of its mock
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// Name of the trait that declares the method
    pub const fn interface(&self) -> &'static str {
        self.interface
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Argument and return types, like `(i32, &str) -> bool`
    pub const fn signature(&self) -> &'static str {
        self.signature
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}{}", self.interface, self.name, self.signature)
    }
}

/// A method selector.
///
/// For every mocked method the derive macros emit a zero-sized marker type
/// implementing this trait, in a module named after the mock:
/// `MockFooMethods::bar` selects `Foo::bar` on a `MockFoo`.
pub trait Method: Copy + 'static {
    /// The mock type whose method this is
    type Mock: Mock;
    /// The typed expectation for this method's signature
    type Expectation: Expect;
    const ID: MethodId;
}

#[cfg(test)]
mod t {
    use super::*;

    #[test]
    fn display() {
        let id = MethodId::new(0, "Interface", "f1", "(i32) -> bool");
        assert_eq!("Interface::f1(i32) -> bool", id.to_string());
    }

    #[test]
    fn signature_is_part_of_identity() {
        let a = MethodId::new(3, "Sink", "put", "(i32)");
        let b = MethodId::new(3, "Sink", "put", "(&str)");
        assert_ne!(a, b);
    }
}
