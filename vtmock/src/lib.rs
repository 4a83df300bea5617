// vim: tw=80
//! Mock objects for traits, with method identities resolved at compile time.
//!
//! vtmock generates a mock version of a trait.  The mock implements the
//! trait, so it can stand in for the real object wherever a `&dyn Trait`,
//! `Box<dyn Trait>` or `T: Trait` is accepted.  Every call made through the
//! trait is checked against the expectations the test set beforehand, and
//! every expectation is verified when the mock is dropped.
//!
//! # Usage
//!
//! * Put [`#[automock]`](automock) on a trait.  A struct named after the trait
//!   with `Mock` prepended is generated next to it.  Traits with supertraits
//!   are mocked with [`mock!`] instead.
//! * In the test, construct the mock with `new`, `strict` or `permissive`.
//!   See [`Strictness`].
//! * Set expectations: an argument matcher, a call count and a script of
//!   actions, each optional.
//! * Hand the mock to the code under test.
//! * Let the mock drop.  Any expectation that was called too few or too many
//!   times fails the test.
//!
//! ## Getting started
//! ```
//! use vtmock::*;
//!
//! #[automock]
//! trait Interface {
//!     fn f1(&self, var: i32) -> bool;
//! }
//!
//! fn exercise(i: &dyn Interface) -> bool {
//!     i.f1(42)
//! }
//!
//! let mut mock = MockInterface::new();
//! mock.expect_f1()
//!     .with(predicate::eq(42))
//!     .return_const(true);
//! assert!(exercise(&mock));
//! ```
//!
//! ## Selecting methods
//!
//! Every method has a generated `expect_<method>` shortcut.  The same
//! expectation can also be reached through the method's marker type, which is
//! what generic test helpers use.  Markers live in a module named after the
//! mock.
//!
//! ```
//! # use vtmock::*;
//! #[automock]
//! trait Interface {
//!     fn f1(&self, var: i32) -> bool;
//!     fn f3(&self, a: i32, b: i32, c: i32) -> i32;
//! }
//!
//! let mut mock = MockInterface::new();
//! mock.expect(MockInterfaceMethods::f3)
//!     .returning(|a, b, c| a + b + c);
//! assert_eq!(6, mock.f3(1, 2, 3));
//! assert_eq!("Interface::f3(i32, i32, i32) -> i32",
//!     MockInterfaceMethods::f3::ID.to_string());
//! ```
//!
//! ## Matching arguments
//!
//! [`with`] takes one [`Predicate`] per argument.  `with_values` compares each
//! argument for equality, and `withf` tests all arguments at once.  A reference
//! argument is matched through the type it refers to.
//!
//! ```
//! # use vtmock::*;
//! #[automock]
//! trait Store {
//!     fn put(&self, key: &str, value: u32);
//! }
//!
//! let mut mock = MockStore::new();
//! mock.expect_put()
//!     .with(predicate::eq("answer"), predicate::ge(40));
//! mock.expect_put()
//!     .withf(|key, value| key.len() == *value as usize);
//! mock.put("answer", 42);
//! mock.put("abc", 3);
//! ```
//!
//! Expectations are tried in the order they were set.  The first one that
//! accepts the arguments and may still be called takes the call.
//!
//! ## Call counts
//!
//! An expectation must be called exactly once unless told otherwise with
//! `times`, `times_range`, `at_least`, `at_most`, `times_any` or `never`.
//!
//! ```should_panic
//! # use vtmock::*;
//! #[automock]
//! trait Interface {
//!     fn f1(&self, var: i32) -> bool;
//! }
//!
//! let mut mock = MockInterface::new();
//! mock.expect_f1().times(2);
//! mock.f1(0);
//! // Panics on drop: called 1 time(s) which is fewer than expected 2
//! ```
//!
//! ## Return values
//!
//! `returning` and `return_const` each append one action.  The *n*th call runs
//! the *n*th action and the last action repeats once the script runs out.
//! Without any action the method returns its type's `Default` value.
//!
//! ```
//! # use vtmock::*;
//! #[automock]
//! trait Counter {
//!     fn next(&self) -> u32;
//! }
//!
//! let mut mock = MockCounter::new();
//! mock.expect_next()
//!     .times(3)
//!     .return_const(1u32)
//!     .return_const(2u32);
//! assert_eq!(1, mock.next());
//! assert_eq!(2, mock.next());
//! assert_eq!(2, mock.next());
//! ```
//!
//! ## Checkpoints
//!
//! [`Mock::checkpoint`] verifies the expectations set so far and discards
//! them.  [`Mock::try_verify`] reports without discarding anything, and
//! [`Mock::finish`] consumes the mock instead of letting it verify on drop.
//!
//! ## Inherited traits
//!
//! ```
//! # use vtmock::*;
//! trait Interface {
//!     fn get(&self) -> bool;
//! }
//! trait ExtendedInterface: Interface {
//!     fn foo(&self, b: bool);
//! }
//!
//! mock! {
//!     pub Extended {}
//!     impl Interface for Extended {
//!         fn get(&self) -> bool;
//!     }
//!     impl ExtendedInterface for Extended {
//!         fn foo(&self, b: bool);
//!     }
//! }
//!
//! let mut mock = MockExtended::strict();
//! mock.expect_get().return_const(true);
//! mock.expect_foo().with_values(true);
//! let ext: &dyn ExtendedInterface = &mock;
//! ext.foo(ext.get());
//! ```
//!
//! ## Compile-time checks
//!
//! Expectations are typed by the method they belong to, so a matcher or
//! return value of the wrong type doesn't compile:
//!
//! ```compile_fail
//! # use vtmock::*;
//! #[automock]
//! trait Interface {
//!     fn f1(&self, var: i32) -> bool;
//! }
//!
//! let mut mock = MockInterface::new();
//! mock.expect_f1().with(predicate::eq("42"));
//! ```
//!
//! Nor does a trait with more methods than the mock's capacity:
//!
//! ```compile_fail
//! # use vtmock::*;
//! #[automock(capacity = 1)]
//! trait Interface {
//!     fn f1(&self, var: i32) -> bool;
//!     fn f2(&self, a: i32, b: i32) -> bool;
//! }
//! ```
//!
//! `#[automock]` refuses traits with supertraits; those need [`mock!`]:
//!
//! ```compile_fail
//! # use vtmock::*;
//! trait Base {
//!     fn base(&self);
//! }
//! #[automock]
//! trait Derived: Base {
//!     fn derived(&self);
//! }
//! ```
//!
//! And `mock!` only mocks trait methods:
//!
//! ```compile_fail
//! # use vtmock::*;
//! mock! {
//!     pub Thing {
//!         fn frob(&self);
//!     }
//! }
//! ```
//!
//! [`with`]: #matching-arguments

use std::fmt;

mod expectation;
mod method;
#[doc(hidden)]
#[path = "private.rs"]
pub mod __private;
mod recorder;
mod times;
mod violation;

pub use vtmock_derive::{automock, mock};
pub use predicates::prelude::{Predicate, predicate};

pub use crate::expectation::{Actions, Expect, Expectations};
pub use crate::method::{Method, MethodId};
pub use crate::recorder::{Instance, Recorder, Slot};
pub use crate::times::Times;
pub use crate::violation::{
    CardinalityViolation,
    UnexpectedCall,
    VerifyError,
    Violation
};

/// Maximum number of methods per mock, unless the mock declares its own
/// `capacity`
pub const DEFAULT_CAPACITY: usize = 64;

/// What a mock does with a call that no expectation accepts.
///
/// The call returns the method's `Default` value, if it has one, except under
/// `Strict`.  A method whose return type has no `Default` panics instead.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Strictness {
    /// Fail the test immediately, and again when the mock is verified
    Strict,
    /// Log a warning and remember the call; see [`Mock::warnings`]
    #[default]
    Nice,
    /// Accept the call silently
    Permissive,
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strictness::Strict => "strict",
            Strictness::Nice => "nice",
            Strictness::Permissive => "permissive",
        };
        f.write_str(s)
    }
}

/// Implemented by every generated mock
pub trait Mock: Sized + 'static {
    /// Name of the mock type, like `MockInterface`
    const NAME: &'static str;
    /// Maximum number of methods this mock may have
    const CAPACITY: usize;
    /// Identities of every mocked method, in slot order
    const METHODS: &'static [MethodId];

    #[doc(hidden)]
    fn recorder(&self) -> &Recorder;

    #[doc(hidden)]
    fn recorder_mut(&mut self) -> &mut Recorder;

    /// Add an expectation for the method selected by marker `M`
    fn expect<M>(&mut self, _method: M) -> &mut M::Expectation
        where M: Method<Mock = Self>
    {
        self.recorder_mut().expect::<M::Expectation>(M::ID)
    }

    /// Number of calls charged so far to the current expectations of `M`
    fn calls<M>(&self, _method: M) -> usize
        where M: Method<Mock = Self>
    {
        self.recorder().calls(M::ID)
    }

    /// Verify every expectation set so far, then discard them all.
    ///
    /// # Panics
    ///
    /// If any expectation was called too few or too many times, or if a
    /// strict mock received an unexpected call.
    fn checkpoint(&mut self) {
        self.recorder_mut().checkpoint()
    }

    /// Report violations without changing the mock
    fn try_verify(&self) -> Result<(), VerifyError> {
        self.recorder().try_verify()
    }

    /// Verify and consume the mock.  Nothing is verified again on drop.
    fn finish(mut self) -> Result<(), VerifyError> {
        let r = self.try_verify();
        self.recorder_mut().clear();
        r
    }

    /// Calls a nice mock accepted without any matching expectation
    fn warnings(&self) -> Vec<UnexpectedCall> {
        self.recorder().warnings()
    }

    /// Strictness chosen when the mock was created
    fn strictness(&self) -> Strictness {
        self.recorder().strictness()
    }

    /// Names this mock in diagnostics
    fn instance(&self) -> Instance {
        self.recorder().instance()
    }
}
