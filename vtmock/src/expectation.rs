// vim: tw=80
//! Storage for the expectations of one method
//!
//! The derive macros generate one typed `Expectation` struct per mocked
//! method.  Everything that doesn't depend on the method's signature lives
//! here, generic over that struct.

use downcast::{downcast, Any};

use crate::{
    method::MethodId,
    times::Times,
    violation::{CardinalityViolation, Violation},
    Instance,
};

/// Signature-independent view of a generated `Expectation`
pub trait Expect: Default + 'static {
    /// The expectation's call-count constraint and observed count
    fn cardinality(&self) -> &Times;

    /// Human-readable form of the argument matcher, like `eq(42)`
    fn describe(&self) -> String;
}

/// The scripted actions of an expectation.
///
/// `F` is an unsized closure type such as `dyn FnMut(i32) -> bool`.  The
/// *n*th call runs the *n*th action; once the script runs out, the last
/// action sticks.
pub struct Actions<F: ?Sized> {
    script: Vec<Box<F>>,
}

impl<F: ?Sized> Actions<F> {
    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    /// Select the action for the call with zero-based index `call`
    pub fn pick(&mut self, call: usize) -> Option<&mut F> {
        let last = self.script.len().checked_sub(1)?;
        self.script.get_mut(call.min(last)).map(|f| &mut **f)
    }

    pub fn push(&mut self, f: Box<F>) {
        self.script.push(f);
    }
}

impl<F: ?Sized> Default for Actions<F> {
    fn default() -> Self {
        Actions { script: Vec::new() }
    }
}

/// All expectations registered for one method, in registration order
pub struct Expectations<E> {
    method: MethodId,
    list: Vec<E>,
}

impl<E: Expect> Expectations<E> {
    pub fn new(method: MethodId) -> Self {
        Expectations { method, list: Vec::new() }
    }

    /// Register a new expectation and return it for configuration
    pub fn expect(&mut self) -> &mut E {
        self.list.push(E::default());
        let l = self.list.len();
        &mut self.list[l - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.list.iter()
    }

    /// Find the expectation that should handle a call.
    ///
    /// The oldest expectation that accepts the arguments and still has
    /// capacity wins.  Saturated expectations never take a call; with none
    /// left the call is unexpected.
    pub fn select<M>(&mut self, matches: M) -> Option<&mut E>
        where M: Fn(&E) -> bool
    {
        self.list.iter_mut()
            .find(|e| e.cardinality().has_capacity() && matches(&**e))
    }
}

/// Type-erased `Expectations`, so one recorder can hold those of every method
#[doc(hidden)]
pub trait AnyExpectations: Any {
    fn method(&self) -> MethodId;

    /// Append a violation for every expectation whose count is out of bounds
    fn audit(&self, instance: Instance, violations: &mut Vec<Violation>);

    /// Total number of calls charged to this method's expectations
    fn calls(&self) -> usize;

    /// Number of registered expectations
    fn len(&self) -> usize;
}
downcast!(dyn AnyExpectations);

impl<E: Expect> AnyExpectations for Expectations<E> {
    fn method(&self) -> MethodId {
        self.method
    }

    fn audit(&self, instance: Instance, violations: &mut Vec<Violation>) {
        for (index, e) in self.list.iter().enumerate() {
            let times = e.cardinality();
            if !times.is_met() {
                violations.push(Violation::Cardinality(CardinalityViolation {
                    instance,
                    method: self.method,
                    index,
                    matcher: e.describe(),
                    expected: times.clone(),
                    observed: times.count(),
                }));
            }
        }
    }

    fn calls(&self) -> usize {
        self.list.iter().map(|e| e.cardinality().count()).sum()
    }

    fn len(&self) -> usize {
        self.list.len()
    }
}
