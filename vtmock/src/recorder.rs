// vim: tw=80
//! The per-instance call recorder

use std::{
    any,
    cell::{RefCell, RefMut},
    collections::HashMap,
    fmt,
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicUsize, Ordering},
    thread,
};

use crate::{
    expectation::{AnyExpectations, Expect, Expectations},
    method::MethodId,
    violation::{UnexpectedCall, VerifyError, Violation},
    Strictness,
};

static NEXT_SERIAL: AtomicUsize = AtomicUsize::new(1);

/// Names one mock instance in diagnostics, like `MockInterface#3`
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Instance {
    name: &'static str,
    serial: usize,
}

impl Instance {
    /// Allocate a fresh serial number for a mock of type `name`
    pub fn new(name: &'static str) -> Self {
        let serial = NEXT_SERIAL.fetch_add(1, Ordering::Relaxed);
        Instance { name, serial }
    }

    /// Name of the mock type
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Process-unique number of this instance
    pub fn serial(&self) -> usize {
        self.serial
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.serial)
    }
}

/// Records the expectations and calls of one mock instance.
///
/// Every generated mock owns exactly one `Recorder`.  Expectations are
/// registered through `&mut` access while the test is arranging; calls arrive
/// through `&self` while the code under test runs.  Each method's
/// expectations sit in their own `RefCell`, so an action may call other
/// methods of its mock, but a mock can't be shared between threads.
///
/// Dropping the recorder verifies every expectation it still holds.
pub struct Recorder {
    instance: Instance,
    strictness: Strictness,
    store: HashMap<MethodId, RefCell<Box<dyn AnyExpectations>>>,
    /// Unexpected calls seen by a nice mock
    warnings: RefCell<Vec<UnexpectedCall>>,
    /// Unexpected calls seen by a strict mock
    violations: RefCell<Vec<Violation>>,
}

impl Recorder {
    pub fn new(name: &'static str, strictness: Strictness) -> Self {
        Recorder {
            instance: Instance::new(name),
            strictness,
            store: HashMap::new(),
            warnings: RefCell::new(Vec::new()),
            violations: RefCell::new(Vec::new()),
        }
    }

    pub fn instance(&self) -> Instance {
        self.instance
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Register a new expectation for `method`
    pub fn expect<E: Expect>(&mut self, method: MethodId) -> &mut E {
        self.store
            .entry(method)
            .or_insert_with(|| {
                RefCell::new(Box::new(Expectations::<E>::new(method))
                    as Box<dyn AnyExpectations>)
            })
            .get_mut()
            .downcast_mut::<Expectations<E>>()
            .unwrap_or_else(|_| mismatch(method))
            .expect()
    }

    /// Find the expectation that should handle a call to `method`.
    ///
    /// `matches` is the generated argument matcher, already bound to the
    /// call's arguments.  `None` means the call is unexpected.
    pub fn find<E, M>(&self, method: MethodId, matches: M) -> Option<Slot<'_, E>>
        where E: Expect,
              M: Fn(&E) -> bool
    {
        let cell = self.store.get(&method)?;
        let ee = cell.try_borrow_mut().unwrap_or_else(|_| {
            panic!("{}: {} was called again from within one of its own actions",
                self.instance, method)
        });
        let guard = RefMut::filter_map(ee, |ee| {
            ee.downcast_mut::<Expectations<E>>()
                .unwrap_or_else(|_| mismatch(method))
                .select(&matches)
        }).ok()?;
        tracing::trace!(instance = %self.instance, %method,
            call = guard.cardinality().count() + 1,
            "matched {}", guard.describe());
        Some(Slot { guard })
    }

    /// Explain why each expectation of `method` declined a call: either its
    /// matcher rejected the arguments, or it was already called as often as
    /// it may be.
    pub fn explain<E, X>(&self, method: MethodId, explain: X) -> Vec<String>
        where E: Expect,
              X: Fn(&E) -> Option<String>
    {
        let ee = match self.store.get(&method) {
            Some(cell) => cell.borrow(),
            None => return Vec::new(),
        };
        let ee = ee.downcast_ref::<Expectations<E>>()
            .unwrap_or_else(|_| mismatch(method));
        ee.iter()
            .filter_map(|e| {
                let why = explain(e).or_else(|| {
                    let times = e.cardinality();
                    (!times.has_capacity()).then(|| format!(
                        "already called {} time(s), expected {}",
                        times.count(), times))
                })?;
                Some(format!("Expectation({}): {}", e.describe(), why))
            }).collect()
    }

    /// Apply the strictness policy to a call that no expectation accepted.
    ///
    /// `fallback` is the method's default return value, if its return type
    /// has one.
    pub fn unexpected<O>(&self,
                         method: MethodId,
                         args: Vec<String>,
                         rejections: Vec<String>,
                         fallback: Option<O>) -> O
    {
        let call = UnexpectedCall {
            instance: self.instance,
            method,
            args,
            rejections,
        };
        match self.strictness {
            Strictness::Strict => {
                self.violations.borrow_mut()
                    .push(Violation::Unexpected(call.clone()));
                panic!("{}", call);
            },
            Strictness::Nice => {
                tracing::warn!(instance = %self.instance, %method, "{}", call);
                self.warnings.borrow_mut().push(call.clone());
            },
            Strictness::Permissive => {
                tracing::trace!(instance = %self.instance, %method, "{}", call);
            }
        }
        match fallback {
            Some(o) => o,
            None => panic!("{}; {} has no default value to return instead",
                call, any::type_name::<O>()),
        }
    }

    /// Nice-mode unexpected calls observed so far
    pub fn warnings(&self) -> Vec<UnexpectedCall> {
        self.warnings.borrow().clone()
    }

    /// Number of calls charged to `method`'s current expectations
    pub fn calls(&self, method: MethodId) -> usize {
        self.store.get(&method)
            .map(|ee| ee.borrow().calls())
            .unwrap_or(0)
    }

    /// Number of current expectations on `method`
    pub fn expectations(&self, method: MethodId) -> usize {
        self.store.get(&method)
            .map(|ee| ee.borrow().len())
            .unwrap_or(0)
    }

    /// Collect every violation without changing any state
    pub fn audit(&self) -> Vec<Violation> {
        let mut violations = self.violations.borrow().clone();
        let mut methods = self.store.values()
            .map(RefCell::borrow)
            .collect::<Vec<_>>();
        methods.sort_by_key(|ee| ee.method().slot());
        for ee in methods {
            ee.audit(self.instance, &mut violations);
        }
        violations
    }

    pub fn try_verify(&self) -> Result<(), VerifyError> {
        let violations = self.audit();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(VerifyError::new(violations))
        }
    }

    /// Verify, then discard every expectation and recorded violation
    pub fn checkpoint(&mut self) {
        let result = self.try_verify();
        self.clear();
        tracing::debug!(instance = %self.instance, ok = result.is_ok(),
            "checkpoint");
        if let Err(e) = result {
            panic!("{}", e);
        }
    }

    /// Discard every expectation and recorded violation without verifying
    pub fn clear(&mut self) {
        self.store.clear();
        self.violations.get_mut().clear();
    }
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("instance", &self.instance)
            .field("strictness", &self.strictness)
            .finish_non_exhaustive()
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        let violations = self.audit();
        if violations.is_empty() {
            return;
        }
        if thread::panicking() {
            for v in violations.iter() {
                tracing::error!(instance = %self.instance, "{}", v);
            }
        } else {
            panic!("{}", VerifyError::new(violations));
        }
    }
}

/// Mutable access to the expectation chosen for a call
pub struct Slot<'a, E> {
    guard: RefMut<'a, E>,
}

impl<E> Deref for Slot<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.guard
    }
}

impl<E> DerefMut for Slot<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.guard
    }
}

fn mismatch(method: MethodId) -> ! {
    panic!("expectations stored for {} have a different type", method)
}

#[cfg(test)]
mod t {
    use super::*;

    #[test]
    fn instances_are_distinct() {
        let a = Instance::new("MockA");
        let b = Instance::new("MockA");
        assert_ne!(a, b);
        assert_eq!(format!("MockA#{}", a.serial()), a.to_string());
    }

    #[derive(Default)]
    struct Stub {
        times: crate::Times,
    }

    impl Expect for Stub {
        fn cardinality(&self) -> &crate::Times {
            &self.times
        }

        fn describe(&self) -> String {
            String::from("<stub>")
        }
    }

    const STUB: MethodId = MethodId::new(0, "Stub", "stub", "()");

    #[test]
    fn registered_expectations_are_counted() {
        let mut r = Recorder::new("MockStub", Strictness::Nice);
        assert_eq!(0, r.expectations(STUB));
        r.expect::<Stub>(STUB);
        r.expect::<Stub>(STUB).times.any();
        assert_eq!(2, r.expectations(STUB));
        r.find::<Stub, _>(STUB, |_| true).unwrap().times.call();
        assert_eq!(1, r.calls(STUB));
        assert!(r.try_verify().is_ok());
        r.clear();
        assert_eq!(0, r.expectations(STUB));
    }

    #[test]
    fn explain_names_exhausted_expectations() {
        let mut r = Recorder::new("MockStub", Strictness::Nice);
        r.expect::<Stub>(STUB);
        r.find::<Stub, _>(STUB, |_| true).unwrap().times.call();
        assert!(r.find::<Stub, _>(STUB, |_| true).is_none());
        let why = r.explain::<Stub, _>(STUB, |_| None);
        assert_eq!(vec![String::from(
            "Expectation(<stub>): already called 1 time(s), expected 1")],
            why);
    }

    #[test]
    fn other_methods_are_reachable_while_one_is_held() {
        const OTHER: MethodId = MethodId::new(1, "Stub", "other", "()");
        let mut r = Recorder::new("MockStub", Strictness::Nice);
        r.expect::<Stub>(STUB);
        r.expect::<Stub>(OTHER);
        let mut held = r.find::<Stub, _>(STUB, |_| true).unwrap();
        r.find::<Stub, _>(OTHER, |_| true).unwrap().times.call();
        held.times.call();
        drop(held);
        assert_eq!(1, r.calls(OTHER));
        assert!(r.try_verify().is_ok());
    }

    #[test]
    #[should_panic(expected = "was called again from within one of its own actions")]
    fn same_method_is_not_reentrant() {
        let mut r = Recorder::new("MockStub", Strictness::Nice);
        r.expect::<Stub>(STUB).times.any();
        let _held = r.find::<Stub, _>(STUB, |_| true).unwrap();
        r.find::<Stub, _>(STUB, |_| true);
    }

    #[test]
    fn empty_recorder_verifies() {
        for s in [Strictness::Strict, Strictness::Nice, Strictness::Permissive]
        {
            let r = Recorder::new("MockEmpty", s);
            assert!(r.try_verify().is_ok());
            assert!(r.warnings().is_empty());
        }
    }
}
