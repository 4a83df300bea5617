// vim: tw=80
//! Method identities, markers and capacity
#![deny(warnings)]

use std::collections::HashSet;

use vtmock::*;

#[automock]
pub trait Interface {
    fn f1(&self, var: i32) -> bool;
    fn f2(&self, a: i32, b: i32) -> bool;
    fn f3(&self, a: i32, b: i32, c: i32) -> i32;
    fn f4(&mut self, name: &str, values: Vec<u8>) -> Option<u8>;
}

#[automock(capacity = 2)]
pub trait Small {
    fn a(&self);
    fn b(&self);
}

#[test]
fn identities_are_distinct_and_dense() {
    let ids = MockInterface::METHODS;
    assert_eq!(4, ids.len());
    let unique = ids.iter().collect::<HashSet<_>>();
    assert_eq!(ids.len(), unique.len());
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(i, id.slot());
        assert_eq!("Interface", id.interface());
    }
}

#[test]
fn identities_are_stable() {
    assert_eq!(MockInterfaceMethods::f2::ID, MockInterface::METHODS[1]);
    assert_eq!(MockInterfaceMethods::Interface::f2::ID,
               MockInterfaceMethods::f2::ID);
}

#[test]
fn signatures() {
    let sigs = MockInterface::METHODS.iter()
        .map(MethodId::to_string)
        .collect::<Vec<_>>();
    assert_eq!(vec!["Interface::f1(i32) -> bool",
                    "Interface::f2(i32, i32) -> bool",
                    "Interface::f3(i32, i32, i32) -> i32",
                    "Interface::f4(&str, Vec<u8>) -> Option<u8>"],
               sigs);
}

#[test]
fn capacity() {
    assert_eq!(DEFAULT_CAPACITY, MockInterface::CAPACITY);
    assert_eq!(2, MockSmall::CAPACITY);
    assert_eq!(2, MockSmall::METHODS.len());
    assert_eq!("MockSmall", MockSmall::NAME);
}

#[test]
fn markers() {
    let mut mock = MockInterface::strict();
    mock.expect(MockInterfaceMethods::f1)
        .return_const(true);
    mock.expect(MockInterfaceMethods::Interface::f4)
        .with(predicate::eq("x"), predicate::always())
        .returning(|_, values| values.first().copied());
    assert!(mock.f1(0));
    assert_eq!(Some(9), mock.f4("x", vec![9, 8]));
    assert_eq!(1, mock.calls(MockInterfaceMethods::f4));
}

/// A test helper that works for any method of any mock
fn assert_uncalled<M: Method>(mock: &M::Mock, method: M) {
    assert_eq!(0, mock.calls(method), "{} was called", M::ID);
}

#[test]
fn generic_over_markers() {
    let mut mock = MockInterface::new();
    mock.expect_f3().never();
    assert_uncalled(&mock, MockInterfaceMethods::f3);
    let mut small = MockSmall::new();
    small.expect_a();
    small.expect_b().times_any();
    small.a();
    assert_uncalled(&small, MockSmallMethods::b);
}

#[test]
fn instances_are_distinct() {
    let a = MockInterface::new();
    let b = MockInterface::new();
    assert_ne!(a.instance(), b.instance());
    assert_eq!("MockInterface", a.instance().name());
}
