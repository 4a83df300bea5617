// vim: tw=80
//! A mock's Debug output names the instance and its strictness
#![deny(warnings)]

use vtmock::*;

#[automock]
pub trait Foo {
    fn foo(&self);
}

pub trait Bar {
    fn bar(&self);
}

mock! {
    #[derive(Debug)]
    pub Bar {}
    impl Bar for Bar {
        fn bar(&self);
    }
}

#[test]
fn automock() {
    let mock = MockFoo::strict();
    assert_eq!(
        format!("MockFoo {{ instance: MockFoo#{}, strictness: Strict }}",
            mock.instance().serial()),
        format!("{:?}", mock));
}

#[test]
fn mock() {
    let mock = MockBar::permissive();
    assert_eq!(
        format!("MockBar {{ instance: {}, strictness: Permissive }}",
            mock.instance()),
        format!("{:?}", mock));
}

#[test]
fn instance_display() {
    let mock = MockFoo::new();
    let instance = mock.instance();
    assert_eq!(format!("MockFoo#{}", instance.serial()), instance.to_string());
}

#[test]
fn strictness_display() {
    assert_eq!("strict", Strictness::Strict.to_string());
    assert_eq!("nice", Strictness::Nice.to_string());
    assert_eq!("permissive", Strictness::Permissive.to_string());
}
