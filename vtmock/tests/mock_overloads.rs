// vim: tw=80
//! A mock whose traits share a method name, differing only by argument type
#![deny(warnings)]

use vtmock::*;

pub trait IntSink {
    fn put(&self, x: i32) -> usize;
}

pub trait StrSink {
    fn put(&self, x: &str) -> usize;
    fn flush(&self);
}

mock! {
    pub Sink {}
    impl IntSink for Sink {
        fn put(&self, x: i32) -> usize;
    }
    impl StrSink for Sink {
        fn put(&self, x: &str) -> usize;
        fn flush(&self);
    }
}

#[test]
fn identities_differ() {
    let int = MockSinkMethods::IntSink::put::ID;
    let str_ = MockSinkMethods::StrSink::put::ID;
    assert_ne!(int, str_);
    assert_eq!(int.name(), str_.name());
    assert_eq!("IntSink::put(i32) -> usize", int.to_string());
    assert_eq!("StrSink::put(&str) -> usize", str_.to_string());
}

#[test]
fn expectations_stay_with_their_overload() {
    let mut mock = MockSink::nice();
    mock.expect_int_sink_put()
        .times_any()
        .return_const(1usize);
    IntSink::put(&mock, 5);
    assert_eq!(0, StrSink::put(&mock, "five"));
    let warnings = mock.warnings();
    assert_eq!(1, warnings.len());
    assert_eq!(MockSinkMethods::StrSink::put::ID, warnings[0].method);
    assert_eq!(1, mock.calls(MockSinkMethods::IntSink::put));
    assert_eq!(0, mock.calls(MockSinkMethods::StrSink::put));
}

#[test]
#[should_panic(expected = "unexpected call to StrSink::put(&str) -> usize")]
fn strict_overload_is_not_consumed() {
    let mut mock = MockSink::strict();
    mock.expect_int_sink_put()
        .return_const(1usize);
    StrSink::put(&mock, "one");
}

#[test]
fn both_overloads() {
    let mut mock = MockSink::strict();
    mock.expect_int_sink_put()
        .with_values(3)
        .returning(|x| x as usize);
    mock.expect_str_sink_put()
        .with_values("four")
        .returning(|x| x.len());
    mock.expect(MockSinkMethods::flush);
    assert_eq!(3, IntSink::put(&mock, 3));
    assert_eq!(4, StrSink::put(&mock, "four"));
    mock.flush();
}
