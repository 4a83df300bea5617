// vim: tw=80
//! Scripted return values and the defaults used without them
#![deny(warnings)]

use vtmock::*;

/// Has no `Default`
#[derive(Debug, Eq, PartialEq)]
pub struct Handle(u32);

#[automock]
pub trait Source {
    fn next(&self) -> u32;
    fn scale(&self, x: u32, factor: u32) -> u32;
    fn open(&self, path: String) -> Handle;
    fn log(&mut self, msg: String);
}

#[test]
fn no_action_returns_default() {
    let mut mock = MockSource::new();
    mock.expect_next();
    assert_eq!(0, mock.next());
}

#[test]
fn returning_sees_the_arguments() {
    let mut mock = MockSource::new();
    mock.expect_scale()
        .times(2)
        .returning(|x, factor| x * factor);
    assert_eq!(6, mock.scale(2, 3));
    assert_eq!(20, mock.scale(4, 5));
}

#[test]
fn returning_may_keep_state() {
    let mut mock = MockSource::new();
    let mut counter = 0;
    mock.expect_next()
        .times(3)
        .returning(move || {
            counter += 10;
            counter
        });
    assert_eq!(10, mock.next());
    assert_eq!(20, mock.next());
    assert_eq!(30, mock.next());
}

#[test]
fn the_last_action_sticks() {
    let mut mock = MockSource::new();
    mock.expect_next()
        .times_any()
        .return_const(1u32)
        .returning(|| 2)
        .return_const(3u32);
    let values = (0..5).map(|_| mock.next()).collect::<Vec<_>>();
    assert_eq!(vec![1, 2, 3, 3, 3], values);
}

#[test]
fn return_const_converts() {
    let mut mock = MockSource::new();
    mock.expect_next().return_const(7u8);
    assert_eq!(7, mock.next());
}

#[test]
fn return_types_without_default() {
    let mut mock = MockSource::new();
    mock.expect_open()
        .returning(|path| Handle(path.len() as u32));
    assert_eq!(Handle(4), mock.open("/tmp".to_owned()));
}

#[test]
fn unit_methods() {
    let mut mock = MockSource::new();
    mock.expect_log()
        .withf(|msg| msg.starts_with("hello"))
        .returning(|msg| println!("{}", msg));
    mock.log("hello world".to_owned());
}

#[test]
#[should_panic(expected = "has no default value")]
fn no_default_for_matched_call() {
    let mut mock = MockSource::new();
    mock.expect_open();
    mock.open("/dev/null".to_owned());
}

#[test]
#[should_panic(expected = "\"/dev/null\"); no expectations were set; \
                           automock_actions::Handle has no default value")]
fn no_default_for_unexpected_call() {
    let mock = MockSource::nice();
    mock.open("/dev/null".to_owned());
}
