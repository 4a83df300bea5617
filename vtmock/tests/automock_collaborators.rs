// vim: tw=80
//! Several mocks driving one piece of code under test
#![deny(warnings)]

use vtmock::*;

#[automock]
pub trait Interface1 {
    fn f1(&self, var: i32) -> bool;
}

#[automock]
pub trait Interface2 {
    fn f2_1(&self);
    fn f2_2(&self);
}

#[automock]
pub trait Interface3 {
    fn f3(&self, a: i32, b: i32, c: i32);
}

struct Example<'a> {
    i1: &'a dyn Interface1,
    i2: &'a dyn Interface2,
    i3: &'a dyn Interface3,
}

impl<'a> Example<'a> {
    fn test(&self) {
        if self.i1.f1(42) {
            self.i2.f2_1();
        } else {
            self.i2.f2_2();
        }
        self.i3.f3(0, 1, 2);
    }
}

fn mocks(f1: bool) -> (MockInterface1, MockInterface2, MockInterface3) {
    let mut m1 = MockInterface1::strict();
    let mut m2 = MockInterface2::strict();
    let mut m3 = MockInterface3::strict();
    m1.expect_f1().with_values(42).return_const(f1);
    if f1 {
        m2.expect_f2_1().times(1);
    } else {
        m2.expect_f2_2().times(1);
    }
    m3.expect_f3().with_values(0, 1, 2).times(1);
    (m1, m2, m3)
}

#[test]
fn first_branch() {
    let (m1, m2, m3) = mocks(true);
    Example { i1: &m1, i2: &m2, i3: &m3 }.test();
}

#[test]
fn second_branch() {
    let (m1, m2, m3) = mocks(false);
    Example { i1: &m1, i2: &m2, i3: &m3 }.test();
}

#[test]
#[should_panic(expected = "unexpected call to Interface3::f3(i32, i32, i32) \
                           with arguments (0, 1, 2)")]
fn wrong_arguments() {
    let (m1, m2, _m3) = mocks(true);
    let mut m3 = MockInterface3::strict();
    m3.expect_f3().with_values(2, 1, 0);
    Example { i1: &m1, i2: &m2, i3: &m3 }.test();
}
