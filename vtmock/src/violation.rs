// vim: tw=80
//! Runtime violations and their reports

use std::{error::Error, fmt};

use crate::{method::MethodId, times::Times, Instance};

/// An expectation whose observed call count fell outside its constraint
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CardinalityViolation {
    pub instance: Instance,
    pub method: MethodId,
    /// Position of the expectation among those of its method
    pub index: usize,
    /// The expectation's argument matcher, as displayed
    pub matcher: String,
    pub expected: Times,
    pub observed: usize,
}

impl fmt::Display for CardinalityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let comparison = if self.expected.is_exceeded() {
            "more"
        } else {
            "fewer"
        };
        write!(f,
            "{} {}: Expectation({}) called {} time(s) which is {} than expected {}",
            self.instance, self.method, self.matcher, self.observed,
            comparison, self.expected)
    }
}

/// A call that no expectation accepted
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnexpectedCall {
    pub instance: Instance,
    pub method: MethodId,
    /// The call's arguments, `Debug`-formatted where possible
    pub args: Vec<String>,
    /// Why each registered expectation of the method declined the call
    pub rejections: Vec<String>,
}

impl fmt::Display for UnexpectedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: unexpected call to {} with arguments ({})",
            self.instance, self.method, self.args.join(", "))?;
        if self.rejections.is_empty() {
            write!(f, "; no expectations were set")
        } else {
            for r in self.rejections.iter() {
                write!(f, "\n    {}", r)?;
            }
            Ok(())
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Violation {
    Cardinality(CardinalityViolation),
    /// Recorded by strict mocks only
    Unexpected(UnexpectedCall),
}

impl Violation {
    pub fn method(&self) -> MethodId {
        match self {
            Violation::Cardinality(c) => c.method,
            Violation::Unexpected(u) => u.method,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Cardinality(c) => c.fmt(f),
            Violation::Unexpected(u) => u.fmt(f),
        }
    }
}

/// Everything that went wrong with one mock, as found by verification
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VerifyError {
    violations: Vec<Violation>,
}

impl VerifyError {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        VerifyError { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for v in self.violations.iter() {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

impl Error for VerifyError {}
