// vim: tw=80
//! Cardinality constraints of an expectation

use std::{fmt, ops::Range};

/// How many times an expectation may be called, and how many times it was.
///
/// Both bounds are inclusive.  A fresh `Times` requires exactly one call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Times {
    /// How many times has the expectation already been called?
    count: usize,
    min: usize,
    max: usize,
}

impl Times {
    /// Record one more call.  Returns the zero-based index of this call.
    #[doc(hidden)]
    pub fn call(&mut self) -> usize {
        let index = self.count;
        self.count = self.count.saturating_add(1);
        index
    }

    /// Number of calls observed so far
    pub fn count(&self) -> usize {
        self.count
    }

    /// May the expectation accept another call without exceeding its
    /// maximum?
    pub fn has_capacity(&self) -> bool {
        self.count < self.max
    }

    /// Has the expectation been called more often than allowed?
    pub fn is_exceeded(&self) -> bool {
        self.count > self.max
    }

    /// Has the expectation been called at least the minimum number of times?
    pub fn is_satisfied(&self) -> bool {
        self.count >= self.min
    }

    /// Is the count within bounds?
    pub fn is_met(&self) -> bool {
        self.is_satisfied() && !self.is_exceeded()
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> Option<usize> {
        if self.max == usize::MAX {
            None
        } else {
            Some(self.max)
        }
    }

    pub fn any(&mut self) {
        self.min = 0;
        self.max = usize::MAX;
    }

    pub fn at_least(&mut self, n: usize) {
        self.min = n;
        self.max = usize::MAX;
    }

    pub fn at_most(&mut self, n: usize) {
        self.min = 0;
        self.max = n;
    }

    pub fn n(&mut self, n: usize) {
        self.min = n;
        self.max = n;
    }

    pub fn never(&mut self) {
        self.n(0);
    }

    /// Allow any count within a half-open range.  An empty range forbids all
    /// calls.
    pub fn range(&mut self, range: Range<usize>) {
        if range.is_empty() {
            self.never();
        } else {
            self.min = range.start;
            self.max = range.end - 1;
        }
    }
}

impl Default for Times {
    fn default() -> Self {
        Times { count: 0, min: 1, max: 1 }
    }
}

/// Renders the constraint, not the count: "1", "2..=4", "at least 3", ...
impl fmt::Display for Times {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max()) {
            (0, None) => write!(f, "any number of times"),
            (min, None) => write!(f, "at least {}", min),
            (0, Some(max)) if max > 0 => write!(f, "at most {}", max),
            (min, Some(max)) if min == max => write!(f, "{}", min),
            (min, Some(max)) => write!(f, "{}..={}", min, max),
        }
    }
}
