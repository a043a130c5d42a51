//! Domain-specific newtypes for type safety.
//!
//! Cycle lengths, period lengths, elapsed-day counters and 1-based day numbers
//! are all counts of calendar days. Wrapping them in [`DayCount`] keeps them
//! from being mixed up with raw ordinals or indices. Uses `derive_more` to
//! eliminate arithmetic boilerplate.

use std::fmt;
use std::ops::{AddAssign, Sub, SubAssign};

use derive_more::{Add as DeriveAdd, From, Into};

// ============================================================================
// Macros for reducing boilerplate
// ============================================================================

/// Generates common methods for numeric newtypes.
macro_rules! impl_newtype_common {
    ($type:ty) => {
        impl $type {
            /// Create a new instance.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Get the inner value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }

            /// Check if the value is zero.
            #[must_use]
            pub const fn is_zero(self) -> bool {
                self.0 == 0
            }
        }
    };
}

/// Generates Sub and assignment trait implementations.
macro_rules! impl_sub_traits {
    ($type:ty) => {
        impl Sub for $type {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl SubAssign for $type {
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }

        impl AddAssign for $type {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }
    };
}

// ============================================================================
// DayCount
// ============================================================================

/// A number of calendar days.
///
/// Used for cycle lengths, period lengths, elapsed days and 1-based day
/// numbers inside a period or cycle.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, DeriveAdd, From, Into,
)]
pub struct DayCount(pub i64);

impl_newtype_common!(DayCount);
impl_sub_traits!(DayCount);

impl DayCount {
    /// Integer mean of a set of counts, rounded down.
    ///
    /// Returns `None` for an empty input.
    #[must_use]
    pub fn floor_mean(values: impl IntoIterator<Item = Self>) -> Option<Self> {
        let (sum, count) = values
            .into_iter()
            .fold((0_i64, 0_i64), |(sum, count), v| (sum + v.0, count + 1));
        (count > 0).then(|| Self(sum.div_euclid(count)))
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 1 {
            write!(f, "1 day")
        } else {
            write!(f, "{} days", self.0)
        }
    }
}

impl From<i32> for DayCount {
    fn from(value: i32) -> Self {
        Self(i64::from(value))
    }
}

impl From<usize> for DayCount {
    fn from(value: usize) -> Self {
        Self(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

// ============================================================================
// Tests
// ============================================================================
