use num_traits::{Float as NumFloat, FromPrimitive};
use std::iter::Sum;
use std::ops::{AddAssign, MulAssign, SubAssign};
use std::time::{Duration, Instant};

pub trait RealNumber:
    NumFloat + FromPrimitive + Sum + Send + Sync + AddAssign + SubAssign + MulAssign + 'static
{
}

impl<T> RealNumber for T where
    T: NumFloat + FromPrimitive + Sum + Send + Sync + AddAssign + SubAssign + MulAssign + 'static
{
}

pub type Scalar = f64;

pub fn dot<T: RealNumber>(lhs: &[T], rhs: &[T]) -> T {
    assert_eq!(lhs.len(), rhs.len(), "dot product dimension mismatch");
    lhs.iter()
        .zip(rhs.iter())
        .fold(T::zero(), |acc, (a, b)| acc + (*a) * (*b))
}

pub fn norm_inf<T: RealNumber>(data: &[T]) -> T {
    data.iter()
        .copied()
        .map(|v| v.abs())
        .fold(T::zero(), |acc, value| acc.max(value))
}

/// Whether two totals agree up to `tolerance`, relative to their magnitude.
pub fn totals_match<T: RealNumber>(lhs: T, rhs: T, tolerance: T) -> bool {
    let scale = T::one().max(lhs.abs()).max(rhs.abs());
    (lhs - rhs).abs() <= tolerance * scale
}

/// Replaces values closer to zero than `threshold` by an exact zero.
pub fn flush_to_zero<T: RealNumber>(value: T, threshold: T) -> T {
    if value.abs() < threshold {
        T::zero()
    } else {
        value
    }
}

/// Wall-clock stopwatch for setup and solve phases.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
