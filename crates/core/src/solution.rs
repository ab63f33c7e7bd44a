use crate::math::RealNumber;
use crate::stats::SolveStats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    Optimal,
    AlmostOptimal,
    PrimalInfeasible,
    DualInfeasible,
    MaxIterations,
    MaxTime,
    NumericalFailure,
}

impl Status {
    /// Statuses whose primal vector may be read as a solution.
    pub fn is_solved(self) -> bool {
        matches!(self, Status::Optimal | Status::AlmostOptimal)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution<T: RealNumber> {
    pub primal: Vec<T>,
    pub equality_dual: Vec<T>,
    pub status: Status,
    pub objective_value: T,
    pub iterations: usize,
    pub stats: SolveStats,
}

impl<T> Solution<T>
where
    T: RealNumber,
{
    pub fn with_capacity(n: usize, meq: usize) -> Self {
        Self {
            primal: vec![T::zero(); n],
            equality_dual: vec![T::zero(); meq],
            status: Status::NumericalFailure,
            objective_value: T::zero(),
            iterations: 0,
            stats: SolveStats::new(),
        }
    }
}
