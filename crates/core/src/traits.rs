use crate::math::RealNumber;
use crate::options::SolveOptions;
use crate::problem::ProblemLP;
use crate::solution::Solution;
use anyhow::Result;

/// An optimisation engine that LP problems can be loaded into.
pub trait SolverBackend<T: RealNumber> {
    type Session: BackendSession<T>;

    fn name(&self) -> &'static str;

    /// Copies `problem` into backend-owned storage. The returned session owns
    /// every resource the backend allocated; dropping it releases them.
    fn load(&self, problem: &ProblemLP<T>, options: &SolveOptions<T>) -> Result<Self::Session>;
}

pub trait BackendSession<T: RealNumber> {
    /// Runs the solver. Infeasibility and iteration limits are reported through
    /// [`Solution::status`]; `Err` is reserved for failures of the backend itself.
    fn solve(&mut self) -> Result<Solution<T>>;
}
