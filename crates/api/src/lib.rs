#![forbid(unsafe_code)]

pub mod builder;
pub mod error;
pub mod model;
pub mod report;

use tracing::info;
use transflow_core::instance::Instance;
use transflow_core::math::Scalar;
use transflow_core::options::SolveOptions;
use transflow_core::traits::SolverBackend;
use transflow_solver::ClarabelBackend;

pub use builder::LpBuilder;
pub use error::TransportError;
pub use model::TransportModel;
pub use report::{FlowMatrix, Route, TransportReport};
pub use transflow_core::options::BalancePolicy;
pub use transflow_core::solution::Status;
pub use transflow_core::stats::SolveStats;

pub struct TransportSolver<B = ClarabelBackend> {
    backend: B,
    options: SolveOptions<Scalar>,
}

impl TransportSolver<ClarabelBackend> {
    pub fn new() -> Self {
        Self::with_backend(ClarabelBackend::new())
    }
}

impl Default for TransportSolver<ClarabelBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> TransportSolver<B>
where
    B: SolverBackend<Scalar>,
{
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            options: SolveOptions::default(),
        }
    }

    pub fn options(mut self, options: SolveOptions<Scalar>) -> Self {
        self.options = options;
        self
    }

    pub fn solve(&self, instance: &Instance) -> Result<TransportReport, TransportError> {
        let model = TransportModel::build(instance, &self.options)?;
        let report = model.solve(&self.backend, &self.options)?;
        info!(
            backend = self.backend.name(),
            objective = report.objective,
            iterations = report.iterations,
            "transport problem solved"
        );
        Ok(report)
    }
}

pub fn solve_transport(
    instance: &Instance,
    options: SolveOptions<Scalar>,
) -> Result<TransportReport, TransportError> {
    TransportSolver::new().options(options).solve(instance)
}
