use thiserror::Error;
use transflow_core::instance::InstanceError;
use transflow_core::options::OptionsError;
use transflow_core::problem::ProblemError;
use transflow_core::solution::Status;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid instance: {0}")]
    Instance(#[from] InstanceError),
    #[error("invalid options: {0}")]
    Options(#[from] OptionsError),
    #[error("invalid problem: {0}")]
    Problem(#[from] ProblemError),
    #[error("no flow satisfies every supply and demand constraint")]
    Infeasible,
    #[error("objective is unbounded below")]
    Unbounded,
    #[error("iteration limit reached after {0} iterations")]
    IterationLimit(usize),
    #[error("time limit reached before convergence")]
    TimeLimit,
    #[error("{0}")]
    Numerical(String),
    #[error("{0}")]
    Backend(String),
}

impl TransportError {
    /// Short label for one-line diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Instance(InstanceError::Unbalanced { .. }) => "unbalanced",
            TransportError::Instance(_) | TransportError::Options(_) => "input",
            TransportError::Problem(_) => "model",
            TransportError::Infeasible => "infeasible",
            TransportError::Unbounded => "unbounded",
            TransportError::IterationLimit(_) => "iteration-limit",
            TransportError::TimeLimit => "time-limit",
            TransportError::Numerical(_) => "numerical",
            TransportError::Backend(_) => "backend",
        }
    }

    pub(crate) fn backend(err: anyhow::Error) -> Self {
        TransportError::Backend(format!("{err:#}"))
    }

    /// Maps a terminal solver status to an error, or `None` when the primal
    /// vector is usable.
    pub(crate) fn from_status(status: Status, iterations: usize) -> Option<Self> {
        match status {
            Status::Optimal | Status::AlmostOptimal => None,
            Status::PrimalInfeasible => Some(TransportError::Infeasible),
            Status::DualInfeasible => Some(TransportError::Unbounded),
            Status::MaxIterations => Some(TransportError::IterationLimit(iterations)),
            Status::MaxTime => Some(TransportError::TimeLimit),
            Status::NumericalFailure => Some(TransportError::Numerical(
                "solver stopped without a usable solution".into(),
            )),
        }
    }
}
