//! Balance-constrained transport model.
//!
//! One non-negative flow variable per facility/customer pair, stored
//! row-major (`flow[i][j]` is variable `i * Nc + j`). Facility rows come
//! first in the equality block, customer rows after them:
//!
//! ```text
//! sum_j flow[i][j] = supply[i]    i in 0..Nf
//! sum_i flow[i][j] = demand[j]    j in 0..Nc
//! ```
//!
//! The objective is `sum_ij distance[i][j] * flow[i][j]`.

use crate::builder::LpBuilder;
use crate::error::TransportError;
use crate::report::{FlowMatrix, TransportReport};
use itertools::Itertools;
use tracing::{debug, info, warn};
use transflow_core::distance::DistanceMatrix;
use transflow_core::instance::Instance;
use transflow_core::math::{flush_to_zero, norm_inf, Scalar};
use transflow_core::options::{BalancePolicy, SolveOptions};
use transflow_core::problem::{Bounds, CscMatrix, ProblemLP};
use transflow_core::solution::Status;
use transflow_core::traits::{BackendSession, SolverBackend};

/// A built model: variables, balance rows and objective are attached and the
/// instance has passed validation.
///
/// [`TransportModel::solve`] consumes the model, so a model is solved at most
/// once. Backend resources live only for the duration of that call.
#[derive(Debug, Clone)]
pub struct TransportModel<'a> {
    instance: &'a Instance,
    distances: DistanceMatrix,
    problem: ProblemLP<Scalar>,
}

impl<'a> TransportModel<'a> {
    pub fn build(
        instance: &'a Instance,
        options: &SolveOptions<Scalar>,
    ) -> Result<Self, TransportError> {
        options.validate()?;
        instance.validate_shape()?;
        match options.balance_policy {
            BalancePolicy::Validate => instance.validate_balance(options.balance_tolerance)?,
            BalancePolicy::Defer => {
                if instance
                    .validate_balance(options.balance_tolerance)
                    .is_err()
                {
                    warn!(
                        supply = instance.total_supply(),
                        demand = instance.total_demand(),
                        "totals differ, leaving the verdict to the solver"
                    );
                }
            }
        }

        let distances = DistanceMatrix::for_instance(instance);
        let nf = instance.num_facilities();
        let nc = instance.num_customers();
        let balance = balance_matrix(nf, nc);
        let rhs: Vec<Scalar> = instance
            .supply
            .iter()
            .chain(instance.demand.iter())
            .copied()
            .collect();
        let problem = LpBuilder::new()
            .c(distances.as_slice().to_vec())
            .c_eq(balance, rhs)
            .bounds(Bounds::non_negative(nf * nc))
            .build()?;

        info!(
            facilities = nf,
            customers = nc,
            variables = problem.nvars(),
            constraints = problem.nequalities(),
            "built transport model"
        );
        Ok(Self {
            instance,
            distances,
            problem,
        })
    }

    pub fn instance(&self) -> &Instance {
        self.instance
    }

    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    pub fn problem(&self) -> &ProblemLP<Scalar> {
        &self.problem
    }

    /// Loads the model into `backend`, solves it and reads the flows back.
    ///
    /// The backend session is dropped before this returns, whether the solve
    /// succeeded, the solver reported a failure status, or the backend errored.
    ///
    /// Flows that break a balance row or go negative by more than
    /// `feasibility_tolerance` (scaled by the largest quantity) are rejected as
    /// numerical failures. Accepted flows are clamped at zero and entries below
    /// that tolerance are flushed to exact zeros.
    pub fn solve<B>(
        self,
        backend: &B,
        options: &SolveOptions<Scalar>,
    ) -> Result<TransportReport, TransportError>
    where
        B: SolverBackend<Scalar>,
    {
        options.validate()?;
        let solution = {
            let mut session = backend
                .load(&self.problem, options)
                .map_err(TransportError::backend)?;
            session.solve().map_err(TransportError::backend)?
        };

        if let Some(err) = TransportError::from_status(solution.status, solution.iterations) {
            warn!(backend = backend.name(), status = ?solution.status, "solve failed");
            return Err(err);
        }
        if solution.status == Status::AlmostOptimal {
            warn!("solver reached reduced accuracy only");
        }

        let nf = self.instance.num_facilities();
        let nc = self.instance.num_customers();
        let raw = FlowMatrix::from_row_major(nf, nc, solution.primal).ok_or_else(|| {
            TransportError::Backend(format!(
                "solver returned a primal vector of the wrong length (expected {})",
                nf * nc
            ))
        })?;
        if raw.as_slice().iter().any(|v| !v.is_finite()) {
            return Err(TransportError::Numerical(
                "solver returned non-finite flows".into(),
            ));
        }

        let scale = self
            .instance
            .supply
            .iter()
            .chain(&self.instance.demand)
            .fold(1.0, |acc: Scalar, q| acc.max(q.abs()));
        let flow_tolerance = options.feasibility_tolerance * scale;
        let balance_residual = match &self.problem.equalities {
            Some(eq) => norm_inf(&eq.residual(raw.as_slice())?),
            None => 0.0,
        };
        let min_flow = raw
            .as_slice()
            .iter()
            .copied()
            .fold(Scalar::INFINITY, Scalar::min);
        debug!(balance_residual, min_flow, flow_tolerance, "checked flows");
        if balance_residual > flow_tolerance {
            warn!(balance_residual, flow_tolerance, "solution violates balance rows");
            return Err(TransportError::Numerical(format!(
                "balance rows violated by {balance_residual:e} (allowed {flow_tolerance:e})"
            )));
        }
        if min_flow < -flow_tolerance {
            warn!(min_flow, flow_tolerance, "solution has negative flows");
            return Err(TransportError::Numerical(format!(
                "negative flow {min_flow:e} (allowed {:e})",
                -flow_tolerance
            )));
        }
        let flows = raw.map(|v| flush_to_zero(v.max(0.0), flow_tolerance));

        Ok(TransportReport {
            distances: self.distances,
            flows,
            supply: self.instance.supply.clone(),
            demand: self.instance.demand.clone(),
            objective: solution.objective_value,
            status: solution.status,
            iterations: solution.iterations,
            balance_residual,
            flow_tolerance,
            stats: solution.stats,
        })
    }
}

/// Two non-zeros per column: the facility row and the customer row.
fn balance_matrix(nf: usize, nc: usize) -> CscMatrix<Scalar> {
    CscMatrix::from_columns(
        nf + nc,
        (0..nf)
            .cartesian_product(0..nc)
            .map(|(i, j)| [(i, 1.0), (nf + j, 1.0)]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use transflow_core::instance::Point;

    fn two_by_three() -> Instance {
        Instance::new(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            vec![
                Point::new(0.0, 1.0),
                Point::new(1.0, 1.0),
                Point::new(2.0, 1.0),
            ],
            vec![4.0, 2.0],
            vec![1.0, 2.0, 3.0],
        )
    }

    #[test]
    fn balance_matrix_layout() {
        let matrix = balance_matrix(2, 3);
        assert_eq!((matrix.nrows, matrix.ncols), (5, 6));
        assert_eq!(matrix.indptr, vec![0, 2, 4, 6, 8, 10, 12]);
        // variable 4 is flow[1][1]: facility row 1, customer row 2 + 1
        assert_eq!(&matrix.indices[8..10], &[1, 3]);
        assert!(matrix.validate().is_ok());
    }

    #[test]
    fn build_attaches_costs_rows_and_bounds() {
        let instance = two_by_three();
        let model = TransportModel::build(&instance, &SolveOptions::default()).unwrap();
        let problem = model.problem();
        assert_eq!(problem.nvars(), 6);
        assert_eq!(problem.nequalities(), 5);
        assert_eq!(problem.cost, model.distances().as_slice());
        let eq = problem.equalities.as_ref().unwrap();
        assert_eq!(eq.rhs, vec![4.0, 2.0, 1.0, 2.0, 3.0]);
        let bounds = problem.bounds.as_ref().unwrap();
        assert!(bounds.lower.iter().all(|&lo| lo == 0.0));
        assert!(bounds.upper.iter().all(|hi| hi.is_infinite()));
    }

    #[test]
    fn build_rejects_shape_errors_under_any_policy() {
        let mut instance = two_by_three();
        instance.demand.pop();
        for policy in [BalancePolicy::Validate, BalancePolicy::Defer] {
            let options = SolveOptions::default().balance_policy(policy);
            let err = TransportModel::build(&instance, &options).unwrap_err();
            assert_eq!(err.kind(), "input");
        }
    }

    #[test]
    fn build_rejects_non_finite_tolerance() {
        let instance = two_by_three();
        let options = SolveOptions {
            tolerance: f64::NAN,
            ..SolveOptions::default()
        };
        let err = TransportModel::build(&instance, &options).unwrap_err();
        assert_eq!(err.kind(), "input");
        assert!(err.to_string().contains("tolerance"));
    }

    #[test]
    fn deferred_balance_still_builds() {
        let mut instance = two_by_three();
        instance.supply[0] = 10.0;
        let strict = TransportModel::build(&instance, &SolveOptions::default());
        assert_eq!(strict.unwrap_err().kind(), "unbalanced");
        let options = SolveOptions::default().balance_policy(BalancePolicy::Defer);
        assert!(TransportModel::build(&instance, &options).is_ok());
    }
}
