//! Clarabel conic backend.
//!
//! Clarabel solves `min ½xᵀPx + qᵀx  s.t.  Ax + s = b, s ∈ K`. An LP maps to
//! it with `P = 0`, `q = cost`, and `A`/`b`/`K` stacked as:
//!
//! | rows            | A   | b     | cone         |
//! |-----------------|-----|-------|--------------|
//! | equalities      | C   | rhs   | zero         |
//! | finite lower    | -eₖ | -lₖ   | non-negative |
//! | finite upper    | eₖ  | uₖ    | non-negative |

use anyhow::{anyhow, Result};
use ::clarabel::algebra::CscMatrix as ClarabelMatrix;
use ::clarabel::solver::*;
use std::time::Duration;
use tracing::{debug, info};
use transflow_core::math::{Scalar, Timer};
use transflow_core::options::SolveOptions;
use transflow_core::problem::{Cone, ProblemLP};
use transflow_core::solution::{Solution, Status};
use transflow_core::stats::SolveStats;
use transflow_core::traits::{BackendSession, SolverBackend};

#[derive(Debug, Clone, Copy, Default)]
pub struct ClarabelBackend;

impl ClarabelBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SolverBackend<Scalar> for ClarabelBackend {
    type Session = ClarabelSession;

    fn name(&self) -> &'static str {
        "clarabel"
    }

    fn load(
        &self,
        problem: &ProblemLP<Scalar>,
        options: &SolveOptions<Scalar>,
    ) -> Result<ClarabelSession> {
        problem.validate()?;
        let timer = Timer::start();
        let data = ConicData::from_lp(problem);
        let settings = settings(options)?;
        let n = problem.nvars();
        let p = ClarabelMatrix::new(n, n, vec![0; n + 1], Vec::new(), Vec::new());
        let a = ClarabelMatrix::new(
            data.rows,
            n,
            data.colptr,
            data.rowval,
            data.nzval,
        );
        let cones: Vec<SupportedConeT<Scalar>> = data
            .cones
            .iter()
            .map(|cone| match *cone {
                Cone::Zero(dim) => ZeroConeT(dim),
                Cone::NonNegative(dim) => NonnegativeConeT(dim),
            })
            .collect();
        let solver = DefaultSolver::new(&p, &problem.cost, &a, &data.rhs, &cones, settings);

        let stats = SolveStats {
            setup_time: timer.elapsed(),
            variables: n,
            constraints: data.rows,
            nonzeros: data.nnz,
            ..SolveStats::new()
        };
        debug!(
            variables = n,
            rows = data.rows,
            nonzeros = data.nnz,
            cones = ?data.cones,
            "loaded LP into clarabel"
        );
        Ok(ClarabelSession {
            solver,
            equalities: problem.nequalities(),
            stats,
            solved: false,
        })
    }
}

/// A problem loaded into a Clarabel solver instance. Dropping the session
/// releases the solver workspace.
pub struct ClarabelSession {
    solver: DefaultSolver<Scalar>,
    equalities: usize,
    stats: SolveStats,
    solved: bool,
}

impl BackendSession<Scalar> for ClarabelSession {
    fn solve(&mut self) -> Result<Solution<Scalar>> {
        let timer = Timer::start();
        self.solver.solve();
        self.solved = true;

        let result = &self.solver.solution;
        let status = map_status(&result.status);
        let mut stats = self.stats.clone();
        stats.solve_time = timer.elapsed();
        info!(
            status = ?status,
            clarabel_status = ?result.status,
            iterations = result.iterations,
            objective = result.obj_val,
            elapsed_ms = stats.solve_time.as_secs_f64() * 1e3,
            "clarabel solve finished"
        );
        Ok(Solution {
            primal: result.x.clone(),
            equality_dual: result.z.iter().take(self.equalities).copied().collect(),
            status,
            objective_value: result.obj_val,
            iterations: result.iterations as usize,
            stats,
        })
    }
}

impl Drop for ClarabelSession {
    fn drop(&mut self) {
        debug!(solved = self.solved, "released clarabel session");
    }
}

fn map_status(status: &SolverStatus) -> Status {
    match status {
        SolverStatus::Solved => Status::Optimal,
        SolverStatus::AlmostSolved => Status::AlmostOptimal,
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
            Status::PrimalInfeasible
        }
        SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
            Status::DualInfeasible
        }
        SolverStatus::MaxIterations => Status::MaxIterations,
        SolverStatus::MaxTime => Status::MaxTime,
        _ => Status::NumericalFailure,
    }
}

fn settings(options: &SolveOptions<Scalar>) -> Result<DefaultSettings<Scalar>> {
    let time_limit = options
        .max_time
        .map_or(Scalar::INFINITY, |limit: Duration| limit.as_secs_f64());
    DefaultSettingsBuilder::default()
        .verbose(options.verbose)
        .max_iter(u32::try_from(options.max_iterations).unwrap_or(u32::MAX))
        .time_limit(time_limit)
        .tol_gap_abs(options.tolerance)
        .tol_gap_rel(options.tolerance)
        .tol_feas(options.tolerance)
        .equilibrate_enable(options.equilibrate)
        .build()
        .map_err(|err| anyhow!("invalid clarabel settings: {err}"))
}

/// Constraint data in Clarabel's stacked layout.
struct ConicData {
    rows: usize,
    nnz: usize,
    colptr: Vec<usize>,
    rowval: Vec<usize>,
    nzval: Vec<Scalar>,
    rhs: Vec<Scalar>,
    cones: Vec<Cone>,
}

impl ConicData {
    fn from_lp(problem: &ProblemLP<Scalar>) -> Self {
        let n = problem.nvars();
        let meq = problem.nequalities();
        let mut rhs: Vec<Scalar> = problem
            .equalities
            .as_ref()
            .map(|eq| eq.rhs.clone())
            .unwrap_or_default();

        // Bound row offsets (relative to the start of the bound block) per column.
        let mut lower_rows = vec![None; n];
        let mut upper_rows = vec![None; n];
        if let Some(bounds) = &problem.bounds {
            let mut next = 0;
            for (col, lo) in bounds.lower.iter().enumerate() {
                if lo.is_finite() {
                    lower_rows[col] = Some(next);
                    rhs.push(-*lo);
                    next += 1;
                }
            }
            for (col, hi) in bounds.upper.iter().enumerate() {
                if hi.is_finite() {
                    upper_rows[col] = Some(next);
                    rhs.push(*hi);
                    next += 1;
                }
            }
        }

        let mut colptr = Vec::with_capacity(n + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();
        colptr.push(0);
        for col in 0..n {
            if let Some(eq) = &problem.equalities {
                let start = eq.matrix.indptr[col];
                let end = eq.matrix.indptr[col + 1];
                rowval.extend_from_slice(&eq.matrix.indices[start..end]);
                nzval.extend_from_slice(&eq.matrix.data[start..end]);
            }
            if let Some(offset) = lower_rows[col] {
                rowval.push(meq + offset);
                nzval.push(-1.0);
            }
            if let Some(offset) = upper_rows[col] {
                rowval.push(meq + offset);
                nzval.push(1.0);
            }
            colptr.push(rowval.len());
        }

        Self {
            rows: rhs.len(),
            nnz: nzval.len(),
            colptr,
            rowval,
            nzval,
            rhs,
            cones: problem.cones(),
        }
    }
}
