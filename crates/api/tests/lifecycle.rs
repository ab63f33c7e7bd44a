use anyhow::{bail, Result};
use std::cell::Cell;
use std::rc::Rc;
use transflow_api::{Status, TransportError, TransportSolver};
use transflow_core::instance::{Instance, Point};
use transflow_core::math::Scalar;
use transflow_core::options::SolveOptions;
use transflow_core::problem::ProblemLP;
use transflow_core::solution::Solution;
use transflow_core::traits::{BackendSession, SolverBackend};

#[derive(Clone, Copy)]
enum Outcome {
    Status(Status),
    /// Reports `Optimal` with exactly these flows.
    Flows(&'static [f64]),
    BackendError,
}

/// Returns a canned outcome and counts how often sessions are released.
struct ScriptedBackend {
    outcome: Outcome,
    loads: Rc<Cell<usize>>,
    disposals: Rc<Cell<usize>>,
}

struct ScriptedSession {
    outcome: Outcome,
    nvars: usize,
    disposals: Rc<Cell<usize>>,
}

impl SolverBackend<Scalar> for ScriptedBackend {
    type Session = ScriptedSession;

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn load(
        &self,
        problem: &ProblemLP<Scalar>,
        _options: &SolveOptions<Scalar>,
    ) -> Result<ScriptedSession> {
        self.loads.set(self.loads.get() + 1);
        Ok(ScriptedSession {
            outcome: self.outcome,
            nvars: problem.nvars(),
            disposals: Rc::clone(&self.disposals),
        })
    }
}

impl BackendSession<Scalar> for ScriptedSession {
    fn solve(&mut self) -> Result<Solution<Scalar>> {
        match self.outcome {
            Outcome::Status(status) => {
                let mut solution = Solution::with_capacity(self.nvars, 0);
                solution.primal = vec![5.0; self.nvars];
                solution.objective_value = 25.0;
                solution.status = status;
                Ok(solution)
            }
            Outcome::Flows(flows) => {
                let mut solution = Solution::with_capacity(self.nvars, 0);
                solution.primal = flows.to_vec();
                solution.status = Status::Optimal;
                Ok(solution)
            }
            Outcome::BackendError => bail!("scripted backend failure"),
        }
    }
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        self.disposals.set(self.disposals.get() + 1);
    }
}

fn single_pair() -> Instance {
    Instance::new(
        vec![Point::new(0.0, 0.0)],
        vec![Point::new(3.0, 4.0)],
        vec![5.0],
        vec![5.0],
    )
}

fn two_by_two() -> Instance {
    Instance::new(
        vec![Point::new(0.0, 0.0), Point::new(0.0, 1.0)],
        vec![Point::new(1.0, 0.0), Point::new(1.0, 1.0)],
        vec![1.0, 1.0],
        vec![1.0, 1.0],
    )
}

fn run(outcome: Outcome) -> (Result<f64, TransportError>, usize, usize) {
    run_on(&single_pair(), outcome)
}

fn run_on(instance: &Instance, outcome: Outcome) -> (Result<f64, TransportError>, usize, usize) {
    let loads = Rc::new(Cell::new(0));
    let disposals = Rc::new(Cell::new(0));
    let solver = TransportSolver::with_backend(ScriptedBackend {
        outcome,
        loads: Rc::clone(&loads),
        disposals: Rc::clone(&disposals),
    });
    let result = solver.solve(instance).map(|report| report.objective);
    (result, loads.get(), disposals.get())
}

#[test]
fn session_released_once_after_success() {
    let (result, loads, disposals) = run(Outcome::Status(Status::Optimal));
    assert_eq!(result.unwrap(), 25.0);
    assert_eq!((loads, disposals), (1, 1));
}

#[test]
fn session_released_once_after_failure_status() {
    for status in [
        Status::PrimalInfeasible,
        Status::DualInfeasible,
        Status::MaxIterations,
        Status::MaxTime,
        Status::NumericalFailure,
    ] {
        let (result, loads, disposals) = run(Outcome::Status(status));
        assert!(result.is_err(), "{status:?} must not yield a report");
        assert_eq!((loads, disposals), (1, 1));
    }
}

#[test]
fn session_released_once_after_backend_error() {
    let (result, loads, disposals) = run(Outcome::BackendError);
    let err = result.unwrap_err();
    assert_eq!(err.kind(), "backend");
    assert!(err.to_string().contains("scripted backend failure"));
    assert_eq!((loads, disposals), (1, 1));
}

#[test]
fn invalid_instance_never_loads_a_session() {
    let loads = Rc::new(Cell::new(0));
    let disposals = Rc::new(Cell::new(0));
    let solver = TransportSolver::with_backend(ScriptedBackend {
        outcome: Outcome::Status(Status::Optimal),
        loads: Rc::clone(&loads),
        disposals: Rc::clone(&disposals),
    });
    let mut instance = single_pair();
    instance.demand[0] = 3.0;
    assert!(solver.solve(&instance).is_err());
    assert_eq!((loads.get(), disposals.get()), (0, 0));
}

#[test]
fn optimal_status_with_negative_flows_is_rejected() {
    // rows and columns all sum to 1, but two entries are negative
    let (result, loads, disposals) =
        run_on(&two_by_two(), Outcome::Flows(&[1.5, -0.5, -0.5, 1.5]));
    let err = result.unwrap_err();
    assert_eq!(err.kind(), "numerical");
    assert!(err.to_string().contains("negative flow"));
    assert_eq!((loads, disposals), (1, 1));
}

#[test]
fn optimal_status_with_broken_balance_rows_is_rejected() {
    let (result, _, disposals) = run(Outcome::Flows(&[4.0]));
    let err = result.unwrap_err();
    assert_eq!(err.kind(), "numerical");
    assert!(err.to_string().contains("balance rows violated"));
    assert_eq!(disposals, 1);
}

#[test]
fn non_finite_flows_are_rejected() {
    let (result, _, _) = run(Outcome::Flows(&[f64::NAN]));
    assert_eq!(result.unwrap_err().kind(), "numerical");
}

#[test]
fn noise_within_tolerance_is_cleaned() {
    let solver = TransportSolver::with_backend(ScriptedBackend {
        outcome: Outcome::Flows(&[1.0 - 2e-8, -4e-9, 3e-8, 1.0]),
        loads: Rc::new(Cell::new(0)),
        disposals: Rc::new(Cell::new(0)),
    });
    let report = solver.solve(&two_by_two()).unwrap();
    assert_eq!(report.flows.get(0, 1), 0.0);
    assert_eq!(report.flows.get(1, 0), 0.0);
    assert!(report.flows.as_slice().iter().all(|&f| f >= 0.0));
    assert_eq!(report.routes().len(), 2);
}

#[test]
fn invalid_options_never_load_a_session() {
    let loads = Rc::new(Cell::new(0));
    let solver = TransportSolver::with_backend(ScriptedBackend {
        outcome: Outcome::Status(Status::Optimal),
        loads: Rc::clone(&loads),
        disposals: Rc::new(Cell::new(0)),
    })
    .options(SolveOptions {
        tolerance: f64::INFINITY,
        ..SolveOptions::default()
    });
    let err = solver.solve(&single_pair()).unwrap_err();
    assert_eq!(err.kind(), "input");
    assert_eq!(loads.get(), 0);
}
