use crate::math::RealNumber;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum OptionsError {
    #[error("{name} must be finite and positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("max_iterations must be at least 1")]
    NoIterations,
}

/// How a supply/demand total mismatch is handled before solving.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BalancePolicy {
    /// Reject unbalanced instances before a model is built.
    #[default]
    Validate,
    /// Hand the instance to the solver and report its infeasibility verdict.
    Defer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveOptions<T: RealNumber> {
    pub tolerance: T,
    pub max_iterations: usize,
    pub max_time: Option<Duration>,
    pub verbose: bool,
    pub equilibrate: bool,
    pub balance_policy: BalancePolicy,
    pub balance_tolerance: T,
    /// Largest balance violation or negative flow a solution may carry,
    /// relative to the largest supply or demand (and at least 1).
    pub feasibility_tolerance: T,
}

impl<T> SolveOptions<T>
where
    T: RealNumber,
{
    pub fn balance_policy(mut self, policy: BalancePolicy) -> Self {
        self.balance_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        for (name, value) in [
            ("tolerance", self.tolerance),
            ("balance_tolerance", self.balance_tolerance),
            ("feasibility_tolerance", self.feasibility_tolerance),
        ] {
            if !(value.is_finite() && value > T::zero()) {
                return Err(OptionsError::NotPositive {
                    name,
                    value: value.to_f64().unwrap_or(f64::NAN),
                });
            }
        }
        if self.max_iterations == 0 {
            return Err(OptionsError::NoIterations);
        }
        Ok(())
    }
}

impl<T> Default for SolveOptions<T>
where
    T: RealNumber,
{
    fn default() -> Self {
        Self {
            tolerance: T::from(1e-8).unwrap(),
            max_iterations: 200,
            max_time: None,
            verbose: false,
            equilibrate: true,
            balance_policy: BalancePolicy::Validate,
            balance_tolerance: T::from(1e-9).unwrap(),
            feasibility_tolerance: T::from(1e-6).unwrap(),
        }
    }
}
