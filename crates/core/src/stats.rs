use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolveStats {
    pub setup_time: Duration,
    pub solve_time: Duration,
    pub variables: usize,
    pub constraints: usize,
    pub nonzeros: usize,
}

impl SolveStats {
    pub fn new() -> Self {
        Self::default()
    }
}
