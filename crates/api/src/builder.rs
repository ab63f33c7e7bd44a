use transflow_core::math::RealNumber;
use transflow_core::problem::{
    Bounds, CscMatrix, EqualityConstraints, ProblemError, ProblemLP, ProblemResult,
};

#[derive(Debug, Clone)]
pub struct LpBuilder<T: RealNumber> {
    cost: Option<Vec<T>>,
    equality: Option<EqualityConstraints<T>>,
    bounds: Option<Bounds<T>>,
}

impl<T> Default for LpBuilder<T>
where
    T: RealNumber,
{
    fn default() -> Self {
        Self {
            cost: None,
            equality: None,
            bounds: None,
        }
    }
}

impl<T> LpBuilder<T>
where
    T: RealNumber,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn c(mut self, cost: Vec<T>) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn c_eq(mut self, matrix: CscMatrix<T>, rhs: Vec<T>) -> Self {
        self.equality = Some(EqualityConstraints { matrix, rhs });
        self
    }

    pub fn bounds(mut self, bounds: Bounds<T>) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn build(self) -> ProblemResult<ProblemLP<T>> {
        let cost = self
            .cost
            .ok_or_else(|| ProblemError::InvalidStructure("objective vector missing".into()))?;
        let problem = ProblemLP {
            cost,
            equalities: self.equality,
            bounds: self.bounds,
        };
        problem.validate()?;
        Ok(problem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cost_is_rejected() {
        let result = LpBuilder::<f64>::new().bounds(Bounds::non_negative(2)).build();
        assert!(matches!(result, Err(ProblemError::InvalidStructure(_))));
    }

    #[test]
    fn mismatched_rhs_is_rejected() {
        let matrix = CscMatrix::from_columns(2, vec![vec![(0, 1.0)], vec![(1, 1.0)]]);
        let result = LpBuilder::new()
            .c(vec![1.0, 1.0])
            .c_eq(matrix, vec![1.0])
            .build();
        assert!(matches!(result, Err(ProblemError::DimensionMismatch(_))));
    }
}
