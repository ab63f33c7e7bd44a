use crate::math::RealNumber;
use serde::{Deserialize, Serialize};
use sprs::CsMat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProblemError {
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("invalid structure: {0}")]
    InvalidStructure(String),
}

pub type ProblemResult<T> = Result<T, ProblemError>;

/// Compressed sparse column matrix in the layout conic solvers consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CscMatrix<T> {
    pub nrows: usize,
    pub ncols: usize,
    pub indptr: Vec<usize>,
    pub indices: Vec<usize>,
    pub data: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: RealNumber,
{
    /// Builds a matrix column by column from `(row, value)` entries.
    pub fn from_columns<I, C>(nrows: usize, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = (usize, T)>,
    {
        let mut indptr = vec![0];
        let mut indices = Vec::new();
        let mut data = Vec::new();
        for column in columns {
            for (row, value) in column {
                indices.push(row);
                data.push(value);
            }
            indptr.push(indices.len());
        }
        Self {
            nrows,
            ncols: indptr.len() - 1,
            indptr,
            indices,
            data,
        }
    }

    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    pub fn to_csmat(&self) -> ProblemResult<CsMat<T>> {
        self.validate()?;
        Ok(CsMat::new_csc(
            (self.nrows, self.ncols),
            self.indptr.clone(),
            self.indices.clone(),
            self.data.clone(),
        ))
    }

    pub fn validate(&self) -> ProblemResult<()> {
        if self.indptr.len() != self.ncols + 1 {
            return Err(ProblemError::DimensionMismatch(format!(
                "indptr length {} != ncols + 1 ({})",
                self.indptr.len(),
                self.ncols + 1
            )));
        }
        if self.indices.len() != self.data.len() {
            return Err(ProblemError::DimensionMismatch(format!(
                "indices length {} != data length {}",
                self.indices.len(),
                self.data.len()
            )));
        }
        if self.indptr.last().copied() != Some(self.data.len()) {
            return Err(ProblemError::InvalidStructure(format!(
                "indptr must end at nnz ({})",
                self.data.len()
            )));
        }
        for col in 0..self.ncols {
            let start = self.indptr[col];
            let end = self.indptr[col + 1];
            if start > end {
                return Err(ProblemError::InvalidStructure(format!(
                    "indptr decreases at column {col}"
                )));
            }
            let rows = &self.indices[start..end];
            if rows.iter().any(|&row| row >= self.nrows) {
                return Err(ProblemError::InvalidStructure(format!(
                    "row index out of range in column {col}"
                )));
            }
            if rows.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(ProblemError::InvalidStructure(format!(
                    "row indices not strictly increasing in column {col}"
                )));
            }
        }
        Ok(())
    }

    /// Computes `A x` into a freshly allocated vector.
    pub fn multiply(&self, x: &[T]) -> ProblemResult<Vec<T>> {
        if x.len() != self.ncols {
            return Err(ProblemError::DimensionMismatch(format!(
                "vector length {} != ncols {}",
                x.len(),
                self.ncols
            )));
        }
        let matrix = self.to_csmat()?;
        let mut out = vec![T::zero(); self.nrows];
        for (col, column) in matrix.outer_iterator().enumerate() {
            for (row, value) in column.iter() {
                out[row] += *value * x[col];
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub lower: Vec<T>,
    pub upper: Vec<T>,
}

impl<T> Bounds<T>
where
    T: RealNumber,
{
    pub fn non_negative(dim: usize) -> Self {
        Self {
            lower: vec![T::zero(); dim],
            upper: vec![T::infinity(); dim],
        }
    }

    pub fn validate(&self) -> ProblemResult<()> {
        if self.lower.len() != self.upper.len() {
            return Err(ProblemError::DimensionMismatch(format!(
                "lower len {} != upper len {}",
                self.lower.len(),
                self.upper.len()
            )));
        }
        for (i, (lo, hi)) in self.lower.iter().zip(self.upper.iter()).enumerate() {
            if lo > hi {
                return Err(ProblemError::InvalidStructure(format!(
                    "lower bound exceeds upper bound at index {i}"
                )));
            }
        }
        Ok(())
    }
}

/// Rows of `matrix * x = rhs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EqualityConstraints<T> {
    pub matrix: CscMatrix<T>,
    pub rhs: Vec<T>,
}

impl<T> EqualityConstraints<T>
where
    T: RealNumber,
{
    fn validate(&self, nvars: usize) -> ProblemResult<()> {
        self.matrix.validate()?;
        if self.matrix.ncols != nvars {
            return Err(ProblemError::DimensionMismatch(format!(
                "constraint matrix columns {} != nvars {}",
                self.matrix.ncols, nvars
            )));
        }
        if self.matrix.nrows != self.rhs.len() {
            return Err(ProblemError::DimensionMismatch(format!(
                "constraint rows {} != rhs len {}",
                self.matrix.nrows,
                self.rhs.len()
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    /// `matrix * x - rhs`, row by row.
    pub fn residual(&self, x: &[T]) -> ProblemResult<Vec<T>> {
        let mut lhs = self.matrix.multiply(x)?;
        for (value, rhs) in lhs.iter_mut().zip(self.rhs.iter()) {
            *value -= *rhs;
        }
        Ok(lhs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemLP<T> {
    pub cost: Vec<T>,
    pub equalities: Option<EqualityConstraints<T>>,
    pub bounds: Option<Bounds<T>>,
}

impl<T> ProblemLP<T>
where
    T: RealNumber,
{
    pub fn nvars(&self) -> usize {
        self.cost.len()
    }

    pub fn nequalities(&self) -> usize {
        self.equalities.as_ref().map_or(0, EqualityConstraints::len)
    }

    pub fn validate(&self) -> ProblemResult<()> {
        let n = self.nvars();
        if n == 0 {
            return Err(ProblemError::InvalidStructure(
                "problem has no variables".into(),
            ));
        }
        if self.cost.iter().any(|c| !c.is_finite()) {
            return Err(ProblemError::InvalidStructure(
                "objective vector contains non-finite entries".into(),
            ));
        }
        if let Some(bounds) = &self.bounds {
            if bounds.lower.len() != n {
                return Err(ProblemError::DimensionMismatch(format!(
                    "bounds size {} != nvars {n}",
                    bounds.lower.len()
                )));
            }
            bounds.validate()?;
        }
        if let Some(eq) = &self.equalities {
            eq.validate(n)?;
        }
        Ok(())
    }

    /// Cone blocks a conic backend needs for this problem, in stacking order.
    pub fn cones(&self) -> Vec<Cone> {
        let mut cones = Vec::new();
        let meq = self.nequalities();
        if meq > 0 {
            cones.push(Cone::Zero(meq));
        }
        if let Some(bounds) = &self.bounds {
            let lower = bounds.lower.iter().filter(|lo| lo.is_finite()).count();
            let upper = bounds.upper.iter().filter(|hi| hi.is_finite()).count();
            if lower + upper > 0 {
                cones.push(Cone::NonNegative(lower + upper));
            }
        }
        cones
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Cone {
    Zero(usize),
    NonNegative(usize),
}
