use crate::math::Scalar;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Scalar>,
}

#[derive(Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Scalar>,
}

impl TryFrom<RawMatrix> for DenseMatrix {
    type Error = String;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        let found = raw.data.len();
        DenseMatrix::from_row_major(raw.rows, raw.cols, raw.data).ok_or_else(|| {
            format!(
                "matrix data has {found} entries, expected {} x {}",
                raw.rows, raw.cols
            )
        })
    }
}

impl DenseMatrix {
    /// Wraps `data` laid out row by row. Returns `None` when the length does
    /// not equal `rows * cols`.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<Scalar>) -> Option<Self> {
        (rows.checked_mul(cols) == Some(data.len())).then_some(Self { rows, cols, data })
    }

    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> Scalar) -> Self {
        let data = (0..rows)
            .cartesian_product(0..cols)
            .map(|(i, j)| f(i, j))
            .collect();
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Scalar {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[Scalar] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[Scalar]> + '_ {
        // chunks(0) panics; a matrix without columns has no visible rows.
        self.data.chunks(self.cols.max(1))
    }

    pub fn as_slice(&self) -> &[Scalar] {
        &self.data
    }

    /// Applies `f` to every entry.
    pub fn map(&self, f: impl FnMut(Scalar) -> Scalar) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().copied().map(f).collect(),
        }
    }

    pub fn row_sums(&self) -> Vec<Scalar> {
        self.iter_rows().map(|row| row.iter().sum()).collect()
    }

    pub fn col_sums(&self) -> Vec<Scalar> {
        let mut sums = vec![0.0; self.cols];
        for row in self.iter_rows() {
            for (sum, value) in sums.iter_mut().zip(row) {
                *sum += *value;
            }
        }
        sums
    }

    pub fn transpose(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |i, j| self.get(j, i))
    }

    /// Sum of element-wise products with `other`.
    pub fn weighted_sum(&self, other: &DenseMatrix) -> Scalar {
        assert_eq!(
            (self.rows, self.cols),
            (other.rows, other.cols),
            "weighted sum shape mismatch"
        );
        crate::math::dot(&self.data, &other.data)
    }
}

#[cfg(test)]
mod tests {
    use super::DenseMatrix;

    #[test]
    fn deserialize_checks_shape() {
        let ok: DenseMatrix =
            serde_json::from_str(r#"{"rows":1,"cols":2,"data":[1.0,2.0]}"#).unwrap();
        assert_eq!(ok.get(0, 1), 2.0);
        let err = serde_json::from_str::<DenseMatrix>(r#"{"rows":2,"cols":2,"data":[1.0]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("expected 2 x 2"));
    }

    #[test]
    fn map_keeps_shape() {
        let m = DenseMatrix::from_row_major(1, 3, vec![-1e-9, 2.0, -3.0]).unwrap();
        let clamped = m.map(|v| v.max(0.0));
        assert_eq!(clamped.as_slice(), &[0.0, 2.0, 0.0]);
        assert_eq!((clamped.rows(), clamped.cols()), (1, 3));
    }

    #[test]
    fn sums_and_transpose() {
        let m = DenseMatrix::from_row_major(2, 3, vec![1., 2., 3., 4., 5., 6.]).unwrap();
        assert_eq!(m.row_sums(), vec![6., 15.]);
        assert_eq!(m.col_sums(), vec![5., 7., 9.]);
        let t = m.transpose();
        assert_eq!((t.rows(), t.cols()), (3, 2));
        assert_eq!(t.row(2), &[3., 6.]);
        assert_eq!(m.weighted_sum(&m), 91.0);
    }

    #[test]
    fn from_row_major_checks_length() {
        assert!(DenseMatrix::from_row_major(2, 2, vec![1.0; 3]).is_none());
    }
}
