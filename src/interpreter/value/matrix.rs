use crate::{error::RuntimeError, interpreter::evaluator::core::EvalResult};

/// Pivot magnitudes below this are treated as zero during inversion.
const PIVOT_EPSILON: f64 = 1e-10;

/// A dense 2-D matrix of `f64` in row-major storage.
///
/// Matrices are always rectangular; `data.len() == rows * cols` holds for
/// every constructed value. A `1×N` matrix doubles as a row vector and an
/// `N×1` matrix as a column vector. The empty matrix is `0×0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Builds a matrix from row-major data.
    ///
    /// Returns `None` when the element count does not match the dimensions.
    #[must_use]
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        if rows * cols != data.len() {
            return None;
        }
        Some(Self { rows, cols, data })
    }

    /// The 0×0 matrix.
    #[must_use]
    pub const fn empty() -> Self {
        Self { rows: 0,
               cols: 0,
               data: Vec::new() }
    }

    /// A matrix with every element set to `value`.
    #[must_use]
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self { rows,
               cols,
               data: vec![value; rows * cols] }
    }

    /// The identity matrix of size `n`.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        let mut result = Self::filled(n, n, 0.0);
        for i in 0..n {
            result.data[i * n + i] = 1.0;
        }
        result
    }

    /// A single-column matrix from a vector of values.
    #[must_use]
    pub fn from_column(values: Vec<f64>) -> Self {
        let rows = values.len();
        Self { rows,
               cols: if rows == 0 { 0 } else { 1 },
               data: values }
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `true` for the 0×0 matrix.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// The element at `(row, col)`; both 0-based.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Row `index` as a new `1×cols` matrix.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Self> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.cols;
        Some(Self { rows: 1,
                    cols: self.cols,
                    data: self.data[start..start + self.cols].to_vec() })
    }

    /// Element-wise sum; dimensions must match exactly.
    pub fn add(&self, other: &Self, line: usize) -> EvalResult<Self> {
        self.zip_with(other, line, "addition", |a, b| a + b)
    }

    /// Element-wise difference; dimensions must match exactly.
    pub fn sub(&self, other: &Self, line: usize) -> EvalResult<Self> {
        self.zip_with(other, line, "subtraction", |a, b| a - b)
    }

    /// Scales every element by `factor`.
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        Self { rows: self.rows,
               cols: self.cols,
               data: self.data.iter().map(|v| v * factor).collect() }
    }

    /// Negates every element.
    #[must_use]
    pub fn negate(&self) -> Self {
        self.scale(-1.0)
    }

    /// Classic triple-loop matrix product.
    ///
    /// The left column count must equal the right row count.
    pub fn matmul(&self, other: &Self, line: usize) -> EvalResult<Self> {
        if self.is_empty() || other.is_empty() || self.cols != other.rows {
            return Err(RuntimeError::DimensionMismatch { details: format!("Invalid matrix dimensions for multiplication: {}x{} mult {}x{}",
                                                                          self.rows,
                                                                          self.cols,
                                                                          other.rows,
                                                                          other.cols),
                                                         line });
        }

        let mut result = Self::filled(self.rows, other.cols, 0.0);
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.get(i, k) * other.get(k, j);
                }
                result.data[i * other.cols + j] = sum;
            }
        }
        Ok(result)
    }

    /// Swaps rows and columns; the empty matrix transposes to itself.
    #[must_use]
    pub fn transpose(&self) -> Self {
        if self.is_empty() {
            return Self::empty();
        }

        let mut result = Self::filled(self.cols, self.rows, 0.0);
        for i in 0..self.rows {
            for j in 0..self.cols {
                result.data[j * self.rows + i] = self.get(i, j);
            }
        }
        result
    }

    /// Determinant by cofactor expansion along row 0.
    ///
    /// Sizes 1 and 2 are computed directly. The expansion is factorial in
    /// the matrix size, which is acceptable for the sizes the language works
    /// with.
    pub fn determinant(&self, line: usize) -> EvalResult<f64> {
        if self.is_empty() || self.rows != self.cols {
            return Err(RuntimeError::DimensionMismatch { details:
                                                             "Determinant requires a square matrix"
                                                                                                   .to_string(),
                                                         line });
        }

        Ok(self.determinant_unchecked())
    }

    fn determinant_unchecked(&self) -> f64 {
        let n = self.rows;
        if n == 1 {
            return self.data[0];
        }
        if n == 2 {
            return self.data[0] * self.data[3] - self.data[1] * self.data[2];
        }

        let mut det = 0.0;
        for j in 0..n {
            let minor = self.minor(0, j);
            let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
            det += sign * self.get(0, j) * minor.determinant_unchecked();
        }
        det
    }

    /// The matrix with `row` and `col` removed.
    fn minor(&self, row: usize, col: usize) -> Self {
        let n = self.rows;
        let mut data = Vec::with_capacity((n - 1) * (n - 1));
        for i in 0..n {
            if i == row {
                continue;
            }
            for j in 0..n {
                if j == col {
                    continue;
                }
                data.push(self.get(i, j));
            }
        }
        Self { rows: n - 1,
               cols: n - 1,
               data }
    }

    /// Inverse by Gauss–Jordan elimination with partial pivoting.
    ///
    /// The matrix is augmented with the identity, reduced, and the right
    /// half extracted. A pivot below `1e-10` in magnitude means the matrix
    /// is singular.
    pub fn inverse(&self, line: usize) -> EvalResult<Self> {
        if self.is_empty() || self.rows != self.cols {
            return Err(RuntimeError::DimensionMismatch { details:
                                                             "Inverse requires a square matrix"
                                                                                                .to_string(),
                                                         line });
        }

        let n = self.rows;
        let width = 2 * n;

        // Augmented [A | I].
        let mut aug = vec![0.0; n * width];
        for i in 0..n {
            for j in 0..n {
                aug[i * width + j] = self.get(i, j);
            }
            aug[i * width + n + i] = 1.0;
        }

        for i in 0..n {
            // Largest pivot in the column, for numerical stability.
            let mut pivot_row = i;
            for k in i + 1..n {
                if aug[k * width + i].abs() > aug[pivot_row * width + i].abs() {
                    pivot_row = k;
                }
            }

            if aug[pivot_row * width + i].abs() < PIVOT_EPSILON {
                return Err(RuntimeError::SingularMatrix { line });
            }

            if pivot_row != i {
                for j in 0..width {
                    aug.swap(i * width + j, pivot_row * width + j);
                }
            }

            let pivot = aug[i * width + i];
            for j in 0..width {
                aug[i * width + j] /= pivot;
            }

            for k in 0..n {
                if k == i {
                    continue;
                }
                let factor = aug[k * width + i];
                for j in 0..width {
                    aug[k * width + j] -= factor * aug[i * width + j];
                }
            }
        }

        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                data.push(aug[i * width + n + j]);
            }
        }
        Ok(Self { rows: n,
                  cols: n,
                  data })
    }

    fn zip_with(&self,
                other: &Self,
                line: usize,
                operation: &str,
                f: impl Fn(f64, f64) -> f64)
                -> EvalResult<Self> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(RuntimeError::DimensionMismatch { details: format!("Matrix dimensions don't match for {operation}: {}x{} and {}x{}",
                                                                          self.rows,
                                                                          self.cols,
                                                                          other.rows,
                                                                          other.cols),
                                                         line });
        }

        Ok(Self { rows: self.rows,
                  cols: self.cols,
                  data: self.data
                            .iter()
                            .zip(&other.data)
                            .map(|(&a, &b)| f(a, b))
                            .collect() })
    }
}

impl std::fmt::Display for Matrix {
    /// Formats as `[a,b;c,d]`: commas between columns, semicolons between
    /// rows, matching the literal syntax.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for i in 0..self.rows {
            if i > 0 {
                write!(f, ";")?;
            }
            for j in 0..self.cols {
                if j > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", self.get(i, j))?;
            }
        }
        write!(f, "]")
    }
}
