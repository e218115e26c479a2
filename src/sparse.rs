use log::{trace, warn};
use rayon::prelude::*;

use crate::scalar::Scalar;

/// Compressed row storage matrix.
/// # Definition
/// Row $r$ owns the entries `row_ptr[r]..row_ptr[r + 1]` of `col` and
/// `values`, in strictly increasing column order. Rows are appended in order
/// with [CrsMatrix::push_row].
#[derive(Debug, Clone, PartialEq)]
pub struct CrsMatrix<S> {
    rows: usize,
    cols: usize,
    row_ptr: Vec<usize>,
    col: Vec<usize>,
    values: Vec<S>,
}

impl<S: Scalar> CrsMatrix<S> {
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut row_ptr = Vec::with_capacity(rows + 1);
        row_ptr.push(0);
        CrsMatrix { rows, cols, row_ptr, col: Vec::new(), values: Vec::new() }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn nonzeros(&self) -> usize {
        self.values.len()
    }

    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub fn col_indices(&self) -> &[usize] {
        &self.col
    }

    pub fn values(&self) -> &[S] {
        &self.values
    }

    /// Appends the next row. `entries` must be sorted by column without
    /// duplicates.
    /// # Returns
    /// Number of entries written.
    pub fn push_row(&mut self, entries: &[(usize, S)]) -> usize {
        debug_assert!(self.row_ptr.len() <= self.rows);
        debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
        for &(c, v) in entries.iter() {
            self.col.push(c);
            self.values.push(v);
        }
        self.row_ptr.push(self.col.len());
        entries.len()
    }

    /// Structural sanity: every row pushed, row pointers non decreasing and
    /// ending at the number of entries, columns in range and sorted.
    pub fn check_validity(&self) -> bool {
        if self.row_ptr.len() != self.rows + 1 || self.row_ptr[self.rows] != self.col.len() {
            return false;
        }
        for r in 0..self.rows {
            let (start, end) = (self.row_ptr[r], self.row_ptr[r + 1]);
            if start > end {
                return false;
            }
            let row = &self.col[start..end];
            if row.iter().any(|&c| c >= self.cols) || row.windows(2).any(|w| w[0] >= w[1]) {
                return false;
            }
        }
        true
    }

    /// Entry $(r, c)$, zero when not stored.
    pub fn element(&self, r: usize, c: usize) -> S {
        let (start, end) = (self.row_ptr[r], self.row_ptr[r + 1]);
        match self.col[start..end].binary_search(&c) {
            Ok(k) => self.values[start + k],
            Err(_) => S::zero(),
        }
    }

    /// Checks $A_{rc}=A^*_{cr}$ entry by entry.
    pub fn is_hermitian(&self, tol: f64) -> bool {
        if self.rows != self.cols {
            return false;
        }
        for r in 0..self.rows {
            for k in self.row_ptr[r]..self.row_ptr[r + 1] {
                let c = self.col[k];
                let diff = self.values[k] - self.element(c, r).conj();
                if diff.abs() > tol {
                    warn!(
                        "Not hermitian at ({}, {}): {} vs conj {}",
                        r,
                        c,
                        self.values[k],
                        self.element(c, r)
                    );
                    return false;
                }
            }
        }
        true
    }

    /// $x\leftarrow x+Ay$, rows in parallel.
    pub fn matrix_vector_product(&self, x: &mut [S], y: &[S]) {
        debug_assert_eq!(x.len(), self.rows);
        debug_assert_eq!(y.len(), self.cols);
        x.par_iter_mut().enumerate().for_each(|(r, xr)| {
            let mut sum = S::zero();
            for k in self.row_ptr[r]..self.row_ptr[r + 1] {
                sum += self.values[k] * y[self.col[k]];
            }
            *xr += sum;
        });
    }

    /// Dense copy, column major.
    pub fn to_dense(&self) -> Vec<S> {
        let mut out = vec![S::zero(); self.rows * self.cols];
        for r in 0..self.rows {
            for k in self.row_ptr[r]..self.row_ptr[r + 1] {
                out[r + self.col[k] * self.rows] = self.values[k];
            }
        }
        out
    }
}

/// Scratch accumulator of one matrix row.
/// # Usage
/// Terms are added in any order with [SparseRow::add], possibly several times
/// for the same column. Finalizing sums the duplicates, flushes the row
/// into a matrix or a scalar product, and leaves the accumulator empty for
/// the next row.
#[derive(Debug, Clone, Default)]
pub struct SparseRow<S> {
    entries: Vec<(usize, S)>,
}

impl<S: Scalar> SparseRow<S> {
    pub fn new() -> Self {
        SparseRow { entries: Vec::new() }
    }

    #[inline(always)]
    pub fn add(&mut self, col: usize, value: S) {
        self.entries.push((col, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // Stable sort keeps the summation order of equal columns reproducible.
    fn merge(&mut self) {
        self.entries.sort_by_key(|&(c, _)| c);
        let mut out = 0;
        for k in 0..self.entries.len() {
            if out > 0 && self.entries[out - 1].0 == self.entries[k].0 {
                let v = self.entries[k].1;
                self.entries[out - 1].1 += v;
            } else {
                self.entries[out] = self.entries[k];
                out += 1;
            }
        }
        self.entries.truncate(out);
    }

    /// Writes the merged row as the next row of `matrix`.
    /// # Returns
    /// Number of entries written.
    pub fn finalize(&mut self, matrix: &mut CrsMatrix<S>) -> usize {
        self.merge();
        let n = matrix.push_row(&self.entries);
        self.entries.clear();
        n
    }

    /// $\sum_c A_{rc}y_c$ over the merged row.
    pub fn finalize_dot(&mut self, y: &[S]) -> S {
        self.merge();
        let mut sum = S::zero();
        for &(c, v) in self.entries.iter() {
            sum += v * y[c];
        }
        self.entries.clear();
        sum
    }

    /// Merged entries, leaving the accumulator empty.
    pub fn take(&mut self) -> Vec<(usize, S)> {
        self.merge();
        trace!("Row flushed with {} entries.", self.entries.len());
        std::mem::take(&mut self.entries)
    }
}
