//! Dense matrices and vectors addressed by semantic keys.
//!
//! Rows and columns are identified by keys (typically
//! [`NodalDegreeOfFreedom`](fem_model::NodalDegreeOfFreedom)) instead of raw
//! indices. Key order is fixed at construction and is the order of the
//! underlying nalgebra storage, so two matrices built from the same key list
//! line up index-for-index.

use crate::error::{FemError, Result};
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Anything usable as a row or column key
pub trait MatrixKey: Copy + Eq + Hash + Debug + Display {}

impl<T: Copy + Eq + Hash + Debug + Display> MatrixKey for T {}

/// Ordered key list with reverse lookup
#[derive(Debug, Clone)]
struct KeyIndex<K> {
    keys: Vec<K>,
    positions: HashMap<K, usize>,
}

impl<K: MatrixKey> KeyIndex<K> {
    fn new(keys: Vec<K>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            if positions.insert(*key, i).is_some() {
                return Err(FemError::InvalidArgument(format!("duplicate key {key}")));
            }
        }
        Ok(Self { keys, positions })
    }

    fn position(&self, key: &K) -> Result<usize> {
        self.positions
            .get(key)
            .copied()
            .ok_or_else(|| FemError::UnknownKey(key.to_string()))
    }

    fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }
}

/// Column vector keyed by `K`
#[derive(Debug, Clone)]
pub struct KeyedVector<K> {
    index: KeyIndex<K>,
    values: DVector<f64>,
}

impl<K: MatrixKey> KeyedVector<K> {
    /// Zero vector over `keys`
    pub fn new(keys: Vec<K>) -> Result<Self> {
        let len = keys.len();
        Ok(Self {
            index: KeyIndex::new(keys)?,
            values: DVector::zeros(len),
        })
    }

    pub fn from_values(keys: Vec<K>, values: Vec<f64>) -> Result<Self> {
        if keys.len() != values.len() {
            return Err(FemError::DimensionMismatch(format!(
                "{} keys but {} values",
                keys.len(),
                values.len()
            )));
        }
        Ok(Self {
            index: KeyIndex::new(keys)?,
            values: DVector::from_vec(values),
        })
    }

    pub fn get(&self, key: &K) -> Result<f64> {
        Ok(self.values[self.index.position(key)?])
    }

    pub fn set(&mut self, key: K, value: f64) -> Result<()> {
        let i = self.index.position(&key)?;
        self.values[i] = value;
        Ok(())
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains(key)
    }

    pub fn keys(&self) -> &[K] {
        &self.index.keys
    }

    pub fn len(&self) -> usize {
        self.index.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.keys.is_empty()
    }

    /// (key, value) pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (K, f64)> + '_ {
        self.index.keys.iter().copied().zip(self.values.iter().copied())
    }

    pub fn as_dvector(&self) -> &DVector<f64> {
        &self.values
    }
}

/// Dense matrix with rows keyed by `R` and columns keyed by `C`
#[derive(Debug, Clone)]
pub struct KeyedMatrix<R, C> {
    rows: KeyIndex<R>,
    columns: KeyIndex<C>,
    values: DMatrix<f64>,
}

impl<R: MatrixKey, C: MatrixKey> KeyedMatrix<R, C> {
    /// Zero matrix over the given row and column keys
    pub fn new(row_keys: Vec<R>, column_keys: Vec<C>) -> Result<Self> {
        let (nrows, ncols) = (row_keys.len(), column_keys.len());
        Ok(Self {
            rows: KeyIndex::new(row_keys)?,
            columns: KeyIndex::new(column_keys)?,
            values: DMatrix::zeros(nrows, ncols),
        })
    }

    pub fn get(&self, row: &R, column: &C) -> Result<f64> {
        let i = self.rows.position(row)?;
        let j = self.columns.position(column)?;
        Ok(self.values[(i, j)])
    }

    pub fn set(&mut self, row: R, column: C, value: f64) -> Result<()> {
        let i = self.rows.position(&row)?;
        let j = self.columns.position(&column)?;
        self.values[(i, j)] = value;
        Ok(())
    }

    /// Add `value` to the entry at (row, column)
    pub fn add(&mut self, row: R, column: C, value: f64) -> Result<()> {
        let i = self.rows.position(&row)?;
        let j = self.columns.position(&column)?;
        self.values[(i, j)] += value;
        Ok(())
    }

    pub fn contains_row(&self, row: &R) -> bool {
        self.rows.contains(row)
    }

    pub fn contains_column(&self, column: &C) -> bool {
        self.columns.contains(column)
    }

    pub fn row_keys(&self) -> &[R] {
        &self.rows.keys
    }

    pub fn column_keys(&self) -> &[C] {
        &self.columns.keys
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn as_dmatrix(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn transpose(&self) -> KeyedMatrix<C, R> {
        KeyedMatrix {
            rows: self.columns.clone(),
            columns: self.rows.clone(),
            values: self.values.transpose(),
        }
    }

    /// `self * other`; the column keys of `self` must equal the row keys of
    /// `other`, in the same order.
    pub fn multiply<X: MatrixKey>(&self, other: &KeyedMatrix<C, X>) -> Result<KeyedMatrix<R, X>> {
        if self.columns.keys != other.rows.keys {
            return Err(FemError::DimensionMismatch(format!(
                "cannot multiply {}x{} by {}x{}: inner keys differ",
                self.nrows(),
                self.ncols(),
                other.nrows(),
                other.ncols()
            )));
        }
        Ok(KeyedMatrix {
            rows: self.rows.clone(),
            columns: other.columns.clone(),
            values: &self.values * &other.values,
        })
    }

    pub fn multiply_vector(&self, vector: &KeyedVector<C>) -> Result<KeyedVector<R>> {
        if self.columns.keys != vector.index.keys {
            return Err(FemError::DimensionMismatch(format!(
                "cannot multiply {}x{} by vector of length {}: keys differ",
                self.nrows(),
                self.ncols(),
                vector.len()
            )));
        }
        Ok(KeyedVector {
            index: self.rows.clone(),
            values: &self.values * &vector.values,
        })
    }

    /// Copy of the entries at the given row and column keys, in that order
    pub fn submatrix(&self, row_keys: &[R], column_keys: &[C]) -> Result<KeyedMatrix<R, C>> {
        let mut sub = KeyedMatrix::new(row_keys.to_vec(), column_keys.to_vec())?;
        for (i, row) in row_keys.iter().enumerate() {
            let src_i = self.rows.position(row)?;
            for (j, column) in column_keys.iter().enumerate() {
                let src_j = self.columns.position(column)?;
                sub.values[(i, j)] = self.values[(src_i, src_j)];
            }
        }
        Ok(sub)
    }
}

impl<K: MatrixKey> KeyedMatrix<K, K> {
    /// Square zero matrix sharing one key list for rows and columns
    pub fn square(keys: Vec<K>) -> Result<Self> {
        Self::new(keys.clone(), keys)
    }

    fn has_matching_axes(&self) -> bool {
        self.rows.keys == self.columns.keys
    }

    /// Determinant of the underlying storage. Only meaningful when rows and
    /// columns share one key order.
    pub fn determinant(&self) -> Result<f64> {
        if !self.has_matching_axes() {
            return Err(FemError::DimensionMismatch(
                "determinant requires identical row and column keys".to_string(),
            ));
        }
        Ok(self.values.determinant())
    }

    /// `|det| / Π ‖row_i‖`, in `[0, 1]` by Hadamard's inequality.
    ///
    /// Zero for exactly singular matrices and for any matrix with a zero row.
    pub fn singularity_ratio(&self) -> Result<f64> {
        let det = self.determinant()?;
        if det == 0.0 {
            return Ok(0.0);
        }
        let mut log_bound = 0.0;
        for row in self.values.row_iter() {
            let norm = row.norm();
            if norm == 0.0 {
                return Ok(0.0);
            }
            log_bound += norm.ln();
        }
        Ok((det.abs().ln() - log_bound).exp())
    }

    /// Entry-wise symmetry within `tolerance` relative to the largest entry
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        if !self.has_matching_axes() {
            return false;
        }
        let scale = self.values.amax().max(f64::MIN_POSITIVE);
        let n = self.nrows();
        (0..n).all(|i| {
            (i + 1..n)
                .all(|j| (self.values[(i, j)] - self.values[(j, i)]).abs() <= tolerance * scale)
        })
    }
}
