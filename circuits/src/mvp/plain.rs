//! Plaintext matrices, vectors and the reference diagonal matrix-vector
//! products the encrypted engine is checked against.

use itertools::izip;
use sampling::source::Source;
use utils::isqrt;

use crate::{error::CircuitError, mvp::BsgsPlan};

/// Row-major real matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    pub fn identity(dim: usize) -> Self {
        let mut m: Matrix = Self::zeros(dim, dim);
        (0..dim).for_each(|i| m.set(i, i, 1.0));
        m
    }

    /// Matrix with entries uniform in [-0.5, 0.5).
    pub fn random(rows: usize, cols: usize, source: &mut Source) -> Self {
        let mut m: Matrix = Self::zeros(rows, cols);
        source.fill_f64(&mut m.data, -0.5, 0.5);
        m
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, CircuitError> {
        let cols: usize = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err(CircuitError::EmptyOperand);
        }
        let mut data: Vec<f64> = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(CircuitError::ShapeMismatch {
                    what: "row length",
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Textbook product `self * v`.
    pub fn mvp(&self, v: &[f64]) -> Result<Vec<f64>, CircuitError> {
        check_len("vector length", self.cols, v.len())?;
        Ok((0..self.rows)
            .map(|i| izip!(self.row(i), v).map(|(a, b)| a * b).sum::<f64>())
            .collect())
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix, CircuitError> {
        check_len("row count", self.rows, other.rows)?;
        check_len("column count", self.cols, other.cols)?;
        Ok(Matrix {
            data: add_vectors(&self.data, &other.data)?,
            rows: self.rows,
            cols: self.cols,
        })
    }

    fn check_squat(&self) -> Result<(), CircuitError> {
        if self.rows > self.cols {
            return Err(CircuitError::NonSquat {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Generalized diagonal `d` of a squat matrix: `diag[i] = M[i mod m][(i + d) mod n]`
    /// for `i` in `0..n`.
    pub fn diag(&self, d: usize) -> Result<Vec<f64>, CircuitError> {
        self.check_squat()?;
        if d >= self.cols {
            return Err(CircuitError::ShapeMismatch {
                what: "diagonal index bound",
                expected: self.cols,
                found: d,
            });
        }
        Ok((0..self.cols)
            .map(|i| self.at(i % self.rows, (i + d) % self.cols))
            .collect())
    }

    /// The `rows` generalized diagonals, starting with the main diagonal.
    pub fn diagonals(&self) -> Result<Vec<Vec<f64>>, CircuitError> {
        self.check_squat()?;
        (0..self.rows).map(|d| self.diag(d)).collect()
    }
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), CircuitError> {
    if expected != found {
        return Err(CircuitError::ShapeMismatch { what, expected, found });
    }
    Ok(())
}

/// Vector with entries uniform in [-0.5, 0.5).
pub fn random_vector(len: usize, source: &mut Source) -> Vec<f64> {
    let mut v: Vec<f64> = vec![0.0; len];
    source.fill_f64(&mut v, -0.5, 0.5);
    v
}

pub fn add_vectors(a: &[f64], b: &[f64]) -> Result<Vec<f64>, CircuitError> {
    check_len("vector length", a.len(), b.len())?;
    Ok(izip!(a, b).map(|(x, y)| x + y).collect())
}

pub fn mul_vectors(a: &[f64], b: &[f64]) -> Result<Vec<f64>, CircuitError> {
    check_len("vector length", a.len(), b.len())?;
    Ok(izip!(a, b).map(|(x, y)| x * y).collect())
}

/// `v || v`.
pub fn duplicate(v: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(v.len() << 1);
    out.extend_from_slice(v);
    out.extend_from_slice(v);
    out
}

/// Cyclic left rotation by `steps` (right for negative steps).
pub fn rotate<T: Clone>(v: &[T], steps: i64) -> Vec<T> {
    let mut out: Vec<T> = v.to_vec();
    if !v.is_empty() {
        out.rotate_left(steps.rem_euclid(v.len() as i64) as usize);
    }
    out
}

/// True if every `r[i]` is within `tolerance` of `expected[i]`, relative to
/// `max(|expected[i]|, 1)`.
pub fn approx_equal(r: &[f64], expected: &[f64], tolerance: f64) -> Result<bool, CircuitError> {
    check_len("vector length", expected.len(), r.len())?;
    Ok(izip!(r, expected).all(|(a, b)| (a - b).abs() <= tolerance * b.abs().max(1.0)))
}

/// Largest `n1` with `1 < n1 <= sqrt(n)` dividing `n`.
pub fn find_factor(n: usize) -> Result<usize, CircuitError> {
    (2..=isqrt(n))
        .rev()
        .find(|d| n % d == 0)
        .ok_or(CircuitError::Unfactorizable(n))
}

/// Checks `diagonals` describe a `m x n` squat matrix, with `m = diagonals.len()`
/// and `n` the vector length.
pub(crate) fn check_diagonals(diagonals: &[Vec<f64>], n: usize) -> Result<(), CircuitError> {
    if diagonals.is_empty() || n == 0 {
        return Err(CircuitError::EmptyOperand);
    }
    if diagonals.len() > n {
        return Err(CircuitError::NonSquat {
            rows: diagonals.len(),
            cols: n,
        });
    }
    diagonals
        .iter()
        .try_for_each(|d| check_len("diagonal length", n, d.len()))
}

pub(crate) fn check_square(diagonals: &[Vec<f64>], n: usize) -> Result<(), CircuitError> {
    check_diagonals(diagonals, n)?;
    check_len("diagonal count", n, diagonals.len())
}

/// `M * v` for square `M` given by its diagonals: `sum_d diag_d * rot(v, d)`.
pub fn mvp_from_diagonals(diagonals: &[Vec<f64>], v: &[f64]) -> Result<Vec<f64>, CircuitError> {
    let n: usize = v.len();
    check_square(diagonals, n)?;
    let mut acc: Vec<f64> = vec![0.0; n];
    diagonals.iter().enumerate().for_each(|(d, diag)| {
        let rv: Vec<f64> = rotate(v, d as i64);
        izip!(acc.iter_mut(), diag, &rv).for_each(|(a, w, x)| *a += w * x);
    });
    Ok(acc)
}

/// Baby-step giant-step accumulation shared by the square and general variants.
/// Returns the length-n vector before any block fold.
fn bsgs_accumulate(plan: &BsgsPlan, diagonals: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    let n: usize = plan.n;
    let baby: Vec<Vec<f64>> = (0..plan.n1).map(|i| rotate(v, i as i64)).collect();
    let mut acc: Vec<f64> = vec![0.0; n];
    for j in 0..plan.n2 {
        let giant: i64 = (j * plan.n1) as i64;
        let mut inner: Vec<f64> = vec![0.0; n];
        for (i, rv) in baby.iter().enumerate() {
            let w: Vec<f64> = rotate(&diagonals[j * plan.n1 + i], -giant);
            izip!(inner.iter_mut(), &w, rv).for_each(|(a, w, x)| *a += w * x);
        }
        izip!(acc.iter_mut(), rotate(&inner, giant)).for_each(|(a, x)| *a += x);
    }
    acc
}

/// Same result as [mvp_from_diagonals] with `n1 - 1 + n2 - 1` rotations of
/// `v` instead of `n - 1`, where `n = n1 * n2` is given by [find_factor].
pub fn mvp_from_diagonals_bsgs(diagonals: &[Vec<f64>], v: &[f64]) -> Result<Vec<f64>, CircuitError> {
    let n: usize = v.len();
    check_square(diagonals, n)?;
    let plan: BsgsPlan = BsgsPlan::square(n)?;
    Ok(bsgs_accumulate(&plan, diagonals, v))
}

/// `M * v` for a squat `m x n` matrix given by its `m` generalized diagonals.
/// Returns the length-m product. Requires `m` to divide `n`.
pub fn general_mvp_from_diagonals(diagonals: &[Vec<f64>], v: &[f64]) -> Result<Vec<f64>, CircuitError> {
    let n: usize = v.len();
    check_diagonals(diagonals, n)?;
    let plan: BsgsPlan = BsgsPlan::general(diagonals.len(), n)?;
    let t: Vec<f64> = bsgs_accumulate(&plan, diagonals, v);

    let mut folded: Vec<f64> = if plan.halving_fold() {
        let mut t: Vec<f64> = t;
        for h in plan.fold_steps() {
            let r: Vec<f64> = rotate(&t, h);
            izip!(t.iter_mut(), r).for_each(|(a, x)| *a += x);
        }
        t
    } else {
        let mut acc: Vec<f64> = t.clone();
        for k in plan.fold_steps() {
            izip!(acc.iter_mut(), rotate(&t, k)).for_each(|(a, x)| *a += x);
        }
        acc
    };
    folded.truncate(plan.m);
    Ok(folded)
}

#[cfg(test)]
mod tests {
    use sampling::source::Source;

    use super::{
        Matrix, approx_equal, duplicate, find_factor, general_mvp_from_diagonals, mvp_from_diagonals,
        mvp_from_diagonals_bsgs, random_vector, rotate,
    };
    use crate::error::CircuitError;

    #[test]
    fn diagonals_layout() {
        let m: Matrix = Matrix::from_rows(&[vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]]).unwrap();
        assert_eq!(m.diag(0).unwrap(), vec![1.0, 6.0, 3.0, 8.0]);
        assert_eq!(m.diag(1).unwrap(), vec![2.0, 7.0, 4.0, 5.0]);
        let d: Vec<Vec<f64>> = m.diagonals().unwrap();
        assert_eq!(d.len(), 2);
        assert!(d.iter().all(|x| x.len() == 4));
        assert_eq!(
            m.diag(4).unwrap_err(),
            CircuitError::ShapeMismatch {
                what: "diagonal index bound",
                expected: 4,
                found: 4
            }
        );
    }

    #[test]
    fn non_squat_rejected() {
        let m: Matrix = Matrix::zeros(3, 2);
        assert_eq!(m.diagonals().unwrap_err(), CircuitError::NonSquat { rows: 3, cols: 2 });
    }

    #[test]
    fn vector_helpers() {
        assert_eq!(rotate(&[1, 2, 3, 4], 1), vec![2, 3, 4, 1]);
        assert_eq!(rotate(&[1, 2, 3, 4], -1), vec![4, 1, 2, 3]);
        assert_eq!(rotate(&[1, 2, 3, 4], 6), vec![3, 4, 1, 2]);
        assert_eq!(duplicate(&[1.0, 2.0]), vec![1.0, 2.0, 1.0, 2.0]);
        assert!(approx_equal(&[1.0005, 0.0], &[1.0, 0.0], 1e-3).unwrap());
        assert!(!approx_equal(&[1.01, 0.0], &[1.0, 0.0], 1e-3).unwrap());
    }

    #[test]
    fn factors() {
        assert_eq!(find_factor(16).unwrap(), 4);
        assert_eq!(find_factor(12).unwrap(), 3);
        assert_eq!(find_factor(1024).unwrap(), 32);
        assert_eq!(find_factor(6).unwrap(), 2);
        assert_eq!(find_factor(13).unwrap_err(), CircuitError::Unfactorizable(13));
        assert_eq!(find_factor(1).unwrap_err(), CircuitError::Unfactorizable(1));
    }

    #[test]
    fn identity_mvp() {
        let mut source: Source = Source::new([0u8; 32]);
        let v: Vec<f64> = random_vector(12, &mut source);
        let d: Vec<Vec<f64>> = Matrix::identity(12).diagonals().unwrap();
        assert_eq!(mvp_from_diagonals(&d, &v).unwrap(), v);
        assert!(approx_equal(&mvp_from_diagonals_bsgs(&d, &v).unwrap(), &v, 1e-12).unwrap());
    }

    #[test]
    fn square_variants_agree() {
        let mut source: Source = Source::new([0u8; 32]);
        [4usize, 6, 9, 12, 16, 25, 64].iter().for_each(|&n| {
            println!("test square mvp n: {}", n);
            let m: Matrix = Matrix::random(n, n, &mut source);
            let v: Vec<f64> = random_vector(n, &mut source);
            let d: Vec<Vec<f64>> = m.diagonals().unwrap();
            let want: Vec<f64> = m.mvp(&v).unwrap();
            assert!(approx_equal(&mvp_from_diagonals(&d, &v).unwrap(), &want, 1e-9).unwrap());
            assert!(approx_equal(&mvp_from_diagonals_bsgs(&d, &v).unwrap(), &want, 1e-9).unwrap());
            assert!(approx_equal(&general_mvp_from_diagonals(&d, &v).unwrap(), &want, 1e-9).unwrap());
        });
    }

    #[test]
    fn bsgs_prime_rejected() {
        let d: Vec<Vec<f64>> = Matrix::identity(7).diagonals().unwrap();
        assert_eq!(
            mvp_from_diagonals_bsgs(&d, &[0.0; 7]).unwrap_err(),
            CircuitError::Unfactorizable(7)
        );
    }

    #[test]
    fn general_variants() {
        let mut source: Source = Source::new([1u8; 32]);
        [(1usize, 4usize), (2, 8), (3, 12), (4, 16), (5, 10), (6, 18), (8, 64), (7, 7), (4, 4), (3, 9)]
            .iter()
            .for_each(|&(rows, cols)| {
                println!("test general mvp {}x{}", rows, cols);
                let m: Matrix = Matrix::random(rows, cols, &mut source);
                let v: Vec<f64> = random_vector(cols, &mut source);
                let have: Vec<f64> = general_mvp_from_diagonals(&m.diagonals().unwrap(), &v).unwrap();
                assert_eq!(have.len(), rows);
                assert!(approx_equal(&have, &m.mvp(&v).unwrap(), 1e-9).unwrap());
            });
    }

    #[test]
    fn general_shape_errors() {
        let d: Vec<Vec<f64>> = vec![vec![0.0; 6]; 4];
        assert_eq!(
            general_mvp_from_diagonals(&d, &[0.0; 6]).unwrap_err(),
            CircuitError::NotDivisible { rows: 4, cols: 6 }
        );
        let d: Vec<Vec<f64>> = vec![vec![0.0; 3]; 4];
        assert_eq!(
            general_mvp_from_diagonals(&d, &[0.0; 3]).unwrap_err(),
            CircuitError::NonSquat { rows: 4, cols: 3 }
        );
        let d: Vec<Vec<f64>> = vec![vec![0.0; 4], vec![0.0; 3]];
        assert_eq!(
            general_mvp_from_diagonals(&d, &[0.0; 4]).unwrap_err(),
            CircuitError::ShapeMismatch {
                what: "diagonal length",
                expected: 4,
                found: 3
            }
        );
        assert_eq!(
            mvp_from_diagonals(&vec![vec![0.0; 4]; 2], &[0.0; 4]).unwrap_err(),
            CircuitError::ShapeMismatch {
                what: "diagonal count",
                expected: 4,
                found: 2
            }
        );
    }
}
