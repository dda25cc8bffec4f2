pub mod dense;
pub mod encrypted;
pub mod plain;

pub use dense::*;
pub use encrypted::*;
pub use plain::*;

use crate::error::CircuitError;

/// Rotation schedule of a baby-step giant-step product of a squat `m x n`
/// matrix with `m = n1 * n2` and `m | n`.
///
/// Baby steps rotate the input by `1..n1`, giant steps rotate the inner sums
/// by `j * n1` for `j` in `1..n2`, and for `m < n` the fold adds the `n / m`
/// row blocks of the length-n intermediate together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BsgsPlan {
    pub m: usize,
    pub n: usize,
    pub n1: usize,
    pub n2: usize,
}

impl BsgsPlan {
    /// Square `n x n` plan with `n1` given by [find_factor].
    pub fn square(n: usize) -> Result<Self, CircuitError> {
        if n == 0 {
            return Err(CircuitError::EmptyOperand);
        }
        let n1: usize = find_factor(n)?;
        Ok(Self {
            m: n,
            n,
            n1,
            n2: n / n1,
        })
    }

    /// Plan for a squat `m x n` matrix. A prime `m` gets the degenerate split
    /// `n1 = m, n2 = 1`.
    pub fn general(m: usize, n: usize) -> Result<Self, CircuitError> {
        if m == 0 || n == 0 {
            return Err(CircuitError::EmptyOperand);
        }
        if m > n {
            return Err(CircuitError::NonSquat { rows: m, cols: n });
        }
        if n % m != 0 {
            return Err(CircuitError::NotDivisible { rows: m, cols: n });
        }
        let n1: usize = find_factor(m).unwrap_or(m);
        Ok(Self {
            m,
            n,
            n1,
            n2: m / n1,
        })
    }

    /// Number of row blocks folded together.
    pub fn blocks(&self) -> usize {
        self.n / self.m
    }

    /// Whether the fold is a halving rotate-and-sum (power-of-two block count)
    /// or a linear sum over `k * m`.
    pub fn halving_fold(&self) -> bool {
        self.blocks().is_power_of_two()
    }

    pub fn baby_steps(&self) -> Vec<i64> {
        (1..self.n1).map(|i| i as i64).collect()
    }

    pub fn giant_steps(&self) -> Vec<i64> {
        (1..self.n2).map(|j| (j * self.n1) as i64).collect()
    }

    pub fn fold_steps(&self) -> Vec<i64> {
        if self.halving_fold() {
            let mut steps: Vec<i64> = Vec::new();
            let mut h: usize = self.n >> 1;
            while h >= self.m {
                steps.push(h as i64);
                h >>= 1;
            }
            steps
        } else {
            (1..self.blocks()).map(|k| (k * self.m) as i64).collect()
        }
    }

    /// Distinct rotation steps, ascending. Galois keys for exactly these
    /// steps are sufficient.
    pub fn rotation_steps(&self) -> Vec<i64> {
        let mut steps: Vec<i64> = self.baby_steps();
        steps.extend(self.giant_steps());
        steps.extend(self.fold_steps());
        steps.sort_unstable();
        steps.dedup();
        steps
    }

    /// Number of ciphertext rotations one product performs.
    pub fn rotation_count(&self) -> usize {
        self.baby_steps().len() + self.giant_steps().len() + self.fold_steps().len()
    }
}
