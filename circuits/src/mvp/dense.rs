use sampling::source::Source;

use crate::{
    error::CircuitError,
    mvp::plain::{Matrix, add_vectors, general_mvp_from_diagonals, random_vector},
};

/// Fully connected layer stored as the generalized diagonals of its
/// `units x input_size` weight matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseLayer {
    diagonals: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl DenseLayer {
    /// Layer with weights and bias uniform in [-0.5, 0.5).
    pub fn random(units: usize, input_size: usize, source: &mut Source) -> Result<Self, CircuitError> {
        let weights: Matrix = Matrix::random(units, input_size, source);
        let bias: Vec<f64> = random_vector(units, source);
        Self::from_matrix(&weights, bias)
    }

    pub fn from_matrix(weights: &Matrix, bias: Vec<f64>) -> Result<Self, CircuitError> {
        if weights.rows() == 0 || weights.cols() == 0 {
            return Err(CircuitError::EmptyOperand);
        }
        if bias.len() != weights.rows() {
            return Err(CircuitError::ShapeMismatch {
                what: "bias length",
                expected: weights.rows(),
                found: bias.len(),
            });
        }
        Ok(Self {
            diagonals: weights.diagonals()?,
            bias,
        })
    }

    pub fn units(&self) -> usize {
        self.diagonals.len()
    }

    pub fn input_size(&self) -> usize {
        self.diagonals[0].len()
    }

    pub fn weights_as_diagonals(&self) -> &[Vec<f64>] {
        &self.diagonals
    }

    pub fn bias(&self) -> &[f64] {
        &self.bias
    }

    /// `W * v + b`, without activation.
    pub fn forward_plain(&self, v: &[f64]) -> Result<Vec<f64>, CircuitError> {
        add_vectors(&general_mvp_from_diagonals(&self.diagonals, v)?, &self.bias)
    }
}

fn rnn_step(x: &[f64], h: &[f64], w_x: &Matrix, w_h: &Matrix, b: &[f64]) -> Result<Vec<f64>, CircuitError> {
    add_vectors(&add_vectors(&w_x.mvp(x)?, &w_h.mvp(h)?)?, b)
}

/// One recurrent step `relu(W_x * x + W_h * h + b)`.
pub fn rnn_with_relu(x: &[f64], h: &[f64], w_x: &Matrix, w_h: &Matrix, b: &[f64]) -> Result<Vec<f64>, CircuitError> {
    Ok(rnn_step(x, h, w_x, w_h, b)?
        .into_iter()
        .map(|z| z.max(0.0))
        .collect())
}

/// One recurrent step `(W_x * x + W_h * h + b)^2`, the activation an
/// encrypted evaluation can afford.
pub fn rnn_with_squaring(
    x: &[f64],
    h: &[f64],
    w_x: &Matrix,
    w_h: &Matrix,
    b: &[f64],
) -> Result<Vec<f64>, CircuitError> {
    Ok(rnn_step(x, h, w_x, w_h, b)?
        .into_iter()
        .map(|z| z * z)
        .collect())
}
