use backend::BackendError;
use thiserror::Error;

use crate::bits::BitOrder;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CircuitError {
    #[error("operand widths differ: {lhs} != {rhs}")]
    WidthMismatch { lhs: usize, rhs: usize },
    #[error("operand is empty")]
    EmptyOperand,
    #[error("expected {expected:?} operand, found {found:?}")]
    BitOrderMismatch { expected: BitOrder, found: BitOrder },
    #[error("value {value} does not fit in {width} bits")]
    ValueOutOfRange { value: u64, width: usize },
    #[error("width {0} exceeds 64 bits")]
    WidthTooLarge(usize),
    #[error("bit {index} decrypted to {value}, not 0 or 1")]
    NotABit { index: usize, value: f64 },
    #[error("{what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{rows}x{cols} matrix is not squat (rows > cols)")]
    NonSquat { rows: usize, cols: usize },
    #[error("{0} has no factor pair n1 * n2 with 1 < n1 <= sqrt({0})")]
    Unfactorizable(usize),
    #[error("row count {rows} does not divide column count {cols}")]
    NotDivisible { rows: usize, cols: usize },
    #[error("{needed} slots required, backend has {available}")]
    SlotCapacity { needed: usize, available: usize },
    #[error("{required} levels required, ciphertext has {available}")]
    DepthExhausted { required: usize, available: usize },
    #[error("missing galois keys for steps {steps:?}")]
    MissingGaloisKeys { steps: Vec<i64> },
    #[error(transparent)]
    Backend(#[from] BackendError),
}
