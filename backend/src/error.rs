use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParameterError {
    #[error("slot count must be non-zero")]
    ZeroSlots,
    #[error("slot count {0} is not a power of two")]
    NonPowerOfTwoSlots(usize),
    #[error("plain modulus {0} is too small (must be at least 2)")]
    PlainModulusTooSmall(u64),
    #[error("plain modulus {0} exceeds 2^62")]
    PlainModulusTooLarge(u64),
    #[error("log scale must be non-zero")]
    ZeroScale,
    #[error("at least one level is required")]
    ZeroLevels,
    #[error("invalid noise standard deviation {0}")]
    InvalidSigma(f64),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    #[error("invalid parameters: {0}")]
    Parameters(#[from] ParameterError),
    #[error("{len} values do not fit in {slots} slots")]
    SlotOverflow { len: usize, slots: usize },
    #[error("operand of size {size} must be relinearized before multiplication")]
    NotRelinearized { size: usize },
    #[error("no level left for {op}")]
    LevelExhausted { op: &'static str },
    #[error("operands at levels {lhs} and {rhs}")]
    LevelMismatch { lhs: usize, rhs: usize },
    #[error("operands at scales 2^{lhs:.2} and 2^{rhs:.2}")]
    ScaleMismatch { lhs: f64, rhs: f64 },
    #[error("no galois key for rotation step {0}")]
    MissingGaloisKey(i64),
    #[error("objects encrypted or generated under different keys")]
    KeyMismatch,
    #[error("{op} is not supported by the {scheme} scheme")]
    Unsupported { op: &'static str, scheme: &'static str },
}
