use backend::Scalar;

use crate::{
    bits::EncryptedBit,
    error::CircuitError,
    session::{Session, SessionFamily},
};

/// Boolean gates a circuit schedule is written against.
///
/// The same schedule runs over ciphertexts ([Session]), over plain booleans
/// ([PlainBits]) and over multiplicative depths ([DepthCounter]).
pub trait BitEvaluator {
    type Bit: Clone;

    /// Addition mod 2.
    fn xor(&self, a: &Self::Bit, b: &Self::Bit) -> Result<Self::Bit, CircuitError>;

    /// Multiplication mod 2. The only gate consuming depth.
    fn and(&self, a: &Self::Bit, b: &Self::Bit) -> Result<Self::Bit, CircuitError>;

    /// Addition of the constant 1.
    fn not(&self, a: &Self::Bit) -> Result<Self::Bit, CircuitError>;
}

impl<B: SessionFamily> BitEvaluator for Session<'_, B> {
    type Bit = EncryptedBit<B::Ciphertext>;

    fn xor(&self, a: &Self::Bit, b: &Self::Bit) -> Result<Self::Bit, CircuitError> {
        Ok(EncryptedBit(self.add(&a.0, &b.0)?))
    }

    fn and(&self, a: &Self::Bit, b: &Self::Bit) -> Result<Self::Bit, CircuitError> {
        Ok(EncryptedBit(self.multiply(&a.0, &b.0)?))
    }

    fn not(&self, a: &Self::Bit) -> Result<Self::Bit, CircuitError> {
        Ok(EncryptedBit(self.add_scalar(&a.0, B::Value::one())?))
    }
}

/// Evaluates schedules in the clear.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainBits;

impl BitEvaluator for PlainBits {
    type Bit = bool;

    fn xor(&self, a: &bool, b: &bool) -> Result<bool, CircuitError> {
        Ok(a ^ b)
    }

    fn and(&self, a: &bool, b: &bool) -> Result<bool, CircuitError> {
        Ok(a & b)
    }

    fn not(&self, a: &bool) -> Result<bool, CircuitError> {
        Ok(!a)
    }
}

/// Tracks the multiplicative depth of every wire of a schedule.
#[derive(Clone, Copy, Debug, Default)]
pub struct DepthCounter;

impl BitEvaluator for DepthCounter {
    type Bit = usize;

    fn xor(&self, a: &usize, b: &usize) -> Result<usize, CircuitError> {
        Ok(*a.max(b))
    }

    fn and(&self, a: &usize, b: &usize) -> Result<usize, CircuitError> {
        Ok(a.max(b) + 1)
    }

    fn not(&self, a: &usize) -> Result<usize, CircuitError> {
        Ok(*a)
    }
}

/// Integer with `width` bits least significant first.
#[cfg(test)]
pub(crate) fn to_bits(value: u64, width: usize) -> Vec<bool> {
    (0..width).map(|i| (value >> i) & 1 == 1).collect()
}

#[cfg(test)]
pub(crate) fn from_bits(bits: &[bool]) -> u64 {
    bits.iter()
        .enumerate()
        .fold(0u64, |acc, (i, b)| acc | ((*b as u64) << i))
}
