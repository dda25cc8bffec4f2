//! Backend-agnostic HE API.
//!
//! Circuit code is written once against these traits and runs on any
//! backend implementing them. Every method takes `&self`: contexts and keys
//! are long-lived, caller-owned resources that evaluation never mutates.

use std::fmt::Debug;

use sampling::source::Source;

use crate::error::BackendError;

/// Slot value type of a scheme.
pub trait Scalar: Copy + Debug + PartialEq + Default + Send + Sync + 'static {
    fn zero() -> Self;
    fn one() -> Self;
    fn from_u64(value: u64) -> Self;
    fn as_f64(self) -> f64;
}

impl Scalar for u64 {
    #[inline]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn one() -> Self {
        1
    }

    #[inline]
    fn from_u64(value: u64) -> Self {
        value
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl Scalar for f64 {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn from_u64(value: u64) -> Self {
        value as f64
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}

/// Opaque types of a backend together with its batching width.
pub trait Backend {
    type Value: Scalar;
    type Plaintext: Clone + Debug;
    type Ciphertext: Clone + Debug;
    type SecretKey;
    type PublicKey;
    type RelinKey;
    type GaloisKeys;

    /// Number of packed slots of a plaintext.
    fn slot_count(&self) -> usize;
}

pub trait Encoding: Backend {
    /// Encodes `values` (zero-padded to [Backend::slot_count]) at the top level
    /// and default scale.
    fn encode(&self, values: &[Self::Value]) -> Result<Self::Plaintext, BackendError>;

    /// Encodes `values` at the level and scale of `like`, so the result can be
    /// added to or multiplied with `like`.
    fn encode_like(&self, values: &[Self::Value], like: &Self::Ciphertext) -> Result<Self::Plaintext, BackendError>;
}

pub trait Decoding: Backend {
    fn decode(&self, pt: &Self::Plaintext) -> Vec<Self::Value>;
}

pub trait Encryption: Backend {
    fn encrypt(&self, pt: &Self::Plaintext, pk: &Self::PublicKey, source: &mut Source) -> Result<Self::Ciphertext, BackendError>;
}

pub trait Decryption: Backend {
    fn decrypt(&self, ct: &Self::Ciphertext, sk: &Self::SecretKey) -> Result<Self::Plaintext, BackendError>;
}

pub trait Evaluation: Backend {
    fn add(&self, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<Self::Ciphertext, BackendError>;

    fn sub(&self, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<Self::Ciphertext, BackendError>;

    fn add_plain(&self, a: &Self::Ciphertext, b: &Self::Plaintext) -> Result<Self::Ciphertext, BackendError>;

    /// Tensor product. The result must be relinearized before it enters
    /// another [Evaluation::multiply].
    fn multiply(&self, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<Self::Ciphertext, BackendError>;

    fn multiply_plain(&self, a: &Self::Ciphertext, b: &Self::Plaintext) -> Result<Self::Ciphertext, BackendError>;

    fn relinearize(&self, a: &Self::Ciphertext, rk: &Self::RelinKey) -> Result<Self::Ciphertext, BackendError>;

    /// Cyclic left rotation of the slots by `steps` (right for negative steps).
    /// Requires a Galois key generated for exactly `steps`.
    fn rotate(&self, a: &Self::Ciphertext, steps: i64, keys: &Self::GaloisKeys) -> Result<Self::Ciphertext, BackendError>;

    /// Whether [Evaluation::rotate] by `steps` is possible with `keys`.
    fn has_rotation_key(&self, keys: &Self::GaloisKeys, steps: i64) -> bool;

    /// Drops one level and divides the scale (approximate schemes only).
    fn rescale(&self, a: &Self::Ciphertext) -> Result<Self::Ciphertext, BackendError>;

    /// Remaining multiplicative depth of `a`.
    fn level(&self, a: &Self::Ciphertext) -> usize;

    fn add_inplace(&self, a: &mut Self::Ciphertext, b: &Self::Ciphertext) -> Result<(), BackendError> {
        *a = self.add(a, b)?;
        Ok(())
    }
}
