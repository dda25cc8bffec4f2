use backend::{Backend, Encoding, Encryption, Evaluation};
use sampling::source::Source;

use crate::error::CircuitError;

/// Backend capabilities a [Session] evaluates circuits with.
pub trait SessionFamily: Encoding + Encryption + Evaluation {}

impl<T> SessionFamily for T where T: Encoding + Encryption + Evaluation {}

/// Immutable handle bundling a backend with the evaluation keys of one party.
///
/// Circuits borrow the session; they never own or mutate the backend or its
/// keys.
pub struct Session<'a, B: Backend> {
    backend: &'a B,
    public_key: &'a B::PublicKey,
    relin_key: &'a B::RelinKey,
    galois_keys: Option<&'a B::GaloisKeys>,
}

impl<B: Backend> Clone for Session<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: Backend> Copy for Session<'_, B> {}

impl<'a, B: Backend> Session<'a, B> {
    pub fn new(backend: &'a B, public_key: &'a B::PublicKey, relin_key: &'a B::RelinKey) -> Self {
        Self {
            backend,
            public_key,
            relin_key,
            galois_keys: None,
        }
    }

    pub fn with_galois_keys(self, galois_keys: &'a B::GaloisKeys) -> Self {
        Self {
            galois_keys: Some(galois_keys),
            ..self
        }
    }

    pub fn backend(&self) -> &'a B {
        self.backend
    }

    pub fn slot_count(&self) -> usize {
        self.backend.slot_count()
    }

    pub fn galois_keys(&self) -> Option<&'a B::GaloisKeys> {
        self.galois_keys
    }
}

impl<B: SessionFamily> Session<'_, B> {
    pub fn encrypt_values(&self, values: &[B::Value], source: &mut Source) -> Result<B::Ciphertext, CircuitError> {
        let pt: B::Plaintext = self.backend.encode(values)?;
        Ok(self.backend.encrypt(&pt, self.public_key, source)?)
    }

    /// Encrypts `value` replicated in every slot.
    pub fn encrypt_constant(&self, value: B::Value, source: &mut Source) -> Result<B::Ciphertext, CircuitError> {
        self.encrypt_values(&vec![value; self.slot_count()], source)
    }

    pub fn add(&self, a: &B::Ciphertext, b: &B::Ciphertext) -> Result<B::Ciphertext, CircuitError> {
        Ok(self.backend.add(a, b)?)
    }

    pub fn add_inplace(&self, a: &mut B::Ciphertext, b: &B::Ciphertext) -> Result<(), CircuitError> {
        Ok(self.backend.add_inplace(a, b)?)
    }

    pub fn sub(&self, a: &B::Ciphertext, b: &B::Ciphertext) -> Result<B::Ciphertext, CircuitError> {
        Ok(self.backend.sub(a, b)?)
    }

    /// Adds `values` slot-wise, encoded at the level and scale of `a`.
    pub fn add_values(&self, a: &B::Ciphertext, values: &[B::Value]) -> Result<B::Ciphertext, CircuitError> {
        let pt: B::Plaintext = self.backend.encode_like(values, a)?;
        Ok(self.backend.add_plain(a, &pt)?)
    }

    /// Adds `value` to every slot of `a`.
    pub fn add_scalar(&self, a: &B::Ciphertext, value: B::Value) -> Result<B::Ciphertext, CircuitError> {
        self.add_values(a, &vec![value; self.slot_count()])
    }

    /// Multiplies then relinearizes, so the result can enter another
    /// multiplication.
    pub fn multiply(&self, a: &B::Ciphertext, b: &B::Ciphertext) -> Result<B::Ciphertext, CircuitError> {
        let ab: B::Ciphertext = self.backend.multiply(a, b)?;
        Ok(self.backend.relinearize(&ab, self.relin_key)?)
    }

    /// Multiplies `a` slot-wise with `values` encoded at its level and scale.
    pub fn multiply_values(&self, a: &B::Ciphertext, values: &[B::Value]) -> Result<B::Ciphertext, CircuitError> {
        let pt: B::Plaintext = self.backend.encode_like(values, a)?;
        Ok(self.backend.multiply_plain(a, &pt)?)
    }

    pub fn multiply_scalar(&self, a: &B::Ciphertext, value: B::Value) -> Result<B::Ciphertext, CircuitError> {
        self.multiply_values(a, &vec![value; self.slot_count()])
    }

    pub fn square(&self, a: &B::Ciphertext) -> Result<B::Ciphertext, CircuitError> {
        self.multiply(a, a)
    }

    pub fn rescale(&self, a: &B::Ciphertext) -> Result<B::Ciphertext, CircuitError> {
        Ok(self.backend.rescale(a)?)
    }

    pub fn rotate(&self, a: &B::Ciphertext, steps: i64) -> Result<B::Ciphertext, CircuitError> {
        match self.galois_keys {
            Some(keys) => Ok(self.backend.rotate(a, steps, keys)?),
            None => Err(CircuitError::MissingGaloisKeys { steps: vec![steps] }),
        }
    }

    pub fn level(&self, a: &B::Ciphertext) -> usize {
        self.backend.level(a)
    }

    /// Fails with [CircuitError::MissingGaloisKeys] listing every step of
    /// `steps` the session holds no key for.
    pub fn check_rotation_keys(&self, steps: &[i64]) -> Result<(), CircuitError> {
        let missing: Vec<i64> = match self.galois_keys {
            Some(keys) => steps
                .iter()
                .copied()
                .filter(|&step| !self.backend.has_rotation_key(keys, step))
                .collect(),
            None => steps.iter().copied().filter(|&step| step != 0).collect(),
        };
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CircuitError::MissingGaloisKeys { steps: missing })
        }
    }

    /// Fails with [CircuitError::DepthExhausted] if `a` has fewer than
    /// `required` levels left.
    pub fn check_level(&self, a: &B::Ciphertext, required: usize) -> Result<(), CircuitError> {
        let available: usize = self.level(a);
        if available < required {
            return Err(CircuitError::DepthExhausted { required, available });
        }
        Ok(())
    }
}
