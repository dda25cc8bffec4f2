use crate::scheme::Scheme;

/// Encoded slot vector.
#[derive(Clone, Debug)]
pub struct Plaintext<S: Scheme> {
    pub(crate) data: Vec<S::Value>,
    pub(crate) level: usize,
    pub(crate) log_scale: f64,
}

impl<S: Scheme> Plaintext<S> {
    pub fn data(&self) -> &[S::Value] {
        &self.data
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn log_scale(&self) -> f64 {
        self.log_scale
    }
}

/// Encrypted slot vector.
///
/// `size` is the number of ring elements: 2 for a fresh or relinearized
/// ciphertext, 3 after a ciphertext-ciphertext multiplication.
#[derive(Clone, Debug)]
pub struct Ciphertext<S: Scheme> {
    pub(crate) data: Vec<S::Value>,
    pub(crate) size: usize,
    pub(crate) level: usize,
    pub(crate) log_scale: f64,
    pub(crate) key_id: u64,
}

impl<S: Scheme> Ciphertext<S> {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn log_scale(&self) -> f64 {
        self.log_scale
    }

    pub fn key_id(&self) -> u64 {
        self.key_id
    }
}
