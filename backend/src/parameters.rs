use crate::error::ParameterError;

pub const DEFAULT_SIGMA: f64 = 3.2;

/// Encryption parameters of a [crate::Module].
///
/// * `slots`: batching width, a power of two. The ring degree is `2 * slots`.
/// * `plain_modulus`: slot modulus of exact schemes (2 for boolean circuits).
/// * `levels`: multiplicative depth available to a fresh ciphertext.
/// * `log_scale`: base two logarithm of the encoding scale of approximate schemes.
/// * `sigma`: standard deviation of the fresh encryption noise.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    pub slots: usize,
    pub plain_modulus: u64,
    pub levels: usize,
    pub log_scale: usize,
    pub sigma: f64,
}

impl Parameters {
    pub fn bfv(slots: usize, plain_modulus: u64, levels: usize) -> Self {
        Self {
            slots,
            plain_modulus,
            levels,
            log_scale: 0,
            sigma: DEFAULT_SIGMA,
        }
    }

    pub fn ckks(slots: usize, levels: usize, log_scale: usize) -> Self {
        Self {
            slots,
            plain_modulus: 0,
            levels,
            log_scale,
            sigma: DEFAULT_SIGMA,
        }
    }

    /// Ring degree N.
    pub fn n(&self) -> usize {
        self.slots << 1
    }

    pub(crate) fn check_common(&self) -> Result<(), ParameterError> {
        if self.slots == 0 {
            return Err(ParameterError::ZeroSlots);
        }
        if !self.slots.is_power_of_two() {
            return Err(ParameterError::NonPowerOfTwoSlots(self.slots));
        }
        if self.levels == 0 {
            return Err(ParameterError::ZeroLevels);
        }
        if !(self.sigma.is_finite() && self.sigma >= 0.0) {
            return Err(ParameterError::InvalidSigma(self.sigma));
        }
        Ok(())
    }
}
