use std::fmt::Debug;

use sampling::{NoiseDistribution, source::Source};

use crate::{api::Scalar, error::ParameterError, parameters::Parameters};

/// Slot arithmetic of an HE scheme.
///
/// The [crate::Module] keeps the leveled bookkeeping (levels, scales, sizes,
/// key binding) and delegates the slot-wise arithmetic to the scheme.
pub trait Scheme: Clone + Debug + Sized + 'static {
    type Value: Scalar;

    const NAME: &'static str;

    /// Whether ciphertexts carry a scale that multiplications grow and
    /// rescaling shrinks.
    const RESCALING: bool;

    fn validate(params: &Parameters) -> Result<(), ParameterError>;

    /// Noise added to each slot of a fresh encryption.
    fn noise(params: &Parameters) -> Result<NoiseDistribution, ParameterError>;

    /// Base two logarithm of the scale of freshly encoded plaintexts.
    fn default_log_scale(params: &Parameters) -> f64;

    fn reduce(params: &Parameters, a: Self::Value) -> Self::Value;

    fn add(params: &Parameters, a: Self::Value, b: Self::Value) -> Self::Value;

    fn sub(params: &Parameters, a: Self::Value, b: Self::Value) -> Self::Value;

    fn mul(params: &Parameters, a: Self::Value, b: Self::Value) -> Self::Value;

    /// Applies one sample of encryption noise to `a`, encoded at scale 2^`log_scale`.
    fn perturb(noise: &NoiseDistribution, a: Self::Value, log_scale: f64, source: &mut Source) -> Self::Value;
}

/// Exact integer arithmetic modulo the plain modulus t.
#[derive(Clone, Copy, Debug)]
pub struct Bfv;

/// Approximate fixed-point arithmetic over the reals.
#[derive(Clone, Copy, Debug)]
pub struct Ckks;

const MAX_PLAIN_MODULUS: u64 = 1 << 62;

impl Scheme for Bfv {
    type Value = u64;

    const NAME: &'static str = "BFV";
    const RESCALING: bool = false;

    fn validate(params: &Parameters) -> Result<(), ParameterError> {
        params.check_common()?;
        if params.plain_modulus < 2 {
            return Err(ParameterError::PlainModulusTooSmall(params.plain_modulus));
        }
        if params.plain_modulus > MAX_PLAIN_MODULUS {
            return Err(ParameterError::PlainModulusTooLarge(params.plain_modulus));
        }
        Ok(())
    }

    fn noise(_params: &Parameters) -> Result<NoiseDistribution, ParameterError> {
        Ok(NoiseDistribution::None)
    }

    fn default_log_scale(_params: &Parameters) -> f64 {
        0.0
    }

    #[inline]
    fn reduce(params: &Parameters, a: u64) -> u64 {
        a % params.plain_modulus
    }

    #[inline]
    fn add(params: &Parameters, a: u64, b: u64) -> u64 {
        (a + b) % params.plain_modulus
    }

    #[inline]
    fn sub(params: &Parameters, a: u64, b: u64) -> u64 {
        (a + params.plain_modulus - b) % params.plain_modulus
    }

    #[inline]
    fn mul(params: &Parameters, a: u64, b: u64) -> u64 {
        ((a as u128 * b as u128) % params.plain_modulus as u128) as u64
    }

    #[inline]
    fn perturb(_noise: &NoiseDistribution, a: u64, _log_scale: f64, _source: &mut Source) -> u64 {
        a
    }
}

impl Scheme for Ckks {
    type Value = f64;

    const NAME: &'static str = "CKKS";
    const RESCALING: bool = true;

    fn validate(params: &Parameters) -> Result<(), ParameterError> {
        params.check_common()?;
        if params.log_scale == 0 {
            return Err(ParameterError::ZeroScale);
        }
        Ok(())
    }

    fn noise(params: &Parameters) -> Result<NoiseDistribution, ParameterError> {
        NoiseDistribution::gaussian(params.sigma, 6.0 * params.sigma).map_err(|_| ParameterError::InvalidSigma(params.sigma))
    }

    fn default_log_scale(params: &Parameters) -> f64 {
        params.log_scale as f64
    }

    #[inline]
    fn reduce(_params: &Parameters, a: f64) -> f64 {
        a
    }

    #[inline]
    fn add(_params: &Parameters, a: f64, b: f64) -> f64 {
        a + b
    }

    #[inline]
    fn sub(_params: &Parameters, a: f64, b: f64) -> f64 {
        a - b
    }

    #[inline]
    fn mul(_params: &Parameters, a: f64, b: f64) -> f64 {
        a * b
    }

    #[inline]
    fn perturb(noise: &NoiseDistribution, a: f64, log_scale: f64, source: &mut Source) -> f64 {
        a + noise.sample(source) / log_scale.exp2()
    }
}

#[cfg(test)]
mod tests {
    use super::{Bfv, Ckks, Scheme};
    use crate::{error::ParameterError, parameters::Parameters};

    #[test]
    fn bfv_arithmetic_mod_t() {
        let params: Parameters = Parameters::bfv(8, 17, 1);
        assert_eq!(Bfv::add(&params, 16, 3), 2);
        assert_eq!(Bfv::sub(&params, 3, 5), 15);
        assert_eq!(Bfv::mul(&params, 16, 16), 1);
        assert_eq!(Bfv::reduce(&params, 35), 1);
    }

    #[test]
    fn bfv_binary_is_gf2() {
        let params: Parameters = Parameters::bfv(8, 2, 1);
        (0..2u64).for_each(|a| {
            (0..2u64).for_each(|b| {
                assert_eq!(Bfv::add(&params, a, b), a ^ b);
                assert_eq!(Bfv::mul(&params, a, b), a & b);
            })
        });
    }

    #[test]
    fn validation() {
        assert_eq!(Bfv::validate(&Parameters::bfv(0, 2, 1)), Err(ParameterError::ZeroSlots));
        assert_eq!(
            Bfv::validate(&Parameters::bfv(12, 2, 1)),
            Err(ParameterError::NonPowerOfTwoSlots(12))
        );
        assert_eq!(
            Bfv::validate(&Parameters::bfv(16, 1, 1)),
            Err(ParameterError::PlainModulusTooSmall(1))
        );
        assert_eq!(Bfv::validate(&Parameters::bfv(16, 2, 0)), Err(ParameterError::ZeroLevels));
        assert_eq!(Ckks::validate(&Parameters::ckks(16, 2, 0)), Err(ParameterError::ZeroScale));
        assert!(Ckks::validate(&Parameters::ckks(16, 2, 40)).is_ok());
    }
}
