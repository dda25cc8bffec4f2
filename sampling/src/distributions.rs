use rand_distr::{Distribution, Normal};
use thiserror::Error;

use crate::source::Source;

#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum DistributionError {
    #[error("standard deviation {0} must be finite and non-negative")]
    BadSigma(f64),
    #[error("rejection bound {0} must be finite and non-negative")]
    BadBound(f64),
}

/// Noise added to fresh encryptions.
#[derive(Clone, Copy, Debug)]
pub enum NoiseDistribution {
    /// Exact schemes: decryption removes the noise entirely.
    None,
    /// Centered normal, rejection-sampled to [-bound, bound].
    Gaussian { normal: Normal<f64>, bound: f64 },
}

impl NoiseDistribution {
    pub fn gaussian(sigma: f64, bound: f64) -> Result<Self, DistributionError> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(DistributionError::BadSigma(sigma));
        }
        if !bound.is_finite() || bound < 0.0 {
            return Err(DistributionError::BadBound(bound));
        }
        let normal: Normal<f64> = Normal::new(0.0, sigma).map_err(|_| DistributionError::BadSigma(sigma))?;
        Ok(Self::Gaussian { normal, bound })
    }

    pub fn sample(&self, source: &mut Source) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Gaussian { normal, bound } => {
                let mut x: f64 = normal.sample(source);
                while x.abs() > *bound {
                    x = normal.sample(source);
                }
                x
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DistributionError, NoiseDistribution};
    use crate::source::Source;

    #[test]
    fn gaussian_respects_bound() {
        let mut source: Source = Source::new([0u8; 32]);
        let dist: NoiseDistribution = NoiseDistribution::gaussian(3.2, 6.0 * 3.2).unwrap();
        (0..4096).for_each(|_| assert!(dist.sample(&mut source).abs() <= 6.0 * 3.2));
    }

    #[test]
    fn none_is_zero() {
        let mut source: Source = Source::new([0u8; 32]);
        assert_eq!(NoiseDistribution::None.sample(&mut source), 0.0);
    }

    #[test]
    fn negative_sigma_rejected() {
        assert_eq!(
            NoiseDistribution::gaussian(-1.0, 1.0).unwrap_err(),
            DistributionError::BadSigma(-1.0)
        );
        assert!(NoiseDistribution::gaussian(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn negative_bound_rejected() {
        assert_eq!(
            NoiseDistribution::gaussian(3.2, -1.0).unwrap_err(),
            DistributionError::BadBound(-1.0)
        );
        assert!(NoiseDistribution::gaussian(3.2, f64::INFINITY).is_err());
    }

    #[test]
    fn zero_bound_samples_zero() {
        let mut source: Source = Source::new([0u8; 32]);
        let dist: NoiseDistribution = NoiseDistribution::gaussian(0.0, 0.0).unwrap();
        assert_eq!(dist.sample(&mut source), 0.0);
    }
}
