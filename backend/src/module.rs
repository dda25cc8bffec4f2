use std::{cell::Cell, marker::PhantomData};

use itertools::izip;
use rand_core::RngCore;
use sampling::{NoiseDistribution, source::Source};
use tracing::{debug, trace};
use utils::Map;

use crate::{
    api::{Backend, Decoding, Decryption, Encoding, Encryption, Evaluation},
    error::BackendError,
    keys::{GaloisKey, GaloisKeys, PublicKey, RelinKey, SecretKey},
    layouts::{Ciphertext, Plaintext},
    parameters::Parameters,
    scheme::Scheme,
    stats::OpCounts,
};

pub const GALOISGENERATOR: u64 = 5;

/// Returns GALOISGENERATOR^|step| * sign(step) mod `cyclotomic_order`.
pub fn galois_element(step: i64, cyclotomic_order: u64) -> i64 {
    debug_assert!(
        cyclotomic_order.is_power_of_two(),
        "cyclotomic_order must be a power of two, got {cyclotomic_order}"
    );

    if step == 0 {
        return 1;
    }

    let mask: u64 = cyclotomic_order - 1;
    let mut gal_el: u64 = 1;
    let mut gen_pow: u64 = GALOISGENERATOR;
    let mut e: u64 = step.unsigned_abs();
    while e > 0 {
        if e & 1 == 1 {
            gal_el = gal_el.wrapping_mul(gen_pow) & mask;
        }
        gen_pow = gen_pow.wrapping_mul(gen_pow) & mask;
        e >>= 1;
    }
    gal_el as i64 * step.signum()
}

/// Leveled evaluation context of scheme `S`.
///
/// Slots hold their logical values and every operation tracks the metadata a
/// real RLWE evaluator would (level, scale, ciphertext size, key binding), so
/// circuits fail here exactly where they would run out of depth, keys or
/// alignment on a lattice backend.
pub struct Module<S: Scheme> {
    params: Parameters,
    noise: NoiseDistribution,
    counts: Cell<OpCounts>,
    _phantom: PhantomData<S>,
}

impl<S: Scheme> Module<S> {
    pub fn new(params: Parameters) -> Result<Self, BackendError> {
        S::validate(&params)?;
        let noise: NoiseDistribution = S::noise(&params)?;
        debug!(
            scheme = S::NAME,
            slots = params.slots,
            levels = params.levels,
            "new module"
        );
        Ok(Self {
            params,
            noise,
            counts: Cell::new(OpCounts::default()),
            _phantom: PhantomData,
        })
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Ring degree.
    pub fn n(&self) -> usize {
        self.params.n()
    }

    pub fn cyclotomic_order(&self) -> u64 {
        (self.n() << 1) as u64
    }

    pub fn galois_element(&self, step: i64) -> i64 {
        galois_element(step, self.cyclotomic_order())
    }

    pub fn op_counts(&self) -> OpCounts {
        self.counts.get()
    }

    pub fn reset_op_counts(&self) {
        self.counts.set(OpCounts::default())
    }

    fn count(&self, f: impl FnOnce(&mut OpCounts)) {
        let mut counts: OpCounts = self.counts.get();
        f(&mut counts);
        self.counts.set(counts);
    }

    pub fn gen_secret_key(&self, source: &mut Source) -> SecretKey {
        let sk: SecretKey = SecretKey { id: source.next_u64() };
        trace!(id = sk.id, "secret key");
        sk
    }

    pub fn gen_public_key(&self, sk: &SecretKey) -> PublicKey {
        PublicKey { id: sk.id }
    }

    pub fn gen_relin_key(&self, sk: &SecretKey) -> RelinKey {
        RelinKey { id: sk.id }
    }

    /// Generates one rotation key per distinct step of `steps`.
    pub fn gen_galois_keys(&self, sk: &SecretKey, steps: &[i64]) -> GaloisKeys {
        let mut keys: Map<i64, GaloisKey> = Map::new();
        steps.iter().for_each(|&step| {
            keys.insert(
                step,
                GaloisKey {
                    step,
                    element: self.galois_element(step),
                },
            );
        });
        trace!(id = sk.id, steps = ?keys.sorted_keys(), "galois keys");
        GaloisKeys { id: sk.id, keys }
    }

    fn check_len(&self, len: usize) -> Result<(), BackendError> {
        if len > self.params.slots {
            return Err(BackendError::SlotOverflow {
                len,
                slots: self.params.slots,
            });
        }
        Ok(())
    }

    fn pad(&self, values: &[S::Value]) -> Vec<S::Value> {
        let mut data: Vec<S::Value> = vec![S::Value::default(); self.params.slots];
        izip!(data.iter_mut(), values.iter()).for_each(|(d, v)| *d = S::reduce(&self.params, *v));
        data
    }

    fn check_key(lhs: u64, rhs: u64) -> Result<(), BackendError> {
        if lhs != rhs {
            return Err(BackendError::KeyMismatch);
        }
        Ok(())
    }

    fn check_scale(lhs: f64, rhs: f64) -> Result<(), BackendError> {
        if S::RESCALING && (lhs - rhs).abs() > 1e-9 {
            return Err(BackendError::ScaleMismatch { lhs, rhs });
        }
        Ok(())
    }

    fn check_same_level(lhs: usize, rhs: usize) -> Result<(), BackendError> {
        if S::RESCALING && lhs != rhs {
            return Err(BackendError::LevelMismatch { lhs, rhs });
        }
        Ok(())
    }

    fn combine(
        &self,
        a: &Ciphertext<S>,
        b: &Ciphertext<S>,
        f: fn(&Parameters, S::Value, S::Value) -> S::Value,
    ) -> Result<Ciphertext<S>, BackendError> {
        Self::check_key(a.key_id, b.key_id)?;
        Self::check_same_level(a.level, b.level)?;
        Self::check_scale(a.log_scale, b.log_scale)?;
        Ok(Ciphertext {
            data: izip!(a.data.iter(), b.data.iter())
                .map(|(x, y)| f(&self.params, *x, *y))
                .collect(),
            size: a.size.max(b.size),
            level: a.level.min(b.level),
            log_scale: a.log_scale,
            key_id: a.key_id,
        })
    }
}

impl<S: Scheme> Backend for Module<S> {
    type Value = S::Value;
    type Plaintext = Plaintext<S>;
    type Ciphertext = Ciphertext<S>;
    type SecretKey = SecretKey;
    type PublicKey = PublicKey;
    type RelinKey = RelinKey;
    type GaloisKeys = GaloisKeys;

    fn slot_count(&self) -> usize {
        self.params.slots
    }
}

impl<S: Scheme> Encoding for Module<S> {
    fn encode(&self, values: &[S::Value]) -> Result<Plaintext<S>, BackendError> {
        self.check_len(values.len())?;
        Ok(Plaintext {
            data: self.pad(values),
            level: self.params.levels,
            log_scale: S::default_log_scale(&self.params),
        })
    }

    fn encode_like(&self, values: &[S::Value], like: &Ciphertext<S>) -> Result<Plaintext<S>, BackendError> {
        self.check_len(values.len())?;
        Ok(Plaintext {
            data: self.pad(values),
            level: like.level,
            log_scale: like.log_scale,
        })
    }
}

impl<S: Scheme> Decoding for Module<S> {
    fn decode(&self, pt: &Plaintext<S>) -> Vec<S::Value> {
        pt.data.clone()
    }
}

impl<S: Scheme> Encryption for Module<S> {
    fn encrypt(&self, pt: &Plaintext<S>, pk: &PublicKey, source: &mut Source) -> Result<Ciphertext<S>, BackendError> {
        self.count(|c| c.encrypt += 1);
        Ok(Ciphertext {
            data: pt
                .data
                .iter()
                .map(|x| S::perturb(&self.noise, *x, pt.log_scale, source))
                .collect(),
            size: 2,
            level: pt.level,
            log_scale: pt.log_scale,
            key_id: pk.id,
        })
    }
}

impl<S: Scheme> Decryption for Module<S> {
    fn decrypt(&self, ct: &Ciphertext<S>, sk: &SecretKey) -> Result<Plaintext<S>, BackendError> {
        Self::check_key(ct.key_id, sk.id)?;
        Ok(Plaintext {
            data: ct.data.clone(),
            level: ct.level,
            log_scale: ct.log_scale,
        })
    }
}

impl<S: Scheme> Evaluation for Module<S> {
    fn add(&self, a: &Ciphertext<S>, b: &Ciphertext<S>) -> Result<Ciphertext<S>, BackendError> {
        self.count(|c| c.add += 1);
        self.combine(a, b, S::add)
    }

    fn sub(&self, a: &Ciphertext<S>, b: &Ciphertext<S>) -> Result<Ciphertext<S>, BackendError> {
        self.count(|c| c.sub += 1);
        self.combine(a, b, S::sub)
    }

    fn add_plain(&self, a: &Ciphertext<S>, b: &Plaintext<S>) -> Result<Ciphertext<S>, BackendError> {
        self.count(|c| c.add_plain += 1);
        Self::check_same_level(a.level, b.level)?;
        Self::check_scale(a.log_scale, b.log_scale)?;
        Ok(Ciphertext {
            data: izip!(a.data.iter(), b.data.iter())
                .map(|(x, y)| S::add(&self.params, *x, *y))
                .collect(),
            ..a.clone()
        })
    }

    fn multiply(&self, a: &Ciphertext<S>, b: &Ciphertext<S>) -> Result<Ciphertext<S>, BackendError> {
        self.count(|c| c.multiply += 1);
        Self::check_key(a.key_id, b.key_id)?;
        if a.size != 2 || b.size != 2 {
            return Err(BackendError::NotRelinearized {
                size: a.size.max(b.size),
            });
        }
        Self::check_same_level(a.level, b.level)?;

        let min_level: usize = a.level.min(b.level);
        if min_level == 0 {
            return Err(BackendError::LevelExhausted { op: "multiply" });
        }

        // Approximate schemes spend the level at rescale time.
        let (level, log_scale) = if S::RESCALING {
            (min_level, a.log_scale + b.log_scale)
        } else {
            (min_level - 1, a.log_scale)
        };

        Ok(Ciphertext {
            data: izip!(a.data.iter(), b.data.iter())
                .map(|(x, y)| S::mul(&self.params, *x, *y))
                .collect(),
            size: 3,
            level,
            log_scale,
            key_id: a.key_id,
        })
    }

    fn multiply_plain(&self, a: &Ciphertext<S>, b: &Plaintext<S>) -> Result<Ciphertext<S>, BackendError> {
        self.count(|c| c.multiply_plain += 1);
        let log_scale: f64 = if S::RESCALING {
            Self::check_same_level(a.level, b.level)?;
            if a.level == 0 {
                return Err(BackendError::LevelExhausted { op: "multiply_plain" });
            }
            a.log_scale + b.log_scale
        } else {
            a.log_scale
        };

        Ok(Ciphertext {
            data: izip!(a.data.iter(), b.data.iter())
                .map(|(x, y)| S::mul(&self.params, *x, *y))
                .collect(),
            log_scale,
            ..a.clone()
        })
    }

    fn relinearize(&self, a: &Ciphertext<S>, rk: &RelinKey) -> Result<Ciphertext<S>, BackendError> {
        self.count(|c| c.relinearize += 1);
        Self::check_key(a.key_id, rk.id)?;
        Ok(Ciphertext { size: 2, ..a.clone() })
    }

    fn rotate(&self, a: &Ciphertext<S>, steps: i64, keys: &GaloisKeys) -> Result<Ciphertext<S>, BackendError> {
        if steps == 0 {
            return Ok(a.clone());
        }
        self.count(|c| c.rotate += 1);
        Self::check_key(a.key_id, keys.id)?;
        if !keys.contains(steps) {
            return Err(BackendError::MissingGaloisKey(steps));
        }

        let slots: usize = self.params.slots;
        let shift: usize = steps.rem_euclid(slots as i64) as usize;
        let mut data: Vec<S::Value> = a.data.clone();
        data.rotate_left(shift);
        Ok(Ciphertext { data, ..a.clone() })
    }

    fn has_rotation_key(&self, keys: &GaloisKeys, steps: i64) -> bool {
        steps == 0 || keys.contains(steps)
    }

    fn rescale(&self, a: &Ciphertext<S>) -> Result<Ciphertext<S>, BackendError> {
        if !S::RESCALING {
            return Err(BackendError::Unsupported {
                op: "rescale",
                scheme: S::NAME,
            });
        }
        self.count(|c| c.rescale += 1);
        if a.level == 0 {
            return Err(BackendError::LevelExhausted { op: "rescale" });
        }
        Ok(Ciphertext {
            level: a.level - 1,
            log_scale: a.log_scale - self.params.log_scale as f64,
            ..a.clone()
        })
    }

    fn level(&self, a: &Ciphertext<S>) -> usize {
        a.level
    }
}
