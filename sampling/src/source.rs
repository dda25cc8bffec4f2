use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_core::RngCore;

const MAXF64: f64 = 9007199254740992.0;

/// Seeded ChaCha8 stream used for encryption noise, key identifiers
/// and random test data. Two sources built from the same seed yield
/// the same stream.
pub struct Source {
    source: ChaCha8Rng,
}

/// Draws a fresh 32-byte seed from the thread-local OS-seeded generator.
pub fn new_seed() -> [u8; 32] {
    let mut seed = [0u8; 32];
    rand::rng().fill_bytes(&mut seed);
    seed
}

impl Source {
    pub fn new(seed: [u8; 32]) -> Source {
        Source {
            source: ChaCha8Rng::from_seed(seed),
        }
    }

    pub fn new_seed(&mut self) -> [u8; 32] {
        let mut seed: [u8; 32] = [0u8; 32];
        self.source.fill_bytes(&mut seed);
        seed
    }

    /// Returns an independent [Source] seeded from this one.
    pub fn branch(&mut self) -> Self {
        Source::new(self.new_seed())
    }

    /// Uniform value in [0, 2^bits).
    #[inline(always)]
    pub fn next_bits(&mut self, bits: usize) -> u64 {
        match bits {
            0 => 0,
            64.. => self.next_u64(),
            _ => self.next_u64() & ((1u64 << bits) - 1),
        }
    }

    #[inline(always)]
    pub fn next_bool(&mut self) -> bool {
        self.next_u64() & 1 == 1
    }

    /// Uniform value in [min, max).
    #[inline(always)]
    pub fn next_f64(&mut self, min: f64, max: f64) -> f64 {
        min + ((self.next_u64() << 11 >> 11) as f64) / MAXF64 * (max - min)
    }

    /// Fills `data` with uniform values in [min, max).
    pub fn fill_f64(&mut self, data: &mut [f64], min: f64, max: f64) {
        data.iter_mut().for_each(|x| *x = self.next_f64(min, max));
    }
}

impl RngCore for Source {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.source.next_u32()
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.source.next_u64()
    }

    #[inline(always)]
    fn fill_bytes(&mut self, bytes: &mut [u8]) {
        self.source.fill_bytes(bytes)
    }
}
