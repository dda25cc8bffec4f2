use utils::Map;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretKey {
    pub(crate) id: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub(crate) id: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelinKey {
    pub(crate) id: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GaloisKey {
    pub(crate) step: i64,
    pub(crate) element: i64,
}

impl GaloisKey {
    pub fn step(&self) -> i64 {
        self.step
    }

    /// Galois element of the automorphism X -> X^element.
    pub fn element(&self) -> i64 {
        self.element
    }
}

/// Rotation keys indexed by rotation step.
#[derive(Clone, Debug)]
pub struct GaloisKeys {
    pub(crate) id: u64,
    pub(crate) keys: Map<i64, GaloisKey>,
}

impl GaloisKeys {
    pub fn get(&self, step: i64) -> Option<&GaloisKey> {
        self.keys.get(&step)
    }

    pub fn contains(&self, step: i64) -> bool {
        self.keys.contains_key(&step)
    }

    /// Steps in ascending order.
    pub fn steps(&self) -> Vec<i64> {
        self.keys.sorted_keys()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

macro_rules! key_id {
    ($($t:ty),*) => {
        $(impl $t {
            pub fn id(&self) -> u64 {
                self.id
            }
        })*
    };
}

key_id!(SecretKey, PublicKey, RelinKey, GaloisKeys);
