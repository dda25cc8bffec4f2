use backend::{Decoding, Decryption, Scalar};
use sampling::source::Source;

use crate::{
    error::CircuitError,
    session::{Session, SessionFamily},
};

/// Storage order of an [EncryptedBitVector].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitOrder {
    /// Index 0 holds the least significant bit. Circuits only accept this order.
    LsbFirst,
    /// Index 0 holds the most significant bit.
    MsbFirst,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftDirection {
    /// Multiplies by two.
    Left,
    /// Divides by two.
    Right,
}

/// Ciphertext whose slots all decrypt to 0 or 1.
#[derive(Clone, Debug)]
pub struct EncryptedBit<C>(pub(crate) C);

impl<C> EncryptedBit<C> {
    pub fn new(ct: C) -> Self {
        Self(ct)
    }

    pub fn ciphertext(&self) -> &C {
        &self.0
    }

    pub fn into_ciphertext(self) -> C {
        self.0
    }
}

/// Fixed-width unsigned integer stored as one [EncryptedBit] per position.
#[derive(Clone, Debug)]
pub struct EncryptedBitVector<C> {
    bits: Vec<EncryptedBit<C>>,
    order: BitOrder,
}

impl<C> EncryptedBitVector<C> {
    pub fn new(bits: Vec<EncryptedBit<C>>, order: BitOrder) -> Result<Self, CircuitError> {
        if bits.is_empty() {
            return Err(CircuitError::EmptyOperand);
        }
        Ok(Self { bits, order })
    }

    pub fn width(&self) -> usize {
        self.bits.len()
    }

    pub fn order(&self) -> BitOrder {
        self.order
    }

    /// Bits in storage order.
    pub fn bits(&self) -> &[EncryptedBit<C>] {
        &self.bits
    }

    pub fn into_bits(self) -> Vec<EncryptedBit<C>> {
        self.bits
    }

    /// Re-stores the vector in `order`; the encoded integer is unchanged.
    pub fn into_order(mut self, order: BitOrder) -> Self {
        if self.order != order {
            self.bits.reverse();
            self.order = order;
        }
        self
    }

    /// Returns the bits least significant first, failing if the vector is
    /// stored in another order.
    pub fn lsb_first(&self) -> Result<&[EncryptedBit<C>], CircuitError> {
        if self.order != BitOrder::LsbFirst {
            return Err(CircuitError::BitOrderMismatch {
                expected: BitOrder::LsbFirst,
                found: self.order,
            });
        }
        Ok(&self.bits)
    }

    /// Checks the contract shared by binary circuits: same width, both
    /// least significant bit first.
    pub fn check_operands<'a>(
        lhs: &'a Self,
        rhs: &'a Self,
    ) -> Result<(&'a [EncryptedBit<C>], &'a [EncryptedBit<C>]), CircuitError> {
        if lhs.width() != rhs.width() {
            return Err(CircuitError::WidthMismatch {
                lhs: lhs.width(),
                rhs: rhs.width(),
            });
        }
        Ok((lhs.lsb_first()?, rhs.lsb_first()?))
    }
}

impl<C: Clone> EncryptedBitVector<C> {
    /// Vector of `width` bits holding `bit` at the least significant position
    /// and encrypted zeros elsewhere.
    pub fn from_bit<B>(
        session: &Session<B>,
        bit: &EncryptedBit<C>,
        width: usize,
        source: &mut Source,
    ) -> Result<Self, CircuitError>
    where
        B: SessionFamily<Ciphertext = C>,
    {
        if width == 0 {
            return Err(CircuitError::EmptyOperand);
        }
        let mut bits: Vec<EncryptedBit<C>> = Vec::with_capacity(width);
        bits.push(bit.clone());
        (1..width).try_for_each(|_| -> Result<(), CircuitError> {
            bits.push(encrypt_bit(session, false, source)?);
            Ok(())
        })?;
        Ok(Self {
            bits,
            order: BitOrder::LsbFirst,
        })
    }
}

/// Encrypts `bit` replicated in every slot.
pub fn encrypt_bit<B: SessionFamily>(
    session: &Session<B>,
    bit: bool,
    source: &mut Source,
) -> Result<EncryptedBit<B::Ciphertext>, CircuitError> {
    Ok(EncryptedBit(
        session.encrypt_constant(B::Value::from_u64(bit as u64), source)?,
    ))
}

/// Encrypts the `width`-bit binary representation of `value`, one broadcast
/// ciphertext per bit, stored in `order`.
pub fn encode_integer<B: SessionFamily>(
    session: &Session<B>,
    value: u64,
    width: usize,
    order: BitOrder,
    source: &mut Source,
) -> Result<EncryptedBitVector<B::Ciphertext>, CircuitError> {
    if width == 0 {
        return Err(CircuitError::EmptyOperand);
    }
    if width > 64 {
        return Err(CircuitError::WidthTooLarge(width));
    }
    if width < 64 && value >> width != 0 {
        return Err(CircuitError::ValueOutOfRange { value, width });
    }

    let bits: Vec<EncryptedBit<B::Ciphertext>> = (0..width)
        .map(|i| encrypt_bit(session, (value >> i) & 1 == 1, source))
        .collect::<Result<_, _>>()?;

    Ok(EncryptedBitVector {
        bits,
        order: BitOrder::LsbFirst,
    }
    .into_order(order))
}

/// Decrypts a single bit from its first slot.
pub fn decode_bit<B>(backend: &B, sk: &B::SecretKey, bit: &EncryptedBit<B::Ciphertext>) -> Result<bool, CircuitError>
where
    B: Decryption + Decoding,
{
    decode_bit_at(backend, sk, bit, 0)
}

fn decode_bit_at<B>(
    backend: &B,
    sk: &B::SecretKey,
    bit: &EncryptedBit<B::Ciphertext>,
    index: usize,
) -> Result<bool, CircuitError>
where
    B: Decryption + Decoding,
{
    let values: Vec<B::Value> = backend.decode(&backend.decrypt(&bit.0, sk)?);
    let value: B::Value = values.first().copied().unwrap_or_else(B::Value::zero);
    if value == B::Value::zero() {
        Ok(false)
    } else if value == B::Value::one() {
        Ok(true)
    } else {
        Err(CircuitError::NotABit {
            index,
            value: value.as_f64(),
        })
    }
}

/// Decrypts every bit of `vector` and reassembles the integer according to
/// the vector's own order. Requires the secret key.
pub fn decode_bitvector<B>(
    backend: &B,
    sk: &B::SecretKey,
    vector: &EncryptedBitVector<B::Ciphertext>,
) -> Result<u64, CircuitError>
where
    B: Decryption + Decoding,
{
    if vector.width() > 64 {
        return Err(CircuitError::WidthTooLarge(vector.width()));
    }
    let width: usize = vector.width();
    vector
        .bits
        .iter()
        .enumerate()
        .try_fold(0u64, |acc: u64, (i, bit)| -> Result<u64, CircuitError> {
            let pos: usize = match vector.order {
                BitOrder::LsbFirst => i,
                BitOrder::MsbFirst => width - 1 - i,
            };
            Ok(acc | ((decode_bit_at(backend, sk, bit, i)? as u64) << pos))
        })
}

/// Logical shift by one position in numeric terms, filling the vacated bit
/// with an encrypted zero. The storage order is preserved.
pub fn shift<B: SessionFamily>(
    session: &Session<B>,
    vector: EncryptedBitVector<B::Ciphertext>,
    direction: ShiftDirection,
    source: &mut Source,
) -> Result<EncryptedBitVector<B::Ciphertext>, CircuitError> {
    let order: BitOrder = vector.order;
    let mut bits: Vec<EncryptedBit<B::Ciphertext>> = vector.into_order(BitOrder::LsbFirst).bits;
    let zero: EncryptedBit<B::Ciphertext> = encrypt_bit(session, false, source)?;
    match direction {
        ShiftDirection::Left => {
            bits.pop();
            bits.insert(0, zero);
        }
        ShiftDirection::Right => {
            bits.remove(0);
            bits.push(zero);
        }
    }
    Ok(EncryptedBitVector {
        bits,
        order: BitOrder::LsbFirst,
    }
    .into_order(order))
}

#[cfg(test)]
mod tests {
    use backend::{Bfv, Ciphertext, Module, Parameters, PublicKey, RelinKey, SecretKey};
    use sampling::source::Source;

    use super::{BitOrder, EncryptedBitVector, ShiftDirection, decode_bitvector, encode_integer, encrypt_bit, shift};
    use crate::{error::CircuitError, session::Session};

    fn setup() -> (Module<Bfv>, SecretKey, PublicKey, RelinKey, Source) {
        let module: Module<Bfv> = Module::new(Parameters::bfv(8, 2, 4)).unwrap();
        let mut source: Source = Source::new([0u8; 32]);
        let sk: SecretKey = module.gen_secret_key(&mut source);
        let pk: PublicKey = module.gen_public_key(&sk);
        let rk: RelinKey = module.gen_relin_key(&sk);
        (module, sk, pk, rk, source)
    }

    #[test]
    fn encode_decode() {
        let (module, sk, pk, rk, mut source) = setup();
        let session: Session<Module<Bfv>> = Session::new(&module, &pk, &rk);
        [0u64, 1, 30, 127, 255].iter().for_each(|&x| {
            [BitOrder::LsbFirst, BitOrder::MsbFirst].iter().for_each(|&order| {
                let v: EncryptedBitVector<Ciphertext<Bfv>> = encode_integer(&session, x, 8, order, &mut source).unwrap();
                assert_eq!(v.width(), 8);
                assert_eq!(v.order(), order);
                assert_eq!(decode_bitvector(&module, &sk, &v).unwrap(), x);
                assert_eq!(
                    decode_bitvector(&module, &sk, &v.into_order(BitOrder::LsbFirst)).unwrap(),
                    x
                );
            })
        });
    }

    #[test]
    fn encode_rejects_bad_width() {
        let (module, _, pk, rk, mut source) = setup();
        let session: Session<Module<Bfv>> = Session::new(&module, &pk, &rk);
        assert_eq!(
            encode_integer(&session, 256, 8, BitOrder::LsbFirst, &mut source).unwrap_err(),
            CircuitError::ValueOutOfRange { value: 256, width: 8 }
        );
        assert_eq!(
            encode_integer(&session, 0, 0, BitOrder::LsbFirst, &mut source).unwrap_err(),
            CircuitError::EmptyOperand
        );
        assert_eq!(
            encode_integer(&session, 0, 65, BitOrder::LsbFirst, &mut source).unwrap_err(),
            CircuitError::WidthTooLarge(65)
        );
    }

    #[test]
    fn lsb_first_required() {
        let (module, _, pk, rk, mut source) = setup();
        let session: Session<Module<Bfv>> = Session::new(&module, &pk, &rk);
        let a: EncryptedBitVector<Ciphertext<Bfv>> = encode_integer(&session, 3, 4, BitOrder::MsbFirst, &mut source).unwrap();
        let b: EncryptedBitVector<Ciphertext<Bfv>> = encode_integer(&session, 3, 4, BitOrder::LsbFirst, &mut source).unwrap();
        assert_eq!(
            EncryptedBitVector::check_operands(&a, &b).unwrap_err(),
            CircuitError::BitOrderMismatch {
                expected: BitOrder::LsbFirst,
                found: BitOrder::MsbFirst
            }
        );
        let c: EncryptedBitVector<Ciphertext<Bfv>> = encode_integer(&session, 3, 5, BitOrder::LsbFirst, &mut source).unwrap();
        assert_eq!(
            EncryptedBitVector::check_operands(&b, &c).unwrap_err(),
            CircuitError::WidthMismatch { lhs: 4, rhs: 5 }
        );
    }

    #[test]
    fn shift_both_directions() {
        let (module, sk, pk, rk, mut source) = setup();
        let session: Session<Module<Bfv>> = Session::new(&module, &pk, &rk);
        [BitOrder::LsbFirst, BitOrder::MsbFirst].iter().for_each(|&order| {
            let v: EncryptedBitVector<Ciphertext<Bfv>> = encode_integer(&session, 0b1011_0110, 8, order, &mut source).unwrap();
            let l: EncryptedBitVector<Ciphertext<Bfv>> = shift(&session, v.clone(), ShiftDirection::Left, &mut source).unwrap();
            let r: EncryptedBitVector<Ciphertext<Bfv>> = shift(&session, v, ShiftDirection::Right, &mut source).unwrap();
            assert_eq!(l.order(), order);
            assert_eq!(decode_bitvector(&module, &sk, &l).unwrap(), 0b0110_1100);
            assert_eq!(decode_bitvector(&module, &sk, &r).unwrap(), 0b0101_1011);
        });
    }

    #[test]
    fn from_bit() {
        let (module, sk, pk, rk, mut source) = setup();
        let session: Session<Module<Bfv>> = Session::new(&module, &pk, &rk);
        let one = encrypt_bit(&session, true, &mut source).unwrap();
        let v: EncryptedBitVector<Ciphertext<Bfv>> = EncryptedBitVector::from_bit(&session, &one, 8, &mut source).unwrap();
        assert_eq!(v.width(), 8);
        assert_eq!(decode_bitvector(&module, &sk, &v).unwrap(), 1);
    }

    #[test]
    fn not_a_bit() {
        let module: Module<Bfv> = Module::new(Parameters::bfv(8, 17, 2)).unwrap();
        let mut source: Source = Source::new([0u8; 32]);
        let sk: SecretKey = module.gen_secret_key(&mut source);
        let pk: PublicKey = module.gen_public_key(&sk);
        let rk: RelinKey = module.gen_relin_key(&sk);
        let session: Session<Module<Bfv>> = Session::new(&module, &pk, &rk);
        let v: EncryptedBitVector<Ciphertext<Bfv>> = encode_integer(&session, 1, 2, BitOrder::LsbFirst, &mut source).unwrap();
        let bits = v.into_bits();
        let two = session.add(bits[0].ciphertext(), bits[0].ciphertext()).unwrap();
        let bad: EncryptedBitVector<Ciphertext<Bfv>> =
            EncryptedBitVector::new(vec![bits[1].clone(), super::EncryptedBit::new(two)], BitOrder::LsbFirst).unwrap();
        assert_eq!(
            decode_bitvector(&module, &sk, &bad).unwrap_err(),
            CircuitError::NotABit { index: 1, value: 2.0 }
        );
    }
}
