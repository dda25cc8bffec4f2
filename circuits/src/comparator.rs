use tracing::debug;

use crate::{
    bits::{EncryptedBit, EncryptedBitVector},
    boolean::{BitEvaluator, DepthCounter},
    error::CircuitError,
    session::{Session, SessionFamily},
};

fn check_widths<T>(lhs: &[T], rhs: &[T]) -> Result<(), CircuitError> {
    if lhs.len() != rhs.len() {
        return Err(CircuitError::WidthMismatch {
            lhs: lhs.len(),
            rhs: rhs.len(),
        });
    }
    if lhs.is_empty() {
        return Err(CircuitError::EmptyOperand);
    }
    Ok(())
}

/// 1 iff `lhs` and `rhs` are bit-identical: per-position XNOR folded by a
/// balanced AND tree of depth `ceil(log2(N))`.
pub fn equal_bits<E: BitEvaluator>(eval: &E, lhs: &[E::Bit], rhs: &[E::Bit]) -> Result<E::Bit, CircuitError> {
    check_widths(lhs, rhs)?;

    let mut v: Vec<E::Bit> = lhs
        .iter()
        .zip(rhs.iter())
        .map(|(a, b)| eval.not(&eval.xor(a, b)?))
        .collect::<Result<_, _>>()?;

    let size: usize = v.len();
    let mut k: usize = 1;
    while k < size {
        for i in (0..size - k).step_by(k << 1) {
            v[i] = eval.and(&v[i], &v[i + k])?;
        }
        k <<= 1;
    }
    Ok(v.swap_remove(0))
}

/// 1 iff `lhs < rhs` as unsigned integers stored least significant bit first.
///
/// The high half decides unless both high halves are equal, in which case the
/// low half does: `lower(hi) + equal(hi) * lower(lo)`.
pub fn lower_bits<E: BitEvaluator>(eval: &E, lhs: &[E::Bit], rhs: &[E::Bit]) -> Result<E::Bit, CircuitError> {
    check_widths(lhs, rhs)?;

    if lhs.len() == 1 {
        return eval.and(&eval.not(&lhs[0])?, &rhs[0]);
    }

    let mid: usize = lhs.len() >> 1;
    let (lhs_lo, lhs_hi) = lhs.split_at(mid);
    let (rhs_lo, rhs_hi) = rhs.split_at(mid);

    let lt_hi: E::Bit = lower_bits(eval, lhs_hi, rhs_hi)?;
    let eq_hi: E::Bit = equal_bits(eval, lhs_hi, rhs_hi)?;
    let lt_lo: E::Bit = lower_bits(eval, lhs_lo, rhs_lo)?;
    eval.xor(&lt_hi, &eval.and(&eq_hi, &lt_lo)?)
}

pub fn equal_depth(width: usize) -> usize {
    let zeros: Vec<usize> = vec![0; width.max(1)];
    equal_bits(&DepthCounter, &zeros, &zeros).unwrap_or(0)
}

pub fn lower_depth(width: usize) -> usize {
    let zeros: Vec<usize> = vec![0; width.max(1)];
    lower_bits(&DepthCounter, &zeros, &zeros).unwrap_or(0)
}

/// Encrypted `lhs == rhs`.
pub fn equal<B: SessionFamily>(
    session: &Session<B>,
    lhs: &EncryptedBitVector<B::Ciphertext>,
    rhs: &EncryptedBitVector<B::Ciphertext>,
) -> Result<EncryptedBit<B::Ciphertext>, CircuitError> {
    let (a, b) = EncryptedBitVector::check_operands(lhs, rhs)?;
    debug!(width = a.len(), depth = equal_depth(a.len()), "equality comparator");
    equal_bits(session, a, b)
}

/// Encrypted unsigned `lhs < rhs`.
pub fn lower<B: SessionFamily>(
    session: &Session<B>,
    lhs: &EncryptedBitVector<B::Ciphertext>,
    rhs: &EncryptedBitVector<B::Ciphertext>,
) -> Result<EncryptedBit<B::Ciphertext>, CircuitError> {
    let (a, b) = EncryptedBitVector::check_operands(lhs, rhs)?;
    debug!(width = a.len(), depth = lower_depth(a.len()), "less-than comparator");
    lower_bits(session, a, b)
}

#[cfg(test)]
mod tests {
    use backend::{Bfv, Ciphertext, Module, Parameters, PublicKey, RelinKey, SecretKey};
    use sampling::source::Source;
    use utils::log2_ceil;

    use super::{equal, equal_bits, equal_depth, lower, lower_bits, lower_depth};
    use crate::{
        bits::{BitOrder, EncryptedBit, EncryptedBitVector, decode_bit, encode_integer},
        boolean::{PlainBits, to_bits},
        error::CircuitError,
        session::Session,
    };

    #[test]
    fn plain_exhaustive_6_bits() {
        (0..64u64).for_each(|a| {
            (0..64u64).for_each(|b| {
                let (x, y) = (to_bits(a, 6), to_bits(b, 6));
                assert_eq!(equal_bits(&PlainBits, &x, &y).unwrap(), a == b, "{} == {}", a, b);
                assert_eq!(lower_bits(&PlainBits, &x, &y).unwrap(), a < b, "{} < {}", a, b);
            })
        });
    }

    #[test]
    fn plain_odd_widths() {
        let mut source: Source = Source::new([0u8; 32]);
        [1usize, 3, 5, 7, 11, 13].iter().for_each(|&width| {
            (0..256).for_each(|_| {
                let a: u64 = source.next_bits(width);
                let b: u64 = if source.next_bool() { a } else { source.next_bits(width) };
                let (x, y) = (to_bits(a, width), to_bits(b, width));
                assert_eq!(equal_bits(&PlainBits, &x, &y).unwrap(), a == b);
                assert_eq!(lower_bits(&PlainBits, &x, &y).unwrap(), a < b);
            })
        });
    }

    #[test]
    fn depths() {
        (1..=64usize).for_each(|width| assert_eq!(equal_depth(width), log2_ceil(width), "width={}", width));
        [1usize, 2, 4, 8, 16, 32, 64]
            .iter()
            .for_each(|&width| assert_eq!(lower_depth(width), log2_ceil(width) + 1, "width={}", width));
        assert_eq!(lower_depth(3), 2);
    }

    #[test]
    fn width_mismatch() {
        assert_eq!(
            lower_bits(&PlainBits, &[true, false], &[true]).unwrap_err(),
            CircuitError::WidthMismatch { lhs: 2, rhs: 1 }
        );
        assert_eq!(
            equal_bits(&PlainBits, &[true], &[]).unwrap_err(),
            CircuitError::WidthMismatch { lhs: 1, rhs: 0 }
        );
    }

    #[test]
    fn encrypted() {
        let width: usize = 5;
        let levels: usize = lower_depth(width).max(equal_depth(width));
        let module: Module<Bfv> = Module::new(Parameters::bfv(4, 2, levels)).unwrap();
        let mut source: Source = Source::new([0u8; 32]);
        let sk: SecretKey = module.gen_secret_key(&mut source);
        let pk: PublicKey = module.gen_public_key(&sk);
        let rk: RelinKey = module.gen_relin_key(&sk);
        let session: Session<Module<Bfv>> = Session::new(&module, &pk, &rk);

        [(0u64, 0u64), (3, 4), (4, 3), (17, 17), (30, 31), (31, 0), (9, 25)]
            .iter()
            .for_each(|&(a, b)| {
                println!("test encrypted comparator {} {}", a, b);
                let ca: EncryptedBitVector<Ciphertext<Bfv>> = encode_integer(&session, a, width, BitOrder::LsbFirst, &mut source).unwrap();
                let cb: EncryptedBitVector<Ciphertext<Bfv>> = encode_integer(&session, b, width, BitOrder::LsbFirst, &mut source).unwrap();
                let eq: EncryptedBit<Ciphertext<Bfv>> = equal(&session, &ca, &cb).unwrap();
                let lt: EncryptedBit<Ciphertext<Bfv>> = lower(&session, &ca, &cb).unwrap();
                assert_eq!(decode_bit(&module, &sk, &eq).unwrap(), a == b);
                assert_eq!(decode_bit(&module, &sk, &lt).unwrap(), a < b);
                assert_eq!(eq.ciphertext().level(), levels - equal_depth(width));
                assert_eq!(lt.ciphertext().level(), levels - lower_depth(width));
            });
    }

    #[test]
    fn mismatch_rejected_before_evaluation() {
        let module: Module<Bfv> = Module::new(Parameters::bfv(4, 2, 4)).unwrap();
        let mut source: Source = Source::new([0u8; 32]);
        let sk: SecretKey = module.gen_secret_key(&mut source);
        let pk: PublicKey = module.gen_public_key(&sk);
        let rk: RelinKey = module.gen_relin_key(&sk);
        let session: Session<Module<Bfv>> = Session::new(&module, &pk, &rk);

        let a: EncryptedBitVector<Ciphertext<Bfv>> = encode_integer(&session, 5, 4, BitOrder::LsbFirst, &mut source).unwrap();
        let b: EncryptedBitVector<Ciphertext<Bfv>> = encode_integer(&session, 5, 3, BitOrder::LsbFirst, &mut source).unwrap();
        module.reset_op_counts();
        assert_eq!(
            lower(&session, &a, &b).unwrap_err(),
            CircuitError::WidthMismatch { lhs: 4, rhs: 3 }
        );
        assert_eq!(
            equal(&session, &a, &b).unwrap_err(),
            CircuitError::WidthMismatch { lhs: 4, rhs: 3 }
        );
        assert_eq!(module.op_counts(), Default::default());
    }
}
