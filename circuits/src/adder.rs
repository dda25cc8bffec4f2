use tracing::debug;
use utils::log2_ceil;

use crate::{
    bits::{BitOrder, EncryptedBitVector},
    boolean::{BitEvaluator, DepthCounter},
    error::CircuitError,
    session::{Session, SessionFamily},
};

/// Sparse N x N table of propagate or generate signals.
struct PrefixTable<T> {
    size: usize,
    cells: Vec<Option<T>>,
}

impl<T> PrefixTable<T> {
    fn new(size: usize) -> Self {
        Self {
            size,
            cells: (0..size * size).map(|_| None).collect(),
        }
    }

    fn at(&self, row: usize, col: usize) -> &T {
        match &self.cells[row * self.size + col] {
            Some(x) => x,
            None => panic!("prefix cell [{}][{}] read before it was written", row, col),
        }
    }

    fn set(&mut self, row: usize, col: usize, value: T) {
        self.cells[row * self.size + col] = Some(value)
    }
}

/// Sklansky parallel-prefix addition of two equal-width operands, least
/// significant bit first. Returns `lhs + rhs mod 2^N`.
///
/// Multiplicative depth is `1 + ceil(log2(N - 1))` for N >= 2 (see [adder_depth]).
pub fn sklansky_add<E: BitEvaluator>(eval: &E, lhs: &[E::Bit], rhs: &[E::Bit]) -> Result<Vec<E::Bit>, CircuitError> {
    if lhs.len() != rhs.len() {
        return Err(CircuitError::WidthMismatch {
            lhs: lhs.len(),
            rhs: rhs.len(),
        });
    }
    if lhs.is_empty() {
        return Err(CircuitError::EmptyOperand);
    }

    let size: usize = lhs.len();
    let mut p: PrefixTable<E::Bit> = PrefixTable::new(size);
    let mut g: PrefixTable<E::Bit> = PrefixTable::new(size);

    for i in 0..size {
        p.set(i, i, eval.xor(&lhs[i], &rhs[i])?);
        if i < size - 1 {
            g.set(i, i, eval.and(&lhs[i], &rhs[i])?);
        }
    }

    let steps: usize = log2_ceil(size - 1);
    for s in 1..=steps {
        let half: usize = 1 << (s - 1);
        let span: usize = 1 << s;
        let mut row: usize = half;
        while row < size - 1 {
            let col: usize = (row / span) * span;
            let k: usize = col + half;
            for _ in 0..half {
                let carry: E::Bit = eval.and(p.at(row, k), g.at(k - 1, col))?;
                let generate: E::Bit = eval.xor(g.at(row, k), &carry)?;
                if col != 0 {
                    let prop: E::Bit = eval.and(p.at(row, k), p.at(k - 1, col))?;
                    p.set(row, col, prop);
                }
                g.set(row, col, generate);
                row += 1;
                if row == size - 1 {
                    break;
                }
            }
            row += half;
        }
    }

    let mut res: Vec<E::Bit> = Vec::with_capacity(size);
    res.push(p.at(0, 0).clone());
    for i in 1..size {
        res.push(eval.xor(p.at(i, i), g.at(i - 1, 0))?);
    }
    Ok(res)
}

/// Multiplicative depth of [sklansky_add] on `width`-bit operands.
pub fn adder_depth(width: usize) -> usize {
    let zeros: Vec<usize> = vec![0; width.max(1)];
    sklansky_add(&DepthCounter, &zeros, &zeros)
        .map(|bits| bits.into_iter().max().unwrap_or(0))
        .unwrap_or(0)
}

/// Encrypted `lhs + rhs mod 2^N`. Operands must share their width and be
/// stored least significant bit first.
pub fn add<B: SessionFamily>(
    session: &Session<B>,
    lhs: &EncryptedBitVector<B::Ciphertext>,
    rhs: &EncryptedBitVector<B::Ciphertext>,
) -> Result<EncryptedBitVector<B::Ciphertext>, CircuitError> {
    let (a, b) = EncryptedBitVector::check_operands(lhs, rhs)?;
    debug!(
        width = a.len(),
        steps = log2_ceil(a.len().saturating_sub(1)),
        depth = adder_depth(a.len()),
        "sklansky adder"
    );
    EncryptedBitVector::new(sklansky_add(session, a, b)?, BitOrder::LsbFirst)
}

#[cfg(test)]
mod tests {
    use backend::{Bfv, Ciphertext, Module, Parameters, PublicKey, RelinKey, SecretKey};
    use sampling::source::Source;
    use utils::log2_ceil;

    use super::{add, adder_depth, sklansky_add};
    use crate::{
        bits::{BitOrder, EncryptedBitVector, decode_bitvector, encode_integer},
        boolean::{PlainBits, from_bits, to_bits},
        error::CircuitError,
        session::Session,
    };

    #[test]
    fn plain_exhaustive_8_bits() {
        (0..256u64).for_each(|a| {
            (0..256u64).for_each(|b| {
                let sum: Vec<bool> = sklansky_add(&PlainBits, &to_bits(a, 8), &to_bits(b, 8)).unwrap();
                assert_eq!(from_bits(&sum), (a + b) & 0xFF, "{} + {}", a, b);
            })
        });
    }

    #[test]
    fn plain_all_widths() {
        let mut source: Source = Source::new([0u8; 32]);
        (1..=33usize).for_each(|width| {
            let mask: u64 = (1u64 << width) - 1;
            (0..64).for_each(|_| {
                let a: u64 = source.next_bits(width);
                let b: u64 = source.next_bits(width);
                let sum: Vec<bool> = sklansky_add(&PlainBits, &to_bits(a, width), &to_bits(b, width)).unwrap();
                assert_eq!(from_bits(&sum), (a + b) & mask, "width={} {} + {}", width, a, b);
            })
        });
    }

    #[test]
    fn depth() {
        assert_eq!(adder_depth(1), 0);
        (2..=64usize).for_each(|width| assert_eq!(adder_depth(width), 1 + log2_ceil(width - 1), "width={}", width));
    }

    #[test]
    fn width_mismatch() {
        assert_eq!(
            sklansky_add(&PlainBits, &[true, false], &[true]).unwrap_err(),
            CircuitError::WidthMismatch { lhs: 2, rhs: 1 }
        );
        assert_eq!(
            sklansky_add(&PlainBits, &[], &[]).unwrap_err(),
            CircuitError::EmptyOperand
        );
    }

    #[test]
    fn encrypted() {
        let width: usize = 6;
        let module: Module<Bfv> = Module::new(Parameters::bfv(4, 2, adder_depth(width))).unwrap();
        let mut source: Source = Source::new([0u8; 32]);
        let sk: SecretKey = module.gen_secret_key(&mut source);
        let pk: PublicKey = module.gen_public_key(&sk);
        let rk: RelinKey = module.gen_relin_key(&sk);
        let session: Session<Module<Bfv>> = Session::new(&module, &pk, &rk);

        [(0u64, 0u64), (1, 1), (21, 42), (63, 1), (37, 50), (63, 63)]
            .iter()
            .for_each(|&(a, b)| {
                println!("test encrypted adder {} + {}", a, b);
                let ca: EncryptedBitVector<Ciphertext<Bfv>> = encode_integer(&session, a, width, BitOrder::LsbFirst, &mut source).unwrap();
                let cb: EncryptedBitVector<Ciphertext<Bfv>> = encode_integer(&session, b, width, BitOrder::LsbFirst, &mut source).unwrap();
                let sum: EncryptedBitVector<Ciphertext<Bfv>> = add(&session, &ca, &cb).unwrap();
                assert_eq!(decode_bitvector(&module, &sk, &sum).unwrap(), (a + b) % 64);
                assert_eq!(
                    sum.bits().iter().map(|bit| bit.ciphertext().level()).min(),
                    Some(0)
                );
            });
    }

    #[test]
    fn encrypted_rejects_msb_first() {
        let module: Module<Bfv> = Module::new(Parameters::bfv(4, 2, 4)).unwrap();
        let mut source: Source = Source::new([0u8; 32]);
        let sk: SecretKey = module.gen_secret_key(&mut source);
        let pk: PublicKey = module.gen_public_key(&sk);
        let rk: RelinKey = module.gen_relin_key(&sk);
        let session: Session<Module<Bfv>> = Session::new(&module, &pk, &rk);

        let a: EncryptedBitVector<Ciphertext<Bfv>> = encode_integer(&session, 5, 4, BitOrder::MsbFirst, &mut source).unwrap();
        let b: EncryptedBitVector<Ciphertext<Bfv>> = encode_integer(&session, 5, 4, BitOrder::LsbFirst, &mut source).unwrap();
        module.reset_op_counts();
        assert!(matches!(
            add(&session, &a, &b).unwrap_err(),
            CircuitError::BitOrderMismatch { .. }
        ));
        assert_eq!(module.op_counts().multiply, 0);

        let sum = add(&session, &a.into_order(BitOrder::LsbFirst), &b).unwrap();
        assert_eq!(decode_bitvector(&module, &sk, &sum).unwrap(), 10);
    }
}
