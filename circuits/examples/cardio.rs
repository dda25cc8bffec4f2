//! Cardiovascular risk score over encrypted 8-bit patient records.
//!
//! Flags (least significant bit first): sex, antecedent, smoker, diabetes,
//! high pressure. Each satisfied condition adds one point to the score.

use backend::{Bfv, Ciphertext, Module, Parameters, PublicKey, RelinKey, SecretKey};
use circuits::{
    BitEvaluator, BitOrder, CircuitError, EncryptedBit, EncryptedBitVector, Session,
    adder::add,
    comparator::lower,
    decode_bitvector, encode_integer,
};
use sampling::source::{Source, new_seed};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

const WIDTH: usize = 8;

type Ct = Ciphertext<Bfv>;

struct Record {
    flags: u64,
    age: u64,
    hdl: u64,
    height: u64,
    weight: u64,
    physical_act: u64,
    drinking: u64,
}

fn risk_score(
    session: &Session<Module<Bfv>>,
    record: &Record,
    source: &mut Source,
) -> Result<EncryptedBitVector<Ct>, CircuitError> {
    let mut enc = |value: u64| encode_integer(session, value, WIDTH, BitOrder::LsbFirst, source);

    let flags: EncryptedBitVector<Ct> = enc(record.flags)?;
    let age: EncryptedBitVector<Ct> = enc(record.age)?;
    let hdl: EncryptedBitVector<Ct> = enc(record.hdl)?;
    let height: EncryptedBitVector<Ct> = enc(record.height)?;
    let weight: EncryptedBitVector<Ct> = enc(record.weight)?;
    let physical_act: EncryptedBitVector<Ct> = enc(record.physical_act)?;
    let drinking: EncryptedBitVector<Ct> = enc(record.drinking)?;

    let f: &[EncryptedBit<Ct>] = flags.bits();
    let male: &EncryptedBit<Ct> = &f[0];
    let female: EncryptedBit<Ct> = session.not(male)?;

    // Threshold conditions, each a single encrypted bit.
    let c1: EncryptedBit<Ct> = session.and(male, &lower(session, &enc(50)?, &age)?)?;
    let c2: EncryptedBit<Ct> = session.and(&female, &lower(session, &enc(60)?, &age)?)?;
    let c7: EncryptedBit<Ct> = lower(session, &hdl, &enc(40)?)?;
    // weight > height - 90  <=>  height < weight + 90
    let c8: EncryptedBit<Ct> = lower(session, &height, &add(session, &weight, &enc(90)?)?)?;
    let c9: EncryptedBit<Ct> = lower(session, &physical_act, &enc(30)?)?;
    let c10: EncryptedBit<Ct> = session.and(male, &lower(session, &enc(3)?, &drinking)?)?;
    let c11: EncryptedBit<Ct> = session.and(&female, &lower(session, &enc(2)?, &drinking)?)?;

    let mut lift = |bit: &EncryptedBit<Ct>| EncryptedBitVector::from_bit(session, bit, WIDTH, source);
    let mut terms: Vec<EncryptedBitVector<Ct>> = vec![
        add(session, &lift(&c2)?, &lift(&c1)?)?,
        add(session, &lift(&f[1])?, &lift(&f[2])?)?,
        add(session, &lift(&f[3])?, &lift(&f[4])?)?,
        add(session, &lift(&c7)?, &lift(&c8)?)?,
        add(session, &add(session, &lift(&c9)?, &lift(&c10)?)?, &lift(&c11)?)?,
    ];

    // Pairwise tree keeps the adder chain shallow.
    while terms.len() > 1 {
        let mut next: Vec<EncryptedBitVector<Ct>> = Vec::with_capacity(terms.len().div_ceil(2));
        for pair in terms.chunks(2) {
            match pair {
                [a, b] => next.push(add(session, a, b)?),
                _ => next.extend_from_slice(pair),
            }
        }
        terms = next;
    }
    terms.pop().ok_or(CircuitError::EmptyOperand)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let module: Module<Bfv> = Module::new(Parameters::bfv(16, 2, 32))?;
    let mut source: Source = Source::new(new_seed());
    let sk: SecretKey = module.gen_secret_key(&mut source);
    let pk: PublicKey = module.gen_public_key(&sk);
    let rk: RelinKey = module.gen_relin_key(&sk);
    let session: Session<Module<Bfv>> = Session::new(&module, &pk, &rk);

    let record: Record = Record {
        flags: 30,
        age: 55,
        hdl: 50,
        height: 80,
        weight: 80,
        physical_act: 45,
        drinking: 4,
    };

    let score: EncryptedBitVector<Ct> = risk_score(&session, &record, &mut source)?;
    info!("operations: {}", module.op_counts());
    info!("risk score: {}", decode_bitvector(&module, &sk, &score)?);
    Ok(())
}
