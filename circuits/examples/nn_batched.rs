//! Batched two-layer network on an encrypted 32x32 image with square
//! activations. Both products use the hybrid BSGS engine.

use backend::{Ciphertext, Ckks, Decoding, Decryption, GaloisKeys, Module, Parameters, PublicKey, RelinKey, SecretKey};
use circuits::{
    CircuitError, Session,
    mvp::{DenseLayer, approx_equal, duplicate, enc_general_mvp_from_diagonals, general_rotation_steps, mul_vectors, random_vector},
};
use sampling::source::{Source, new_seed};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

type Ct = Ciphertext<Ckks>;

fn dense_square(session: &Session<Module<Ckks>>, layer: &DenseLayer, input: &Ct) -> Result<Ct, CircuitError> {
    let r: Ct = enc_general_mvp_from_diagonals(session, layer.weights_as_diagonals(), input)?;
    let r: Ct = session.rescale(&session.add_values(&r, layer.bias())?)?;
    session.square(&r)
}

/// Keeps slots `0..units` and copies them to `units..2 * units`, giving the
/// duplicated layout the next product expects.
fn mask_and_duplicate(session: &Session<Module<Ckks>>, ct: &Ct, units: usize) -> Result<Ct, CircuitError> {
    let masked: Ct = session.multiply_values(ct, &vec![1.0; units])?;
    let mut out: Ct = session.rotate(&masked, -(units as i64))?;
    session.add_inplace(&mut out, &masked)?;
    session.rescale(&out)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let (input_size, units1, units2) = (1024usize, 32usize, 16usize);

    let module: Module<Ckks> = Module::new(Parameters::ckks(1 << 13, 7, 40))?;
    let mut source: Source = Source::new(new_seed());
    let sk: SecretKey = module.gen_secret_key(&mut source);
    let pk: PublicKey = module.gen_public_key(&sk);
    let rk: RelinKey = module.gen_relin_key(&sk);

    let mut steps: Vec<i64> = general_rotation_steps(units1, input_size)?;
    steps.extend(general_rotation_steps(units2, units1)?);
    steps.push(-(units1 as i64));
    let gk: GaloisKeys = module.gen_galois_keys(&sk, &steps);
    info!("galois keys: {}", gk.len());

    let session: Session<Module<Ckks>> = Session::new(&module, &pk, &rk).with_galois_keys(&gk);

    let d1: DenseLayer = DenseLayer::random(units1, input_size, &mut source)?;
    let d2: DenseLayer = DenseLayer::random(units2, units1, &mut source)?;
    let image: Vec<f64> = random_vector(input_size, &mut source);
    let input: Ct = session.encrypt_values(&duplicate(&image), &mut source)?;

    let hidden: Ct = session.rescale(&dense_square(&session, &d1, &input)?)?;
    let hidden: Ct = mask_and_duplicate(&session, &hidden, units1)?;
    let out: Ct = dense_square(&session, &d2, &hidden)?;
    info!("output level: {}", out.level());

    let mut have: Vec<f64> = module.decode(&module.decrypt(&out, &sk)?);
    have.truncate(units2);

    let h: Vec<f64> = d1.forward_plain(&image)?;
    let o: Vec<f64> = d2.forward_plain(&mul_vectors(&h, &h)?)?;
    let want: Vec<f64> = mul_vectors(&o, &o)?;

    (0..10).for_each(|i| info!("{:>2}: {:.10} (plain {:.10})", i, have[i], want[i]));
    info!("matches plain: {}", approx_equal(&have, &want, 1e-6)?);
    info!("operations: {}", module.op_counts());
    Ok(())
}
