//! Chi-squared test statistic for genotype counts, evaluated on encrypted
//! counts N0, N1, N2 over BFV slots:
//!
//! alpha  = (4 N0 N2 - N1^2)^2
//! beta_1 = 2 (2 N0 + N1)^2
//! beta_2 = (2 N0 + N1)(2 N2 + N1)
//! beta_3 = 2 (2 N2 + N1)^2

use backend::{Bfv, Ciphertext, Decoding, Decryption, Module, Parameters, PublicKey, RelinKey, SecretKey};
use circuits::{CircuitError, Session};
use sampling::source::{Source, new_seed};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

type Ct = Ciphertext<Bfv>;

struct Statistic {
    alpha: Ct,
    beta_1: Ct,
    beta_2: Ct,
    beta_3: Ct,
}

fn alpha_betas(session: &Session<Module<Bfv>>, n0: &Ct, n1: &Ct, n2: &Ct) -> Result<Statistic, CircuitError> {
    let four_n0_n2: Ct = session.multiply(&session.multiply_scalar(n0, 4)?, n2)?;
    let alpha: Ct = session.square(&session.sub(&four_n0_n2, &session.square(n1)?)?)?;

    let lhs: Ct = session.add(&session.multiply_scalar(n0, 2)?, n1)?;
    let rhs: Ct = session.add(&session.multiply_scalar(n2, 2)?, n1)?;

    Ok(Statistic {
        alpha,
        beta_1: session.multiply_scalar(&session.square(&lhs)?, 2)?,
        beta_2: session.multiply(&lhs, &rhs)?,
        beta_3: session.multiply_scalar(&session.square(&rhs)?, 2)?,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let module: Module<Bfv> = Module::new(Parameters::bfv(1 << 12, 65537, 2))?;
    let mut source: Source = Source::new(new_seed());
    let sk: SecretKey = module.gen_secret_key(&mut source);
    let pk: PublicKey = module.gen_public_key(&sk);
    let rk: RelinKey = module.gen_relin_key(&sk);
    let session: Session<Module<Bfv>> = Session::new(&module, &pk, &rk);

    let (n0, n1, n2) = (2u64, 7u64, 9u64);
    let c0: Ct = session.encrypt_constant(n0, &mut source)?;
    let c1: Ct = session.encrypt_constant(n1, &mut source)?;
    let c2: Ct = session.encrypt_constant(n2, &mut source)?;

    let stat: Statistic = alpha_betas(&session, &c0, &c1, &c2)?;

    let reveal = |ct: &Ct| -> Result<u64, Box<dyn std::error::Error>> {
        Ok(module.decode(&module.decrypt(ct, &sk)?)[0])
    };
    info!("alpha: {} (expected {})", reveal(&stat.alpha)?, (4 * n0 * n2 - n1 * n1).pow(2));
    info!("beta_1: {} (expected {})", reveal(&stat.beta_1)?, 2 * (2 * n0 + n1).pow(2));
    info!("beta_2: {} (expected {})", reveal(&stat.beta_2)?, (2 * n0 + n1) * (2 * n2 + n1));
    info!("beta_3: {} (expected {})", reveal(&stat.beta_3)?, 2 * (2 * n2 + n1).pow(2));
    info!("operations: {}", module.op_counts());
    Ok(())
}
