//! Diagonal matrix-vector products with an encrypted vector.
//!
//! The input ciphertext must pack the duplicated vector `v || v` in its first
//! `2n` slots, so every rotation by less than `n` reads a full copy of `v`.
//! Diagonals are pre-rotated in the clear, extended periodically to `2n`
//! slots and encoded at the level and scale of the ciphertext they multiply.
//!
//! Products are left unrescaled: the result carries the product of the input
//! and encoding scales, and the caller rescales.

use tracing::debug;

use crate::{
    error::CircuitError,
    mvp::{
        BsgsPlan,
        plain::{check_diagonals, check_square, rotate},
    },
    session::{Session, SessionFamily},
};

/// Steps used by [enc_mvp_from_diagonals] on dimension `n`.
pub fn diagonal_rotation_steps(n: usize) -> Vec<i64> {
    (1..n as i64).collect()
}

/// Steps used by [enc_mvp_from_diagonals_bsgs] on dimension `n`.
pub fn bsgs_rotation_steps(n: usize) -> Result<Vec<i64>, CircuitError> {
    Ok(BsgsPlan::square(n)?.rotation_steps())
}

/// Steps used by [enc_general_mvp_from_diagonals] on a `m x n` matrix.
pub fn general_rotation_steps(m: usize, n: usize) -> Result<Vec<i64>, CircuitError> {
    Ok(BsgsPlan::general(m, n)?.rotation_steps())
}

fn extend_periodic(w: &[f64], len: usize) -> Vec<f64> {
    (0..len).map(|u| w[u % w.len()]).collect()
}

fn check_ciphertext<B>(session: &Session<B>, ct: &B::Ciphertext, n: usize, steps: &[i64]) -> Result<(), CircuitError>
where
    B: SessionFamily<Value = f64>,
{
    let needed: usize = n << 1;
    let available: usize = session.slot_count();
    if available < needed {
        return Err(CircuitError::SlotCapacity { needed, available });
    }
    session.check_level(ct, 1)?;
    session.check_rotation_keys(steps)
}

fn accumulate<B>(session: &Session<B>, acc: &mut Option<B::Ciphertext>, term: B::Ciphertext) -> Result<(), CircuitError>
where
    B: SessionFamily<Value = f64>,
{
    match acc {
        Some(a) => session.add_inplace(a, &term),
        None => {
            *acc = Some(term);
            Ok(())
        }
    }
}

fn diagonal_count(diagonals: &[Vec<f64>]) -> usize {
    diagonals.first().map(Vec::len).unwrap_or(0)
}

/// `M * v` for a square `n x n` matrix, one rotation per non-main diagonal.
/// Valid result slots: `0..n`.
pub fn enc_mvp_from_diagonals<B>(
    session: &Session<B>,
    diagonals: &[Vec<f64>],
    ct: &B::Ciphertext,
) -> Result<B::Ciphertext, CircuitError>
where
    B: SessionFamily<Value = f64>,
{
    let n: usize = diagonal_count(diagonals);
    check_square(diagonals, n)?;
    check_ciphertext(session, ct, n, &diagonal_rotation_steps(n))?;
    debug!(n, rotations = n - 1, "diagonal mvp");

    let mut acc: Option<B::Ciphertext> = None;
    for (d, diag) in diagonals.iter().enumerate() {
        let term: B::Ciphertext = if d == 0 {
            session.multiply_values(ct, &extend_periodic(diag, n << 1))?
        } else {
            session.multiply_values(&session.rotate(ct, d as i64)?, &extend_periodic(diag, n << 1))?
        };
        accumulate(session, &mut acc, term)?;
    }
    acc.ok_or(CircuitError::EmptyOperand)
}

fn enc_bsgs_accumulate<B>(
    session: &Session<B>,
    plan: &BsgsPlan,
    diagonals: &[Vec<f64>],
    ct: &B::Ciphertext,
) -> Result<B::Ciphertext, CircuitError>
where
    B: SessionFamily<Value = f64>,
{
    let len: usize = plan.n << 1;
    let baby: Vec<B::Ciphertext> = (0..plan.n1)
        .map(|i| match i {
            0 => Ok(ct.clone()),
            _ => session.rotate(ct, i as i64),
        })
        .collect::<Result<_, _>>()?;

    let mut acc: Option<B::Ciphertext> = None;
    for j in 0..plan.n2 {
        let giant: i64 = (j * plan.n1) as i64;
        let mut inner: Option<B::Ciphertext> = None;
        for (i, rv) in baby.iter().enumerate() {
            let w: Vec<f64> = rotate(&diagonals[j * plan.n1 + i], -giant);
            let term: B::Ciphertext = session.multiply_values(rv, &extend_periodic(&w, len))?;
            accumulate(session, &mut inner, term)?;
        }
        let inner: B::Ciphertext = inner.ok_or(CircuitError::EmptyOperand)?;
        let rotated: B::Ciphertext = match j {
            0 => inner,
            _ => session.rotate(&inner, giant)?,
        };
        accumulate(session, &mut acc, rotated)?;
    }
    acc.ok_or(CircuitError::EmptyOperand)
}

/// `M * v` for a square `n x n` matrix with `n1 - 1` baby-step and `n2 - 1`
/// giant-step rotations. Valid result slots: `0..n`.
pub fn enc_mvp_from_diagonals_bsgs<B>(
    session: &Session<B>,
    diagonals: &[Vec<f64>],
    ct: &B::Ciphertext,
) -> Result<B::Ciphertext, CircuitError>
where
    B: SessionFamily<Value = f64>,
{
    let n: usize = diagonal_count(diagonals);
    check_square(diagonals, n)?;
    let plan: BsgsPlan = BsgsPlan::square(n)?;
    check_ciphertext(session, ct, n, &plan.rotation_steps())?;
    debug!(
        n,
        n1 = plan.n1,
        n2 = plan.n2,
        rotations = plan.rotation_count(),
        "bsgs mvp"
    );
    enc_bsgs_accumulate(session, &plan, diagonals, ct)
}

/// `M * v` for a squat `m x n` matrix given by its `m` generalized diagonals,
/// `m | n`. Valid result slots: `0..m`.
pub fn enc_general_mvp_from_diagonals<B>(
    session: &Session<B>,
    diagonals: &[Vec<f64>],
    ct: &B::Ciphertext,
) -> Result<B::Ciphertext, CircuitError>
where
    B: SessionFamily<Value = f64>,
{
    let n: usize = diagonal_count(diagonals);
    check_diagonals(diagonals, n)?;
    let plan: BsgsPlan = BsgsPlan::general(diagonals.len(), n)?;
    check_ciphertext(session, ct, n, &plan.rotation_steps())?;
    debug!(
        m = plan.m,
        n,
        n1 = plan.n1,
        n2 = plan.n2,
        rotations = plan.rotation_count(),
        "general bsgs mvp"
    );

    let t: B::Ciphertext = enc_bsgs_accumulate(session, &plan, diagonals, ct)?;
    if plan.halving_fold() {
        let mut t: B::Ciphertext = t;
        for h in plan.fold_steps() {
            let r: B::Ciphertext = session.rotate(&t, h)?;
            session.add_inplace(&mut t, &r)?;
        }
        Ok(t)
    } else {
        let mut acc: B::Ciphertext = t.clone();
        for k in plan.fold_steps() {
            session.add_inplace(&mut acc, &session.rotate(&t, k)?)?;
        }
        Ok(acc)
    }
}
