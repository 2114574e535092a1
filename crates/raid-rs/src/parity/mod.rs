//! P/Q parity codec: computing and recovering stripe parity columns.
//!
//! P is a straight XOR across the data columns. Q is a Vandermonde-style
//! weighted sum in `GF(2^m)`, using successive powers of the field's
//! generator element as per-column coefficients. Recovery solves the
//! resulting linear system for one or two missing columns.
//!
//! Columns carry `u64` entries, not `u8`: a column can hold either actual
//! payload bytes (data columns, always in `0..=255`) or a computed P/Q
//! parity value, which for `m > 8` is a `GF(2^m)` field element that
//! routinely exceeds a byte. Narrowing back to a payload byte happens at
//! the engine's read/write boundary, never inside this codec.

#[cfg(test)]
mod parity_tests;

use crate::gf::GField;

/// Computes the P parity column: the entry-wise XOR of every data column.
///
/// # Panics
/// Panics if `data` is empty or the columns have mismatched lengths.
pub fn compute_p(data: &[&[u64]]) -> Vec<u64> {
    assert!(!data.is_empty(), "compute_p requires at least one data column");
    let len = data[0].len();
    let mut p = vec![0u64; len];
    for column in data {
        assert_eq!(column.len(), len, "all columns must share one chunk size");
        for (acc, entry) in p.iter_mut().zip(column.iter()) {
            *acc ^= entry;
        }
    }
    p
}

/// Computes the Q parity column: `sum_i(g^i * data[i])` over `gf`, where
/// `g` is `gf`'s generator polynomial's smallest nonzero representative
/// used as a coefficient base (here, the field element `2`, the standard
/// Vandermonde choice for `GF(2^m)` RAID-6 codes).
///
/// # Panics
/// Panics if `data` is empty or the columns have mismatched lengths.
pub fn compute_q(gf: &GField, data: &[&[u64]]) -> Vec<u64> {
    assert!(!data.is_empty(), "compute_q requires at least one data column");
    let len = data[0].len();
    let mut q = vec![0u64; len];
    for (i, column) in data.iter().enumerate() {
        assert_eq!(column.len(), len, "all columns must share one chunk size");
        let coefficient = gf_power(gf, 2, i as u32);
        for (acc, entry) in q.iter_mut().zip(column.iter()) {
            let term = gf.multiply(coefficient, *entry as u128);
            *acc ^= term as u64;
        }
    }
    q
}

/// Recovers one missing data column at index `missing` from the P parity
/// and every other surviving data column.
pub fn recover_one_with_p(data: &[Option<&[u64]>], p: &[u64], missing: usize) -> Vec<u64> {
    let mut recovered = p.to_vec();
    for (i, column) in data.iter().enumerate() {
        if i == missing {
            continue;
        }
        let column = column.expect("only the `missing` column may be absent");
        for (acc, entry) in recovered.iter_mut().zip(column.iter()) {
            *acc ^= entry;
        }
    }
    recovered
}

/// Recovers one missing data column at index `missing` from the Q parity
/// and every other surviving data column, dividing out that column's
/// Vandermonde coefficient.
pub fn recover_one_with_q(gf: &GField, data: &[Option<&[u64]>], q: &[u64], missing: usize) -> Vec<u64> {
    let len = q.len();
    let mut partial = q.to_vec();
    for (i, column) in data.iter().enumerate() {
        if i == missing {
            continue;
        }
        let column = column.expect("only the `missing` column may be absent");
        let coefficient = gf_power(gf, 2, i as u32);
        for (acc, entry) in partial.iter_mut().zip(column.iter()) {
            let term = gf.multiply(coefficient, *entry as u128);
            *acc ^= term as u64;
        }
    }
    let missing_coefficient = gf_power(gf, 2, missing as u32);
    let mut recovered = vec![0u64; len];
    for (out, entry) in recovered.iter_mut().zip(partial.iter()) {
        *out = gf.divide(*entry as u128, missing_coefficient) as u64;
    }
    recovered
}

/// Recovers two missing data columns (`missing_a`, `missing_b`) from both
/// P and Q parity and the surviving data columns, by solving the 2x2
/// linear system over `gf`.
///
/// Returns `(column_a, column_b)` in that index order.
pub fn recover_two(
    gf: &GField,
    data: &[Option<&[u64]>],
    p: &[u64],
    q: &[u64],
    missing_a: usize,
    missing_b: usize,
) -> (Vec<u64>, Vec<u64>) {
    assert_ne!(missing_a, missing_b, "recover_two requires two distinct columns");
    let len = p.len();

    // Fold every surviving column out of P and Q, leaving a 2-unknown system.
    let mut p_partial = p.to_vec();
    let mut q_partial = q.to_vec();
    for (i, column) in data.iter().enumerate() {
        if i == missing_a || i == missing_b {
            continue;
        }
        let column = column.expect("only the two missing columns may be absent");
        let coefficient = gf_power(gf, 2, i as u32);
        for byte_index in 0..len {
            p_partial[byte_index] ^= column[byte_index];
            let term = gf.multiply(coefficient, column[byte_index] as u128);
            q_partial[byte_index] ^= term as u64;
        }
    }

    let coeff_a = gf_power(gf, 2, missing_a as u32);
    let coeff_b = gf_power(gf, 2, missing_b as u32);
    // d_a + d_b = p_partial
    // coeff_a*d_a + coeff_b*d_b = q_partial
    // => (coeff_a - coeff_b) * d_a = q_partial - coeff_b * p_partial
    let denom = gf.subtract(coeff_a, coeff_b);

    let mut column_a = vec![0u64; len];
    let mut column_b = vec![0u64; len];
    for byte_index in 0..len {
        let rhs = gf.subtract(
            q_partial[byte_index] as u128,
            gf.multiply(coeff_b, p_partial[byte_index] as u128),
        );
        let a = gf.divide(rhs, denom);
        let b = gf.subtract(p_partial[byte_index] as u128, a as u128);
        column_a[byte_index] = a as u64;
        column_b[byte_index] = b as u64;
    }
    (column_a, column_b)
}

/// `base^exponent` in `gf`, computed by repeated squaring.
fn gf_power(gf: &GField, base: u128, exponent: u32) -> u128 {
    let mut result = 1u128;
    let mut acc = base;
    let mut e = exponent;
    while e > 0 {
        if e & 1 == 1 {
            result = gf.multiply(result, acc);
        }
        acc = gf.multiply(acc, acc);
        e >>= 1;
    }
    result
}
