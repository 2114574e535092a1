//! `GF(2^m)` arithmetic: the substrate for Q parity.
//!
//! Field elements are represented as `u128`, which comfortably holds the
//! largest supported degree (`m = 100`). Multiplication either falls back
//! to shift-and-reduce (`Arith::Naive`) or consults a precomputed
//! multiply/divide table (`Arith::Lut`), mirroring the "capabilities over
//! inheritance" note in the design docs: a small variant type stands in
//! for the original's attribute-rebinding trick.

pub mod conway;

#[cfg(test)]
mod gf_tests;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RaidError, RaidResult};

/// `Arith` selects which multiply/divide strategy a [`GField`] uses.
#[derive(Debug, Clone)]
pub enum Arith {
    /// Shift-and-reduce on every call. Used for larger fields where a
    /// `2^m x 2^m` table would be too large to be worth building.
    Naive,
    /// Precomputed multiply/divide tables, `fieldSize x fieldSize` each.
    /// Auto-selected for `m < 10`.
    Lut(LutTables),
}

/// Precomputed multiply/divide tables for small fields.
#[derive(Debug, Clone)]
pub struct LutTables {
    field_size: usize,
    mul: Vec<u128>,
    div: Vec<u128>,
}

impl LutTables {
    fn index(&self, i: u128, j: u128) -> usize {
        (i as usize) * self.field_size + (j as usize)
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16 + 32 * self.mul.len());
        buf.extend_from_slice(&(self.field_size as u64).to_le_bytes());
        for v in &self.mul {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        for v in &self.div {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }

    fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < 8 {
            return None;
        }
        let field_size = u64::from_le_bytes(buf[0..8].try_into().ok()?) as usize;
        let expected = 8 + field_size * 16 * 2;
        if buf.len() != expected {
            return None;
        }
        let mut offset = 8;
        let mut mul = Vec::with_capacity(field_size * field_size);
        for _ in 0..field_size * field_size {
            mul.push(u128::from_le_bytes(buf[offset..offset + 16].try_into().ok()?));
            offset += 16;
        }
        let mut div = Vec::with_capacity(field_size * field_size);
        for _ in 0..field_size * field_size {
            div.push(u128::from_le_bytes(buf[offset..offset + 16].try_into().ok()?));
            offset += 16;
        }
        Some(Self {
            field_size,
            mul,
            div,
        })
    }
}

/// `GField` implements `GF(2^m)`: add/subtract are XOR, multiply is
/// reduced modulo the degree-`m` Conway polynomial, and inverse is the
/// Bezout coefficient from the extended Euclidean algorithm.
#[derive(Debug, Clone)]
pub struct GField {
    m: u32,
    generator: u128,
    arith: Arith,
}

impl GField {
    /// Builds `GF(2^m)`, auto-selecting a lookup table for `m < 10`. No
    /// on-disk cache is used; see [`GField::with_lut_cache`] for that.
    ///
    /// # Errors
    /// Returns [`RaidError::InvalidArgument`] if `m` has no tabulated
    /// Conway polynomial.
    pub fn new(m: u32) -> RaidResult<Self> {
        let generator = conway::generator(m).ok_or_else(|| {
            RaidError::InvalidArgument(format!("no Conway polynomial tabulated for m={m}"))
        })?;
        let arith = if m < 10 {
            Arith::Lut(build_lut(m, generator))
        } else {
            Arith::Naive
        };
        Ok(Self { m, generator, arith })
    }

    /// Builds `GF(2^m)` the same way as [`GField::new`], but reuses an
    /// on-disk cache of the multiply/divide tables under `cache_dir` when
    /// `m < 10`, writing one if absent. The cache file name is
    /// deterministic (`gf-lut-<m>.bin`) so repeated constructions across
    /// runs reuse it.
    ///
    /// # Errors
    /// Returns [`RaidError::InvalidArgument`] for an unsupported `m`, or
    /// [`RaidError::Io`] if the cache file cannot be read or written.
    pub fn with_lut_cache(m: u32, cache_dir: &Path) -> RaidResult<Self> {
        let generator = conway::generator(m).ok_or_else(|| {
            RaidError::InvalidArgument(format!("no Conway polynomial tabulated for m={m}"))
        })?;
        if m >= 10 {
            return Ok(Self {
                m,
                generator,
                arith: Arith::Naive,
            });
        }
        let cache_path = lut_cache_path(cache_dir, m);
        let arith = match fs::read(&cache_path).ok().and_then(|b| LutTables::from_bytes(&b)) {
            Some(tables) => Arith::Lut(tables),
            None => {
                let tables = build_lut(m, generator);
                if let Some(parent) = cache_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&cache_path, tables.to_bytes())?;
                Arith::Lut(tables)
            }
        };
        Ok(Self { m, generator, arith })
    }

    /// Degree of the field (`GF(2^m)`).
    #[must_use]
    pub const fn degree(&self) -> u32 {
        self.m
    }

    /// The irreducible polynomial used to reduce products, as a field
    /// element (its high bit is bit `m`).
    #[must_use]
    pub const fn generator_poly(&self) -> u128 {
        self.generator
    }

    /// XOR: addition in a characteristic-2 field.
    #[must_use]
    pub const fn add(&self, x: u128, y: u128) -> u128 {
        x ^ y
    }

    /// XOR: subtraction coincides with addition in characteristic 2.
    #[must_use]
    pub const fn subtract(&self, x: u128, y: u128) -> u128 {
        self.add(x, y)
    }

    /// Index of the most significant set bit of `v`, or 0 when `v == 0`.
    #[must_use]
    pub const fn find_degree(&self, v: u128) -> u32 {
        if v == 0 {
            0
        } else {
            127 - v.leading_zeros()
        }
    }

    /// Carry-less multiplication: XORs `f << i` into the accumulator for
    /// every set bit `i` of `v`. Does not reduce modulo the generator.
    #[must_use]
    pub fn multiply_without_reducing(&self, f: u128, v: u128) -> u128 {
        let mut result = 0u128;
        let mut acc = f;
        for i in 0..=self.m as usize {
            if (v >> i) & 1 == 1 {
                result ^= acc;
            }
            acc <<= 1;
        }
        result
    }

    /// Polynomial long division over `GF(2)`: returns `(quotient, remainder)`
    /// such that `f = quotient * v + remainder`.
    #[must_use]
    pub fn full_division(&self, mut f: u128, v: u128, f_degree: u32, v_degree: u32) -> (u128, u128) {
        let mut result = 0u128;
        let mut i = f_degree as i64;
        let v_degree = v_degree as i64;
        while i >= v_degree {
            if (f >> i) & 1 == 1 {
                let shift = (i - v_degree) as u32;
                result ^= 1u128 << shift;
                f = self.subtract(f, v << shift);
            }
            i -= 1;
        }
        (result, f)
    }

    /// Multiplies two field elements modulo the generator polynomial.
    #[must_use]
    pub fn multiply(&self, f: u128, v: u128) -> u128 {
        match &self.arith {
            Arith::Lut(tables) => tables.mul[tables.index(f, v)],
            Arith::Naive => {
                let m = self.multiply_without_reducing(f, v);
                self.full_division(m, self.generator, self.find_degree(m), self.m).1
            }
        }
    }

    /// Divides `f` by `v` (`f * v^-1`). Callers must never pass `v == 0`.
    ///
    /// # Panics
    /// Panics in debug builds if `v == 0`; in release builds the result
    /// is the "invalid" sentinel produced by dividing by the field's zero
    /// row, matching the original implementation's contract that callers
    /// never divide by zero.
    #[must_use]
    pub fn divide(&self, f: u128, v: u128) -> u128 {
        debug_assert_ne!(v, 0, "division by zero field element");
        match &self.arith {
            Arith::Lut(tables) => tables.div[tables.index(f, v)],
            Arith::Naive => self.multiply(f, self.inverse(v)),
        }
    }

    /// Multiplicative inverse of `f` via the extended Euclidean algorithm
    /// on `(f, generator)`. Undefined for `f == 0`; must not be invoked
    /// with it.
    #[must_use]
    pub fn inverse(&self, f: u128) -> u128 {
        match &self.arith {
            Arith::Lut(tables) => tables.div[tables.index(1, f)],
            Arith::Naive => {
                self.extended_euclid(1, f, self.generator, self.find_degree(f), self.m).1
            }
        }
    }

    /// Extended Euclid on `(d, a, b)` where `d = gcd(a, b)`, returning
    /// `(gcd, x, y)` with `a*x + b*y = gcd` in this field's arithmetic.
    fn extended_euclid(&self, d: u128, a: u128, b: u128, a_degree: u32, b_degree: u32) -> (u128, u128, u128) {
        if b == 0 {
            (a, 1, 0)
        } else {
            let (q, r) = self.full_division(a, b, a_degree, b_degree);
            let (d, x, y) = self.extended_euclid(d, b, r, b_degree, self.find_degree(r));
            (d, y, self.subtract(x, self.multiply(q, y)))
        }
    }
}

fn build_lut(m: u32, generator: u128) -> LutTables {
    let field_size = 1usize << m;
    let mut mul = vec![0u128; field_size * field_size];
    let mut div = vec![0u128; field_size * field_size];

    let naive = GField {
        m,
        generator,
        arith: Arith::Naive,
    };

    for i in 0..field_size {
        for j in 0..field_size {
            mul[i * field_size + j] = naive.multiply(i as u128, j as u128);
        }
    }
    for i in 0..field_size {
        for j in 1..field_size {
            // div[i][j] = i * inverse(j)
            div[i * field_size + j] = naive.multiply(i as u128, naive.inverse(j as u128));
        }
        // row for j == 0 is the "invalid" sentinel; leave as 0.
    }

    LutTables {
        field_size,
        mul,
        div,
    }
}

fn lut_cache_path(cache_dir: &Path, m: u32) -> PathBuf {
    cache_dir.join(format!("gf-lut-{m}.bin"))
}
