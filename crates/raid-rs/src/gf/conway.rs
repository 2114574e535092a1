//! Conway primitive polynomial table used to generate each `GField`'s
//! irreducible polynomial.
//!
//! The table lists, for each supported degree `m`, the exponents of the
//! nonzero terms of the degree-`m` Conway polynomial (the leading `m` and
//! trailing `0` always present). Sourced from the same database the
//! original Python implementation drew from (the Lübeck/Stanford Conway
//! polynomial tables).

/// Returns the nonzero-term exponents of the degree-`m` Conway polynomial,
/// or `None` if `m` is not in the supported domain.
pub fn exponents(m: u32) -> Option<&'static [u32]> {
    Some(match m {
        1 => &[1, 0],
        2 => &[2, 1, 0],
        3 => &[3, 1, 0],
        4 => &[4, 1, 0],
        5 => &[5, 2, 0],
        6 => &[6, 4, 3, 1, 0],
        7 => &[7, 1, 0],
        8 => &[8, 4, 3, 2, 0],
        9 => &[9, 4, 0],
        10 => &[10, 6, 5, 3, 2, 1, 0],
        11 => &[11, 2, 0],
        12 => &[12, 7, 6, 5, 3, 1, 0],
        13 => &[13, 4, 3, 1, 0],
        14 => &[14, 7, 5, 3, 0],
        15 => &[15, 5, 4, 2, 0],
        16 => &[16, 5, 3, 2, 0],
        17 => &[17, 3, 0],
        18 => &[18, 12, 10, 1, 0],
        19 => &[19, 5, 2, 1, 0],
        20 => &[20, 10, 9, 7, 6, 5, 4, 1, 0],
        21 => &[21, 6, 5, 2, 0],
        22 => &[22, 12, 11, 10, 9, 8, 6, 5, 0],
        23 => &[23, 5, 0],
        24 => &[24, 16, 15, 14, 13, 10, 9, 7, 5, 3, 0],
        25 => &[25, 8, 6, 2, 0],
        26 => &[26, 14, 10, 8, 7, 6, 4, 1, 0],
        27 => &[27, 12, 10, 9, 7, 5, 3, 2, 0],
        28 => &[28, 13, 7, 6, 5, 2, 0],
        29 => &[29, 2, 0],
        30 => &[30, 17, 16, 13, 11, 7, 5, 3, 2, 1, 0],
        31 => &[31, 3, 0],
        32 => &[32, 15, 9, 7, 4, 3, 0],
        33 => &[33, 13, 12, 11, 10, 8, 6, 3, 0],
        34 => &[34, 16, 15, 12, 11, 8, 7, 6, 5, 4, 2, 1, 0],
        35 => &[35, 11, 10, 7, 5, 2, 0],
        36 => &[36, 23, 22, 20, 19, 17, 14, 13, 8, 6, 5, 1, 0],
        37 => &[37, 5, 4, 3, 2, 1, 0],
        38 => &[38, 14, 10, 9, 8, 5, 2, 1, 0],
        39 => &[39, 15, 12, 11, 10, 9, 7, 6, 5, 2, 0],
        40 => &[40, 23, 21, 18, 16, 15, 13, 12, 8, 5, 3, 1, 0],
        64 => &[
            64, 33, 30, 26, 25, 24, 23, 22, 21, 20, 18, 13, 12, 11, 10, 7, 5, 4, 2, 1, 0,
        ],
        97 => &[97, 6, 0],
        100 => &[100, 15, 0],
        _ => return None,
    })
}

/// Builds the generator polynomial (as a field element) for degree `m`
/// from its Conway exponent list.
pub fn generator(m: u32) -> Option<u128> {
    let exps = exponents(m)?;
    Some(exps.iter().fold(0u128, |acc, &e| acc | (1u128 << e)))
}

#[cfg(test)]
mod conway_tests {
    use super::*;

    #[test]
    fn supported_degrees_cover_the_documented_domain() {
        for m in 1..=40u32 {
            assert!(exponents(m).is_some(), "missing degree {m}");
        }
        for m in [64, 97, 100] {
            assert!(exponents(m).is_some(), "missing degree {m}");
        }
        assert!(exponents(41).is_none());
        assert!(exponents(63).is_none());
    }

    #[test]
    fn generator_sets_leading_and_trailing_bits() {
        let g = generator(8).unwrap();
        assert_eq!(g & 1, 1, "constant term must be set");
        assert_eq!(g >> 8 & 1, 1, "leading term must be set");
    }

    #[test]
    fn gf8_generator_matches_known_conway_polynomial() {
        // x^8 + x^4 + x^3 + x^2 + 1 => 0x11D
        assert_eq!(generator(8).unwrap(), 0x11D);
    }
}
