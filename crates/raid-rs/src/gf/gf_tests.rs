use super::*;

#[test]
fn gf8_multiply_matches_known_vector() {
    // Multiply(2, 0x80) = 0x1D in GF(2^8) with the x^8+x^4+x^3+x^2+1 generator.
    let gf = GField::new(8).unwrap();
    assert_eq!(gf.multiply(2, 0x80), 0x1D);
}

#[test]
fn gf8_inverse_of_one_is_one() {
    let gf = GField::new(8).unwrap();
    assert_eq!(gf.inverse(1), 1);
}

#[test]
fn multiply_is_commutative_and_has_identity() {
    let gf = GField::new(8).unwrap();
    for a in [0u128, 1, 3, 7, 0x80, 0xFF] {
        for b in [0u128, 1, 5, 0x80, 0xAA] {
            assert_eq!(gf.multiply(a, b), gf.multiply(b, a));
        }
        assert_eq!(gf.multiply(a, 1), a);
    }
}

#[test]
fn multiply_then_divide_round_trips() {
    let gf = GField::new(8).unwrap();
    for a in 1u128..=255 {
        for b in 1u128..=255 {
            let product = gf.multiply(a, b);
            assert_eq!(gf.divide(product, b), a, "a={a} b={b}");
        }
    }
}

#[test]
fn inverse_round_trips_for_every_nonzero_element() {
    let gf = GField::new(8).unwrap();
    for a in 1u128..=255 {
        let inv = gf.inverse(a);
        assert_eq!(gf.multiply(a, inv), 1, "a={a}");
    }
}

#[test]
fn lut_and_naive_agree_on_every_product() {
    let lut = GField::new(8).unwrap();
    assert!(matches!(lut.arith, Arith::Lut(_)));
    let naive = GField {
        m: lut.m,
        generator: lut.generator,
        arith: Arith::Naive,
    };
    for a in 0u128..=255 {
        for b in 0u128..=255 {
            assert_eq!(lut.multiply(a, b), naive.multiply(a, b), "a={a} b={b}");
        }
    }
}

#[test]
fn fields_at_or_above_ten_bits_default_to_naive() {
    let gf = GField::new(16).unwrap();
    assert!(matches!(gf.arith, Arith::Naive));
}

#[test]
fn unsupported_degree_is_rejected() {
    assert!(GField::new(41).is_err());
    assert!(GField::new(0).is_err());
}

#[test]
fn lut_cache_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let first = GField::with_lut_cache(8, dir.path()).unwrap();
    assert!(dir.path().join("gf-lut-8.bin").exists());

    let second = GField::with_lut_cache(8, dir.path()).unwrap();
    for a in [0u128, 1, 17, 200, 255] {
        for b in [0u128, 1, 9, 128, 255] {
            assert_eq!(first.multiply(a, b), second.multiply(a, b));
        }
    }
}

#[test]
fn find_degree_reports_msb_index() {
    let gf = GField::new(8).unwrap();
    assert_eq!(gf.find_degree(0), 0);
    assert_eq!(gf.find_degree(1), 0);
    assert_eq!(gf.find_degree(0b1000_0000), 7);
    assert_eq!(gf.find_degree(0x11D), 8);
}
