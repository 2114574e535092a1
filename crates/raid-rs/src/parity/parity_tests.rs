use super::*;

fn field() -> GField {
    GField::new(8).unwrap()
}

#[test]
fn compute_p_is_byte_wise_xor() {
    let a: &[u64] = &[0x01, 0xFF, 0x00];
    let b: &[u64] = &[0x02, 0x0F, 0x00];
    let c: &[u64] = &[0x04, 0xF0, 0x00];
    let p = compute_p(&[a, b, c]);
    assert_eq!(p, vec![0x07, 0xFF, 0x00]);
}

#[test]
fn single_disk_loss_recovers_via_p() {
    let a: &[u64] = &[0x11, 0x22, 0x33];
    let b: &[u64] = &[0xAA, 0xBB, 0xCC];
    let c: &[u64] = &[0x01, 0x02, 0x03];
    let p = compute_p(&[a, b, c]);

    let data = [None, Some(b), Some(c)];
    let recovered = recover_one_with_p(&data, &p, 0);
    assert_eq!(recovered, a);
}

#[test]
fn single_disk_loss_recovers_via_q() {
    let gf = field();
    let a: &[u64] = &[0x11, 0x22, 0x33];
    let b: &[u64] = &[0xAA, 0xBB, 0xCC];
    let c: &[u64] = &[0x01, 0x02, 0x03];
    let q = compute_q(&gf, &[a, b, c]);

    let data = [None, Some(b), Some(c)];
    let recovered = recover_one_with_q(&gf, &data, &q, 0);
    assert_eq!(recovered, a);
}

#[test]
fn double_disk_loss_recovers_both_columns() {
    let gf = field();
    let a: &[u64] = &[0x11, 0x22, 0x33, 0x44];
    let b: &[u64] = &[0xAA, 0xBB, 0xCC, 0xDD];
    let c: &[u64] = &[0x01, 0x02, 0x03, 0x04];
    let d: &[u64] = &[0xF0, 0xE1, 0xD2, 0xC3];
    let p = compute_p(&[a, b, c, d]);
    let q = compute_q(&gf, &[a, b, c, d]);

    let data = [None, Some(b), None, Some(d)];
    let (recovered_a, recovered_c) = recover_two(&gf, &data, &p, &q, 0, 2);
    assert_eq!(recovered_a, a);
    assert_eq!(recovered_c, c);
}

#[test]
fn double_disk_loss_is_symmetric_in_the_missing_order() {
    let gf = field();
    let a: &[u64] = &[0x5A];
    let b: &[u64] = &[0x3C];
    let c: &[u64] = &[0x99];
    let p = compute_p(&[a, b, c]);
    let q = compute_q(&gf, &[a, b, c]);

    let data = [None, None, Some(c)];
    let (col0, col1) = recover_two(&gf, &data, &p, &q, 0, 1);
    assert_eq!(col0, a);
    assert_eq!(col1, b);

    let (col1_swapped, col0_swapped) = recover_two(&gf, &data, &p, &q, 1, 0);
    assert_eq!(col0_swapped, a);
    assert_eq!(col1_swapped, b);
}

#[test]
fn recovered_stripe_matches_original_parity() {
    let gf = field();
    let columns: Vec<Vec<u64>> = (0u64..6).map(|i| vec![(i * 37) % 251, (i * 61) % 251]).collect();
    let refs: Vec<&[u64]> = columns.iter().map(|c| c.as_slice()).collect();
    let p = compute_p(&refs);
    let q = compute_q(&gf, &refs);

    let mut data: Vec<Option<&[u64]>> = refs.iter().map(|c| Some(*c)).collect();
    data[4] = None;
    let recovered = recover_one_with_p(&data, &p, 4);
    assert_eq!(recovered, columns[4]);

    let mut data_q: Vec<Option<&[u64]>> = refs.iter().map(|c| Some(*c)).collect();
    data_q[5] = None;
    let recovered_q = recover_one_with_q(&gf, &data_q, &q, 5);
    assert_eq!(recovered_q, columns[5]);
}

#[test]
fn compute_q_is_not_truncated_to_a_byte_for_m_greater_than_eight() {
    // For m=10, GF(2^10) multiplication of two small operands can land
    // outside 0..=255; Q must preserve that, not wrap it into a byte.
    let gf = GField::new(10).unwrap();
    let a: &[u64] = &[0x3FF];
    let b: &[u64] = &[0x2AA];
    let q = compute_q(&gf, &[a, b]);
    assert!(q[0] <= 0x3FF, "q must stay within the field's element range");

    let data = [Some(a), None];
    let recovered = recover_one_with_q(&gf, &data, &q, 1);
    assert_eq!(recovered, b, "recovery must reproduce the full-width column, not a truncated one");
}
