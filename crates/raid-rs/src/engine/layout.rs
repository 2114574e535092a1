//! Rotating parity placement and the on-disk chunk byte encoding.

/// Physical disk holding the P chunk of stripe `s` in an `n`-disk array.
#[must_use]
pub fn phys_p(n: usize, s: u64) -> usize {
    (((n as u64 - 2) + s) % n as u64) as usize
}

/// Physical disk holding the Q chunk of stripe `s` in an `n`-disk array.
#[must_use]
pub fn phys_q(n: usize, s: u64) -> usize {
    (((n as u64 - 1) + s) % n as u64) as usize
}

/// Physical disk holding data column `c` of stripe `s` in an `n`-disk
/// array. Columns rotate past the two parity slots as `s` advances.
#[must_use]
pub fn phys(n: usize, s: u64, c: usize) -> usize {
    ((c as u64 + s) % n as u64) as usize
}

#[must_use]
pub fn is_p(n: usize, s: u64, d: usize) -> bool {
    d == phys_p(n, s)
}

#[must_use]
pub fn is_q(n: usize, s: u64, d: usize) -> bool {
    d == phys_q(n, s)
}

/// The data column index a physical disk `d` holds at stripe `s`, or
/// `None` if `d` is one of the stripe's two parity slots.
#[must_use]
pub fn data_column_of(n: usize, s: u64, d: usize) -> Option<usize> {
    if is_p(n, s, d) || is_q(n, s, d) {
        return None;
    }
    Some(((d as u64 + n as u64 - (s % n as u64)) % n as u64) as usize)
}

/// Fixed on-disk entry width: 1 byte when `n <= 8`, 8 bytes otherwise,
/// because `GF(2^n)` parity values need more room to represent.
#[must_use]
pub fn chunk_entry_width(n: usize) -> usize {
    if n <= 8 {
        1
    } else {
        8
    }
}

fn bias(m: u32) -> i128 {
    1i128 << (m - 1)
}

/// Encodes one logical entry as a biased, fixed-width, little-endian
/// signed integer, per the on-disk layout in the external-interfaces
/// section: stored value = logical value - 2^(m-1).
///
/// The entry is a full `GF(2^m)` field element, not just a payload byte:
/// for `m > 8` a P or Q parity value routinely exceeds 255, which is the
/// reason the on-disk width widens to 8 bytes in the first place. Data
/// columns narrow back to a payload byte at the engine's read/write
/// boundary, never here.
#[must_use]
pub fn encode_entry(value: u64, m: u32, width: usize) -> Vec<u8> {
    let biased = value as i128 - bias(m);
    match width {
        1 => vec![biased as i8 as u8],
        8 => (biased as i64).to_le_bytes().to_vec(),
        other => panic!("unsupported chunk entry width: {other}"),
    }
}

/// Inverse of [`encode_entry`].
#[must_use]
pub fn decode_entry(raw: &[u8], m: u32, width: usize) -> u64 {
    match width {
        1 => {
            let signed = raw[0] as i8;
            (signed as i128 + bias(m)) as u64
        }
        8 => {
            let bytes: [u8; 8] = raw[..8].try_into().expect("8-byte entry");
            let signed = i64::from_le_bytes(bytes);
            (signed as i128 + bias(m)) as u64
        }
        other => panic!("unsupported chunk entry width: {other}"),
    }
}

#[cfg(test)]
mod layout_tests {
    use super::*;

    #[test]
    fn rotation_cycles_match_the_documented_scenario() {
        // N=8, CHUNK_SIZE=32: phys_P cycles 6,7,0 and phys_Q cycles 7,0,1.
        let n = 8;
        assert_eq!(phys_p(n, 0), 6);
        assert_eq!(phys_p(n, 1), 7);
        assert_eq!(phys_p(n, 2), 0);
        assert_eq!(phys_q(n, 0), 7);
        assert_eq!(phys_q(n, 1), 0);
        assert_eq!(phys_q(n, 2), 1);
        // data column 0 lands on physical disks 0,1,2
        assert_eq!(phys(n, 0, 0), 0);
        assert_eq!(phys(n, 1, 0), 1);
        assert_eq!(phys(n, 2, 0), 2);
    }

    #[test]
    fn column_advancement_never_lands_on_parity() {
        let n = 8usize;
        for s in 0..20u64 {
            for c in 0..n - 2 {
                let d = phys(n, s, c);
                assert!(!is_p(n, s, d));
                assert!(!is_q(n, s, d));
            }
        }
    }

    #[test]
    fn data_column_of_inverts_phys() {
        let n = 10usize;
        for s in 0..15u64 {
            for c in 0..n - 2 {
                let d = phys(n, s, c);
                assert_eq!(data_column_of(n, s, d), Some(c));
            }
            assert_eq!(data_column_of(n, s, phys_p(n, s)), None);
            assert_eq!(data_column_of(n, s, phys_q(n, s)), None);
        }
    }

    #[test]
    fn one_byte_encoding_round_trips_for_n_le_8() {
        let (m, width) = (8, chunk_entry_width(8));
        assert_eq!(width, 1);
        for v in 0..=255u64 {
            let encoded = encode_entry(v, m, width);
            assert_eq!(decode_entry(&encoded, m, width), v);
        }
    }

    #[test]
    fn eight_byte_encoding_round_trips_for_n_gt_8() {
        let (m, width) = (10, chunk_entry_width(10));
        assert_eq!(width, 8);
        for v in 0..=255u64 {
            let encoded = encode_entry(v, m, width);
            assert_eq!(decode_entry(&encoded, m, width), v);
        }
    }

    #[test]
    fn eight_byte_encoding_round_trips_full_field_range_for_n_gt_8() {
        // A parity entry for m=10 can take any value in [0, 2^10), well
        // past the 0..=255 payload-byte range the 1-byte path is limited to.
        let (m, width) = (10, chunk_entry_width(10));
        for v in 0..(1u64 << m) {
            let encoded = encode_entry(v, m, width);
            assert_eq!(decode_entry(&encoded, m, width), v);
        }
    }
}
