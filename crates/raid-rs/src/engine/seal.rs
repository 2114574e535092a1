//! Sealing a stripe: (re)computing P and Q from whatever the stripe's
//! data chunks currently hold on disk.

use tracing::debug;

use super::{layout, Engine};
use crate::error::RaidResult;
use crate::parity;

/// Reads back every data chunk of `stripe` (an unwritten column reads as
/// all-zero, matching the "unfilled columns are zero" contract for a
/// mid-stripe seal), recomputes P and Q, and persists both to their
/// rotated physical slots.
pub(crate) fn seal(engine: &mut Engine, stripe: u64) -> RaidResult<()> {
    let d = engine.n - 2;
    let mut columns: Vec<Vec<u64>> = Vec::with_capacity(d);
    for c in 0..d {
        let phys_disk = layout::phys(engine.n, stripe, c);
        let column = match engine.array.read_chunk(phys_disk, stripe) {
            Ok(raw) => engine.decode_chunk(&raw),
            Err(_) => {
                // Column was never touched by a write: materialize it as an
                // empty, zero-padded chunk so the stripe has exactly one file
                // per disk and later reads don't mistake this for disk loss.
                let zero = vec![0u64; engine.chunk_size];
                engine.persist_physical_chunk(phys_disk, stripe, &zero, 0)?;
                zero
            }
        };
        columns.push(column);
    }

    let refs: Vec<&[u64]> = columns.iter().map(Vec::as_slice).collect();
    let p = parity::compute_p(&refs);
    let q = parity::compute_q(&engine.gf, &refs);

    let p_phys = layout::phys_p(engine.n, stripe);
    let q_phys = layout::phys_q(engine.n, stripe);
    let p_encoded = engine.encode_chunk(&p);
    let q_encoded = engine.encode_chunk(&q);
    engine.array.write_chunk(p_phys, stripe, &p_encoded)?;
    engine.array.write_chunk(q_phys, stripe, &q_encoded)?;
    engine.set_utilization(stripe, p_phys, engine.chunk_size);
    engine.set_utilization(stripe, q_phys, engine.chunk_size);

    debug!(stripe, p_phys, q_phys, "sealed stripe");
    Ok(())
}

/// Recomputes P and Q from the stripe's current data chunks and rewrites
/// them if they disagree with what is on disk. Returns `true` if a
/// mismatch was found and repaired.
pub(crate) fn scrub(engine: &mut Engine, stripe: u64) -> RaidResult<bool> {
    let p_phys = layout::phys_p(engine.n, stripe);
    let q_phys = layout::phys_q(engine.n, stripe);
    let stored_p = engine.decode_chunk(&engine.array.read_chunk(p_phys, stripe)?);
    let stored_q = engine.decode_chunk(&engine.array.read_chunk(q_phys, stripe)?);

    seal(engine, stripe)?;

    let fresh_p = engine.decode_chunk(&engine.array.read_chunk(p_phys, stripe)?);
    let fresh_q = engine.decode_chunk(&engine.array.read_chunk(q_phys, stripe)?);
    Ok(stored_p != fresh_p || stored_q != fresh_q)
}
