//! Reconstructing one or two lost disks from the surviving P and Q
//! parity across every sealed stripe.

use tracing::info;

use super::{layout, Engine};
use crate::error::{RaidError, RaidResult};
use crate::parity;

pub(crate) fn recovering_disks(engine: &mut Engine, lost_disks: &[usize]) -> RaidResult<()> {
    match lost_disks.len() {
        0 => return Err(RaidError::InvalidArgument("recover requires at least one disk id".into())),
        1 | 2 => {}
        _ => {
            return Err(RaidError::InvalidArgument(format!(
                "recover supports at most 2 simultaneous disk losses, got {}",
                lost_disks.len()
            )))
        }
    }

    for &disk in lost_disks {
        engine.array.replace_disk(disk)?;
    }

    let Some(max_stripe) = engine.max_sealed_stripe() else {
        for &disk in lost_disks {
            engine.array.mark_rebuilt(disk);
        }
        return Ok(());
    };

    if lost_disks.len() == 1 {
        for stripe in 0..=max_stripe {
            recover_one_disk(engine, stripe, lost_disks[0])?;
        }
    } else {
        let (l1, l2) = if lost_disks[0] < lost_disks[1] {
            (lost_disks[0], lost_disks[1])
        } else {
            (lost_disks[1], lost_disks[0])
        };
        for stripe in 0..=max_stripe {
            recover_two_disks(engine, stripe, l1, l2)?;
        }
    }

    for &disk in lost_disks {
        engine.array.mark_rebuilt(disk);
    }
    info!(?lost_disks, max_stripe, "recovery complete");
    Ok(())
}

fn recover_one_disk(engine: &mut Engine, stripe: u64, lost: usize) -> RaidResult<()> {
    let (data_cols, (p, q)) = engine.read_stripe(stripe, &[lost], true, false)?;

    if layout::is_p(engine.n, stripe, lost) {
        let refs: Vec<&[u64]> = data_cols.iter().map(Vec::as_slice).collect();
        let fresh_p = parity::compute_p(&refs);
        return engine.persist_physical_chunk(lost, stripe, &fresh_p, engine.chunk_size);
    }
    if layout::is_q(engine.n, stripe, lost) {
        let refs: Vec<&[u64]> = data_cols.iter().map(Vec::as_slice).collect();
        let fresh_q = parity::compute_q(&engine.gf, &refs);
        return engine.persist_physical_chunk(lost, stripe, &fresh_q, engine.chunk_size);
    }

    let missing_col = layout::data_column_of(engine.n, stripe, lost)
        .expect("a disk that is neither P nor Q must hold a data column");
    let data: Vec<Option<&[u64]>> = data_cols
        .iter()
        .enumerate()
        .map(|(i, col)| if i == missing_col { None } else { Some(col.as_slice()) })
        .collect();
    let recovered = parity::recover_one_with_p(&data, &p, missing_col);
    let utilization = engine.utilization_of(stripe, lost);
    engine.persist_physical_chunk(lost, stripe, &recovered, utilization)
}

fn recover_two_disks(engine: &mut Engine, stripe: u64, l1: usize, l2: usize) -> RaidResult<()> {
    let (data_cols, (p, q)) = engine.read_stripe(stripe, &[l1, l2], true, false)?;

    let l1_is_p = layout::is_p(engine.n, stripe, l1);
    let l1_is_q = layout::is_q(engine.n, stripe, l1);
    let l2_is_p = layout::is_p(engine.n, stripe, l2);
    let l2_is_q = layout::is_q(engine.n, stripe, l2);

    if (l1_is_p && l2_is_q) || (l1_is_q && l2_is_p) {
        return super::seal::seal(engine, stripe);
    }

    if !l1_is_p && !l1_is_q && !l2_is_p && !l2_is_q {
        let k1 = layout::data_column_of(engine.n, stripe, l1).expect("data column");
        let k2 = layout::data_column_of(engine.n, stripe, l2).expect("data column");
        let data: Vec<Option<&[u64]>> = data_cols
            .iter()
            .enumerate()
            .map(|(i, col)| if i == k1 || i == k2 { None } else { Some(col.as_slice()) })
            .collect();
        let (col1, col2) = parity::recover_two(&engine.gf, &data, &p, &q, k1, k2);
        let util1 = engine.utilization_of(stripe, l1);
        let util2 = engine.utilization_of(stripe, l2);
        engine.persist_physical_chunk(l1, stripe, &col1, util1)?;
        return engine.persist_physical_chunk(l2, stripe, &col2, util2);
    }

    if l1_is_p || l2_is_p {
        let (p_disk, data_disk) = if l1_is_p { (l1, l2) } else { (l2, l1) };
        let missing_col = layout::data_column_of(engine.n, stripe, data_disk).expect("data column");
        let data: Vec<Option<&[u64]>> = data_cols
            .iter()
            .enumerate()
            .map(|(i, col)| if i == missing_col { None } else { Some(col.as_slice()) })
            .collect();
        let recovered = parity::recover_one_with_q(&engine.gf, &data, &q, missing_col);
        let util = engine.utilization_of(stripe, data_disk);
        engine.persist_physical_chunk(data_disk, stripe, &recovered, util)?;

        let mut full_cols = data_cols;
        full_cols[missing_col] = recovered;
        let refs: Vec<&[u64]> = full_cols.iter().map(Vec::as_slice).collect();
        let fresh_p = parity::compute_p(&refs);
        return engine.persist_physical_chunk(p_disk, stripe, &fresh_p, engine.chunk_size);
    }

    // Q missing, P present: symmetric to the branch above.
    let (q_disk, data_disk) = if l1_is_q { (l1, l2) } else { (l2, l1) };
    let missing_col = layout::data_column_of(engine.n, stripe, data_disk).expect("data column");
    let data: Vec<Option<&[u64]>> = data_cols
        .iter()
        .enumerate()
        .map(|(i, col)| if i == missing_col { None } else { Some(col.as_slice()) })
        .collect();
    let recovered = parity::recover_one_with_p(&data, &p, missing_col);
    let util = engine.utilization_of(stripe, data_disk);
    engine.persist_physical_chunk(data_disk, stripe, &recovered, util)?;

    let mut full_cols = data_cols;
    full_cols[missing_col] = recovered;
    let refs: Vec<&[u64]> = full_cols.iter().map(Vec::as_slice).collect();
    let fresh_q = parity::compute_q(&engine.gf, &refs);
    engine.persist_physical_chunk(q_disk, stripe, &fresh_q, engine.chunk_size)
}
