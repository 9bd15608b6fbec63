//! Final numbering of the merged profiles and the intersection fixups
//! between adjacent depth levels.

use crate::document::{ChainLabel, Document, FEATURE_SLOT_CAPACITY, TURNING_LAYER};
use crate::geometry::{ChainId, Extremity};
use crate::kernel::{chain_intersections, GeometryKernel};
use crate::params::{SpindleSide, TurningConfig, TurningState};
use crate::stages::exchange::classify_slots;
use crate::stages::split::search_crossing_x;
use kurbo::Point;
use tracing::warn;

/// Renumber all surviving per-level chains into one contiguous sequence.
///
/// Merged raw chains are renamed first, up to the groove count recorded by
/// the exchanger; the groove-derived chains continue the sequence and each
/// is trimmed against the last renamed raw chain; leftover raw chains close
/// out the numbering. Everything lands on the turning layer.
pub fn resequence<K: GeometryKernel>(
    doc: &mut Document,
    kernel: &K,
    config: &TurningConfig,
    state: &TurningState,
) {
    let (raw, grooves) = classify_slots(doc);
    let mut next = 1u8;
    let mut last_raw_slot = 0usize;

    for slot in 1..=FEATURE_SLOT_CAPACITY {
        if let Some(id) = raw[slot] {
            if next as usize > state.gr_feature {
                break;
            }
            doc.set_label(id, ChainLabel::Raw { level: next });
            doc.set_layer(id, TURNING_LAYER);
            last_raw_slot = slot;
            next += 1;
        }
    }

    for slot in 1..=FEATURE_SLOT_CAPACITY {
        if let Some(groove_id) = grooves[slot] {
            doc.set_label(groove_id, ChainLabel::Raw { level: next });
            doc.set_layer(groove_id, TURNING_LAYER);
            next += 1;
            if last_raw_slot != 0 {
                if let Some(partner) = raw[last_raw_slot] {
                    fixup_pair(doc, kernel, config, partner, groove_id, state.turn_max_angle);
                }
            }
        }
    }

    for slot in last_raw_slot + 1..=FEATURE_SLOT_CAPACITY {
        if let Some(id) = raw[slot] {
            doc.set_label(id, ChainLabel::Raw { level: next });
            doc.set_layer(id, TURNING_LAYER);
            next += 1;
        }
    }
}

/// Trim a groove-derived chain where it meets the adjacent profile and
/// close its open start with a short segment rising at the max-angle
/// heuristic.
///
/// When several intersection candidates exist the third takes precedence
/// over the first; with no intersection at all the closing segment is
/// appended without trimming.
fn fixup_pair<K: GeometryKernel>(
    doc: &mut Document,
    kernel: &K,
    config: &TurningConfig,
    subject_id: ChainId,
    partner_id: ChainId,
    turn_max_angle: f64,
) -> Option<()> {
    let hits = chain_intersections(kernel, doc.chain(subject_id)?, doc.chain(partner_id)?);
    let joint = if hits.len() >= 3 {
        Some(hits[2].point)
    } else {
        hits.first().map(|h| h.point)
    };

    if let Some(joint) = joint {
        let crossing = search_crossing_x(doc.chain(partner_id)?, joint.x);
        match crossing {
            Some(index) => {
                let chain = doc.chain_mut(partner_id)?;
                let keep = chain.count() - index;
                chain.reverse();
                chain.truncate(keep);
                append_closing(doc, partner_id, config.spindle_side, turn_max_angle);
                doc.chain_mut(partner_id)?.reverse();
            }
            None => {
                warn!(%partner_id, joint_x = joint.x, "joint off the partner chain, closing without trim");
                let chain = doc.chain_mut(partner_id)?;
                chain.reverse();
                append_closing(doc, partner_id, config.spindle_side, turn_max_angle);
                doc.chain_mut(partner_id)?.reverse();
            }
        }
    } else {
        let chain = doc.chain_mut(partner_id)?;
        chain.reverse();
        append_closing(doc, partner_id, config.spindle_side, turn_max_angle);
        doc.chain_mut(partner_id)?.reverse();
    }
    Some(())
}

fn append_closing(
    doc: &mut Document,
    id: ChainId,
    side: SpindleSide,
    turn_max_angle: f64,
) -> Option<()> {
    let chain = doc.chain_mut(id)?;
    let end = chain.extremity(Extremity::End)?;
    let dx = match side {
        SpindleSide::Main => turn_max_angle.cos() * 0.8,
        SpindleSide::Sub => -turn_max_angle.cos() * 0.8,
    };
    chain.add_point(Point::new(end.x + dx, end.y + turn_max_angle.sin() * 0.8));
    Some(())
}
