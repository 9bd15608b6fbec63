//! Pairing of per-level profiles with their groove pieces and the splice
//! into one continuous chain per level.

use crate::document::{ChainLabel, Document, FEATURE_SLOT_CAPACITY};
use crate::geometry::{ChainId, Element, FeatureChain};
use crate::kernel::{probe_intersection, GeometryKernel};
use crate::params::{TurningConfig, TurningState};
use kurbo::Point;
use tracing::{debug, warn};

/// Depth-indexed slots for the two chain families, indices `1..=12`.
pub type Slots = [Option<ChainId>; FEATURE_SLOT_CAPACITY + 1];

/// Sort the document's per-level chains into raw and groove slot arrays.
pub fn classify_slots(doc: &Document) -> (Slots, Slots) {
    let mut raw: Slots = [None; FEATURE_SLOT_CAPACITY + 1];
    let mut grooves: Slots = [None; FEATURE_SLOT_CAPACITY + 1];
    for entry in doc.entries() {
        match entry.label {
            ChainLabel::Raw { level } if (1..=FEATURE_SLOT_CAPACITY as u8).contains(&level) => {
                raw[level as usize] = Some(entry.id);
            }
            ChainLabel::Groove { level }
                if (1..=FEATURE_SLOT_CAPACITY as u8).contains(&level) =>
            {
                grooves[level as usize] = Some(entry.id);
            }
            _ => {}
        }
    }
    (raw, grooves)
}

fn populated(slots: &Slots) -> usize {
    slots.iter().flatten().count()
}

fn first_slot(slots: &Slots) -> Option<usize> {
    (1..=FEATURE_SLOT_CAPACITY).find(|&i| slots[i].is_some())
}

/// Splice each raw chain with its groove partner.
///
/// Walks raw slots in depth order, pairing the n-th raw chain with the n-th
/// groove. The joint is found by probing horizontally through the raw
/// chain's highest vertex; a miss falls back to trimming the groove after
/// its extension segment. The merged chain keeps the raw identity and the
/// groove entry is deleted.
///
/// Returns whether re-sequencing should run afterwards.
pub fn exchange_features<K: GeometryKernel>(
    doc: &mut Document,
    kernel: &K,
    config: &TurningConfig,
    state: &mut TurningState,
) -> bool {
    let (raw, grooves) = classify_slots(doc);
    let raw_count = populated(&raw);
    let groove_count = populated(&grooves);
    state.gr_feature = groove_count;

    if groove_count == 0 {
        // Nothing to splice; the outermost profile will need the patch.
        state.first_feature_need = true;
        return false;
    }
    let Some(first_raw) = first_slot(&raw) else {
        state.first_feature_need = true;
        return true;
    };

    let mut pair = 0usize;
    for slot in first_raw..first_raw + raw_count {
        pair += 1;
        if pair > groove_count {
            break;
        }
        let (Some(raw_id), Some(groove_id)) = (raw[slot], grooves[slot - first_raw + 1]) else {
            warn!(slot, "slot gap during feature exchange");
            continue;
        };
        splice_pair(doc, kernel, config, raw_id, groove_id);
    }
    true
}

fn splice_pair<K: GeometryKernel>(
    doc: &mut Document,
    kernel: &K,
    config: &TurningConfig,
    raw_id: ChainId,
    groove_id: ChainId,
) -> Option<()> {
    let max_pt = doc.chain(raw_id)?.max_y_point()?;
    let trim = crate::stages::split::find_point_element(doc.chain(raw_id)?, max_pt.x, max_pt.y);

    doc.chain_mut(groove_id)?.reverse();
    let probe = Element::segment(
        max_pt,
        Point::new(max_pt.x + config.spindle_side.extend_sign() * 20.0, max_pt.y),
    );
    let hit = probe_intersection(kernel, &probe, doc.chain(groove_id)?);
    match hit {
        Some(joint) => {
            let keep =
                crate::stages::split::find_point_element(doc.chain(groove_id)?, joint.x, joint.y);
            let chain = doc.chain_mut(groove_id)?;
            chain.truncate(keep);
            chain.add_point(joint);
        }
        None => {
            // No crossing through the crest; cut after the extension
            // segment instead.
            debug!(%raw_id, "probe missed groove, trimming at extension length");
            let cut = doc.chain(groove_id)?.elements().iter().position(|el| {
                matches!(el, Element::Segment(_))
                    && el.length() - config.turning_extend <= 0.01
            });
            if let Some(index) = cut {
                doc.chain_mut(groove_id)?.truncate(index + 1);
            }
        }
    }

    {
        let chain = doc.chain_mut(raw_id)?;
        chain.truncate(trim);
        chain.add_point(max_pt);
    }
    doc.chain_mut(groove_id)?.reverse();
    let groove: FeatureChain = doc.remove_chain(groove_id)?.chain;
    doc.chain_mut(raw_id)?.connect(&groove);
    Some(())
}
