//! Crossing searches and the per-level groove/front split.

use crate::document::{ChainLabel, Document, TURNING_LAYER};
use crate::geometry::{ChainId, Extremity, FeatureChain};
use tracing::debug;

/// Index of the first element whose Y span reaches the height `h`.
///
/// Endpoints are normalized lower-X first before the test; the span is
/// half-open, matching on the far endpoint but not the near one.
pub fn search_crossing(chain: &FeatureChain, h: f64) -> Option<usize> {
    for (index, el) in chain.elements().iter().enumerate() {
        let (mut near, mut far) = (el.start(), el.end());
        if near.x > far.x {
            std::mem::swap(&mut near, &mut far);
        }
        if (h > near.y && h <= far.y) || (h < near.y && h >= far.y) {
            return Some(index);
        }
    }
    None
}

/// Index of the first element whose X span reaches `x`, with the same
/// lower-X-first normalization and half-open test as [`search_crossing`].
pub fn search_crossing_x(chain: &FeatureChain, x: f64) -> Option<usize> {
    for (index, el) in chain.elements().iter().enumerate() {
        let (mut near, mut far) = (el.start(), el.end());
        if near.x > far.x {
            std::mem::swap(&mut near, &mut far);
        }
        if x > near.x && x <= far.x {
            return Some(index);
        }
    }
    None
}

/// Index of the element holding the point `(t, v)`.
///
/// An element matches when one of its normalized endpoints lies within
/// 0.001 of `t` in X while `v` falls strictly between the endpoint Y
/// values, or when `t` falls strictly inside its X span. Falls back to the
/// element count when nothing matches.
pub fn find_point_element(chain: &FeatureChain, t: f64, v: f64) -> usize {
    for (index, el) in chain.elements().iter().enumerate() {
        let (mut near, mut far) = (el.start(), el.end());
        if near.x > far.x {
            std::mem::swap(&mut near, &mut far);
        }
        if (near.x - t).abs() <= 0.001 || (far.x - t).abs() <= 0.001 {
            if far.y > near.y {
                if v > near.y && v < far.y {
                    return index;
                }
            } else if v < near.y && v > far.y {
                return index;
            }
        }
        if t > near.x && t < far.x {
            return index;
        }
    }
    chain.count()
}

/// Split one translated duplicate into its groove and front pieces.
///
/// The duplicate is examined reversed; when it never reaches the stock
/// radius it stays a plain per-level profile. Otherwise the trimmed piece
/// becomes the groove and a second duplicate is trimmed into the front
/// piece, with degenerate fronts discarded and a near-coincident
/// groove/front pair collapsing back to a plain duplicate.
pub fn split_level(
    doc: &mut Document,
    base: ChainId,
    level: u8,
    dy: f64,
    bar_radius: f64,
) -> Option<()> {
    let groove_id = doc.translate_copy(base, dy)?;
    doc.chain_mut(groove_id)?.reverse();

    let Some(crossing) = search_crossing(doc.chain(groove_id)?, bar_radius) else {
        doc.set_label(groove_id, ChainLabel::Raw { level });
        doc.set_layer(groove_id, TURNING_LAYER);
        doc.chain_mut(groove_id)?.reverse();
        return Some(());
    };

    doc.set_label(groove_id, ChainLabel::Groove { level });
    doc.set_layer(groove_id, TURNING_LAYER);
    {
        let chain = doc.chain_mut(groove_id)?;
        chain.truncate(crossing + 1);
        chain.reverse();
    }
    let groove_start = doc.chain(groove_id)?.extremity(Extremity::Start)?;
    let groove_kept = crossing + 1;

    let front_id = doc.translate_copy(base, dy)?;
    let front_count = doc.chain(front_id)?.count();
    let front_crossing = search_crossing(doc.chain(front_id)?, bar_radius);
    match front_crossing {
        None => {
            doc.remove_chain(front_id);
        }
        // Same crossing seen from the other end; the front piece would
        // mirror the groove exactly.
        Some(c) if c == front_count - groove_kept => {
            doc.remove_chain(front_id);
        }
        Some(c) => {
            doc.set_label(front_id, ChainLabel::Front { level });
            doc.set_layer(front_id, TURNING_LAYER);
            doc.chain_mut(front_id)?.truncate(c + 1);
            let chain = doc.chain(front_id)?;
            let above_stock = chain
                .extremity(Extremity::Start)
                .map(|p| p.y > bar_radius)
                .unwrap_or(true)
                || chain
                    .extremity(Extremity::Middle)
                    .map(|p| p.y > bar_radius)
                    .unwrap_or(true);
            if above_stock {
                doc.remove_chain(front_id);
            } else if let Some(front_end) = chain.extremity(Extremity::End) {
                if groove_start.distance(front_end) < 0.5 {
                    debug!(level, "degenerate groove/front pair, keeping plain duplicate");
                    doc.remove_chain(front_id);
                    doc.remove_chain(groove_id);
                    let plain = doc.translate_copy(base, dy)?;
                    doc.set_label(plain, ChainLabel::Raw { level });
                    doc.set_layer(plain, TURNING_LAYER);
                }
            }
        }
    }
    Some(())
}
