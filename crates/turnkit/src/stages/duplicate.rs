//! Replication of the base profile across the turning passes.

use crate::document::{ChainLabel, Document, TURNING_LAYER};
use crate::geometry::ChainId;
use crate::stages::split::split_level;
use tracing::debug;

/// Duplicate the base profile once per pass and split each copy.
///
/// Two passes are a special case: the base chain itself covers one depth,
/// so a single translated duplicate becomes the only per-level profile
/// without splitting. Otherwise each level `1..times` is translated by
/// `(times - level) * depth` and handed to the splitter.
pub fn duplicate_levels(
    doc: &mut Document,
    base: ChainId,
    times: u32,
    depth: f64,
    bar_radius: f64,
) {
    if times == 2 {
        if let Some(copy) = doc.translate_copy(base, (times - 1) as f64 * depth) {
            doc.set_label(copy, ChainLabel::Raw { level: 1 });
            doc.set_layer(copy, TURNING_LAYER);
        }
        return;
    }
    for level in 1..times {
        let dy = (times - level) as f64 * depth;
        if split_level(doc, base, level as u8, dy, bar_radius).is_none() {
            debug!(level, "base chain vanished during duplication");
            return;
        }
    }
}
