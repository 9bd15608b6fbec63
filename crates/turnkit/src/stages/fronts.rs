//! Front-piece pruning and the derived offset fronts.

use crate::document::{ChainLabel, Document, FEATURE_SLOT_CAPACITY, TURNING_LAYER};
use crate::error::StageResult;
use crate::geometry::{Extremity, FeatureChain};
use crate::host::ProfileHost;
use crate::params::TurningConfig;
use kurbo::Point;
use tracing::{debug, warn};

/// Discard stub front pieces and keep a single survivor.
///
/// Fronts shorter than one unit go first; of the remainder only the
/// deepest level is kept. Returns the surviving level.
pub fn prune_fronts(doc: &mut Document) -> Option<u8> {
    doc.retain(|e| !matches!(e.label, ChainLabel::Front { .. }) || e.chain.length() > 1.0);

    let survivor = (1..=FEATURE_SLOT_CAPACITY as u8)
        .filter(|&level| doc.find_label(ChainLabel::Front { level }).is_some())
        .max()?;
    doc.retain(|e| match e.label {
        ChainLabel::Front { level } => level >= survivor,
        _ => true,
    });
    debug!(survivor, "pruned front pieces");
    Some(survivor)
}

/// First sampled point matching the predicate, walking the chain at a
/// 0.02 spacing; falls back to the last sample, then to the chain start.
fn first_sample(chain: &FeatureChain, matches: impl Fn(Point) -> bool) -> Option<Point> {
    let samples = (chain.length() / 0.02).trunc() as usize;
    let mut last = None;
    for k in 1..=samples {
        let p = chain.point_along(0.02 * k as f64);
        last = Some(p);
        if matches(p) {
            return Some(p);
        }
    }
    last.or_else(|| chain.extremity(Extremity::Start))
}

/// Derive additional front profiles by offsetting the surviving piece.
///
/// The survivor becomes level 1; levels 2 through 8 are offsets of it at
/// two-thirds-depth spacing, each trimmed at the stock radius and at the
/// spindle axis. An offset that degenerates ends the derivation.
pub fn offset_fronts<H: ProfileHost>(
    doc: &mut Document,
    host: &mut H,
    config: &TurningConfig,
    depth: f64,
    surviving_level: Option<u8>,
) -> StageResult<()> {
    let Some(level) = surviving_level else {
        return Ok(());
    };
    let Some(survivor) = doc.find_label(ChainLabel::Front { level }) else {
        return Ok(());
    };
    doc.set_label(survivor, ChainLabel::Front { level: 1 });
    let bar_radius = config.bar_radius();

    for level in 2..=8u8 {
        let delta = depth * 2.0 / 3.0 * (level - 1) as f64;
        let id = match host.offset_profile(doc, survivor, delta) {
            Ok(id) => id,
            Err(err) => {
                warn!(level, %err, "front offset failed");
                break;
            }
        };

        let trimmed = (|| {
            let crossing = crate::stages::split::search_crossing(doc.chain(id)?, bar_radius)?;
            let chain = doc.chain_mut(id)?;
            chain.truncate(crossing + 1);
            chain.reverse();
            if let Some(axis) = crate::stages::split::search_crossing_x(chain, 0.0) {
                chain.truncate(axis + 1);
            }
            chain.reverse();
            Some(())
        })();
        if trimmed.is_none() {
            doc.remove_chain(id);
            break;
        }

        let Some(chain) = doc.chain(id) else { break };
        if front_is_degenerate(chain, depth, bar_radius) {
            doc.remove_chain(id);
            break;
        }
        doc.set_label(id, ChainLabel::Front { level });
        doc.set_layer(id, TURNING_LAYER);
    }
    Ok(())
}

/// An offset front is useless when it hugs the stock corner, collapses onto
/// the spindle axis, or ends behind it.
fn front_is_degenerate(chain: &FeatureChain, depth: f64, bar_radius: f64) -> bool {
    let (Some(end), Some(start)) = (
        chain.extremity(Extremity::End),
        chain.extremity(Extremity::Start),
    ) else {
        return true;
    };
    if end.x <= depth && (start.y - bar_radius).abs() < 0.5 {
        return true;
    }
    if chain.count() >= 1 {
        let near_axis = first_sample(chain, |p| p.x.abs() <= 0.025);
        let near_stock = first_sample(chain, |p| (p.y - bar_radius).abs() <= 0.025);
        if let (Some(a), Some(s)) = (near_axis, near_stock) {
            if (a.y - bar_radius).abs() <= 0.25 && s.x.abs() <= 0.25 {
                return true;
            }
        }
        if end.x < 0.0 {
            return true;
        }
    }
    false
}
