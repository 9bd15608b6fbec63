//! Base-profile extraction: shape recognition, boundary trimming and the
//! derived measurements every later stage reads.

use crate::document::{ChainLabel, Document, TURNING_LAYER};
use crate::error::{StageError, StageResult};
use crate::geometry::{ChainId, Element, Extremity, FeatureChain};
use crate::host::ProfileHost;
use crate::params::{SpindleSide, TurningConfig, TurningState};
use kurbo::Point;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use tracing::debug;

/// Steepest descending-segment angle of a chain, radians.
///
/// Only straight segments at least 0.35 long whose end sits below their
/// start participate; a near-vertical drop counts as a right angle.
pub fn max_angle(chain: &FeatureChain) -> f64 {
    let mut best = 0.0_f64;
    for el in chain.elements() {
        let Element::Segment(_) = el else { continue };
        let (start, end) = (el.start(), el.end());
        if end.y >= start.y || el.length() < 0.35 {
            continue;
        }
        let angle = if (end.x - start.x).abs() <= 0.001 {
            FRAC_PI_2
        } else {
            ((end.y - start.y) / (end.x - start.x)).abs().atan()
        };
        if angle > best {
            best = angle;
        }
    }
    best
}

/// Run recognition, trim the result at the stock boundary, extend its open
/// end, and record the derived measurements into `state`.
///
/// The recognized chain is labeled `Base` on the turning layer; its id is
/// returned for the duplicator.
pub fn extract_base_profile<H: ProfileHost>(
    doc: &mut Document,
    host: &mut H,
    config: &TurningConfig,
    state: &mut TurningState,
) -> StageResult<ChainId> {
    host.create_turning_profile(doc, "XYZ")?;
    // Recognition may add several chains; the newest one is the profile.
    let id = doc.latest().ok_or(StageError::NoProfileRecognized)?;
    if config.spindle_side == SpindleSide::Sub {
        if let Some(chain) = doc.chain_mut(id) {
            chain.reverse();
        }
    }
    doc.set_label(id, ChainLabel::Base);
    doc.set_layer(id, TURNING_LAYER);

    let chain = doc.chain(id).ok_or(StageError::ChainMissing(id))?;
    let natural_end = chain
        .extremity(Extremity::End)
        .ok_or(StageError::NoProfileRecognized)?;

    // Walk toward the stock boundary, tracking the outboard vertex of each
    // element so the bridge segment below anchors at the last one visited.
    let mut anchor = natural_end;
    let mut crossing = None;
    for (index, el) in chain.elements().iter().enumerate() {
        let (start, end) = (el.start(), el.end());
        anchor = match config.spindle_side {
            SpindleSide::Main => {
                if start.x < end.x {
                    end
                } else {
                    start
                }
            }
            SpindleSide::Sub => {
                if start.x > end.x {
                    end
                } else {
                    start
                }
            }
        };
        let (lo, hi) = if start.x <= end.x {
            (start.x, end.x)
        } else {
            (end.x, start.x)
        };
        if lo <= config.back_point_x && config.back_point_x <= hi {
            crossing = Some(index);
            break;
        }
    }

    if config.non_connection {
        anchor = natural_end;
    } else if let Some(index) = crossing {
        if let Some(chain) = doc.chain_mut(id) {
            chain.truncate(index);
        }
    }
    state.lower_y = anchor.y;

    let chain = doc.chain(id).ok_or(StageError::ChainMissing(id))?;
    let end = chain
        .extremity(Extremity::End)
        .unwrap_or(anchor);
    state.end_x_value = end.x;
    let extended = Point::new(
        end.x + config.spindle_side.extend_sign() * config.turning_extend,
        end.y,
    );
    let bridge = Element::segment(Point::new(anchor.x, anchor.y), extended);
    let chain = doc.chain_mut(id).ok_or(StageError::ChainMissing(id))?;
    chain.add(bridge);

    state.high_y = chain.max_y_point().map(|p| p.y).unwrap_or(anchor.y);
    let mut angle = max_angle(chain);
    if angle.abs() <= 0.785 {
        angle = FRAC_PI_4;
    }
    state.turn_max_angle = angle;
    debug!(
        lower_y = state.lower_y,
        high_y = state.high_y,
        end_x = state.end_x_value,
        turn_max_angle = state.turn_max_angle,
        "extracted base profile"
    );
    Ok(id)
}
