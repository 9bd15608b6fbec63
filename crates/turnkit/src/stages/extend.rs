//! Closing-segment finishers: chamfer extensions back to the stock
//! boundary, the outermost-profile patch, and the back-side chains.

use crate::document::{ChainLabel, Document, TURNING_LAYER};
use crate::geometry::{Extremity, FeatureChain};
use crate::params::{TurningConfig, TurningState};
use kurbo::Point;
use tracing::{debug, warn};

/// Append the closing segments that connect every finished profile's open
/// end back up to the bar-stock radius.
///
/// The base profile gets a single chamfer segment. Each numbered profile
/// first gets a horizontal landing proportional to its remaining depth,
/// then the chamfer segment; both end exactly at the stock radius.
pub fn extend_profiles(doc: &mut Document, config: &TurningConfig, state: &TurningState) {
    let bar_radius = config.bar_radius();
    let sign = config.spindle_side.extend_sign();

    for id in doc.ids() {
        let Some(entry) = doc.get(id) else { continue };
        let label = entry.label;
        let Some(end) = entry.chain.extremity(Extremity::End) else {
            warn!(%id, "empty chain skipped by finisher");
            continue;
        };
        match label {
            ChainLabel::Base => {
                let tan = config.chamfer_tan();
                let x = end.x + sign * (bar_radius - end.y) / tan;
                if let Some(chain) = doc.chain_mut(id) {
                    chain.add_point(Point::new(x, bar_radius));
                }
            }
            ChainLabel::Raw { level } => {
                let landing_x = if config.chamfer_deg == 90.0 {
                    end.x
                } else {
                    let tan = config.chamfer_tan();
                    let remaining = state.turning_times.saturating_sub(level as u32) as f64;
                    end.x + sign * remaining * state.turning_depth / tan
                };
                let tan = config.chamfer_tan();
                let top_x = landing_x + sign * (bar_radius - end.y) / tan;
                if let Some(chain) = doc.chain_mut(id) {
                    chain.add_point(Point::new(landing_x, end.y));
                    chain.add_point(Point::new(top_x, bar_radius));
                }
            }
            _ => {}
        }
    }
}

/// Close the outermost profile when it never received a groove partner.
///
/// Anchors near the surviving front piece when one exists, otherwise at
/// the spindle axis; the anchor height clears both the profile's crest and
/// the stock radius. The profile's own tail is dropped (twice when it
/// already touched the stock radius) before the two closing segments go in.
pub fn first_feature_patch(doc: &mut Document, config: &TurningConfig, state: &TurningState) {
    let bar_radius = config.bar_radius();
    let anchor_y = if state.high_y > bar_radius - 0.25 {
        state.high_y + 0.05
    } else {
        bar_radius - 0.25
    };
    let anchor_x = doc
        .find_label(ChainLabel::Front { level: 1 })
        .and_then(|front| doc.chain(front)?.extremity(Extremity::End))
        .map(|p| p.x - 1.0)
        .unwrap_or(0.0);
    let anchor = Point::new(anchor_x, anchor_y);

    let Some(id) = doc.find_label(ChainLabel::Raw { level: 1 }) else {
        debug!("no outermost profile to patch");
        return;
    };
    let Some(chain) = doc.chain_mut(id) else { return };
    let Some(start) = chain.extremity(Extremity::Start) else {
        return;
    };
    let corner = Point::new(start.x, anchor_y);

    chain.reverse();
    chain.truncate(chain.count().saturating_sub(1));
    if let Some(end) = chain.extremity(Extremity::End) {
        if (end.y - bar_radius).abs() <= 0.25 {
            chain.truncate(chain.count().saturating_sub(1));
        }
    }
    chain.add_point(corner);
    chain.add_point(anchor);
    chain.reverse();
}

/// Emit one closing chain per pass behind the part.
///
/// Each is a four-point zigzag from the stock radius down to the pass
/// depth, across the back-turn clearance, and back up at the chamfer
/// angle.
pub fn back_turning_chains(doc: &mut Document, config: &TurningConfig, state: &TurningState) {
    let bar_radius = config.bar_radius();
    let chamfer_tan = config.chamfer_tan();
    let complement_tan = {
        let tan = (90.0 - config.chamfer_deg).to_radians().tan();
        if tan.is_nan() || tan.abs() < 1e-6 {
            1.0
        } else {
            tan
        }
    };

    for pass in 1..=state.turning_times {
        let remaining = (state.turning_times - pass) as f64;
        let x2 = state.end_x_value + config.turning_extend - 1.0;
        let y2 = state.lower_y + remaining * state.turning_depth;
        let x1 = x2 - (bar_radius - y2) / complement_tan;
        let x3 = x2 + config.back_turn + remaining * state.turning_depth / chamfer_tan;
        let x4 = x3 + (bar_radius - y2) / chamfer_tan;
        let chain = FeatureChain::from_points(&[
            Point::new(x1, bar_radius),
            Point::new(x2, y2),
            Point::new(x3, y2),
            Point::new(x4, bar_radius),
        ]);
        doc.add_chain(
            ChainLabel::BackTurning { index: pass as u8 },
            TURNING_LAYER,
            chain,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polyline(points: &[(f64, f64)]) -> FeatureChain {
        let pts: Vec<Point> = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        FeatureChain::from_points(&pts)
    }

    #[test]
    fn test_base_closing_segment_reaches_stock_radius() {
        let mut doc = Document::new();
        let id = doc.add_chain(
            ChainLabel::Base,
            TURNING_LAYER,
            polyline(&[(10.0, 2.0), (4.0, 2.0)]),
        );
        let config = TurningConfig {
            bar_diameter: 20.0,
            chamfer_deg: 45.0,
            ..TurningConfig::default()
        };
        let state = TurningState::default();
        extend_profiles(&mut doc, &config, &state);
        let end = doc.chain(id).unwrap().extremity(Extremity::End).unwrap();
        assert_eq!(end.y, 10.0);
        // 45 degrees: horizontal travel equals the vertical rise, toward
        // negative X on the main spindle side
        assert!((end.x - (4.0 - 8.0)).abs() < 1e-9, "end {end:?}");
    }

    #[test]
    fn test_closing_segment_reaches_radius_for_any_chamfer() {
        for chamfer in [15.0, 30.0, 60.0, 89.0] {
            let mut doc = Document::new();
            let id = doc.add_chain(
                ChainLabel::Raw { level: 2 },
                TURNING_LAYER,
                polyline(&[(10.0, 1.0), (5.0, 1.0)]),
            );
            let config = TurningConfig {
                bar_diameter: 12.0,
                chamfer_deg: chamfer,
                ..TurningConfig::default()
            };
            let state = TurningState {
                turning_times: 5,
                turning_depth: 1.0,
                ..TurningState::default()
            };
            extend_profiles(&mut doc, &config, &state);
            let end = doc.chain(id).unwrap().extremity(Extremity::End).unwrap();
            assert!(
                (end.y - 6.0).abs() < 1e-9,
                "chamfer {chamfer}: end {end:?}"
            );
        }
    }

    #[test]
    fn test_right_angle_chamfer_skips_landing_offset() {
        let mut doc = Document::new();
        let id = doc.add_chain(
            ChainLabel::Raw { level: 1 },
            TURNING_LAYER,
            polyline(&[(10.0, 1.0), (5.0, 1.0)]),
        );
        let config = TurningConfig {
            bar_diameter: 12.0,
            chamfer_deg: 90.0,
            ..TurningConfig::default()
        };
        let state = TurningState {
            turning_times: 4,
            turning_depth: 1.0,
            ..TurningState::default()
        };
        extend_profiles(&mut doc, &config, &state);
        let chain = doc.chain(id).unwrap();
        let end = chain.extremity(Extremity::End).unwrap();
        assert!((end.y - 6.0).abs() < 1e-9, "end {end:?}");
    }

    #[test]
    fn test_patch_anchors_at_axis_without_front() {
        let mut doc = Document::new();
        let id = doc.add_chain(
            ChainLabel::Raw { level: 1 },
            TURNING_LAYER,
            polyline(&[(0.0, 2.0), (4.0, 2.0), (8.0, 2.0), (10.0, 2.0)]),
        );
        let config = TurningConfig {
            bar_diameter: 20.0,
            ..TurningConfig::default()
        };
        let state = TurningState {
            high_y: 2.0,
            ..TurningState::default()
        };
        first_feature_patch(&mut doc, &config, &state);
        let chain = doc.chain(id).unwrap();
        // After the final reverse the anchor is the new start, at the
        // computed safe height over the spindle axis
        let start = chain.extremity(Extremity::Start).unwrap();
        assert!(start.distance(Point::new(0.0, 9.75)) < 1e-9, "start {start:?}");
        // The old leading element was dropped and replaced by the two
        // closing segments
        let end = chain.extremity(Extremity::End).unwrap();
        assert!(end.distance(Point::new(10.0, 2.0)) < 1e-9);
    }

    #[test]
    fn test_patch_drops_second_element_near_radius() {
        let mut doc = Document::new();
        // Reversed traversal ends at (2, 9.9), within 0.25 of the radius,
        // so the patch trims twice
        let id = doc.add_chain(
            ChainLabel::Raw { level: 1 },
            TURNING_LAYER,
            polyline(&[(0.0, 9.8), (2.0, 9.9), (6.0, 2.0), (10.0, 2.0)]),
        );
        let config = TurningConfig {
            bar_diameter: 20.0,
            ..TurningConfig::default()
        };
        let state = TurningState {
            high_y: 9.9,
            ..TurningState::default()
        };
        first_feature_patch(&mut doc, &config, &state);
        let chain = doc.chain(id).unwrap();
        // Only the (6,2)-(10,2) element survives from the input chain;
        // with no front piece the corner and anchor coincide, so a single
        // closing segment joins it
        assert_eq!(chain.count(), 2);
        let start = chain.extremity(Extremity::Start).unwrap();
        assert!((start.y - 9.95).abs() < 1e-9, "start {start:?}");
    }

    #[test]
    fn test_back_turning_chain_per_pass() {
        let mut doc = Document::new();
        let config = TurningConfig {
            bar_diameter: 10.0,
            chamfer_deg: 45.0,
            back_turn: 2.0,
            turning_extend: 3.0,
            ..TurningConfig::default()
        };
        let state = TurningState {
            turning_times: 3,
            turning_depth: 1.0,
            lower_y: 1.0,
            end_x_value: 8.0,
            ..TurningState::default()
        };
        back_turning_chains(&mut doc, &config, &state);
        assert_eq!(doc.len(), 3);
        for pass in 1..=3u8 {
            let id = doc
                .find_label(ChainLabel::BackTurning { index: pass })
                .expect("pass chain");
            let chain = doc.chain(id).unwrap();
            assert_eq!(chain.count(), 3);
            let start = chain.extremity(Extremity::Start).unwrap();
            let end = chain.extremity(Extremity::End).unwrap();
            assert_eq!(start.y, 5.0, "starts at the stock radius");
            assert_eq!(end.y, 5.0, "returns to the stock radius");
            assert!(end.x > start.x);
        }
    }
}
