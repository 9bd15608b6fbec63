use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;
use std::{fs, path::Path};
use tracing::warn;

/// Which side of the lathe holds the part; flips traversal orientation and
/// the sign of every X extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpindleSide {
    #[default]
    Main,
    Sub,
}

impl SpindleSide {
    /// Sign applied when extending geometry away from the part along X.
    pub fn extend_sign(&self) -> f64 {
        match self {
            SpindleSide::Main => -1.0,
            SpindleSide::Sub => 1.0,
        }
    }
}

/// Machine-setup and workflow parameters supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurningConfig {
    /// Stock bar diameter from the lathe machine setup.
    pub bar_diameter: f64,
    /// Radial depth removed per turning pass. Zero/NaN is normalized at run
    /// time; see [`normalized_depth`].
    pub turning_depth: f64,
    /// Distance the extracted profile is extended past its natural end.
    pub turning_extend: f64,
    /// Closing-cut angle in degrees, used to connect open profile ends to
    /// the stock boundary.
    pub chamfer_deg: f64,
    /// Extra clearance behind the part for the back-turning chains.
    pub back_turn: f64,
    pub spindle_side: SpindleSide,
    /// X coordinate of the stock boundary the base profile is trimmed at.
    pub back_point_x: f64,
    /// Set by the stock-locating step when the profile never reaches the
    /// boundary; skips boundary trimming in the extractor.
    pub non_connection: bool,
}

impl Default for TurningConfig {
    fn default() -> Self {
        Self {
            bar_diameter: 10.0,
            turning_depth: 1.0,
            turning_extend: 2.0,
            chamfer_deg: 45.0,
            back_turn: 1.0,
            spindle_side: SpindleSide::Main,
            back_point_x: 0.0,
            non_connection: false,
        }
    }
}

impl TurningConfig {
    pub fn bar_radius(&self) -> f64 {
        self.bar_diameter / 2.0
    }

    /// Tangent of the chamfer angle, substituting 45 degrees when the
    /// configured angle is degenerate.
    pub fn chamfer_tan(&self) -> f64 {
        let tan = (self.chamfer_deg.to_radians()).tan();
        if tan.is_nan() || tan.abs() < 1e-6 {
            warn!(chamfer_deg = self.chamfer_deg, "degenerate chamfer angle, using 45 degrees");
            FRAC_PI_4.tan()
        } else {
            tan
        }
    }

    /// Persist the configuration to disk as prettified JSON.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = serde_json::to_vec_pretty(self).context("serialize turning config")?;
        fs::write(path, data).context("write turning config file")
    }

    /// Load a configuration from disk.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(&path).with_context(|| {
            format!(
                "read turning config from {}",
                path.as_ref().to_string_lossy()
            )
        })?;
        serde_json::from_slice(&bytes).context("deserialize turning config")
    }
}

/// Radial span between the stock radius and the profile's lowest Y. Falls
/// back to `max(1, |lower_y|)` when the machine setup yields garbage, so the
/// pass-count division below stays finite.
pub fn turning_span(bar_radius: f64, lower_y: f64) -> f64 {
    let span = bar_radius - lower_y;
    if span.is_nan() || span.is_infinite() || span <= 0.0 {
        let fallback = 1.0_f64.max(lower_y.abs());
        warn!(span, lower_y, fallback, "invalid turning span, using fallback");
        fallback
    } else {
        span
    }
}

/// Per-pass depth, substituting `max(0.5, span / 5)` for an unset or
/// degenerate configured value.
pub fn normalized_depth(depth: f64, span: f64) -> f64 {
    if depth.is_nan() || depth.is_infinite() || depth.abs() < 1e-6 {
        let applied = 0.5_f64.max(span / 5.0);
        warn!(configured = depth, applied, "turning depth normalized");
        applied
    } else {
        depth
    }
}

/// Number of turning passes for a span/depth pair.
///
/// Bias rules, applied in this order: a fractional remainder above 0.1
/// rounds up; 2 maps to 3; 1 maps to 2; the result is capped at 15.
pub fn turning_pass_count(span: f64, depth: f64) -> u32 {
    let ratio = span / depth;
    let mut times = ratio.trunc() as i64;
    if ratio - ratio.trunc() > 0.1 {
        times += 1;
    }
    if times == 2 {
        times = 3;
    }
    if times == 1 {
        times = 2;
    }
    times.clamp(2, 15) as u32
}

/// Values computed by the pipeline, surfaced for display and persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurningState {
    pub turning_times: u32,
    /// The depth actually applied after normalization.
    pub turning_depth: f64,
    pub lower_y: f64,
    pub high_y: f64,
    /// X of the base profile's end before the turning extension.
    pub end_x_value: f64,
    /// Steepest descending-segment angle of the base profile, radians.
    pub turn_max_angle: f64,
    /// Set when no groove pairing existed for the outermost profile.
    pub first_feature_need: bool,
    /// Number of groove-derived profiles seen by the exchanger.
    pub gr_feature: usize,
    /// Front-piece level kept after pruning, when any survived.
    pub min_front: Option<u8>,
}
