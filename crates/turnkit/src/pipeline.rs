//! End-to-end reconstruction of the multi-pass turning profiles.

use crate::document::{ChainLabel, Document};
use crate::host::ProfileHost;
use crate::kernel::GeometryKernel;
use crate::params::{
    normalized_depth, turning_pass_count, turning_span, TurningConfig, TurningState,
};
use crate::stages::{
    duplicate_levels, exchange_features, extend_profiles, extract_base_profile,
    first_feature_patch, offset_fronts, prune_fronts, resequence,
};
use anyhow::{Context, Result};
use tracing::info;

/// Rebuild the full set of turning profiles for the current part.
///
/// Recognizes the base profile, plans the pass count from the stock span,
/// replicates and splits the profile per depth level, splices groove pieces
/// back in, renumbers, derives the offset fronts, and closes every open end
/// at the stock boundary. Returns the measurements and flags the run
/// produced.
pub fn rebuild_turning_profiles<H: ProfileHost, K: GeometryKernel>(
    doc: &mut Document,
    host: &mut H,
    kernel: &K,
    config: &TurningConfig,
) -> Result<TurningState> {
    let mut state = TurningState::default();
    let base = extract_base_profile(doc, host, config, &mut state)
        .context("extract base turning profile")?;

    let bar_radius = config.bar_radius();
    let span = turning_span(bar_radius, state.lower_y);
    let depth = normalized_depth(config.turning_depth, span);
    let times = turning_pass_count(span, depth);
    state.turning_depth = depth;
    state.turning_times = times;
    info!(times, depth, span, "turning plan");

    duplicate_levels(doc, base, times, depth, bar_radius);

    // With only two passes there is a single plain duplicate and nothing to
    // splice or renumber.
    if times > 2 {
        let needs_resequence = exchange_features(doc, kernel, config, &mut state);
        if needs_resequence {
            resequence(doc, kernel, config, &state);
        }
        state.min_front = prune_fronts(doc);
    }

    // Degenerate leftovers of the splitting and splicing steps. Back-side
    // and scratch chains are exempt.
    doc.retain(|e| match e.label {
        ChainLabel::Base
        | ChainLabel::Raw { .. }
        | ChainLabel::Groove { .. }
        | ChainLabel::Front { .. } => e.chain.length() > 0.001,
        _ => true,
    });

    offset_fronts(doc, host, config, depth, state.min_front)
        .context("derive offset front profiles")?;
    extend_profiles(doc, config, &state);
    if state.first_feature_need {
        first_feature_patch(doc, config, &state);
    }
    Ok(state)
}
