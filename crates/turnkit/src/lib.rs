//! Reconstruction of multi-pass lathe turning profiles from a recognized
//! part section.
//!
//! The host environment contributes shape recognition and (optionally)
//! chain offsetting through the [`ProfileHost`] trait; everything else is
//! pure chain geometry on a [`Document`]. The top-level entry point is
//! [`rebuild_turning_profiles`].

mod document;
mod error;
mod geometry;
mod host;
mod kernel;
mod params;
mod pipeline;
mod stages;

pub use document::*;
pub use error::*;
pub use geometry::*;
pub use host::*;
pub use kernel::*;
pub use params::*;
pub use pipeline::rebuild_turning_profiles;
pub use stages::{
    back_turning_chains, duplicate_levels, exchange_features, extend_profiles,
    extract_base_profile, first_feature_patch, offset_fronts, prune_fronts, resequence,
    split_level,
};
