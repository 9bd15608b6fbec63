//! The reconstruction stages, in pipeline order.

pub mod duplicate;
pub mod exchange;
pub mod extend;
pub mod extract;
pub mod fronts;
pub mod resequence;
pub mod split;

pub use duplicate::duplicate_levels;
pub use exchange::exchange_features;
pub use extend::{back_turning_chains, extend_profiles, first_feature_patch};
pub use extract::extract_base_profile;
pub use fronts::{offset_fronts, prune_fronts};
pub use resequence::resequence;
pub use split::split_level;
