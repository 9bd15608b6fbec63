pub mod chain;
pub mod element;
pub mod ids;
pub mod offset;

pub use chain::{Extremity, FeatureChain};
pub use element::{Arc, Element};
pub use ids::ChainId;
pub use offset::offset_chain;
