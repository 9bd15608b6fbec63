//! Seam to the hosting CAD/CAM environment.
//!
//! The pipeline only needs two host services: running shape recognition to
//! obtain the raw section profile, and offsetting a profile chain. The
//! offset has a geometric default; recognition must come from the host.

use crate::document::{ChainLabel, Document, WORKING_LAYER};
use crate::error::{StageError, StageResult};
use crate::geometry::{offset_chain, ChainId, FeatureChain};
use tracing::debug;

pub trait ProfileHost {
    /// Run shape recognition over the currently selected mesh against the
    /// named section plane, add the recognized chain to the document as
    /// scratch geometry, and return its id.
    fn create_turning_profile(&mut self, doc: &mut Document, plane: &str) -> StageResult<ChainId>;

    /// Offset the chain to the left of its traversal by `delta` and add the
    /// result to the document as scratch geometry.
    fn offset_profile(
        &mut self,
        doc: &mut Document,
        id: ChainId,
        delta: f64,
    ) -> StageResult<ChainId> {
        let chain = doc.chain(id).ok_or(StageError::ChainMissing(id))?;
        let offset = offset_chain(chain, delta).map_err(|e| StageError::Host(e.to_string()))?;
        debug!(%id, delta, elements = offset.count(), "offset profile");
        Ok(doc.add_chain(ChainLabel::Scratch, WORKING_LAYER, offset))
    }
}

/// Host stand-in that replays pre-recorded recognition results, in order.
/// Used by the test suites and by callers driving the pipeline offline.
#[derive(Debug, Default)]
pub struct FixtureHost {
    profiles: Vec<FeatureChain>,
    served: usize,
}

impl FixtureHost {
    pub fn new(profiles: Vec<FeatureChain>) -> Self {
        Self {
            profiles,
            served: 0,
        }
    }

    /// Host with a single recognition result.
    pub fn single(profile: FeatureChain) -> Self {
        Self::new(vec![profile])
    }
}

impl ProfileHost for FixtureHost {
    fn create_turning_profile(&mut self, doc: &mut Document, plane: &str) -> StageResult<ChainId> {
        let profile = self
            .profiles
            .get(self.served)
            .cloned()
            .ok_or_else(|| StageError::MissingPlane(plane.to_string()))?;
        self.served += 1;
        if profile.is_empty() {
            return Err(StageError::NoProfileRecognized);
        }
        Ok(doc.add_chain(ChainLabel::Scratch, WORKING_LAYER, profile))
    }
}
