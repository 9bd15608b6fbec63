use crate::geometry::{ChainId, FeatureChain};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest depth level the slot-classified stages address.
pub const FEATURE_SLOT_CAPACITY: usize = 12;

/// Layer the finished turning profiles live on.
pub const TURNING_LAYER: &str = "TurningLayer";
/// Scratch layer for in-flight duplicates.
pub const WORKING_LAYER: &str = "MyLayer";

/// Explicit identity of a chain within the turning pipeline.
///
/// This replaces the host's convention of encoding the depth level and chain
/// kind in the chain name and re-parsing it by string length; `Display` still
/// renders the host-compatible names for downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainLabel {
    /// The extracted base turning profile.
    Base,
    /// A plain profile at one depth level.
    Raw { level: u8 },
    /// The groove sub-piece of a depth level.
    Groove { level: u8 },
    /// The front sub-piece of a depth level.
    Front { level: u8 },
    /// A back-side closing chain.
    BackTurning { index: u8 },
    /// Unclassified working geometry.
    Scratch,
}

impl fmt::Display for ChainLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainLabel::Base => write!(f, "Turning"),
            ChainLabel::Raw { level } => write!(f, "TurningProfile{level}"),
            ChainLabel::Groove { level } => write!(f, "TurningProfile{level}_Gr{level}"),
            ChainLabel::Front { level } => write!(f, "TurningProfile{level}_Front"),
            ChainLabel::BackTurning { index } => write!(f, "Back_Turning_{index}"),
            ChainLabel::Scratch => write!(f, "Temp"),
        }
    }
}

/// One chain resident in a document, with its identity and placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainEntry {
    pub id: ChainId,
    /// Monotonically increasing creation serial; the host exposes the same
    /// notion as the chain `Key`, and "most recently created" queries use it.
    pub key: u64,
    pub label: ChainLabel,
    pub layer: String,
    pub chain: FeatureChain,
}

/// The shared document the pipeline stages read and mutate in sequence.
///
/// Insertion-ordered, like the host's `FeatureChains` collection; every stage
/// receives it as an explicit argument rather than through shared statics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    entries: Vec<ChainEntry>,
    next_key: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chain and return its id.
    pub fn add_chain(&mut self, label: ChainLabel, layer: &str, chain: FeatureChain) -> ChainId {
        let id = ChainId::new();
        self.next_key += 1;
        self.entries.push(ChainEntry {
            id,
            key: self.next_key,
            label,
            layer: layer.to_string(),
            chain,
        });
        id
    }

    pub fn remove_chain(&mut self, id: ChainId) -> Option<ChainEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }

    pub fn get(&self, id: ChainId) -> Option<&ChainEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: ChainId) -> Option<&mut ChainEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn chain(&self, id: ChainId) -> Option<&FeatureChain> {
        self.get(id).map(|e| &e.chain)
    }

    pub fn chain_mut(&mut self, id: ChainId) -> Option<&mut FeatureChain> {
        self.get_mut(id).map(|e| &mut e.chain)
    }

    pub fn set_label(&mut self, id: ChainId, label: ChainLabel) {
        if let Some(entry) = self.get_mut(id) {
            entry.label = label;
        }
    }

    pub fn set_layer(&mut self, id: ChainId, layer: &str) {
        if let Some(entry) = self.get_mut(id) {
            entry.layer = layer.to_string();
        }
    }

    /// First chain carrying the given label, in insertion order.
    pub fn find_label(&self, label: ChainLabel) -> Option<ChainId> {
        self.entries.iter().find(|e| e.label == label).map(|e| e.id)
    }

    /// The most recently created chain (highest key).
    pub fn latest(&self) -> Option<ChainId> {
        self.entries.iter().max_by_key(|e| e.key).map(|e| e.id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ChainEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> Vec<ChainId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry the predicate rejects.
    pub fn retain(&mut self, mut keep: impl FnMut(&ChainEntry) -> bool) {
        self.entries.retain(|e| keep(e));
    }

    /// Duplicate a chain translated along Y, placing the copy on the working
    /// layer as scratch geometry. This is the selection-set translate-copy.
    pub fn translate_copy(&mut self, id: ChainId, dy: f64) -> Option<ChainId> {
        let mut copy = self.chain(id)?.clone();
        copy.translate(Vec2::new(0.0, dy));
        Some(self.add_chain(ChainLabel::Scratch, WORKING_LAYER, copy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Extremity;
    use kurbo::Point;

    fn chain() -> FeatureChain {
        FeatureChain::from_points(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)])
    }

    #[test]
    fn test_add_get_remove() {
        let mut doc = Document::new();
        let id = doc.add_chain(ChainLabel::Base, TURNING_LAYER, chain());
        assert!(doc.get(id).is_some());
        assert_eq!(doc.len(), 1);
        let removed = doc.remove_chain(id).expect("remove");
        assert_eq!(removed.id, id);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_latest_tracks_creation_order() {
        let mut doc = Document::new();
        let first = doc.add_chain(ChainLabel::Scratch, WORKING_LAYER, chain());
        let second = doc.add_chain(ChainLabel::Scratch, WORKING_LAYER, chain());
        assert_eq!(doc.latest(), Some(second));
        doc.remove_chain(second);
        assert_eq!(doc.latest(), Some(first));
    }

    #[test]
    fn test_find_label() {
        let mut doc = Document::new();
        doc.add_chain(ChainLabel::Raw { level: 2 }, TURNING_LAYER, chain());
        let id = doc.add_chain(ChainLabel::Groove { level: 2 }, TURNING_LAYER, chain());
        assert_eq!(doc.find_label(ChainLabel::Groove { level: 2 }), Some(id));
        assert_eq!(doc.find_label(ChainLabel::Front { level: 1 }), None);
    }

    #[test]
    fn test_translate_copy() {
        let mut doc = Document::new();
        let base = doc.add_chain(ChainLabel::Base, TURNING_LAYER, chain());
        let copy = doc.translate_copy(base, 3.0).expect("copy");
        let moved = doc.chain(copy).unwrap();
        assert_eq!(
            moved.extremity(Extremity::Start),
            Some(Point::new(0.0, 3.0))
        );
        assert_eq!(doc.get(copy).unwrap().layer, WORKING_LAYER);
        // Source untouched
        assert_eq!(
            doc.chain(base).unwrap().extremity(Extremity::Start),
            Some(Point::new(0.0, 0.0))
        );
    }

    #[test]
    fn test_label_names_match_host_convention() {
        assert_eq!(ChainLabel::Base.to_string(), "Turning");
        assert_eq!(ChainLabel::Raw { level: 3 }.to_string(), "TurningProfile3");
        assert_eq!(
            ChainLabel::Groove { level: 3 }.to_string(),
            "TurningProfile3_Gr3"
        );
        assert_eq!(
            ChainLabel::Front { level: 10 }.to_string(),
            "TurningProfile10_Front"
        );
        assert_eq!(
            ChainLabel::BackTurning { index: 2 }.to_string(),
            "Back_Turning_2"
        );
    }
}
