//! Download candidates for one video and quality-based selection.

mod candidate;
mod select;
mod tier;

pub use candidate::{CandidateSet, ContainerType, PlaybackCandidate};
pub use select::{FormatCatalog, Selection};
pub use tier::QualityTier;
