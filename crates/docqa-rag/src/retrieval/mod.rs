//! Chunk storage and nearest-neighbour retrieval

pub mod distance;
pub mod persistence;
pub mod store;

pub use distance::DistanceMetric;
pub use persistence::{Collection, StoredChunk};
pub use store::ChunkStore;
