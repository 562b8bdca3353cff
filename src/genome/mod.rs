pub mod genome;
pub mod ring_buffer;

pub use genome::{Genome, Move, ScoringStrategy, RING_CAPACITY};
pub use ring_buffer::RingBuffer;
