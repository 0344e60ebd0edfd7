pub mod block;
pub mod segment;
pub mod collision;
pub mod pattern;
pub mod known;
pub mod pairs;

pub use block::{Block, BlockError, BLOCK_SIZE, WORDS_PER_BLOCK};
pub use segment::load_file;
pub use collision::{find_identical_blocks, CollisionMap, CollisionSummary};
pub use known::{generate_sequence_block, header_index_end_block, KnownRegionError};
pub use pairs::{collect_known_pairs, KnownPair, PairSource};
