//! Splitting a whole file buffer into sequential 64-byte blocks.
//!
//! A buffer whose length is not a multiple of [`BLOCK_SIZE`] is rejected with
//! [`BlockError::Truncated`]; the final chunk is never zero padded.

use std::io::Cursor;

use tracing::debug;

use crate::block::{Block, BlockError, BLOCK_SIZE};

/// Segment `bytes` into blocks at offsets 0, 64, 128, ... each tagged with
/// `encrypted`.
pub fn load_file(bytes: &[u8], encrypted: bool) -> Result<Vec<Block>, BlockError> {
    let total = bytes.len() as u64;
    let mut cursor = Cursor::new(bytes);
    let mut blocks = Vec::with_capacity(bytes.len() / BLOCK_SIZE);
    while cursor.position() < total {
        let offset = cursor.position();
        blocks.push(Block::read(&mut cursor, offset, encrypted)?);
    }
    debug!(blocks = blocks.len(), encrypted, "segmented file");
    Ok(blocks)
}
