//! Blocks whose plaintext follows from the file structure alone.
//!
//! Two regions are supported:
//!
//! - The header index end block at the fixed offset `0x1C0`. Its plaintext is
//!   16 copies of `(last_block_offset + 0x100 - 0x200) >> 8`.
//! - The sequence block near the end of most files: one run of bytes each one
//!   higher than the last, reconstructible from its trailing word.

use thiserror::Error;
use tracing::{debug, warn};

use crate::block::{Block, BLOCK_SIZE, WORDS_PER_BLOCK};

/// Fixed byte offset of the header index end block.
pub const HEADER_INDEX_END_OFFSET: u64 = 0x1C0;
/// Size of the TPS file header that precedes the first page.
pub const HEADER_SIZE: u64 = 0x200;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KnownRegionError {
    #[error("Block at index {index} reports offset {found:#x}, expected {expected:#x}")]
    OffsetMismatch { index: usize, expected: u64, found: u64 },
    #[error("Block index {index} out of range for a file of {len} blocks")]
    MissingBlock { index: usize, len: usize },
}

/// The header index end block of `file`.
///
/// With `want_encrypted` the block is looked up in `file`; otherwise the
/// plaintext is computed from the offset of the last block.
pub fn header_index_end_block(file: &[Block], want_encrypted: bool) -> Result<Block, KnownRegionError> {
    if want_encrypted {
        let index = (HEADER_INDEX_END_OFFSET / BLOCK_SIZE as u64) as usize;
        let block = file
            .get(index)
            .ok_or(KnownRegionError::MissingBlock { index, len: file.len() })?;
        if block.offset() != HEADER_INDEX_END_OFFSET {
            warn!(index, offset = block.offset(), "header index end block out of place");
            return Err(KnownRegionError::OffsetMismatch {
                index,
                expected: HEADER_INDEX_END_OFFSET,
                found: block.offset(),
            });
        }
        return Ok(*block);
    }

    let last = file
        .last()
        .ok_or(KnownRegionError::MissingBlock { index: 0, len: 0 })?;
    let value = header_index_end_value(last.offset());
    debug!(last_offset = last.offset(), value, "computed header index end plaintext");
    Ok(Block::from_words(HEADER_INDEX_END_OFFSET, [value; WORDS_PER_BLOCK], false))
}

/// Plaintext word of the header index end block for a file whose last block
/// starts at `last_block_offset`.
///
/// The arithmetic is 32-bit with wraparound, followed by a logical shift.
pub fn header_index_end_value(last_block_offset: u64) -> u32 {
    (last_block_offset as u32)
        .wrapping_add(0x100)
        .wrapping_sub(HEADER_SIZE as u32)
        >> 8
}

/// Rebuild a sequence block from its trailing word `end`.
///
/// The most significant byte of `end` is the last byte of the block; every
/// earlier byte is one less, wrapping below zero. The result sits at offset 0;
/// use [`Block::with_offset`] to place it.
pub fn generate_sequence_block(end: u32) -> Block {
    let mut value = (end >> 24) as u8;
    let mut sequence = [0u8; BLOCK_SIZE];
    for byte in sequence.iter_mut().rev() {
        *byte = value;
        value = value.wrapping_sub(1);
    }
    Block::from_bytes(0, &sequence, false)
}
