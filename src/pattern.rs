//! Recognizers for filler regions whose plaintext is known in advance.

use crate::block::{Block, WORDS_PER_BLOCK};

/// Word TPS writes into unused space.
pub const FILLER_WORD: u32 = 0xB0B0_B0B0;

pub fn is_filler_constant(value: u32) -> bool {
    value == FILLER_WORD
}

/// True for a run of bytes that increases by one from the least significant
/// byte upward, wrapping at 0xFF, e.g. `0x2A292827` or `0x0100FFFE`.
pub fn is_byte_sequence_part(value: u32) -> bool {
    let bytes = value.to_le_bytes();
    bytes.windows(2).all(|pair| pair[1].wrapping_sub(pair[0]) == 1)
}

pub fn is_filler_block(block: &Block) -> bool {
    block.words().iter().all(|w| is_filler_constant(*w))
}

/// True when all 64 bytes form one continuous wrapping run, including across
/// word boundaries.
pub fn is_sequence_block(block: &Block) -> bool {
    let bytes = block.to_bytes();
    bytes.windows(2).all(|pair| pair[1].wrapping_sub(pair[0]) == 1)
}

/// Unencrypted all-filler block at `offset`.
pub fn filler_block(offset: u64) -> Block {
    Block::from_words(offset, [FILLER_WORD; WORDS_PER_BLOCK], false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filler_constant() {
        assert!(is_filler_constant(0xB0B0B0B0));
        assert!(!is_filler_constant(0xB0B0B0B1));
        assert!(!is_filler_constant(0));
    }

    #[test]
    fn test_byte_sequence_part() {
        assert!(is_byte_sequence_part(u32::from_le_bytes([0x27, 0x28, 0x29, 0x2A])));
        assert!(!is_byte_sequence_part(u32::from_le_bytes([0x27, 0x28, 0x29, 0x2B])));
        assert!(is_byte_sequence_part(u32::from_le_bytes([0xFF, 0x00, 0x01, 0x02])));
        assert!(is_byte_sequence_part(0x0100FFFE));
        assert!(!is_byte_sequence_part(0x27282A29));
        assert!(!is_byte_sequence_part(FILLER_WORD));
    }

    #[test]
    fn test_filler_block() {
        let block = filler_block(0x200);
        assert!(is_filler_block(&block));
        assert_eq!(block.offset(), 0x200);
        assert!(!block.is_encrypted());

        let mut words = [FILLER_WORD; WORDS_PER_BLOCK];
        words[9] = 0;
        assert!(!is_filler_block(&Block::from_words(0, words, false)));
    }

    #[test]
    fn test_sequence_block_must_cross_word_boundaries() {
        // Every word is a sequence part, but consecutive words do not continue the run.
        let words = [u32::from_le_bytes([0x10, 0x11, 0x12, 0x13]); WORDS_PER_BLOCK];
        let block = Block::from_words(0, words, false);
        assert!(!is_sequence_block(&block));
    }
}
