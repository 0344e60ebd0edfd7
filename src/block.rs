use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::cmp::Ordering;
use std::fmt;
use std::io::{self, Read};
use thiserror::Error;

/// Size of one ECB block in bytes.
pub const BLOCK_SIZE: usize = 0x40;
/// Number of little-endian 32-bit words in one block.
pub const WORDS_PER_BLOCK: usize = BLOCK_SIZE / 4;

#[derive(Error, Debug)]
pub enum BlockError {
    #[error("Truncated block at offset {offset:#x}: {available} of {BLOCK_SIZE} bytes available")]
    Truncated { offset: u64, available: usize },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One 64-byte unit of file content, viewed as 16 little-endian words.
///
/// `Eq`/`Ord` take every field into account so the type can key a `BTreeMap`
/// consistently. Use [`Block::same_value`] for content equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    offset:    u64,
    words:     [u32; WORDS_PER_BLOCK],
    encrypted: bool,
}

impl Block {
    pub fn from_words(offset: u64, words: [u32; WORDS_PER_BLOCK], encrypted: bool) -> Self {
        Self { offset, words, encrypted }
    }

    pub fn from_bytes(offset: u64, bytes: &[u8; BLOCK_SIZE], encrypted: bool) -> Self {
        let mut words = [0u32; WORDS_PER_BLOCK];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self { offset, words, encrypted }
    }

    /// Read the next 64 bytes from `reader` as a block at `offset`.
    ///
    /// A short read is reported as [`BlockError::Truncated`] with the number
    /// of bytes that were actually left.
    pub fn read<R: Read>(mut reader: R, offset: u64, encrypted: bool) -> Result<Self, BlockError> {
        let mut buf = [0u8; BLOCK_SIZE];
        let mut filled = 0;
        while filled < BLOCK_SIZE {
            match reader.read(&mut buf[filled..]) {
                Ok(0) => return Err(BlockError::Truncated { offset, available: filled }),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        let mut cursor = &buf[..];
        let mut words = [0u32; WORDS_PER_BLOCK];
        for word in words.iter_mut() {
            *word = cursor.read_u32::<LittleEndian>()?;
        }
        Ok(Self { offset, words, encrypted })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn words(&self) -> &[u32; WORDS_PER_BLOCK] {
        &self.words
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// The trailing word, i.e. the last 4 bytes of the block.
    pub fn last_word(&self) -> u32 {
        self.words[WORDS_PER_BLOCK - 1]
    }

    /// Same content at a different file position.
    pub fn with_offset(&self, offset: u64) -> Self {
        Self { offset, ..*self }
    }

    pub fn to_bytes(&self) -> [u8; BLOCK_SIZE] {
        let mut out = [0u8; BLOCK_SIZE];
        let mut writer = &mut out[..];
        for word in &self.words {
            // Writing 64 bytes into a 64 byte slice cannot run out of room.
            let _ = writer.write_u32::<LittleEndian>(*word);
        }
        out
    }

    /// Content equality: offset and the encrypted flag are ignored.
    pub fn same_value(&self, other: &Block) -> bool {
        self.words == other.words
    }
}

impl Ord for Block {
    fn cmp(&self, other: &Self) -> Ordering {
        self.words
            .cmp(&other.words)
            .then(self.offset.cmp(&other.offset))
            .then(self.encrypted.cmp(&other.encrypted))
    }
}

impl PartialOrd for Block {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x} {}", self.offset, hex::encode(self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_bytes() -> [u8; BLOCK_SIZE] {
        let mut bytes = [0u8; BLOCK_SIZE];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        bytes
    }

    #[test]
    fn test_words_are_little_endian() {
        let block = Block::from_bytes(0, &counting_bytes(), true);
        assert_eq!(block.words()[0], 0x03020100);
        assert_eq!(block.last_word(), 0x3f3e3d3c);
    }

    #[test]
    fn test_read_matches_from_bytes() {
        let bytes = counting_bytes();
        let read = Block::read(&bytes[..], 0x40, false).unwrap();
        assert_eq!(read, Block::from_bytes(0x40, &bytes, false));
        assert_eq!(read.to_bytes(), bytes);
    }

    #[test]
    fn test_read_short_input() {
        let bytes = [0u8; 10];
        match Block::read(&bytes[..], 0x80, true) {
            Err(BlockError::Truncated { offset, available }) => {
                assert_eq!(offset, 0x80);
                assert_eq!(available, 10);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn test_same_value_ignores_offset_and_flag() {
        let a = Block::from_words(0, [7; WORDS_PER_BLOCK], true);
        let b = Block::from_words(0x400, [7; WORDS_PER_BLOCK], false);
        assert!(a.same_value(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_order_first_differing_word_decides() {
        let mut low = [0u32; WORDS_PER_BLOCK];
        let mut high = [0u32; WORDS_PER_BLOCK];
        low[3] = 1;
        low[4] = 0xffff_ffff;
        high[3] = 2;
        let a = Block::from_words(0x1000, low, true);
        let b = Block::from_words(0, high, true);
        assert!(a < b);
    }

    #[test]
    fn test_order_offset_breaks_ties() {
        let a = Block::from_words(0x40, [1; WORDS_PER_BLOCK], true);
        let b = Block::from_words(0x80, [1; WORDS_PER_BLOCK], true);
        assert!(a < b);
    }

    #[test]
    fn test_display_hex() {
        let block = Block::from_words(0x1c0, [0xb0b0b0b0; WORDS_PER_BLOCK], false);
        let text = block.to_string();
        assert!(text.starts_with("000001c0 b0b0b0b0"));
        assert_eq!(text.len(), 9 + BLOCK_SIZE * 2);
    }
}
