//! Assembling known-plaintext pairs for the key recovery solver.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info};

use crate::block::Block;
use crate::collision::find_identical_blocks;
use crate::known::{generate_sequence_block, header_index_end_block, KnownRegionError};
use crate::pattern::{filler_block, is_filler_block, is_sequence_block};

#[derive(Error, Debug)]
pub enum PairError {
    #[error("Known region error: {0}")]
    KnownRegion(#[from] KnownRegionError),
    #[error("Plaintext view has {plain} blocks, ciphertext has {cipher}")]
    LengthMismatch { cipher: usize, plain: usize },
}

/// Why the plaintext of a pair is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairSource {
    HeaderIndexEnd,
    Filler,
    Sequence,
    /// Shares ciphertext with a block whose plaintext is known.
    Collision,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnownPair {
    pub offset: u64,
    #[serde(serialize_with = "block_hex")]
    pub cipher: Block,
    #[serde(serialize_with = "block_hex")]
    pub plain:  Block,
    pub source: PairSource,
}

fn block_hex<S: Serializer>(block: &Block, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(block.to_bytes()))
}

/// Collect every pair whose plaintext can be proven from `cipher_blocks`
/// and, when given, a (partial) plaintext view of the same file.
///
/// The header index end pair is always produced. A plaintext view adds a pair
/// for each filler or sequence block, and for every other member of a
/// collision class that contains one. At most one pair is produced per offset; the result is
/// sorted by offset.
pub fn collect_known_pairs(
    cipher_blocks: &[Block],
    plain_blocks: Option<&[Block]>,
) -> Result<Vec<KnownPair>, PairError> {
    let mut pairs: BTreeMap<u64, KnownPair> = BTreeMap::new();

    let cipher = header_index_end_block(cipher_blocks, true)?;
    let plain = header_index_end_block(cipher_blocks, false)?;
    pairs.insert(cipher.offset(), KnownPair { offset: cipher.offset(), cipher, plain, source: PairSource::HeaderIndexEnd });

    if let Some(plain_blocks) = plain_blocks {
        if plain_blocks.len() != cipher_blocks.len() {
            return Err(PairError::LengthMismatch { cipher: cipher_blocks.len(), plain: plain_blocks.len() });
        }
        for (cipher, observed) in cipher_blocks.iter().zip(plain_blocks) {
            if let Some((plain, source)) = proven_plaintext(observed) {
                pairs.entry(cipher.offset()).or_insert(KnownPair { offset: cipher.offset(), cipher: *cipher, plain, source });
            }
        }

        for (representative, duplicates) in find_identical_blocks(cipher_blocks) {
            let members: Vec<Block> = std::iter::once(representative).chain(duplicates).collect();
            let known = members.iter().find_map(|b| pairs.get(&b.offset()).map(|p| p.plain));
            let Some(known) = known else { continue };
            for member in members {
                pairs.entry(member.offset()).or_insert(KnownPair {
                    offset: member.offset(),
                    cipher: member,
                    plain:  known.with_offset(member.offset()),
                    source: PairSource::Collision,
                });
            }
        }
    }

    info!(pairs = pairs.len(), "collected known plaintext pairs");
    Ok(pairs.into_values().collect())
}

/// The plaintext of `observed` when it matches a pattern that fixes every
/// byte, rebuilt from the pattern rather than copied.
fn proven_plaintext(observed: &Block) -> Option<(Block, PairSource)> {
    if is_filler_block(observed) {
        return Some((filler_block(observed.offset()), PairSource::Filler));
    }
    if is_sequence_block(observed) {
        let plain = generate_sequence_block(observed.last_word()).with_offset(observed.offset());
        debug!(offset = observed.offset(), "sequence block");
        return Some((plain, PairSource::Sequence));
    }
    None
}
