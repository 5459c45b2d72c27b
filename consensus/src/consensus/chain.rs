//! Read-only view of the active chain used by the difficulty rules.

use consensus_core::header::Header;
use consensus_core::BlockHeight;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-block metadata the difficulty rules read from the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockIndexEntry {
    pub height: BlockHeight,
    pub timestamp: u32,
    pub bits: u32,
    pub version: i32,
}

impl BlockIndexEntry {
    pub fn from_header(height: BlockHeight, header: &Header) -> Self {
        Self { height, timestamp: header.timestamp, bits: header.bits, version: header.version }
    }
}

/// Lookup of chain entries by height.
///
/// Implementors must present a consistent snapshot for the duration of a
/// call: the difficulty rules never lock, they only read.
pub trait ChainContext {
    /// Entry at `height` on this chain.
    fn entry_at(&self, height: BlockHeight) -> Option<BlockIndexEntry>;

    fn tip(&self) -> Option<BlockIndexEntry>;

    fn contains(&self, entry: &BlockIndexEntry) -> bool {
        self.entry_at(entry.height).as_ref() == Some(entry)
    }

    /// `None` at genesis.
    fn predecessor(&self, entry: &BlockIndexEntry) -> Option<BlockIndexEntry> {
        let height = entry.height.checked_sub(1)?;
        self.entry_at(height)
    }

    /// Ancestor of `entry` at `height`. Fails when `height` is above `entry`
    /// or `entry` is not on this chain.
    fn ancestor(&self, entry: &BlockIndexEntry, height: BlockHeight) -> Option<BlockIndexEntry> {
        if height > entry.height || !self.contains(entry) {
            return None;
        }
        self.entry_at(height)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Expected entry at height {expected}, got {found}")]
    NonContiguousHeight { expected: BlockHeight, found: BlockHeight },

    #[error("Chain is full")]
    HeightOverflow,
}

/// Active chain stored as an arena indexed by height.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActiveChain {
    entries: Vec<BlockIndexEntry>,
}

impl ActiveChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chain from entries that must start at height 0 and be contiguous.
    pub fn from_entries(entries: impl IntoIterator<Item = BlockIndexEntry>) -> Result<Self, ChainError> {
        let mut chain = Self::new();
        for entry in entries {
            chain.push(entry)?;
        }
        Ok(chain)
    }

    /// Builds a chain from headers ordered from genesis.
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a Header>) -> Self {
        let entries = headers
            .into_iter()
            .enumerate()
            .map(|(height, header)| BlockIndexEntry::from_header(height as BlockHeight, header))
            .collect();
        Self { entries }
    }

    /// Appends `entry`, which must sit directly on top of the current tip.
    pub fn push(&mut self, entry: BlockIndexEntry) -> Result<(), ChainError> {
        let expected = BlockHeight::try_from(self.entries.len()).map_err(|_| ChainError::HeightOverflow)?;
        if entry.height != expected {
            return Err(ChainError::NonContiguousHeight { expected, found: entry.height });
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Appends a header at the next height and returns its entry.
    pub fn push_header(&mut self, header: &Header) -> Result<BlockIndexEntry, ChainError> {
        let height = BlockHeight::try_from(self.entries.len()).map_err(|_| ChainError::HeightOverflow)?;
        let entry = BlockIndexEntry::from_header(height, header);
        self.push(entry)?;
        Ok(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockIndexEntry> {
        self.entries.iter()
    }
}

impl ChainContext for ActiveChain {
    #[inline]
    fn entry_at(&self, height: BlockHeight) -> Option<BlockIndexEntry> {
        self.entries.get(height as usize).copied()
    }

    #[inline]
    fn tip(&self) -> Option<BlockIndexEntry> {
        self.entries.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(height: BlockHeight) -> BlockIndexEntry {
        BlockIndexEntry { height, timestamp: 1_000 + height * 600, bits: 0x1d00_ffff, version: 1 }
    }

    #[test]
    fn push_enforces_contiguous_heights() {
        let mut chain = ActiveChain::new();
        assert_eq!(chain.push(entry(1)), Err(ChainError::NonContiguousHeight { expected: 0, found: 1 }));
        chain.push(entry(0)).unwrap();
        chain.push(entry(1)).unwrap();
        assert_eq!(chain.push(entry(1)), Err(ChainError::NonContiguousHeight { expected: 2, found: 1 }));
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.tip(), Some(entry(1)));
    }

    #[test]
    fn predecessor_stops_at_genesis() {
        let chain = ActiveChain::from_entries((0..3).map(entry)).unwrap();
        assert_eq!(chain.predecessor(&entry(2)), Some(entry(1)));
        assert_eq!(chain.predecessor(&entry(0)), None);
    }

    #[test]
    fn ancestor_lookup() {
        let chain = ActiveChain::from_entries((0..10).map(entry)).unwrap();
        let tip = chain.tip().unwrap();
        assert_eq!(chain.ancestor(&tip, 3), Some(entry(3)));
        assert_eq!(chain.ancestor(&tip, 9), Some(tip));
        assert_eq!(chain.ancestor(&entry(4), 5), None);

        let foreign = BlockIndexEntry { bits: 0x1c00_ffff, ..entry(5) };
        assert!(!chain.contains(&foreign));
        assert_eq!(chain.ancestor(&foreign, 1), None);
    }

    #[test]
    fn from_headers_assigns_heights() {
        let header = Header::new(1, Default::default(), Default::default(), 42, 0x1d00_ffff, 0);
        let chain = ActiveChain::from_headers([header, header].iter());
        assert_eq!(chain.tip().map(|e| e.height), Some(1));
        assert_eq!(chain.entry_at(0).map(|e| e.timestamp), Some(42));
    }

    #[test]
    fn json_is_a_plain_list() {
        let chain = ActiveChain::from_entries((0..2).map(entry)).unwrap();
        let json = serde_json::to_string(&chain).unwrap();
        assert!(json.starts_with("[{\"height\":0,"));
        let entries: Vec<BlockIndexEntry> = serde_json::from_str(&json).unwrap();
        let back = ActiveChain::from_entries(entries).unwrap();
        assert_eq!(back, chain);
    }
}
