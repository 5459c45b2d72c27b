//! Streaming hashers producing a [`Hash`](crate::Hash).

use sha2::{Digest, Sha256};

pub use crate::pow_hash::PowHash;

pub trait HasherBase {
    fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self;
}

pub trait Hasher: HasherBase + Clone + Default {
    fn finalize(self) -> crate::Hash;
    fn reset(&mut self);
    #[inline(always)]
    fn hash<A: AsRef<[u8]>>(data: A) -> crate::Hash {
        let mut hasher = Self::default();
        hasher.update(data);
        hasher.finalize()
    }
}

/// Identity hash of pre-fork headers: SHA256(SHA256(data)).
#[derive(Clone)]
pub struct BlockHash(Sha256);

impl BlockHash {
    #[inline]
    pub fn new() -> Self {
        Self(Sha256::new())
    }

    pub fn write<A: AsRef<[u8]>>(&mut self, data: A) {
        Digest::update(&mut self.0, data.as_ref());
    }

    #[inline(always)]
    pub fn finalize(self) -> crate::Hash {
        let first = self.0.finalize();
        crate::Hash::from(<[u8; 32]>::from(Sha256::digest(first)))
    }
}

macro_rules! impl_hasher {
    (struct $name:ident) => {
        impl HasherBase for $name {
            #[inline(always)]
            fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self {
                self.write(data);
                self
            }
        }
        impl Hasher for $name {
            #[inline(always)]
            fn finalize(self) -> crate::Hash {
                $name::finalize(self)
            }
            #[inline(always)]
            fn reset(&mut self) {
                *self = Self::new();
            }
        }
    };
}

impl_hasher! { struct BlockHash }
impl_hasher! { struct PowHash }

impl Default for BlockHash {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{double_sha256, pow_hash::lyra2z, Hash};

    #[test]
    fn block_hash_streams_like_one_shot() {
        let mut hasher = BlockHash::new();
        hasher.update(b"hel").update(b"lo");
        assert_eq!(hasher.finalize(), Hash::from(double_sha256(b"hello")));
    }

    #[test]
    fn reset_discards_written_data() {
        let mut hasher = PowHash::new();
        hasher.update([1u8; 80]);
        hasher.reset();
        hasher.update([2u8; 80]);
        assert_eq!(hasher.finalize(), lyra2z(&[2u8; 80]));
    }

    #[test]
    fn hash_helper_uses_default_state() {
        assert_eq!(BlockHash::hash(b"hello"), Hash::from(double_sha256(b"hello")));
    }
}
