//! Module containing utilities to hash members.

use crate::meta::Qualifiers;
use std::any::TypeId;
use std::hash::{BuildHasher, Hash, Hasher};

/// Dummy hash value which should never be produced by a real member.
pub const ALT_ZERO_HASH: u64 = 42;

/// A hasher that only takes one single [`u64`] and returns it as a hash key.
///
/// # Panics
///
/// Panics when hashing any data type other than a [`u64`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct StraightHasher(u64);

impl Hasher for StraightHasher {
    #[inline(always)]
    fn finish(&self) -> u64 {
        self.0
    }
    #[inline(always)]
    fn write(&mut self, _bytes: &[u8]) {
        panic!("StraightHasher can only hash u64 values");
    }
    #[inline(always)]
    fn write_u64(&mut self, i: u64) {
        if i == 0 {
            self.0 = ALT_ZERO_HASH;
        } else {
            self.0 = i;
        }
    }
}

/// A hash builder for `StraightHasher`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct StraightHasherBuilder;

impl BuildHasher for StraightHasherBuilder {
    type Hasher = StraightHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        StraightHasher(ALT_ZERO_HASH)
    }
}

/// Create an instance of the default hasher.
#[inline(always)]
#[must_use]
pub fn get_hasher() -> ahash::AHasher {
    ahash::AHasher::default()
}

/// Calculate a [`u64`] hash key identifying a member.
///
/// The key is derived from the owning type (none for free functions), the member name,
/// the parameter types and the qualifiers. It is stable for the lifetime of the process
/// and serves as the operation identity of proxy dispatch.
#[must_use]
pub fn calc_member_hash(
    owner: Option<TypeId>,
    name: &str,
    params: impl IntoIterator<Item = TypeId>,
    qualifiers: Qualifiers,
) -> u64 {
    let s = &mut get_hasher();

    owner.hash(s);
    name.hash(s);
    let mut len = 0_usize;
    params.into_iter().for_each(|t| {
        len += 1;
        t.hash(s);
    });
    len.hash(s);
    qualifiers.bits().hash(s);

    match s.finish() {
        0 => ALT_ZERO_HASH,
        r => r,
    }
}
