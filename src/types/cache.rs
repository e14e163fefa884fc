//! Per-thread memoization of layout-search results.
//!
//! Entries are keyed by `(target, source)` type identities and are never evicted nor
//! invalidated: a pair that could not be converted is never searched again on the same
//! thread.

use crate::types::type_info;
use ahash::AHashMap;
use std::any::TypeId;
use std::cell::RefCell;

/// Outcome of a layout search.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct CastEntry {
    /// Can a value of the source type be viewed as the target type?
    pub possible: bool,
    /// Byte offset of the target inside the source.
    pub offset: usize,
}

impl CastEntry {
    /// Entry for an impossible conversion.
    pub const IMPOSSIBLE: Self = Self {
        possible: false,
        offset: 0,
    };
}

/// Counters of the conversion cache of the current thread.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct CacheStats {
    /// Number of lookups.
    pub lookups: u64,
    /// Number of lookups answered from the cache.
    pub hits: u64,
    /// Number of layout searches run on a cache miss.
    pub searches: u64,
}

#[derive(Debug, Default)]
struct ConversionCache {
    entries: AHashMap<(TypeId, TypeId), CastEntry>,
    stats: CacheStats,
}

thread_local! {
    static CACHE: RefCell<ConversionCache> = RefCell::new(ConversionCache::default());
}

/// Look up the cached outcome of converting `from` into `to`.
#[must_use]
pub fn lookup(to: TypeId, from: TypeId) -> Option<CastEntry> {
    CACHE.with(|cache| {
        let cache = &mut *cache.borrow_mut();
        cache.stats.lookups += 1;

        let entry = cache.entries.get(&(to, from)).copied();
        if entry.is_some() {
            cache.stats.hits += 1;
        }
        entry
    })
}

/// Record the outcome of converting `from` into `to`.
///
/// An existing entry is never overwritten. `offset` is dereferenced by later views, so it
/// must come from [`type_info::search`].
fn record(to: TypeId, from: TypeId, possible: bool, offset: usize) {
    CACHE.with(|cache| {
        cache
            .borrow_mut()
            .entries
            .entry((to, from))
            .or_insert(CastEntry { possible, offset });
    });
}

/// Get the counters of the conversion cache of the current thread.
#[must_use]
pub fn stats() -> CacheStats {
    CACHE.with(|cache| cache.borrow().stats)
}

/// Number of entries in the conversion cache of the current thread.
#[must_use]
pub fn len() -> usize {
    CACHE.with(|cache| cache.borrow().entries.len())
}

/// Resolve a conversion through the cache, probing the type table on a miss.
pub(crate) fn resolve(to: TypeId, from: TypeId) -> CastEntry {
    if let Some(entry) = lookup(to, from) {
        return entry;
    }

    CACHE.with(|cache| cache.borrow_mut().stats.searches += 1);

    let entry = match type_info::search(to, from) {
        Some(offset) => CastEntry {
            possible: true,
            offset,
        },
        None => CastEntry::IMPOSSIBLE,
    };

    tracing::trace!(?to, ?from, possible = entry.possible, "conversion cache populated");
    record(to, from, entry.possible, entry.offset);
    entry
}
