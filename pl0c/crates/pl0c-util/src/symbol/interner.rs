//! The global string table backing [`super::Symbol`].
//!
//! Strings are hashed with `AHasher`, and the resulting 64-bit hash is
//! reduced to a 32-bit slot index by multiplying with the nearest prime to
//! the golden ratio reciprocal of `u32::MAX` (Knuth's multiplicative hash),
//! which spreads colliding hashes across the table instead of clustering
//! them. Collisions are resolved by linear probing.

use ahash::AHasher;
use dashmap::DashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use super::{Symbol, KEYWORD_TABLE};

/// Reciprocal of the golden ratio scaled to 32 bits; used to scramble hash
/// buckets so that strings differing only in a common suffix don't cluster.
const GOLDEN_RATIO_PRIME: u64 = 0x9E3779B97F4A7C15;

pub struct StringTable {
    // Maps a scrambled hash bucket to (string, symbol index). Strings are
    // leaked to get a `'static` lifetime: they live for the process's
    // duration, which is acceptable for a single-shot compiler.
    slots: DashMap<u64, (&'static str, u32)>,
    strings: DashMap<u32, &'static str>,
    next_index: AtomicU32,
}

pub static STRING_TABLE: OnceLock<StringTable> = OnceLock::new();

fn table() -> &'static StringTable {
    STRING_TABLE.get_or_init(StringTable::new)
}

impl StringTable {
    fn new() -> Self {
        let table = StringTable {
            slots: DashMap::new(),
            strings: DashMap::new(),
            next_index: AtomicU32::new(0),
        };
        table.initialize_known_symbols();
        table
    }

    fn initialize_known_symbols(&self) {
        for (spelling, symbol) in KEYWORD_TABLE.iter() {
            let bucket = Self::bucket_for(spelling);
            self.insert_at(bucket, spelling, symbol.index);
        }
        self.next_index
            .store(KEYWORD_TABLE.len() as u32, Ordering::SeqCst);
    }

    /// Inserts at the caller-resolved `bucket`. Callers that probed past
    /// occupied slots (`intern`) must pass that probed bucket through here
    /// rather than letting it be recomputed from `s`, or a real collision
    /// would overwrite the prior occupant's slot instead of landing in the
    /// empty one that was found.
    fn insert_at(&self, bucket: u64, s: &str, index: u32) {
        let leaked: &'static str = Box::leak(s.to_string().into_boxed_str());
        self.strings.insert(index, leaked);
        self.slots.insert(bucket, (leaked, index));
    }

    fn hash_of(s: &str) -> u64 {
        let mut hasher = AHasher::default();
        s.hash(&mut hasher);
        hasher.finish()
    }

    fn bucket_for(s: &str) -> u64 {
        Self::hash_of(s).wrapping_mul(GOLDEN_RATIO_PRIME)
    }

    pub fn intern(&self, s: &str) -> Symbol {
        let mut bucket = Self::bucket_for(s);

        // Linear probe until we find an empty slot or our own string.
        loop {
            match self.slots.get(&bucket) {
                Some(entry) if entry.0 == s => return Symbol { index: entry.1 },
                Some(_) => bucket = bucket.wrapping_add(1),
                None => break,
            }
        }

        let index = self.next_index.fetch_add(1, Ordering::SeqCst);
        self.insert_at(bucket, s, index);
        Symbol { index }
    }

    pub fn resolve(&self, symbol: Symbol) -> &'static str {
        self.strings
            .get(&symbol.index)
            .map(|entry| *entry.value())
            .expect("symbol index missing from string table")
    }
}

pub(super) fn intern(s: &str) -> Symbol {
    table().intern(s)
}

pub(super) fn resolve(symbol: Symbol) -> &'static str {
    table().resolve(symbol)
}
