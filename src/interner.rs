// edn-codec - Weak canonicalizing table
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! A canonicalizing table holding weak references to its values.
//!
//! `intern` returns the one canonical `Arc` for a key, creating it from
//! the caller's candidate on first use. The table holds only `Weak`
//! references, so a canonical value is reclaimed once every strong
//! reference outside the table is gone; a later `intern` for the same key
//! then installs a fresh canonical value. This keeps identity-based
//! equality cheap without letting the table grow with every distinct key
//! ever seen.
//!
//! Dead entries are swept opportunistically: each insertion bumps a
//! counter, and when the counter outgrows the table a full sweep drops
//! entries whose referent is gone. Amortized, each `intern` does O(1)
//! sweeping work.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, Weak};

pub(crate) struct Interner<K, V> {
    table: Mutex<Table<K, V>>,
}

struct Table<K, V> {
    entries: HashMap<K, Weak<V>>,
    inserts_since_sweep: usize,
}

impl<K: Eq + Hash, V> Interner<K, V> {
    pub(crate) fn new() -> Self {
        Interner {
            table: Mutex::new(Table {
                entries: HashMap::new(),
                inserts_since_sweep: 0,
            }),
        }
    }

    /// Return the canonical value for `key`. If the table has a live entry
    /// it wins and `candidate` is discarded; otherwise `candidate` becomes
    /// the canonical value.
    pub(crate) fn intern(&self, key: K, candidate: Arc<V>) -> Arc<V> {
        let mut guard = self
            .table
            .lock()
            .expect("interner mutex poisoned: another thread panicked while holding the lock");
        let table = &mut *guard;

        if table.inserts_since_sweep > table.entries.len() / 2 + 64 {
            table.entries.retain(|_, weak| weak.strong_count() > 0);
            table.inserts_since_sweep = 0;
        }

        match table.entries.entry(key) {
            std::collections::hash_map::Entry::Occupied(mut entry) => {
                match entry.get().upgrade() {
                    Some(existing) => existing,
                    None => {
                        // Referent collected out from under us; replace it.
                        entry.insert(Arc::downgrade(&candidate));
                        table.inserts_since_sweep += 1;
                        candidate
                    }
                }
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(Arc::downgrade(&candidate));
                table.inserts_since_sweep += 1;
                candidate
            }
        }
    }

    /// Number of entries whose referent is still alive.
    #[cfg(test)]
    fn live_len(&self) -> usize {
        self.table
            .lock()
            .unwrap()
            .entries
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

// ============================================================================
// Tests
// ============================================================================
