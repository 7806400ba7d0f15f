// edn-codec - Keyword type with interning
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Keywords are interned, optionally namespaced identifiers.
//!
//! # Interning
//!
//! Two keywords with the same prefix and name are guaranteed to be the
//! *same* canonical allocation for as long as either is reachable. This
//! makes equality and hashing a pointer operation.
//!
//! # Memory behaviour
//!
//! The global table holds only weak references. A keyword that no longer
//! has any strong reference outside the table is reclaimed, and a later
//! occurrence of the same prefix/name creates a fresh canonical instance.
//! Feeding arbitrary input through the reader therefore cannot grow the
//! table without bound, at the cost that keyword identity is only stable
//! while some strong reference exists.
//!
//! # Thread safety
//!
//! The table supports concurrent interning from multiple threads with
//! at-most-one-winner semantics per key; a losing candidate allocation is
//! simply discarded. Comparison and hashing never touch the table.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::error::Result;
use crate::interner::Interner;
use crate::symbol::Symbol;

/// An interned keyword, printed with a leading `:`.
#[derive(Clone)]
pub struct Keyword {
    inner: Arc<Symbol>,
}

/// Global keyword interner.
static KEYWORD_INTERNER: OnceLock<Interner<Symbol, Symbol>> = OnceLock::new();

fn interner() -> &'static Interner<Symbol, Symbol> {
    KEYWORD_INTERNER.get_or_init(Interner::new)
}

impl Keyword {
    /// Create a keyword with no prefix. Fails if `name` does not satisfy
    /// the edn identifier grammar.
    pub fn new(name: &str) -> Result<Keyword> {
        Symbol::new(name).map(Keyword::from_symbol)
    }

    /// Create a keyword with a prefix.
    pub fn namespaced(prefix: &str, name: &str) -> Result<Keyword> {
        Symbol::namespaced(prefix, name).map(Keyword::from_symbol)
    }

    /// Intern the keyword named by `sym`.
    pub fn from_symbol(sym: Symbol) -> Keyword {
        let inner = interner().intern(sym.clone(), Arc::new(sym));
        Keyword { inner }
    }

    /// The namespace prefix, if any.
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.inner.prefix()
    }

    /// The name part.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    #[inline]
    #[must_use]
    pub fn has_prefix(&self) -> bool {
        self.inner.has_prefix()
    }

    /// The keyword's name as a symbol (without the leading `:`).
    #[must_use]
    pub fn symbol(&self) -> &Symbol {
        &self.inner
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.inner)
    }
}

impl fmt::Debug for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keyword({})", self)
    }
}

impl PartialEq for Keyword {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Interning makes pointer comparison sufficient.
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Keyword {}

impl PartialOrd for Keyword {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Keyword {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.as_ref().cmp(other.inner.as_ref())
    }
}

impl Hash for Keyword {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_keyword() {
        let kw = Keyword::new("foo").unwrap();
        assert_eq!(kw.name(), "foo");
        assert!(kw.prefix().is_none());
        assert_eq!(format!("{}", kw), ":foo");
    }

    #[test]
    fn test_namespaced_keyword() {
        let kw = Keyword::namespaced("user", "foo").unwrap();
        assert_eq!(kw.name(), "foo");
        assert_eq!(kw.prefix(), Some("user"));
        assert_eq!(format!("{}", kw), ":user/foo");
    }

    #[test]
    fn test_interning() {
        let kw1 = Keyword::new("interning-test").unwrap();
        let kw2 = Keyword::new("interning-test").unwrap();
        assert_eq!(kw1, kw2);
        assert!(Arc::ptr_eq(&kw1.inner, &kw2.inner));
    }

    #[test]
    fn test_equality() {
        let kw1 = Keyword::new("eq-a").unwrap();
        let kw2 = Keyword::new("eq-a").unwrap();
        let kw3 = Keyword::new("eq-b").unwrap();

        assert_eq!(kw1, kw2);
        assert_ne!(kw1, kw3);
        assert_ne!(
            Keyword::new("eq-a").unwrap(),
            Keyword::namespaced("ns", "eq-a").unwrap()
        );
    }

    #[test]
    fn test_ordering_is_structural() {
        let a = Keyword::new("ord-a").unwrap();
        let b = Keyword::new("ord-b").unwrap();
        let ns_a = Keyword::namespaced("ns", "ord-a").unwrap();

        assert!(a < b);
        assert!(a < ns_a);
    }

    #[test]
    fn test_rejects_invalid_names() {
        assert!(Keyword::new("").is_err());
        assert!(Keyword::new("1foo").is_err());
    }

    #[test]
    fn test_hash_matches_equality() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Keyword::new("hash-test").unwrap());
        assert!(set.contains(&Keyword::new("hash-test").unwrap()));
    }
}
