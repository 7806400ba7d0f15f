// edn-codec - Type-keyed dispatch protocol
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! An open registry mapping value types to functions.
//!
//! The built-in value types each have one direct binding, so dispatch for
//! them is a plain table lookup. The registry earns its keep as an escape
//! hatch for embedding applications: a [`TypeKey::Custom`] names an
//! application type, and [`ProtocolBuilder::derive`] declares its
//! supertypes. When a key has no direct binding, lookup walks the key's
//! C3 linearization — a deterministic ordering of its ancestors — and
//! uses the first ancestor that has one. Diamond-shaped graphs therefore
//! resolve the same way every time, and a graph with no consistent order
//! is reported as a configuration error naming the offending type rather
//! than silently picking a winner.
//!
//! Linearizations are cached after first computation; the cache is safe
//! to populate concurrently from multiple threads.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::{EdnError, Result};
use crate::symbol::Symbol;

/// Identifies a type for dispatch purposes.
///
/// One variant per built-in value type, `Custom` for application types,
/// and `Any` as the universal root: every key with declared supertypes
/// has `Any` ordered last in its linearization.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Any,
    Nil,
    Bool,
    Int,
    BigInt,
    Float,
    Decimal,
    Char,
    String,
    Symbol,
    Keyword,
    Instant,
    Uuid,
    List,
    Vector,
    Set,
    Map,
    Tagged,
    /// An application-declared type.
    Custom(Symbol),
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKey::Any => write!(f, "any"),
            TypeKey::Nil => write!(f, "nil"),
            TypeKey::Bool => write!(f, "boolean"),
            TypeKey::Int => write!(f, "integer"),
            TypeKey::BigInt => write!(f, "bigint"),
            TypeKey::Float => write!(f, "float"),
            TypeKey::Decimal => write!(f, "decimal"),
            TypeKey::Char => write!(f, "character"),
            TypeKey::String => write!(f, "string"),
            TypeKey::Symbol => write!(f, "symbol"),
            TypeKey::Keyword => write!(f, "keyword"),
            TypeKey::Instant => write!(f, "instant"),
            TypeKey::Uuid => write!(f, "uuid"),
            TypeKey::List => write!(f, "list"),
            TypeKey::Vector => write!(f, "vector"),
            TypeKey::Set => write!(f, "set"),
            TypeKey::Map => write!(f, "map"),
            TypeKey::Tagged => write!(f, "tagged value"),
            TypeKey::Custom(sym) => write!(f, "{}", sym),
        }
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Accumulates bindings and supertype declarations for a [`Protocol`].
pub struct ProtocolBuilder<F> {
    name: String,
    bindings: HashMap<TypeKey, F>,
    supers: HashMap<TypeKey, Vec<TypeKey>>,
}

impl<F> ProtocolBuilder<F> {
    pub fn new(name: impl Into<String>) -> Self {
        ProtocolBuilder {
            name: name.into(),
            bindings: HashMap::new(),
            supers: HashMap::new(),
        }
    }

    /// Bind `f` to `key`, replacing any previous binding.
    #[must_use]
    pub fn put(mut self, key: TypeKey, f: F) -> Self {
        self.bindings.insert(key, f);
        self
    }

    /// Declare `parents` as the (ordered) direct supertypes of `child`.
    /// `Any` is implicit as the last ancestor of every derived key and is
    /// ignored if listed. Self-derivation and cycles are rejected.
    pub fn derive(
        mut self,
        child: TypeKey,
        parents: impl IntoIterator<Item = TypeKey>,
    ) -> Result<Self> {
        if child == TypeKey::Any {
            return Err(EdnError::config("'any' cannot derive from anything"));
        }
        for parent in parents {
            if parent == TypeKey::Any {
                continue;
            }
            if parent == child {
                return Err(EdnError::config(format!(
                    "cannot derive '{}' from itself",
                    child
                )));
            }
            if reaches(&self.supers, &parent, &child) {
                return Err(EdnError::config(format!(
                    "cyclic derivation: '{}' already derives from '{}'",
                    parent, child
                )));
            }
            self.supers.entry(child.clone()).or_default().push(parent);
        }
        Ok(self)
    }

    pub fn build(self) -> Protocol<F> {
        Protocol {
            name: self.name,
            bindings: self.bindings,
            supers: self.supers,
            cache: RwLock::new(HashMap::new()),
        }
    }
}

/// True if `target` is reachable from `from` by following supertype edges.
fn reaches(supers: &HashMap<TypeKey, Vec<TypeKey>>, from: &TypeKey, target: &TypeKey) -> bool {
    if from == target {
        return true;
    }
    supers
        .get(from)
        .is_some_and(|parents| parents.iter().any(|p| reaches(supers, p, target)))
}

// ============================================================================
// Protocol
// ============================================================================

/// A built registry. Read-only after construction apart from its
/// internal, concurrently populated linearization cache.
pub struct Protocol<F> {
    name: String,
    bindings: HashMap<TypeKey, F>,
    supers: HashMap<TypeKey, Vec<TypeKey>>,
    cache: RwLock<HashMap<TypeKey, Arc<Vec<TypeKey>>>>,
}

impl<F> Protocol<F> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Find the function for `key`: its direct binding if it has one,
    /// otherwise the binding of the first ancestor in its linearization.
    /// `Ok(None)` means nothing is registered anywhere along the chain.
    pub fn lookup(&self, key: &TypeKey) -> Result<Option<&F>> {
        if let Some(f) = self.bindings.get(key) {
            return Ok(Some(f));
        }
        if !self.supers.contains_key(key) {
            return Ok(None);
        }
        let order = self.resolution_order(key)?;
        for ancestor in order.iter().skip(1) {
            if let Some(f) = self.bindings.get(ancestor) {
                return Ok(Some(f));
            }
        }
        Ok(None)
    }

    /// The C3 linearization of `key` over the declared supertype graph,
    /// with `Any` appended as the final ancestor. Cached per key.
    pub fn resolution_order(&self, key: &TypeKey) -> Result<Arc<Vec<TypeKey>>> {
        {
            let cache = self.cache.read().expect("protocol cache lock poisoned");
            if let Some(order) = cache.get(key) {
                return Ok(Arc::clone(order));
            }
        }

        let mut order = self.mro(key).map_err(|offender| {
            let mut message = format!(
                "Unable to compute a consistent method resolution order for '{}'",
                key
            );
            if &offender == key {
                message.push('.');
            } else {
                message.push_str(&format!(
                    " because '{}' has no consistent method resolution order.",
                    offender
                ));
            }
            EdnError::config(message)
        })?;
        if self.supers.get(key).is_some_and(|s| !s.is_empty()) {
            order.push(TypeKey::Any);
        }

        let order = Arc::new(order);
        // Idempotent: concurrent computations insert the same linearization.
        self.cache
            .write()
            .expect("protocol cache lock poisoned")
            .insert(key.clone(), Arc::clone(&order));
        Ok(order)
    }

    /// C3: the linearization of a key is the key followed by the merge of
    /// its parents' linearizations and the parent list itself. On merge
    /// failure the error carries the key whose hierarchy is inconsistent.
    fn mro(&self, key: &TypeKey) -> std::result::Result<Vec<TypeKey>, TypeKey> {
        let supers = self.supers.get(key).cloned().unwrap_or_default();
        let mut seqs: Vec<Vec<TypeKey>> = vec![vec![key.clone()]];
        for parent in &supers {
            seqs.push(self.mro(parent)?);
        }
        seqs.push(supers);
        merge(seqs).map_err(|()| key.clone())
    }
}

fn merge(mut seqs: Vec<Vec<TypeKey>>) -> std::result::Result<Vec<TypeKey>, ()> {
    let mut result = Vec::new();
    loop {
        seqs.retain(|seq| !seq.is_empty());
        if seqs.is_empty() {
            return Ok(result);
        }
        // A good candidate heads some sequence and appears in no tail.
        let candidate = seqs
            .iter()
            .map(|seq| &seq[0])
            .find(|&head| !seqs.iter().any(|seq| seq[1..].contains(head)))
            .cloned();
        match candidate {
            None => return Err(()),
            Some(c) => {
                result.push(c.clone());
                for seq in &mut seqs {
                    if seq.first() == Some(&c) {
                        seq.remove(0);
                    }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
