// edn-codec - Symbol and Tag types
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Symbols are identifiers with an optional namespace prefix.
//!
//! A symbol is a plain value: equality, ordering and hashing are all
//! structural (prefix first, then name), and symbols without a prefix sort
//! before symbols with one. The constructors validate the edn identifier
//! grammar, so an existing `Symbol` is always well-formed.
//!
//! [`Tag`] is a symbol with a `#` in front of it: the label preceding a
//! tagged value, such as `#inst` or `#myapp/thing`. Tags are symbol-shaped
//! but are their own type so that a tag can never be confused with a
//! symbol in the value tree.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::error::{EdnError, Result};
use crate::lexer::{is_digit, symbol_constituent, symbol_start};

/// An identifier with an optional namespace prefix.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    prefix: Option<Arc<str>>,
    name: Arc<str>,
}

impl Symbol {
    /// Create a symbol with no prefix. Fails if `name` does not satisfy the
    /// edn identifier grammar.
    pub fn new(name: &str) -> Result<Symbol> {
        check_name("name", name)?;
        Ok(Symbol {
            prefix: None,
            name: Arc::from(name),
        })
    }

    /// Create a symbol with a prefix. Both parts must satisfy the edn
    /// identifier grammar; an empty prefix is rejected (use [`Symbol::new`]).
    pub fn namespaced(prefix: &str, name: &str) -> Result<Symbol> {
        check_name("prefix", prefix)?;
        check_name("name", name)?;
        Ok(Symbol {
            prefix: Some(Arc::from(prefix)),
            name: Arc::from(name),
        })
    }

    /// Assemble a symbol from parts already known to be well-formed.
    pub(crate) fn from_parts(prefix: Option<Arc<str>>, name: Arc<str>) -> Symbol {
        Symbol { prefix, name }
    }

    /// The namespace prefix, if any.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The name part.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn has_prefix(&self) -> bool {
        self.prefix.is_some()
    }

    pub(crate) fn prefix_arc(&self) -> Option<Arc<str>> {
        self.prefix.clone()
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, "{}/{}", prefix, self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self)
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.prefix, &other.prefix) {
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => self.name.cmp(&other.name),
            (Some(a), Some(b)) => match a.cmp(b) {
                Ordering::Equal => self.name.cmp(&other.name),
                other => other,
            },
        }
    }
}

/// Validate one identifier part against the edn grammar.
fn check_name(label: &str, ident: &str) -> Result<()> {
    let mut chars = ident.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => {
            return Err(EdnError::syntax(format!("The {} must not be empty.", label)));
        }
    };
    if is_digit(first) {
        return Err(EdnError::syntax(format!(
            "The {} '{}' must not begin with a digit.",
            label, ident
        )));
    }
    if !symbol_start(first) {
        return Err(EdnError::syntax(format!(
            "The {} '{}' begins with a forbidden character.",
            label, ident
        )));
    }
    let second = chars.clone().next();
    if (first == '.' || first == '-') && second.is_some_and(is_digit) {
        return Err(EdnError::syntax(format!(
            "The {} '{}' must not begin with '-' or '.' followed by a digit.",
            label, ident
        )));
    }
    for c in chars {
        if !symbol_constituent(c) {
            return Err(EdnError::syntax(format!(
                "The {} '{}' contains the illegal character '{}'.",
                label, ident, c
            )));
        }
    }
    Ok(())
}

// ============================================================================
// Tag
// ============================================================================

/// The label preceding a tagged value, e.g. `#inst` or `#myapp/thing`.
///
/// Tags are symbol-shaped and print with a leading `#`. Unlike keywords
/// they are not interned; equality is structural.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    sym: Symbol,
}

impl Tag {
    /// Create a tag with no prefix.
    pub fn new(name: &str) -> Result<Tag> {
        Symbol::new(name).map(Tag::from_symbol)
    }

    /// Create a tag with a prefix.
    pub fn namespaced(prefix: &str, name: &str) -> Result<Tag> {
        Symbol::namespaced(prefix, name).map(Tag::from_symbol)
    }

    pub fn from_symbol(sym: Symbol) -> Tag {
        Tag { sym }
    }

    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.sym.prefix()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.sym.name()
    }

    #[must_use]
    pub fn symbol(&self) -> &Symbol {
        &self.sym
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.sym)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

// ============================================================================
// Tests
// ============================================================================
