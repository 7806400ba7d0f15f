// edn-codec - Value model
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The edn value tree.
//!
//! `Value` is the closed sum of everything the reader can produce and the
//! printer can consume. Values are immutable, cheap to clone (collections
//! use structural sharing, strings are shared `Arc<str>`s) and safe to
//! move between threads.
//!
//! Equality, ordering and hashing are structural and strict: a list is
//! never equal to a vector with the same elements, and `1`, `1N` and
//! `1.0` are three distinct values. Floats compare by bit pattern for
//! equality and hashing so that values containing them can live in sets
//! and maps.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bigdecimal::BigDecimal;
use im::{OrdMap, OrdSet, Vector};
use num_bigint::BigInt;
use uuid::Uuid;

use crate::instant::ParsedInstant;
use crate::keyword::Keyword;
use crate::protocol::TypeKey;
use crate::symbol::{Symbol, Tag};

/// An edn value.
#[derive(Clone)]
pub enum Value {
    /// The nil value, representing nothing/absence.
    Nil,
    /// Boolean true or false.
    Bool(bool),
    /// 64-bit signed integer, the default integer type.
    Int(i64),
    /// Arbitrary-precision integer (`N` suffix, or magnitude overflow).
    BigInt(BigInt),
    /// 64-bit float, the default decimal type.
    Float(f64),
    /// Arbitrary-precision decimal (`M` suffix).
    Decimal(BigDecimal),
    /// Unicode character.
    Char(char),
    /// Immutable string.
    String(Arc<str>),
    /// Optionally namespaced identifier.
    Symbol(Symbol),
    /// Interned, optionally namespaced identifier.
    Keyword(Keyword),
    /// A `#inst` timestamp, decomposed into its fields.
    Instant(ParsedInstant),
    /// A `#uuid` value.
    Uuid(Uuid),
    /// Sequential collection, `(...)`.
    List(Vector<Value>),
    /// Sequential collection with guaranteed random access, `[...]`.
    Vector(Vector<Value>),
    /// Collection of unique elements, `#{...}`.
    Set(OrdSet<Value>),
    /// Collection of unique keys mapped to values, `{...}`.
    Map(OrdMap<Value, Value>),
    /// A tag with no registered handler, kept with its value.
    Tagged(TaggedValue),
}

impl Value {
    pub fn nil() -> Value {
        Value::Nil
    }

    pub fn bool(b: bool) -> Value {
        Value::Bool(b)
    }

    pub fn int(n: i64) -> Value {
        Value::Int(n)
    }

    pub fn bigint(n: impl Into<BigInt>) -> Value {
        Value::BigInt(n.into())
    }

    pub fn float(f: f64) -> Value {
        Value::Float(f)
    }

    pub fn decimal(d: BigDecimal) -> Value {
        Value::Decimal(d)
    }

    pub fn char(c: char) -> Value {
        Value::Char(c)
    }

    pub fn string(s: impl Into<Arc<str>>) -> Value {
        Value::String(s.into())
    }

    pub fn symbol(sym: Symbol) -> Value {
        Value::Symbol(sym)
    }

    pub fn keyword(kw: Keyword) -> Value {
        Value::Keyword(kw)
    }

    pub fn instant(pi: ParsedInstant) -> Value {
        Value::Instant(pi)
    }

    pub fn uuid(u: Uuid) -> Value {
        Value::Uuid(u)
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Value {
        Value::List(items.into_iter().collect())
    }

    pub fn vector(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Vector(items.into_iter().collect())
    }

    /// Build a set, silently dropping duplicates. The reader goes through
    /// a [`CollectionBuilder`](crate::builders::CollectionBuilder), which
    /// rejects duplicates instead.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Set(items.into_iter().collect())
    }

    /// Build a map, keeping the last value for a repeated key. The reader
    /// goes through a builder, which rejects duplicate keys instead.
    pub fn map(pairs: impl IntoIterator<Item = (Value, Value)>) -> Value {
        Value::Map(pairs.into_iter().collect())
    }

    pub fn tagged(tag: Tag, value: Value) -> Value {
        Value::Tagged(TaggedValue::new(tag, value))
    }

    /// The dispatch key for this value's type.
    pub fn type_key(&self) -> TypeKey {
        match self {
            Value::Nil => TypeKey::Nil,
            Value::Bool(_) => TypeKey::Bool,
            Value::Int(_) => TypeKey::Int,
            Value::BigInt(_) => TypeKey::BigInt,
            Value::Float(_) => TypeKey::Float,
            Value::Decimal(_) => TypeKey::Decimal,
            Value::Char(_) => TypeKey::Char,
            Value::String(_) => TypeKey::String,
            Value::Symbol(_) => TypeKey::Symbol,
            Value::Keyword(_) => TypeKey::Keyword,
            Value::Instant(_) => TypeKey::Instant,
            Value::Uuid(_) => TypeKey::Uuid,
            Value::List(_) => TypeKey::List,
            Value::Vector(_) => TypeKey::Vector,
            Value::Set(_) => TypeKey::Set,
            Value::Map(_) => TypeKey::Map,
            Value::Tagged(_) => TypeKey::Tagged,
        }
    }
}

// ============================================================================
// TaggedValue
// ============================================================================

/// A tag paired with the value it labels.
///
/// Produced by the parser only when no handler is registered for the tag;
/// it is the generic representation of an unrecognized extension.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaggedValue {
    tag: Tag,
    value: Box<Value>,
}

impl TaggedValue {
    pub fn new(tag: Tag, value: Value) -> TaggedValue {
        TaggedValue {
            tag,
            value: Box::new(value),
        }
    }

    #[must_use]
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl fmt::Debug for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.tag, self.value)
    }
}

// ============================================================================
// Equality, ordering, hashing
// ============================================================================

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a == b,
            (Value::Instant(a), Value::Instant(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Tagged(a), Value::Tagged(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        // Heterogeneous values order by type rank so that any mix of
        // values can live in the ordered collections.
        fn type_order(v: &Value) -> u8 {
            match v {
                Value::Nil => 0,
                Value::Bool(_) => 1,
                Value::Int(_) => 2,
                Value::BigInt(_) => 3,
                Value::Float(_) => 4,
                Value::Decimal(_) => 5,
                Value::Char(_) => 6,
                Value::String(_) => 7,
                Value::Symbol(_) => 8,
                Value::Keyword(_) => 9,
                Value::Instant(_) => 10,
                Value::Uuid(_) => 11,
                Value::List(_) => 12,
                Value::Vector(_) => 13,
                Value::Set(_) => 14,
                Value::Map(_) => 15,
                Value::Tagged(_) => 16,
            }
        }

        let ta = type_order(self);
        let tb = type_order(other);
        if ta != tb {
            return ta.cmp(&tb);
        }

        match (self, other) {
            (Value::Nil, Value::Nil) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::BigInt(a), Value::BigInt(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            (Value::Char(a), Value::Char(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Symbol(a), Value::Symbol(b)) => a.cmp(b),
            (Value::Keyword(a), Value::Keyword(b)) => a.cmp(b),
            (Value::Instant(a), Value::Instant(b)) => a.cmp(b),
            (Value::Uuid(a), Value::Uuid(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => a.cmp(b),
            (Value::Vector(a), Value::Vector(b)) => a.cmp(b),
            (Value::Set(a), Value::Set(b)) => a.iter().cmp(b.iter()),
            (Value::Map(a), Value::Map(b)) => a.iter().cmp(b.iter()),
            (Value::Tagged(a), Value::Tagged(b)) => a.cmp(b),
            _ => unreachable!("type ranks already compared"),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(n) => n.hash(state),
            Value::BigInt(n) => n.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Decimal(d) => d.hash(state),
            Value::Char(c) => c.hash(state),
            Value::String(s) => s.hash(state),
            Value::Symbol(sym) => sym.hash(state),
            Value::Keyword(kw) => kw.hash(state),
            Value::Instant(pi) => pi.hash(state),
            Value::Uuid(u) => u.hash(state),
            Value::List(items) | Value::Vector(items) => {
                items.len().hash(state);
                for item in items {
                    item.hash(state);
                }
            }
            Value::Set(items) => {
                items.len().hash(state);
                for item in items {
                    item.hash(state);
                }
            }
            Value::Map(map) => {
                map.len().hash(state);
                for (k, v) in map {
                    k.hash(state);
                    v.hash(state);
                }
            }
            Value::Tagged(tv) => tv.hash(state),
        }
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Value {
    /// Renders the value as edn text via the default printer protocol.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match crate::printer::print_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

// ============================================================================
// Tests
// ============================================================================
