// edn-codec - Tag handlers
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Tag handlers transform the value following a tag into its final form.
//!
//! The parser looks handlers up by tag in its configuration; a tag with
//! no handler yields a generic [`TaggedValue`](crate::value::TaggedValue)
//! instead. The four numeric pseudo-tags are a special case: they never
//! appear in input text, but every parsed number literal is routed
//! through the handler registered for its numeric type, which is the seam
//! for substituting custom numeric representations.

use std::sync::{Arc, OnceLock};

use uuid::Uuid;

use crate::error::{EdnError, Result};
use crate::instant;
use crate::symbol::{Symbol, Tag};
use crate::value::Value;

/// Transforms the value following `tag` into its final representation.
pub trait TagHandler: Send + Sync {
    fn transform(&self, tag: &Tag, value: Value) -> Result<Value>;
}

impl<F> TagHandler for F
where
    F: Fn(&Tag, Value) -> Result<Value> + Send + Sync,
{
    fn transform(&self, tag: &Tag, value: Value) -> Result<Value> {
        self(tag, value)
    }
}

// ============================================================================
// Built-in handlers
// ============================================================================

/// Returns the value unchanged. Default for the numeric pseudo-tags.
pub struct IdentityHandler;

impl TagHandler for IdentityHandler {
    fn transform(&self, _tag: &Tag, value: Value) -> Result<Value> {
        Ok(value)
    }
}

/// Default handler for `#uuid`.
pub struct UuidHandler;

impl TagHandler for UuidHandler {
    fn transform(&self, tag: &Tag, value: Value) -> Result<Value> {
        let Value::String(s) = value else {
            return Err(EdnError::syntax(format!("{} expects a String.", tag)));
        };
        match Uuid::parse_str(&s) {
            Ok(u) => Ok(Value::Uuid(u)),
            Err(_) => Err(EdnError::syntax(format!(
                "\"{}\" is not a valid UUID.",
                s
            ))),
        }
    }
}

/// Default handler for `#inst`: decomposes the timestamp into a
/// [`ParsedInstant`](crate::instant::ParsedInstant). Register a
/// replacement to convert instants into an application time type.
pub struct InstantHandler;

impl TagHandler for InstantHandler {
    fn transform(&self, tag: &Tag, value: Value) -> Result<Value> {
        let Value::String(s) = value else {
            return Err(EdnError::syntax(format!("{} expects a String.", tag)));
        };
        instant::parse(&s).map(Value::Instant)
    }
}

// ============================================================================
// Well-known tags
// ============================================================================

fn cached_tag(cell: &OnceLock<Tag>, prefix: Option<&str>, name: &str) -> Tag {
    cell.get_or_init(|| {
        Tag::from_symbol(Symbol::from_parts(
            prefix.map(Arc::from),
            Arc::from(name),
        ))
    })
    .clone()
}

/// The `#inst` tag.
pub fn inst_tag() -> Tag {
    static TAG: OnceLock<Tag> = OnceLock::new();
    cached_tag(&TAG, None, "inst")
}

/// The `#uuid` tag.
pub fn uuid_tag() -> Tag {
    static TAG: OnceLock<Tag> = OnceLock::new();
    cached_tag(&TAG, None, "uuid")
}

/// Pseudo-tag through which 64-bit integer literals are routed.
pub fn long_tag() -> Tag {
    static TAG: OnceLock<Tag> = OnceLock::new();
    cached_tag(&TAG, Some("edn-codec"), "long")
}

/// Pseudo-tag through which arbitrary-precision integer literals are routed.
pub fn big_integer_tag() -> Tag {
    static TAG: OnceLock<Tag> = OnceLock::new();
    cached_tag(&TAG, Some("edn-codec"), "big-integer")
}

/// Pseudo-tag through which float literals are routed.
pub fn double_tag() -> Tag {
    static TAG: OnceLock<Tag> = OnceLock::new();
    cached_tag(&TAG, Some("edn-codec"), "double")
}

/// Pseudo-tag through which arbitrary-precision decimal literals are routed.
pub fn big_decimal_tag() -> Tag {
    static TAG: OnceLock<Tag> = OnceLock::new();
    cached_tag(&TAG, Some("edn-codec"), "big-decimal")
}

// ============================================================================
// Tests
// ============================================================================
