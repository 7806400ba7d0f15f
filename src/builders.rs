// edn-codec - Collection builders
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Pluggable accumulators for the four collection kinds.
//!
//! The parser obtains a fresh builder per collection instance from the
//! factory configured for that kind, feeds it one `add` per element (two
//! per map entry, key then value) and finishes with `build`. `build`
//! consumes the builder, so a finished builder cannot be reused.
//!
//! The default set and map builders reject duplicates: `{:a 1, :a 2}` and
//! `#{1 1}` are syntax errors, never silent overwrites.

use std::sync::Arc;

use im::{OrdMap, OrdSet, Vector};

use crate::error::{EdnError, Result};
use crate::value::Value;

/// A transient, single-use collection accumulator.
pub trait CollectionBuilder {
    fn add(&mut self, value: Value) -> Result<()>;
    fn build(self: Box<Self>) -> Result<Value>;
}

/// Produces a fresh builder per collection instance.
pub type BuilderFactory = Arc<dyn Fn() -> Box<dyn CollectionBuilder> + Send + Sync>;

// ============================================================================
// Default builders
// ============================================================================

#[derive(Default)]
struct ListBuilder {
    items: Vector<Value>,
}

impl CollectionBuilder for ListBuilder {
    fn add(&mut self, value: Value) -> Result<()> {
        self.items.push_back(value);
        Ok(())
    }

    fn build(self: Box<Self>) -> Result<Value> {
        Ok(Value::List(self.items))
    }
}

#[derive(Default)]
struct VectorBuilder {
    items: Vector<Value>,
}

impl CollectionBuilder for VectorBuilder {
    fn add(&mut self, value: Value) -> Result<()> {
        self.items.push_back(value);
        Ok(())
    }

    fn build(self: Box<Self>) -> Result<Value> {
        Ok(Value::Vector(self.items))
    }
}

#[derive(Default)]
struct SetBuilder {
    items: OrdSet<Value>,
}

impl CollectionBuilder for SetBuilder {
    fn add(&mut self, value: Value) -> Result<()> {
        if self.items.contains(&value) {
            return Err(EdnError::syntax(format!(
                "Set contains duplicate element '{}'.",
                value
            )));
        }
        self.items.insert(value);
        Ok(())
    }

    fn build(self: Box<Self>) -> Result<Value> {
        Ok(Value::Set(self.items))
    }
}

#[derive(Default)]
struct MapBuilder {
    map: OrdMap<Value, Value>,
    pending_key: Option<Value>,
}

impl CollectionBuilder for MapBuilder {
    fn add(&mut self, value: Value) -> Result<()> {
        match self.pending_key.take() {
            None => {
                if self.map.contains_key(&value) {
                    return Err(EdnError::syntax(format!(
                        "Map contains duplicate key '{}'.",
                        value
                    )));
                }
                self.pending_key = Some(value);
            }
            Some(key) => {
                self.map.insert(key, value);
            }
        }
        Ok(())
    }

    fn build(self: Box<Self>) -> Result<Value> {
        if self.pending_key.is_some() {
            return Err(EdnError::syntax(
                "Every map must have an equal number of keys and values.",
            ));
        }
        Ok(Value::Map(self.map))
    }
}

// ============================================================================
// Default factories
// ============================================================================

pub fn default_list_factory() -> BuilderFactory {
    Arc::new(|| -> Box<dyn CollectionBuilder> { Box::new(ListBuilder::default()) })
}

pub fn default_vector_factory() -> BuilderFactory {
    Arc::new(|| -> Box<dyn CollectionBuilder> { Box::new(VectorBuilder::default()) })
}

pub fn default_set_factory() -> BuilderFactory {
    Arc::new(|| -> Box<dyn CollectionBuilder> { Box::new(SetBuilder::default()) })
}

pub fn default_map_factory() -> BuilderFactory {
    Arc::new(|| -> Box<dyn CollectionBuilder> { Box::new(MapBuilder::default()) })
}

// ============================================================================
// Tests
// ============================================================================
