// edn-codec - Parser for edn text
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Recursive descent parser for edn text.
//!
//! Drives the [`Lexer`] over a [`Source`], assembling complete values
//! with the collection builders and tag handlers from its
//! [`ParserConfig`]. Repeated [`Parser::next_value`] calls drain the
//! source; end of input is reported as `None`, never as an error.
//!
//! `#_` discards the value that follows without interpreting it: tag
//! handlers are not invoked while discarding, so a discarded `#inst`
//! with a garbage payload cannot raise a handler error or trigger a
//! handler side effect. Grammar violations inside discarded material are
//! still errors.

use std::collections::HashMap;
use std::sync::Arc;

use crate::builders::{self, BuilderFactory, CollectionBuilder};
use crate::error::{EdnError, Result};
use crate::handlers::{self, InstantHandler, TagHandler, UuidHandler};
use crate::keyword::Keyword;
use crate::lexer::{Lexeme, Lexer, Token};
use crate::source::{Source, StrSource};
use crate::symbol::{Symbol, Tag};
use crate::value::{TaggedValue, Value};

// ============================================================================
// Configuration
// ============================================================================

/// Parser configuration: builder factories for the four collection
/// kinds, the tag-handler registry, and the string-escape policy.
#[derive(Clone)]
pub struct ParserConfig {
    list_factory: BuilderFactory,
    vector_factory: BuilderFactory,
    set_factory: BuilderFactory,
    map_factory: BuilderFactory,
    tag_handlers: HashMap<Tag, Arc<dyn TagHandler>>,
    accept_unicode_escapes: bool,
}

impl ParserConfig {
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::new()
    }

    pub fn list_factory(&self) -> &BuilderFactory {
        &self.list_factory
    }

    pub fn vector_factory(&self) -> &BuilderFactory {
        &self.vector_factory
    }

    pub fn set_factory(&self) -> &BuilderFactory {
        &self.set_factory
    }

    pub fn map_factory(&self) -> &BuilderFactory {
        &self.map_factory
    }

    /// The handler registered for `tag`, if any.
    pub fn tag_handler(&self, tag: &Tag) -> Option<&Arc<dyn TagHandler>> {
        self.tag_handlers.get(tag)
    }

    pub fn accept_unicode_escapes(&self) -> bool {
        self.accept_unicode_escapes
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig::builder().build()
    }
}

/// Builds a [`ParserConfig`]. Consumed by `build`, so a finished builder
/// cannot be reused.
pub struct ParserConfigBuilder {
    list_factory: BuilderFactory,
    vector_factory: BuilderFactory,
    set_factory: BuilderFactory,
    map_factory: BuilderFactory,
    tag_handlers: HashMap<Tag, Arc<dyn TagHandler>>,
    accept_unicode_escapes: bool,
}

impl ParserConfigBuilder {
    fn new() -> Self {
        let mut tag_handlers: HashMap<Tag, Arc<dyn TagHandler>> = HashMap::new();
        tag_handlers.insert(handlers::inst_tag(), Arc::new(InstantHandler));
        tag_handlers.insert(handlers::uuid_tag(), Arc::new(UuidHandler));
        let identity: Arc<dyn TagHandler> = Arc::new(handlers::IdentityHandler);
        tag_handlers.insert(handlers::long_tag(), Arc::clone(&identity));
        tag_handlers.insert(handlers::big_integer_tag(), Arc::clone(&identity));
        tag_handlers.insert(handlers::double_tag(), Arc::clone(&identity));
        tag_handlers.insert(handlers::big_decimal_tag(), identity);

        ParserConfigBuilder {
            list_factory: builders::default_list_factory(),
            vector_factory: builders::default_vector_factory(),
            set_factory: builders::default_set_factory(),
            map_factory: builders::default_map_factory(),
            tag_handlers,
            accept_unicode_escapes: true,
        }
    }

    #[must_use]
    pub fn list_factory(mut self, factory: BuilderFactory) -> Self {
        self.list_factory = factory;
        self
    }

    #[must_use]
    pub fn vector_factory(mut self, factory: BuilderFactory) -> Self {
        self.vector_factory = factory;
        self
    }

    #[must_use]
    pub fn set_factory(mut self, factory: BuilderFactory) -> Self {
        self.set_factory = factory;
        self
    }

    #[must_use]
    pub fn map_factory(mut self, factory: BuilderFactory) -> Self {
        self.map_factory = factory;
        self
    }

    /// Register (or replace) the handler for `tag`.
    #[must_use]
    pub fn tag_handler(mut self, tag: Tag, handler: Arc<dyn TagHandler>) -> Self {
        self.tag_handlers.insert(tag, handler);
        self
    }

    /// Whether `\uNNNN` escapes are accepted in string literals. On by
    /// default; when off the lexer rejects `\u` as an unsupported escape.
    #[must_use]
    pub fn accept_unicode_escapes_in_strings(mut self, accept: bool) -> Self {
        self.accept_unicode_escapes = accept;
        self
    }

    pub fn build(self) -> ParserConfig {
        ParserConfig {
            list_factory: self.list_factory,
            vector_factory: self.vector_factory,
            set_factory: self.set_factory,
            map_factory: self.map_factory,
            tag_handlers: self.tag_handlers,
            accept_unicode_escapes: self.accept_unicode_escapes,
        }
    }
}

// ============================================================================
// Parser
// ============================================================================

/// What an internal parsing step produced: a complete value, or a
/// structural terminator for the caller to interpret.
enum Step {
    Value(Value),
    Terminator(Token),
}

/// The parser assembles values from lexemes.
pub struct Parser {
    cfg: ParserConfig,
    lexer: Lexer,
}

impl Parser {
    pub fn new() -> Parser {
        Parser::with_config(ParserConfig::default())
    }

    pub fn with_config(cfg: ParserConfig) -> Parser {
        let lexer = Lexer::new(&cfg);
        Parser { cfg, lexer }
    }

    /// Parse the next value from `src`. `None` signals end of input; a
    /// stray closing delimiter is a syntax error.
    pub fn next_value(&mut self, src: &mut dyn Source) -> Result<Option<Value>> {
        match self.next_step(src, false)? {
            Step::Value(v) => Ok(Some(v)),
            Step::Terminator(Token::EndOfInput) => Ok(None),
            Step::Terminator(t) => Err(self.error(format!("Unexpected {}", t))),
        }
    }

    // ========================================================================
    // Internal parsing methods
    // ========================================================================

    fn error(&self, message: impl Into<String>) -> EdnError {
        EdnError::syntax_at(message, self.lexer.position())
    }

    fn stamp(&self, e: EdnError) -> EdnError {
        e.with_position(self.lexer.position())
    }

    fn next_step(&mut self, src: &mut dyn Source, discard: bool) -> Result<Step> {
        match self.lexer.next_lexeme(src)? {
            Lexeme::Value(v) => Ok(Step::Value(v)),
            Lexeme::Tag(tag) => self.apply_tag(tag, src, discard),
            Lexeme::Token(token) => match token {
                Token::BeginList => {
                    let factory = Arc::clone(&self.cfg.list_factory);
                    self.parse_into_collection(&factory, Token::EndList, src, discard)
                }
                Token::BeginVector => {
                    let factory = Arc::clone(&self.cfg.vector_factory);
                    self.parse_into_collection(&factory, Token::EndVector, src, discard)
                }
                Token::BeginSet => {
                    let factory = Arc::clone(&self.cfg.set_factory);
                    self.parse_into_collection(&factory, Token::EndMapOrSet, src, discard)
                }
                Token::BeginMap => {
                    let factory = Arc::clone(&self.cfg.map_factory);
                    self.parse_into_collection(&factory, Token::EndMapOrSet, src, discard)
                }
                Token::DefaultNamespaceFollows => self.parse_namespaced_map(src, discard),
                Token::Discard => {
                    // Parse and drop exactly one value, then carry on.
                    self.require_value(src, true)?;
                    self.next_step(src, discard)
                }
                Token::Nil => Ok(Step::Value(Value::Nil)),
                Token::EndOfInput
                | Token::EndList
                | Token::EndVector
                | Token::EndMapOrSet => Ok(Step::Terminator(token)),
            },
        }
    }

    /// Parse one value, treating any terminator as a syntax error.
    fn require_value(&mut self, src: &mut dyn Source, discard: bool) -> Result<Value> {
        match self.next_step(src, discard)? {
            Step::Value(v) => Ok(v),
            Step::Terminator(Token::EndOfInput) => {
                Err(self.error("Unexpected end of input"))
            }
            Step::Terminator(t) => Err(self.error(format!("Unexpected {}", t))),
        }
    }

    /// A bare tag labels the next value. While discarding, the handler is
    /// not consulted and a placeholder is returned.
    fn apply_tag(&mut self, tag: Tag, src: &mut dyn Source, discard: bool) -> Result<Step> {
        let value = self.require_value(src, discard)?;
        if discard {
            return Ok(Step::Value(Value::Nil));
        }
        let transformed = match self.cfg.tag_handler(&tag) {
            Some(handler) => Arc::clone(handler).transform(&tag, value),
            None => Ok(Value::Tagged(TaggedValue::new(tag, value))),
        };
        transformed.map(Step::Value).map_err(|e| self.stamp(e))
    }

    fn parse_into_collection(
        &mut self,
        factory: &BuilderFactory,
        end: Token,
        src: &mut dyn Source,
        discard: bool,
    ) -> Result<Step> {
        let mut builder: Option<Box<dyn CollectionBuilder>> =
            if discard { None } else { Some(factory()) };
        loop {
            match self.next_step(src, discard)? {
                Step::Terminator(t) if t == end => break,
                Step::Terminator(t) => {
                    return Err(self.error(format!("Expected {}, but found {}", end, t)));
                }
                Step::Value(v) => {
                    if let Some(b) = builder.as_mut() {
                        b.add(v).map_err(|e| self.stamp(e))?;
                    }
                }
            }
        }
        match builder {
            Some(b) => b.build().map(Step::Value).map_err(|e| self.stamp(e)),
            None => Ok(Step::Value(Value::Nil)),
        }
    }

    /// `#:ns{...}`: a prefixless symbol naming the default namespace,
    /// then a map whose keys get that namespace applied.
    fn parse_namespaced_map(&mut self, src: &mut dyn Source, discard: bool) -> Result<Step> {
        let ns = self.parse_namespace_name(src, discard)?;
        match self.lexer.next_lexeme(src)? {
            Lexeme::Token(Token::BeginMap) => {}
            _ => {
                return Err(self.error(format!("Expected #:{} to be followed by a map.", ns)));
            }
        }
        let map_factory = Arc::clone(&self.cfg.map_factory);
        let factory: BuilderFactory = Arc::new(move || -> Box<dyn CollectionBuilder> {
            Box::new(NamespacedMapBuilder {
                inner: map_factory(),
                default_ns: Arc::clone(&ns),
                at_key: true,
            })
        });
        self.parse_into_collection(&factory, Token::EndMapOrSet, src, discard)
    }

    fn parse_namespace_name(&mut self, src: &mut dyn Source, discard: bool) -> Result<Arc<str>> {
        match self.require_value(src, discard)? {
            Value::Symbol(sym) => {
                if sym.has_prefix() {
                    Err(self.error(format!(
                        "Expected symbol following #: to be namespaceless, but found: {}",
                        sym
                    )))
                } else {
                    Ok(sym.name_arc())
                }
            }
            other => Err(self.error(format!(
                "Expected symbol following #:, but found: {}",
                other
            ))),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}

// ============================================================================
// Namespaced map key rewriting
// ============================================================================

/// Rewrites map keys before delegating to the configured map builder:
/// prefixless symbol and keyword keys receive the default namespace, a
/// `_` prefix is stripped, everything else passes through untouched.
/// Values are never rewritten.
struct NamespacedMapBuilder {
    inner: Box<dyn CollectionBuilder>,
    default_ns: Arc<str>,
    at_key: bool,
}

impl CollectionBuilder for NamespacedMapBuilder {
    fn add(&mut self, value: Value) -> Result<()> {
        let value = if self.at_key {
            apply_default_namespace(value, &self.default_ns)
        } else {
            value
        };
        self.at_key = !self.at_key;
        self.inner.add(value)
    }

    fn build(self: Box<Self>) -> Result<Value> {
        self.inner.build()
    }
}

fn apply_default_namespace(key: Value, default_ns: &Arc<str>) -> Value {
    match key {
        Value::Symbol(sym) => Value::Symbol(rewrite_prefix(sym, default_ns)),
        Value::Keyword(kw) => {
            Value::Keyword(Keyword::from_symbol(rewrite_prefix(kw.symbol().clone(), default_ns)))
        }
        other => other,
    }
}

fn rewrite_prefix(sym: Symbol, default_ns: &Arc<str>) -> Symbol {
    match sym.prefix() {
        None => Symbol::from_parts(Some(Arc::clone(default_ns)), sym.name_arc()),
        Some("_") => Symbol::from_parts(None, sym.name_arc()),
        Some(_) => sym,
    }
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Parse the first value in `text` using the default configuration.
pub fn parse_str(text: &str) -> Result<Option<Value>> {
    let mut parser = Parser::new();
    let mut src = StrSource::new(text);
    parser.next_value(&mut src)
}

/// Parse every value in `text` using the default configuration.
pub fn parse_all_str(text: &str) -> Result<Vec<Value>> {
    let mut parser = Parser::new();
    let mut src = StrSource::new(text);
    let mut values = Vec::new();
    while let Some(v) = parser.next_value(&mut src)? {
        values.push(v);
    }
    Ok(values)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Value {
        parse_str(text).unwrap().unwrap()
    }

    #[test]
    fn test_atoms() {
        assert_eq!(parse("nil"), Value::Nil);
        assert_eq!(parse("true"), Value::Bool(true));
        assert_eq!(parse("42"), Value::int(42));
        assert_eq!(parse("\"hi\""), Value::string("hi"));
    }

    #[test]
    fn test_empty_input_is_none() {
        assert_eq!(parse_str("").unwrap(), None);
        assert_eq!(parse_str("   ").unwrap(), None);
        assert_eq!(parse_str(",").unwrap(), None);
        assert_eq!(parse_str("; comment").unwrap(), None);
    }

    #[test]
    fn test_collections() {
        assert_eq!(
            parse("(1 2 3)"),
            Value::list([Value::int(1), Value::int(2), Value::int(3)])
        );
        assert_eq!(
            parse("[1 2 3]"),
            Value::vector([Value::int(1), Value::int(2), Value::int(3)])
        );
        assert_eq!(parse("#{1 2}"), Value::set([Value::int(1), Value::int(2)]));
        assert_eq!(
            parse("{:a 1}"),
            Value::map([(
                Value::Keyword(Keyword::new("a").unwrap()),
                Value::int(1)
            )])
        );
    }

    #[test]
    fn test_nested_collections() {
        assert_eq!(
            parse("[[1] (2) #{3} {4 5}]"),
            Value::vector([
                Value::vector([Value::int(1)]),
                Value::list([Value::int(2)]),
                Value::set([Value::int(3)]),
                Value::map([(Value::int(4), Value::int(5))]),
            ])
        );
    }

    #[test]
    fn test_stray_close_is_error() {
        assert!(parse_str(")").unwrap_err().is_syntax());
        assert!(parse_str("]").unwrap_err().is_syntax());
        assert!(parse_str("}").unwrap_err().is_syntax());
    }

    #[test]
    fn test_mismatched_delimiters() {
        assert!(parse_str("(1 2]").unwrap_err().is_syntax());
        assert!(parse_str("[1 2)").unwrap_err().is_syntax());
        assert!(parse_str("{1 2)").unwrap_err().is_syntax());
    }

    #[test]
    fn test_unterminated_collection() {
        assert!(parse_str("(1 2").unwrap_err().is_syntax());
        assert!(parse_str("[1 2").unwrap_err().is_syntax());
    }

    #[test]
    fn test_duplicate_map_key() {
        let err = parse_str("{:a 1, :a 2}").unwrap_err();
        assert!(err.is_syntax());
        assert!(err.to_string().contains("duplicate key"));
    }

    #[test]
    fn test_duplicate_set_element() {
        let err = parse_str("#{1 1}").unwrap_err();
        assert!(err.is_syntax());
        assert!(err.to_string().contains("duplicate element"));
    }

    #[test]
    fn test_odd_map_entries() {
        assert!(parse_str("{:a}").unwrap_err().is_syntax());
    }

    #[test]
    fn test_discard() {
        assert_eq!(
            parse("[1 #_2 3]"),
            Value::vector([Value::int(1), Value::int(3)])
        );
        assert_eq!(parse("#_1 2"), Value::int(2));
        assert_eq!(parse("#_(1 2 3) 4"), Value::int(4));
    }

    #[test]
    fn test_discard_suppresses_tag_handlers() {
        // Parsing this tag alone raises; discarding it must not.
        assert!(parse_str("#uuid \"not-a-uuid\"").unwrap_err().is_syntax());
        assert_eq!(parse("#_ #uuid \"not-a-uuid\" 123"), Value::int(123));
    }

    #[test]
    fn test_discard_skips_builders() {
        // No builder runs while discarding, so builder-level duplicate
        // detection does not fire on discarded material.
        assert_eq!(parse("#_ {:a 1, :a 2} 3"), Value::int(3));
    }

    #[test]
    fn test_discarded_value_still_checked_for_grammar() {
        assert!(parse_str("#_ )").unwrap_err().is_syntax());
        assert!(parse_str("#_ (1 2] 3").unwrap_err().is_syntax());
    }

    #[test]
    fn test_unknown_tag_wraps() {
        let v = parse("#my/tag [1]");
        match v {
            Value::Tagged(tv) => {
                assert_eq!(tv.tag().prefix(), Some("my"));
                assert_eq!(tv.tag().name(), "tag");
                assert_eq!(*tv.value(), Value::vector([Value::int(1)]));
            }
            other => panic!("expected tagged value, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_tag_handler() {
        let cfg = ParserConfig::builder()
            .tag_handler(
                Tag::namespaced("my", "double").unwrap(),
                Arc::new(|_tag: &Tag, v: Value| -> Result<Value> {
                    match v {
                        Value::Int(n) => Ok(Value::Int(n * 2)),
                        other => Ok(other),
                    }
                }),
            )
            .build();
        let mut parser = Parser::with_config(cfg);
        let mut src = StrSource::new("#my/double 21");
        assert_eq!(parser.next_value(&mut src).unwrap(), Some(Value::int(42)));
    }

    #[test]
    fn test_custom_numeric_handler() {
        // Int literals can be rerouted through a replacement handler.
        let cfg = ParserConfig::builder()
            .tag_handler(
                handlers::long_tag(),
                Arc::new(|_tag: &Tag, v: Value| -> Result<Value> { Ok(Value::list([v])) }),
            )
            .build();
        let mut parser = Parser::with_config(cfg);
        let mut src = StrSource::new("7");
        assert_eq!(
            parser.next_value(&mut src).unwrap(),
            Some(Value::list([Value::int(7)]))
        );
    }

    #[test]
    fn test_builtin_inst_tag() {
        match parse("#inst \"2010-11-12T09:08:07Z\"") {
            Value::Instant(pi) => {
                assert_eq!(pi.years, 2010);
                assert_eq!(pi.days, 12);
            }
            other => panic!("expected instant, got {:?}", other),
        }
    }

    #[test]
    fn test_builtin_uuid_tag() {
        match parse("#uuid \"f81d4fae-7dec-11d0-a765-00a0c91e6bf6\"") {
            Value::Uuid(u) => {
                assert_eq!(u.to_string(), "f81d4fae-7dec-11d0-a765-00a0c91e6bf6");
            }
            other => panic!("expected uuid, got {:?}", other),
        }
    }

    #[test]
    fn test_tag_without_value_is_error() {
        assert!(parse_str("#foo").unwrap_err().is_syntax());
        assert!(parse_str("(#foo)").unwrap_err().is_syntax());
    }

    #[test]
    fn test_namespaced_map() {
        assert_eq!(
            parse("#:foo{:a 1, b 2, _/c 3, :_/d 4}"),
            parse("{:foo/a 1, foo/b 2, c 3, :d 4}")
        );
    }

    #[test]
    fn test_namespaced_map_leaves_existing_prefixes() {
        assert_eq!(
            parse("#:foo{:bar/x 1}"),
            parse("{:bar/x 1}")
        );
    }

    #[test]
    fn test_namespaced_map_does_not_touch_values_or_other_keys() {
        assert_eq!(
            parse("#:foo{\"s\" bare, 1 :k}"),
            parse("{\"s\" bare, 1 :k}")
        );
    }

    #[test]
    fn test_namespaced_map_header_errors() {
        assert!(parse_str("#:foo [1]").unwrap_err().is_syntax());
        assert!(parse_str("#:foo/bar {}").unwrap_err().is_syntax());
        assert!(parse_str("#:1 {}").unwrap_err().is_syntax());
        assert!(parse_str("#: {}").unwrap_err().is_syntax());
    }

    #[test]
    fn test_multiple_values_drain_source() {
        assert_eq!(
            parse_all_str("1 2 3").unwrap(),
            vec![Value::int(1), Value::int(2), Value::int(3)]
        );
        assert_eq!(parse_all_str("a b").unwrap(), parse_all_str("a,b").unwrap());
    }

    #[test]
    fn test_custom_collection_factory() {
        // Collect list elements into a vector value instead.
        let cfg = ParserConfig::builder()
            .list_factory(builders::default_vector_factory())
            .build();
        let mut parser = Parser::with_config(cfg);
        let mut src = StrSource::new("(1 2)");
        assert_eq!(
            parser.next_value(&mut src).unwrap(),
            Some(Value::vector([Value::int(1), Value::int(2)]))
        );
    }

    #[test]
    fn test_errors_carry_positions() {
        let err = parse_str("[1\n 2\n }").unwrap_err();
        let pos = err.position().expect("position");
        assert_eq!(pos.line, 3);
    }
}
