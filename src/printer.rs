// edn-codec - Printer for edn values
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Prints values as canonical edn text.
//!
//! The printer walks a value tree and, for each value, looks up a render
//! function in a [`Protocol`] keyed by the value's [`TypeKey`]. The
//! default protocol covers every built-in value type; embedding
//! applications can rebind types or register functions for their own
//! type keys.
//!
//! # Softspace
//!
//! Render functions are responsible for separating lexically ambiguous
//! neighbours (numbers, symbols, keywords, `nil`, booleans) by calling
//! [`Printer::softspace`] around the tokens they emit. The printer
//! itself has no per-type spacing policy: it keeps one counter,
//! incremented by `softspace()`, and the next `append` inserts a single
//! space when the counter is greater than one and the appended text does
//! not itself start with whitespace. Collection delimiters are appended
//! directly and need no softspace.

use std::io::{self, Write};
use std::sync::{Arc, OnceLock};

use crate::error::{EdnError, Result};
use crate::instant;
use crate::lexer::is_whitespace;
use crate::protocol::{Protocol, ProtocolBuilder, TypeKey};
use crate::value::Value;

// ============================================================================
// Sink
// ============================================================================

/// An append-only character sink, optionally closeable.
pub trait Sink {
    fn append(&mut self, s: &str) -> io::Result<()>;
    fn append_char(&mut self, c: char) -> io::Result<()>;
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for String {
    fn append(&mut self, s: &str) -> io::Result<()> {
        self.push_str(s);
        Ok(())
    }

    fn append_char(&mut self, c: char) -> io::Result<()> {
        self.push(c);
        Ok(())
    }
}

/// A sink over any [`io::Write`].
pub struct WriteSink<W> {
    inner: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(inner: W) -> WriteSink<W> {
        WriteSink { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Sink for WriteSink<W> {
    fn append(&mut self, s: &str) -> io::Result<()> {
        self.inner.write_all(s.as_bytes())
    }

    fn append_char(&mut self, c: char) -> io::Result<()> {
        let mut buf = [0u8; 4];
        self.inner.write_all(c.encode_utf8(&mut buf).as_bytes())
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ============================================================================
// Printer
// ============================================================================

/// A render function: prints one value through the printer.
pub type PrintFn = Arc<dyn Fn(&Value, &mut Printer<'_>) -> Result<()> + Send + Sync>;

/// Prints edn values to a [`Sink`]. Stateful (the softspace counter) and
/// meant for a single logical sequence of calls at a time.
pub struct Printer<'a> {
    fns: &'a Protocol<PrintFn>,
    out: &'a mut dyn Sink,
    softspace: u32,
}

impl<'a> Printer<'a> {
    /// A printer using the default protocol.
    pub fn new(out: &'a mut dyn Sink) -> Printer<'a> {
        Printer::with_protocol(default_protocol(), out)
    }

    pub fn with_protocol(fns: &'a Protocol<PrintFn>, out: &'a mut dyn Sink) -> Printer<'a> {
        Printer {
            fns,
            out,
            softspace: 0,
        }
    }

    /// Print `value` in edn syntax. Fails with a configuration error if
    /// no render function is registered for the value's type.
    pub fn print_value(&mut self, value: &Value) -> Result<&mut Self> {
        let fns = self.fns;
        let key = value.type_key();
        match fns.lookup(&key)? {
            Some(f) => {
                let f = Arc::clone(f);
                f(value, self)?;
                Ok(self)
            }
            None => Err(EdnError::config(format!(
                "Don't know how to write '{}' of type '{}'",
                value, key
            ))),
        }
    }

    /// Append text, first emitting the pending separator space if one is
    /// due and `s` does not begin with whitespace.
    pub fn append(&mut self, s: &str) -> Result<&mut Self> {
        if self.softspace > 1 && !s.is_empty() && !s.starts_with(is_whitespace) {
            self.out.append_char(' ')?;
        }
        self.softspace = 0;
        self.out.append(s)?;
        Ok(self)
    }

    /// Append one character, with the same separator handling as
    /// [`Printer::append`].
    pub fn append_char(&mut self, c: char) -> Result<&mut Self> {
        if self.softspace > 1 && !is_whitespace(c) {
            self.out.append_char(' ')?;
        }
        self.softspace = 0;
        self.out.append_char(c)?;
        Ok(self)
    }

    /// Increment the softspace counter. The next `append` decides whether
    /// an actual space is required.
    pub fn softspace(&mut self) -> &mut Self {
        self.softspace += 1;
        self
    }

    /// Close the underlying sink. Further use of the printer after
    /// closing is undefined.
    pub fn close(&mut self) -> Result<()> {
        self.out.close()?;
        Ok(())
    }
}

/// Print `value` to a new string using the default protocol.
pub fn print_string(value: &Value) -> Result<String> {
    print_string_with(default_protocol(), value)
}

/// Print `value` to a new string using `fns`.
pub fn print_string_with(fns: &Protocol<PrintFn>, value: &Value) -> Result<String> {
    let mut out = String::new();
    Printer::with_protocol(fns, &mut out).print_value(value)?;
    Ok(out)
}

// ============================================================================
// Default protocol
// ============================================================================

/// The default render protocol, covering every built-in value type.
pub fn default_protocol() -> &'static Protocol<PrintFn> {
    static PROTOCOL: OnceLock<Protocol<PrintFn>> = OnceLock::new();
    PROTOCOL.get_or_init(|| default_protocol_builder().build())
}

fn print_fn(f: impl Fn(&Value, &mut Printer<'_>) -> Result<()> + Send + Sync + 'static) -> PrintFn {
    Arc::new(f)
}

/// A protocol builder preloaded with the default render functions. Use
/// this to rebind individual types or add bindings for custom type keys.
pub fn default_protocol_builder() -> ProtocolBuilder<PrintFn> {
    ProtocolBuilder::new("print")
        .put(
            TypeKey::Nil,
            print_fn(|_, w| {
                w.softspace().append("nil")?.softspace();
                Ok(())
            }),
        )
        .put(
            TypeKey::Bool,
            print_fn(|v, w| {
                let text = if matches!(v, Value::Bool(true)) {
                    "true"
                } else {
                    "false"
                };
                w.softspace().append(text)?.softspace();
                Ok(())
            }),
        )
        .put(
            TypeKey::Int,
            print_fn(|v, w| {
                if let Value::Int(n) = v {
                    w.softspace().append(&n.to_string())?.softspace();
                }
                Ok(())
            }),
        )
        .put(
            TypeKey::BigInt,
            print_fn(|v, w| {
                if let Value::BigInt(n) = v {
                    w.softspace().append(&n.to_string())?.append_char('N')?.softspace();
                }
                Ok(())
            }),
        )
        .put(
            TypeKey::Float,
            print_fn(|v, w| {
                if let Value::Float(f) = v {
                    w.softspace().append(&format!("{:?}", f))?.softspace();
                }
                Ok(())
            }),
        )
        .put(
            TypeKey::Decimal,
            print_fn(|v, w| {
                if let Value::Decimal(d) = v {
                    w.softspace().append(&d.to_string())?.append_char('M')?.softspace();
                }
                Ok(())
            }),
        )
        .put(
            TypeKey::Char,
            print_fn(|v, w| {
                if let Value::Char(c) = v {
                    write_character(*c, w)?;
                }
                Ok(())
            }),
        )
        .put(
            TypeKey::String,
            print_fn(|v, w| {
                if let Value::String(s) = v {
                    write_string_literal(s, w)?;
                }
                Ok(())
            }),
        )
        .put(
            TypeKey::Symbol,
            print_fn(|v, w| {
                if let Value::Symbol(sym) = v {
                    w.softspace().append(&sym.to_string())?.softspace();
                }
                Ok(())
            }),
        )
        .put(
            TypeKey::Keyword,
            print_fn(|v, w| {
                if let Value::Keyword(kw) = v {
                    w.softspace().append(&kw.to_string())?.softspace();
                }
                Ok(())
            }),
        )
        .put(
            TypeKey::Instant,
            print_fn(|v, w| {
                if let Value::Instant(pi) = v {
                    w.softspace().append("#inst")?.softspace();
                    write_string_literal(&instant::to_rfc3339(pi), w)?;
                }
                Ok(())
            }),
        )
        .put(
            TypeKey::Uuid,
            print_fn(|v, w| {
                if let Value::Uuid(u) = v {
                    w.softspace().append("#uuid")?.softspace();
                    write_string_literal(&u.to_string(), w)?;
                }
                Ok(())
            }),
        )
        .put(
            TypeKey::List,
            print_fn(|v, w| {
                if let Value::List(items) = v {
                    w.append_char('(')?;
                    for item in items {
                        w.print_value(item)?;
                    }
                    w.append_char(')')?;
                }
                Ok(())
            }),
        )
        .put(
            TypeKey::Vector,
            print_fn(|v, w| {
                if let Value::Vector(items) = v {
                    w.append_char('[')?;
                    for item in items {
                        w.print_value(item)?;
                    }
                    w.append_char(']')?;
                }
                Ok(())
            }),
        )
        .put(
            TypeKey::Set,
            print_fn(|v, w| {
                if let Value::Set(items) = v {
                    // '#' is a symbol constituent, so a set needs
                    // separation from a preceding atom.
                    w.softspace();
                    w.append("#{")?;
                    for item in items {
                        w.print_value(item)?;
                    }
                    w.append_char('}')?;
                }
                Ok(())
            }),
        )
        .put(
            TypeKey::Map,
            print_fn(|v, w| {
                if let Value::Map(map) = v {
                    w.append_char('{')?;
                    for (k, val) in map {
                        w.print_value(k)?.print_value(val)?;
                    }
                    w.append_char('}')?;
                }
                Ok(())
            }),
        )
        .put(
            TypeKey::Tagged,
            print_fn(|v, w| {
                if let Value::Tagged(tv) = v {
                    w.softspace().append(&tv.tag().to_string())?.softspace();
                    w.print_value(tv.value())?;
                }
                Ok(())
            }),
        )
}

/// Escape and quote a string literal. The escape table is the scanner's,
/// run in reverse.
fn write_string_literal(s: &str, w: &mut Printer<'_>) -> Result<()> {
    w.append_char('"')?;
    for c in s.chars() {
        match c {
            '"' => w.append("\\\"")?,
            '\u{0008}' => w.append("\\b")?,
            '\t' => w.append("\\t")?,
            '\n' => w.append("\\n")?,
            '\r' => w.append("\\r")?,
            '\u{000c}' => w.append("\\f")?,
            '\\' => w.append("\\\\")?,
            _ => w.append_char(c)?,
        };
    }
    w.append_char('"')?;
    Ok(())
}

/// A character literal: the backslash itself separates tokens, so no
/// leading softspace is needed, but a trailing one is.
fn write_character(c: char, w: &mut Printer<'_>) -> Result<()> {
    if !is_whitespace(c) {
        w.append_char('\\')?.append_char(c)?;
    } else {
        match c {
            '\u{0008}' => w.append("\\backspace")?,
            '\t' => w.append("\\tab")?,
            '\n' => w.append("\\newline")?,
            '\r' => w.append("\\return")?,
            '\u{000c}' => w.append("\\formfeed")?,
            ' ' => w.append("\\space")?,
            ',' => w.append("\\,")?,
            other => {
                return Err(EdnError::syntax(format!(
                    "Whitespace character \\u{:04x} is unsupported as a character literal.",
                    other as u32
                )));
            }
        };
    }
    w.softspace();
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
