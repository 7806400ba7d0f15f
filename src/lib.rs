// edn-codec - Reader and printer for edn (extensible data notation)
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # edn-codec
//!
//! A reader and printer for [edn](https://github.com/edn-format/edn),
//! the extensible data notation.
//!
//! Reading turns a character stream into a [`Value`] tree; printing
//! turns a value tree back into canonical edn text. Both ends are
//! pluggable: the parser takes a [`ParserConfig`] carrying collection
//! builder factories and tag handlers, and the printer dispatches
//! through a [`Protocol`] of render functions that applications can
//! extend with their own types.
//!
//! ```
//! use edn_codec::{parse_str, print_string};
//!
//! let value = parse_str("{:a 1, :b [true nil]}").unwrap().unwrap();
//! let text = print_string(&value).unwrap();
//! assert_eq!(parse_str(&text).unwrap().unwrap(), value);
//! ```

pub mod builders;
pub mod error;
pub mod handlers;
pub mod instant;
mod interner;
pub mod keyword;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod protocol;
pub mod source;
pub mod symbol;
pub mod value;

pub use bigdecimal::BigDecimal;
pub use builders::{BuilderFactory, CollectionBuilder};
pub use error::{EdnError, Position, Result};
pub use handlers::TagHandler;
pub use im::{OrdMap, OrdSet, Vector};
pub use instant::ParsedInstant;
pub use keyword::Keyword;
pub use lexer::{Lexeme, Lexer, Token};
pub use num_bigint::BigInt;
pub use parser::{parse_all_str, parse_str, Parser, ParserConfig, ParserConfigBuilder};
pub use printer::{
    default_protocol, default_protocol_builder, print_string, print_string_with, PrintFn, Printer,
    Sink, WriteSink,
};
pub use protocol::{Protocol, ProtocolBuilder, TypeKey};
pub use source::{ReadSource, Source, StrSource};
pub use symbol::{Symbol, Tag};
pub use uuid::Uuid;
pub use value::{TaggedValue, Value};
