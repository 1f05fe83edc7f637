//! Portable markup tokenizer and tree builder.
//!
//! Works the same on server and client: no DOM, no platform parser.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{Attribute, Element, Node};
pub use lexer::{LexError, Span};
pub use parser::{parse, ParseError};
