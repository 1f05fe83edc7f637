//! Block-based post content and its markup form.
//!
//! The editor works on a [`Document`]; what gets stored is the markup string
//! produced by [`serialize`]. [`parse`] rebuilds blocks from stored markup.

pub mod model;
pub mod parse;
pub mod serialize;

pub use model::{Block, BlockError, BlockKind, Document, HeadingLevel};
pub use parse::{parse, parse_str};
pub use serialize::{serialize, EMPTY_MARKUP};
