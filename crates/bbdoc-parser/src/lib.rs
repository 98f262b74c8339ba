//! Parser for forum markup: bracketed `[tag]` elements, an optional html passthrough subset and
//! bare url auto-linking. Parsing never fails. Malformed markup is kept as literal text.

pub mod ast;
pub mod parser;
pub mod tags;

pub use ast::{Element, Node};
pub use parser::{parse, BbParser, ParserSettings};
pub use tags::{HtmlTag, Tag};
