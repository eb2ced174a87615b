//! Parser module for assembly source

pub mod lexer;
pub mod number;

pub use lexer::{SourceLine, parse_source};
pub use number::{Literal, NumberFormat, NumberParser, Term, is_identifier};
