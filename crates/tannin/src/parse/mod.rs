//! Template parsing: macro expansion, tokenization, tree building.
//!
//! A render runs these in a fixed order: [`expand_macros`] rewrites
//! attribute macros into bracket directives over the raw text, [`Tokenizer`]
//! splits the result into tokens in one pass, and [`parse`] builds the
//! [`TemplateAst`](crate::ast::TemplateAst) the renderer walks.

mod macros;
mod parser;
mod tokenizer;

pub use macros::expand_macros;
pub use parser::parse;
pub use tokenizer::{split_directive, Token, Tokenizer};
