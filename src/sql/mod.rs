//! SQL front end
//!
//! Lexer, parser and AST for the heapsql dialect.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Statement;
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::Token;
