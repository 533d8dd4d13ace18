//! # Statement Layer
//!
//! A two-statement dialect sits between the REPL and the tree: `parser`
//! turns a line into a typed [`Statement`] (or a [`ParseError`] carrying
//! the exact message to print), and `executor` runs it against a
//! [`Table`](crate::table::Table).

pub mod executor;
pub mod parser;

pub use executor::{execute, ExecuteResult};
pub use parser::{parse, ParseError, Statement};
