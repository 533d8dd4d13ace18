//! # CLI Module
//!
//! The interactive surface: a REPL with a `db > ` prompt, three meta
//! commands, and the two-statement dialect.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              CLI Entry Point                │
//! │              (bin/rookdb.rs)                │
//! ├─────────────────────────────────────────────┤
//! │                 REPL Loop                   │
//! │  rustyline on a terminal, plain lines on a  │
//! │  pipe; dispatches commands vs. statements   │
//! ├─────────────────────────────────────────────┤
//! │    Commands (.exit/.btree/.constants)       │
//! │    History  (~/.rookdb_history)             │
//! └─────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod history;
pub mod repl;

pub use repl::Repl;
