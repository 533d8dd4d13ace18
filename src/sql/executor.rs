//! # Statement Executor
//!
//! Dispatches parsed statements to the table and returns a typed result the
//! REPL can print. Engine failures (I/O, corruption, interior overflow)
//! propagate as errors and end the process; a duplicate key is a normal
//! result because the tree was left untouched.

use eyre::Result;

use crate::btree::InsertOutcome;
use crate::records::Row;
use crate::table::Table;

use super::parser::Statement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteResult {
    Inserted,
    DuplicateKey,
    Rows(Vec<Row>),
}

pub fn execute(statement: Statement, table: &mut Table) -> Result<ExecuteResult> {
    match statement {
        Statement::Insert(row) => match table.insert(&row)? {
            InsertOutcome::Inserted => Ok(ExecuteResult::Inserted),
            InsertOutcome::DuplicateKey => Ok(ExecuteResult::DuplicateKey),
        },
        Statement::Select => Ok(ExecuteResult::Rows(table.select()?)),
    }
}
