//! # Meta Command Handler
//!
//! Lines starting with `.` are meta commands, not statements:
//!
//! | Command      | Description                                   |
//! |--------------|-----------------------------------------------|
//! | `.exit`      | Flush, close, leave the REPL                  |
//! | `.btree`     | Render the tree depth-first                   |
//! | `.constants` | Print the layout constants, one per line      |
//!
//! Anything else prints `Unrecognized command <line>` and the loop
//! continues.

use eyre::Result;

use crate::config::{
    COMMON_NODE_METADATA_SIZE, LEAF_NODE_CELL_SIZE, LEAF_NODE_MAX_CELLS,
    LEAF_NODE_METADATA_SIZE, LEAF_NODE_SPACE_FOR_CELLS, ROW_SIZE,
};
use crate::table::Table;

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Exit,
    Output(String),
    Unrecognized(String),
}

pub struct CommandHandler;

impl CommandHandler {
    pub fn is_command(input: &str) -> bool {
        input.starts_with('.')
    }

    pub fn execute(input: &str, table: &mut Table) -> Result<CommandResult> {
        match input {
            ".exit" => Ok(CommandResult::Exit),
            ".btree" => Ok(CommandResult::Output(format!(
                "Tree:\n{}",
                table.render_tree()?
            ))),
            ".constants" => Ok(CommandResult::Output(constants_text())),
            _ => Ok(CommandResult::Unrecognized(format!(
                "Unrecognized command {}",
                input
            ))),
        }
    }
}

fn constants_text() -> String {
    format!(
        "ROW_SIZE: {}\n\
         COMMON_NODE_METADATA_SIZE: {}\n\
         LEAF_NODE_METADATA_SIZE: {}\n\
         LEAF_NODE_CELL_SIZE: {}\n\
         LEAF_NODE_SPACE_FOR_CELLS: {}\n\
         LEAF_NODE_MAX_CELLS: {}",
        ROW_SIZE,
        COMMON_NODE_METADATA_SIZE,
        LEAF_NODE_METADATA_SIZE,
        LEAF_NODE_CELL_SIZE,
        LEAF_NODE_SPACE_FOR_CELLS,
        LEAF_NODE_MAX_CELLS
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_table() -> (Table, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let table = Table::open(dir.path().join("test.db")).unwrap();
        (table, dir)
    }

    #[test]
    fn is_command_checks_the_leading_dot() {
        assert!(CommandHandler::is_command(".exit"));
        assert!(CommandHandler::is_command(".anything"));
        assert!(!CommandHandler::is_command("select"));
        assert!(!CommandHandler::is_command(""));
    }

    #[test]
    fn exit_command_returns_exit() {
        let (mut table, _dir) = open_table();

        assert_eq!(
            CommandHandler::execute(".exit", &mut table).unwrap(),
            CommandResult::Exit
        );
    }

    #[test]
    fn constants_prints_six_lines_with_expected_values() {
        let (mut table, _dir) = open_table();

        let result = CommandHandler::execute(".constants", &mut table).unwrap();
        let CommandResult::Output(text) = result else {
            panic!("expected output");
        };

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "ROW_SIZE: 293",
                "COMMON_NODE_METADATA_SIZE: 6",
                "LEAF_NODE_METADATA_SIZE: 14",
                "LEAF_NODE_CELL_SIZE: 297",
                "LEAF_NODE_SPACE_FOR_CELLS: 4082",
                "LEAF_NODE_MAX_CELLS: 13",
            ]
        );
    }

    #[test]
    fn btree_renders_with_a_tree_banner() {
        let (mut table, _dir) = open_table();

        let result = CommandHandler::execute(".btree", &mut table).unwrap();

        assert_eq!(
            result,
            CommandResult::Output("Tree:\n- leaf (size 0)".to_string())
        );
    }

    #[test]
    fn unknown_commands_are_reported_verbatim() {
        let (mut table, _dir) = open_table();

        let result = CommandHandler::execute(".tables", &mut table).unwrap();

        assert_eq!(
            result,
            CommandResult::Unrecognized("Unrecognized command .tables".to_string())
        );
    }
}
