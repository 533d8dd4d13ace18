//! # REPL - Read-Eval-Print Loop
//!
//! The interactive loop behind the `db > ` prompt. Each line is either a
//! meta command (leading `.`) or a statement; statement errors print their
//! message and the loop continues, while engine failures propagate out and
//! terminate the process.
//!
//! ## Execution Flow
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                  Read Line                   │
//! └──────────────────────────────────────────────┘
//!                       │
//!            starts with '.'? ── yes ──> meta command
//!                       │                 (.exit / .btree / .constants)
//!                      no
//!                       │
//!                 parse statement ── error ──> print message, continue
//!                       │
//!                 execute against the table
//!                       │
//!            Executed / rows / Error: Duplicate key
//! ```
//!
//! ## Two Input Modes
//!
//! On a terminal, rustyline provides line editing and persistent history.
//! When stdin is a pipe or a file (scripted use, the integration tests),
//! the loop reads plain lines and prints the prompt itself, so a session
//! transcript is byte-for-byte reproducible. Both modes share one line
//! handler; EOF behaves like `.exit`.

use std::io::{self, BufRead, IsTerminal, Write};

use eyre::{Result, WrapErr};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::cli::commands::{CommandHandler, CommandResult};
use crate::cli::history::history_path;
use crate::sql::{execute, parse, ExecuteResult};
use crate::table::Table;

const PROMPT: &str = "db > ";

pub struct Repl {
    table: Table,
}

impl Repl {
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    pub fn run(&mut self) -> Result<()> {
        if io::stdin().is_terminal() {
            self.run_interactive()
        } else {
            self.run_piped()
        }
    }

    fn run_interactive(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().wrap_err("failed to initialize line editor")?;

        if let Some(history_file) = history_path() {
            let _ = editor.load_history(&history_file);
        }

        loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        editor.add_history_entry(trimmed).ok();
                    }
                    if !self.handle_line(trimmed)? {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    self.table.close()?;
                    break;
                }
                Err(err) => return Err(err).wrap_err("failed to read input"),
            }
        }

        if let Some(history_file) = history_path() {
            if let Err(e) = editor.save_history(&history_file) {
                eprintln!("Warning: could not save history: {}", e);
            }
        }
        Ok(())
    }

    fn run_piped(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            print!("{}", PROMPT);
            io::stdout().flush().wrap_err("failed to flush stdout")?;

            match lines.next() {
                Some(line) => {
                    let line = line.wrap_err("failed to read input")?;
                    if !self.handle_line(line.trim())? {
                        break;
                    }
                }
                None => {
                    self.table.close()?;
                    break;
                }
            }
        }
        Ok(())
    }

    /// Processes one input line. Returns `false` when the session is over.
    fn handle_line(&mut self, line: &str) -> Result<bool> {
        if line.is_empty() {
            return Ok(true);
        }

        if CommandHandler::is_command(line) {
            match CommandHandler::execute(line, &mut self.table)? {
                CommandResult::Exit => {
                    self.table.close()?;
                    return Ok(false);
                }
                CommandResult::Output(text) => println!("{}", text),
                CommandResult::Unrecognized(message) => println!("{}", message),
            }
            return Ok(true);
        }

        let statement = match parse(line) {
            Ok(statement) => statement,
            Err(parse_error) => {
                println!("{}", parse_error);
                return Ok(true);
            }
        };

        match execute(statement, &mut self.table)? {
            ExecuteResult::Inserted => println!("Executed"),
            ExecuteResult::DuplicateKey => println!("Error: Duplicate key"),
            ExecuteResult::Rows(rows) => {
                for row in rows {
                    println!("{}", row);
                }
                println!("Executed");
            }
        }

        Ok(true)
    }
}
