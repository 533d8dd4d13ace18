//! # Statement Parser
//!
//! The dialect is two statements:
//!
//! ```text
//! insert <id> <username> <email>
//! select
//! ```
//!
//! Tokens are whitespace-separated; anything after the email is ignored.
//! Parse failures are ordinary values with the REPL's exact wording, so
//! the loop can print and continue.

use std::fmt;

use crate::config::{EMAIL_MAX_LEN, USERNAME_MAX_LEN};
use crate::records::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Missing fields or an id that is not an integer in range.
    Syntax,
    NegativeId,
    StringTooLong,
    /// The line does not start with a known statement keyword.
    Unrecognized(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Syntax => write!(f, "Syntax error. Could not parse statement"),
            ParseError::NegativeId => write!(f, "ID must be a positive number"),
            ParseError::StringTooLong => write!(f, "String is too long"),
            ParseError::Unrecognized(line) => {
                write!(f, "Unrecognized keyword at start of '{}'", line)
            }
        }
    }
}

impl std::error::Error for ParseError {}

pub fn parse(input: &str) -> Result<Statement, ParseError> {
    let mut tokens = input.split_whitespace();

    match tokens.next() {
        Some("insert") => parse_insert(tokens),
        Some("select") => {
            if tokens.next().is_some() {
                // `select` takes no arguments.
                Err(ParseError::Unrecognized(input.to_string()))
            } else {
                Ok(Statement::Select)
            }
        }
        _ => Err(ParseError::Unrecognized(input.to_string())),
    }
}

fn parse_insert<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<Statement, ParseError> {
    let id_token = tokens.next().ok_or(ParseError::Syntax)?;
    let username = tokens.next().ok_or(ParseError::Syntax)?;
    let email = tokens.next().ok_or(ParseError::Syntax)?;

    let id: i64 = id_token.parse().map_err(|_| ParseError::Syntax)?;
    if id < 0 {
        return Err(ParseError::NegativeId);
    }
    let id = u32::try_from(id).map_err(|_| ParseError::Syntax)?;

    if username.len() > USERNAME_MAX_LEN || email.len() > EMAIL_MAX_LEN {
        return Err(ParseError::StringTooLong);
    }

    // Lengths are validated above, so construction cannot fail.
    let row = Row::new(id, username, email).map_err(|_| ParseError::Syntax)?;
    Ok(Statement::Insert(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_insert_statement() {
        let statement = parse("insert 1 user1 person1@example.com").unwrap();

        match statement {
            Statement::Insert(row) => {
                assert_eq!(row.id, 1);
                assert_eq!(row.username, "user1");
                assert_eq!(row.email, "person1@example.com");
            }
            other => panic!("expected insert, got {:?}", other),
        }
    }

    #[test]
    fn parses_select_statement() {
        assert_eq!(parse("select").unwrap(), Statement::Select);
    }

    #[test]
    fn select_with_arguments_is_unrecognized() {
        assert_eq!(
            parse("select everything"),
            Err(ParseError::Unrecognized("select everything".into()))
        );
    }

    #[test]
    fn missing_fields_are_a_syntax_error() {
        assert_eq!(parse("insert"), Err(ParseError::Syntax));
        assert_eq!(parse("insert 1"), Err(ParseError::Syntax));
        assert_eq!(parse("insert 1 user1"), Err(ParseError::Syntax));
    }

    #[test]
    fn non_numeric_id_is_a_syntax_error() {
        assert_eq!(parse("insert abc user1 a@x"), Err(ParseError::Syntax));
    }

    #[test]
    fn negative_id_is_rejected() {
        assert_eq!(parse("insert -1 user1 a@x"), Err(ParseError::NegativeId));
    }

    #[test]
    fn id_zero_is_accepted() {
        match parse("insert 0 user0 a@x").unwrap() {
            Statement::Insert(row) => assert_eq!(row.id, 0),
            other => panic!("expected insert, got {:?}", other),
        }
    }

    #[test]
    fn id_beyond_u32_is_a_syntax_error() {
        assert_eq!(parse("insert 4294967296 u a@x"), Err(ParseError::Syntax));
    }

    #[test]
    fn boundary_length_strings_are_accepted() {
        let username = "u".repeat(32);
        let email = "e".repeat(255);
        let input = format!("insert 1 {} {}", username, email);

        assert!(parse(&input).is_ok());
    }

    #[test]
    fn over_limit_strings_are_too_long() {
        let long_username = format!("insert 1 {} a@x", "u".repeat(33));
        let long_email = format!("insert 1 user1 {}", "e".repeat(256));

        assert_eq!(parse(&long_username), Err(ParseError::StringTooLong));
        assert_eq!(parse(&long_email), Err(ParseError::StringTooLong));
    }

    #[test]
    fn unknown_keyword_reports_the_whole_line() {
        assert_eq!(
            parse("update 1 user1 a@x"),
            Err(ParseError::Unrecognized("update 1 user1 a@x".into()))
        );
    }

    #[test]
    fn extra_tokens_after_email_are_ignored() {
        match parse("insert 1 user1 a@x trailing junk").unwrap() {
            Statement::Insert(row) => assert_eq!(row.email, "a@x"),
            other => panic!("expected insert, got {:?}", other),
        }
    }

    #[test]
    fn error_messages_match_the_repl_wording() {
        assert_eq!(
            ParseError::Syntax.to_string(),
            "Syntax error. Could not parse statement"
        );
        assert_eq!(
            ParseError::NegativeId.to_string(),
            "ID must be a positive number"
        );
        assert_eq!(ParseError::StringTooLong.to_string(), "String is too long");
        assert_eq!(
            ParseError::Unrecognized("foo".into()).to_string(),
            "Unrecognized keyword at start of 'foo'"
        );
    }
}
