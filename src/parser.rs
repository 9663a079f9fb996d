//! Agent output parsing.
//!
//! Agent output is a whitespace-separated stream of exactly `T × M` action
//! tokens, turn-major and in elevator order within a turn. Line breaks carry
//! no meaning. Tokens are matched case-insensitively:
//!
//! | Token                       | Action                        |
//! |-----------------------------|-------------------------------|
//! | `UP`, `MOVE_UP`             | [`Action::MoveUp`]            |
//! | `DOWN`, `MOVE_DOWN`         | [`Action::MoveDown`]          |
//! | `STAY`                      | [`Action::Stay`]              |
//! | `OPEN`, `OPEN_AND_EXCHANGE` | [`Action::OpenAndExchange`]   |
//!
//! The parser only checks syntax. Whether an action makes sense where the
//! elevator is standing is the engine's business.

use crate::command::{Action, CommandPlan};
use crate::config::BuildingConfig;
use crate::error::Result;
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

const TOKENS: [(&str, Action); 7] = [
    ("UP", Action::MoveUp),
    ("MOVE_UP", Action::MoveUp),
    ("DOWN", Action::MoveDown),
    ("MOVE_DOWN", Action::MoveDown),
    ("STAY", Action::Stay),
    ("OPEN", Action::OpenAndExchange),
    ("OPEN_AND_EXCHANGE", Action::OpenAndExchange),
];

/// Where a token starts. `line` and `column` are 1-based, `token` is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub token: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {} (token {})",
            self.line, self.column, self.token
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    MalformedToken { token: String },
    WrongTokenCount { expected: usize, found: usize },
    TruncatedInput { expected: usize, found: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::MalformedToken { token } => write!(f, "unknown action {token:?}"),
            ParseErrorKind::WrongTokenCount { expected, found } => {
                write!(f, "expected {expected} actions, found {found}")
            }
            ParseErrorKind::TruncatedInput { expected, found } => {
                write!(f, "input ended after {found} of {expected} actions")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid agent output: {kind} at {position}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: Position,
}

/// Parse agent output for `cfg`.
///
/// # Errors
/// Returns [`Error::Config`](crate::Error::Config) if `cfg` is invalid and
/// [`Error::Parse`](crate::Error::Parse) if `text` is malformed.
pub fn parse(text: &str, cfg: &BuildingConfig) -> Result<CommandPlan> {
    cfg.validate()?;

    let expected = cfg.turns * cfg.elevators;
    let mut scanner = Scanner::new(text);
    let mut actions = Vec::with_capacity(expected);

    while actions.len() < expected {
        let Some((position, token)) = scanner.next_token() else {
            return Err(ParseError {
                kind: ParseErrorKind::TruncatedInput {
                    expected,
                    found: actions.len(),
                },
                position: scanner.here(),
            }
            .into());
        };
        let action = decode_token(token).ok_or_else(|| ParseError {
            kind: ParseErrorKind::MalformedToken {
                token: token.to_string(),
            },
            position,
        })?;
        actions.push(action);
    }

    if let Some((position, _)) = scanner.next_token() {
        let mut found = expected + 1;
        while scanner.next_token().is_some() {
            found += 1;
        }
        return Err(ParseError {
            kind: ParseErrorKind::WrongTokenCount { expected, found },
            position,
        }
        .into());
    }

    Ok(CommandPlan::new(cfg.elevators, actions))
}

fn decode_token(token: &str) -> Option<Action> {
    TOKENS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token))
        .map(|&(_, action)| action)
}

struct Scanner<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
    n_tokens: usize,
    line: usize,
    column: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().peekable(),
            n_tokens: 0,
            line: 1,
            column: 1,
        }
    }

    fn here(&self) -> Position {
        Position {
            token: self.n_tokens,
            line: self.line,
            column: self.column,
        }
    }

    fn bump(&mut self, c: char) {
        self.chars.next();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    fn next_token(&mut self) -> Option<(Position, &'a str)> {
        while let Some(&(_, c)) = self.chars.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.bump(c);
        }

        let &(start, _) = self.chars.peek()?;
        let position = self.here();
        let mut end = self.text.len();
        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_whitespace() {
                end = i;
                break;
            }
            self.bump(c);
        }

        self.n_tokens += 1;
        Some((position, &self.text[start..end]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn cfg(turns: usize, elevators: usize) -> BuildingConfig {
        BuildingConfig {
            floors: 4,
            elevators,
            capacity: 2,
            turns,
            arrival_rate: 0.1,
        }
    }

    fn parse_err(text: &str, cfg: &BuildingConfig) -> ParseError {
        match parse(text, cfg) {
            Err(Error::Parse(err)) => err,
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_aliases_in_any_case() {
        let plan = parse("up Move_Down\nSTAY\n open_and_exchange\n", &cfg(2, 2)).unwrap();
        assert_eq!(
            plan.turn(0),
            [Action::MoveUp, Action::MoveDown]
        );
        assert_eq!(
            plan.turn(1),
            [Action::Stay, Action::OpenAndExchange]
        );
    }

    #[test]
    fn rendered_plan_parses_back() {
        let plan = parse("OPEN UP STAY DOWN UP UP", &cfg(3, 2)).unwrap();
        assert_eq!(parse(&plan.to_string(), &cfg(3, 2)).unwrap(), plan);
    }

    #[test]
    fn one_token_short_is_truncated() {
        let err = parse_err("STAY STAY\nSTAY", &cfg(2, 2));
        assert_eq!(
            err.kind,
            ParseErrorKind::TruncatedInput {
                expected: 4,
                found: 3
            }
        );
        assert_eq!(
            err.position,
            Position {
                token: 3,
                line: 2,
                column: 5
            }
        );
    }

    #[test]
    fn empty_input_is_truncated() {
        let err = parse_err("  \n", &cfg(1, 1));
        assert!(matches!(
            err.kind,
            ParseErrorKind::TruncatedInput { found: 0, .. }
        ));
    }

    #[test]
    fn excess_tokens_are_counted() {
        let err = parse_err("STAY\nSTAY\nUP DOWN", &cfg(2, 1));
        assert_eq!(
            err.kind,
            ParseErrorKind::WrongTokenCount {
                expected: 2,
                found: 4
            }
        );
        assert_eq!(
            err.position,
            Position {
                token: 2,
                line: 3,
                column: 1
            }
        );
    }

    #[test]
    fn unknown_token_is_located() {
        let err = parse_err("STAY UP\n  JUMP STAY", &cfg(2, 2));
        assert_eq!(
            err.kind,
            ParseErrorKind::MalformedToken {
                token: "JUMP".to_string()
            }
        );
        assert_eq!(
            err.position,
            Position {
                token: 2,
                line: 2,
                column: 3
            }
        );
        assert!(err.to_string().contains("line 2, column 3"), "{err}");
    }

    #[test]
    fn pick_indices_are_not_actions() {
        let err = parse_err("OPEN 0", &cfg(2, 1));
        assert!(matches!(err.kind, ParseErrorKind::MalformedToken { .. }));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let no_elevators = BuildingConfig {
            elevators: 0,
            ..Default::default()
        };
        assert!(matches!(parse("", &no_elevators), Err(Error::Config(_))));

        let huge = BuildingConfig {
            turns: usize::MAX,
            elevators: 2,
            ..Default::default()
        };
        assert!(matches!(parse("STAY", &huge), Err(Error::Config(_))));
    }
}
