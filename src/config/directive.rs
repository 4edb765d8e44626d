//! Token dispenser for the block-structured writer syntax.
//!
//! Input looks like:
//!
//! ```text
//! http https://logs.example.com/{env.TENANT} {
//!     key   X-Auth
//!     value "secret token"
//! }
//! ```
//!
//! Tokens are separated by whitespace. Double quotes group a token that
//! contains whitespace (`\"` and `\\` escape inside quotes), `#` starts a
//! comment that runs to the end of the line, and standalone `{` / `}` tokens
//! delimit blocks. Braces embedded in a longer token are plain text, which
//! keeps placeholders such as `{env.HOST}` intact.

use std::fmt;

use super::ConfigError;

/// Position of a token in its source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub source: String,
    pub line: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.line)
    }
}

/// A single lexed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Line the token starts on.
    pub line: usize,
    /// Line the token ends on; differs from `line` for multi-line quotes.
    pub end_line: usize,
    pub quoted: bool,
}

impl Token {
    fn is_open_brace(&self) -> bool {
        !self.quoted && self.text == "{"
    }

    fn is_close_brace(&self) -> bool {
        !self.quoted && self.text == "}"
    }
}

/// Split `input` into tokens.
pub fn tokenize(source: &str, input: &str) -> Result<Vec<Token>, ConfigError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        if c == '\n' {
            line += 1;
            chars.next();
        } else if c.is_whitespace() {
            chars.next();
        } else if c == '#' {
            while let Some(&c) = chars.peek() {
                if c == '\n' {
                    break;
                }
                chars.next();
            }
        } else if c == '"' {
            chars.next();
            let start = line;
            let mut text = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' if matches!(chars.peek(), Some('"') | Some('\\')) => {
                        if let Some(escaped) = chars.next() {
                            text.push(escaped);
                        }
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\n' => {
                        line += 1;
                        text.push(c);
                    }
                    _ => text.push(c),
                }
            }
            if !closed {
                return Err(ConfigError::Syntax {
                    message: "unterminated quoted string".into(),
                    location: Location {
                        source: source.to_owned(),
                        line: start,
                    },
                });
            }
            tokens.push(Token {
                text,
                line: start,
                end_line: line,
                quoted: true,
            });
        } else {
            let mut text = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                text.push(c);
                chars.next();
            }
            tokens.push(Token {
                text,
                line,
                end_line: line,
                quoted: false,
            });
        }
    }

    check_balance(source, &tokens)?;
    Ok(tokens)
}

fn check_balance(source: &str, tokens: &[Token]) -> Result<(), ConfigError> {
    let mut open: Vec<usize> = Vec::new();
    for token in tokens {
        if token.is_open_brace() {
            open.push(token.line);
        } else if token.is_close_brace() && open.pop().is_none() {
            return Err(ConfigError::Syntax {
                message: "unexpected '}'".into(),
                location: Location {
                    source: source.to_owned(),
                    line: token.line,
                },
            });
        }
    }
    match open.pop() {
        Some(line) => Err(ConfigError::Syntax {
            message: "unclosed block".into(),
            location: Location {
                source: source.to_owned(),
                line,
            },
        }),
        None => Ok(()),
    }
}

/// Cursor over a token stream with nesting-aware block iteration.
///
/// The cursor starts before the first token; call [`Dispenser::next`] to load
/// it. [`Dispenser::val`] returns the currently loaded token.
#[derive(Debug, Clone)]
pub struct Dispenser {
    source: String,
    tokens: Vec<Token>,
    cursor: Option<usize>,
    nesting: usize,
}

impl Dispenser {
    /// Lex `input` and return a dispenser positioned before the first token.
    pub fn new(source: impl Into<String>, input: &str) -> Result<Self, ConfigError> {
        let source = source.into();
        let tokens = tokenize(&source, input)?;
        Ok(Self::from_tokens(source, tokens))
    }

    /// Wrap already lexed tokens.
    pub fn from_tokens(source: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            source: source.into(),
            tokens,
            cursor: None,
            nesting: 0,
        }
    }

    /// Load the next token, regardless of line. Returns `false` at the end.
    pub fn next(&mut self) -> bool {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next < self.tokens.len() {
            self.cursor = Some(next);
            true
        } else {
            false
        }
    }

    /// Load the next token if it is on the same line and is not a brace.
    pub fn next_arg(&mut self) -> bool {
        if !self.next_on_same_line() {
            return false;
        }
        let Some(next) = self.peek() else {
            return false;
        };
        if next.is_open_brace() || next.is_close_brace() {
            return false;
        }
        self.next()
    }

    /// Advance through the block opened on the current line.
    ///
    /// Pass the value of [`Dispenser::nesting`] captured before the loop.
    /// Returns `true` while a token inside the block is loaded, and `false`
    /// once the closing brace has been consumed or no block follows.
    pub fn next_block(&mut self, initial_nesting: usize) -> bool {
        if self.nesting > initial_nesting {
            if !self.next() {
                return false;
            }
            if self.current().is_some_and(Token::is_close_brace) {
                self.nesting -= 1;
            } else if self.current().is_some_and(Token::is_open_brace) {
                self.nesting += 1;
            }
            return self.nesting > initial_nesting;
        }
        if !self.next_on_same_line() || !self.peek().is_some_and(Token::is_open_brace) {
            return false;
        }
        self.next();
        if !self.next() || self.current().is_some_and(Token::is_close_brace) {
            return false;
        }
        self.nesting += 1;
        true
    }

    /// Current block depth.
    pub fn nesting(&self) -> usize {
        self.nesting
    }

    /// Text of the loaded token, or `""` before the first call to `next`.
    pub fn val(&self) -> &str {
        self.current().map_or("", |t| t.text.as_str())
    }

    /// Location of the loaded token.
    pub fn location(&self) -> Location {
        let line = self
            .current()
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.line);
        Location {
            source: self.source.clone(),
            line,
        }
    }

    /// Error for a directive missing an argument after the loaded token.
    pub fn arg_err(&self) -> ConfigError {
        ConfigError::MissingArgument {
            token: self.val().to_owned(),
            location: self.location(),
        }
    }

    /// Error for a surplus argument; the offending token must be loaded.
    pub fn unexpected_arg_err(&self) -> ConfigError {
        ConfigError::UnexpectedArgument {
            token: self.val().to_owned(),
            location: self.location(),
        }
    }

    /// Error for an unknown option inside a block.
    pub fn unrecognized_err(&self) -> ConfigError {
        ConfigError::UnrecognizedDirective {
            token: self.val().to_owned(),
            location: self.location(),
        }
    }

    /// Split off the next top-level directive: its line and any block that
    /// opens on that line.
    ///
    /// The returned dispenser is positioned before the directive name. Returns
    /// `None` once every token has been consumed.
    pub fn next_segment(&mut self) -> Option<Dispenser> {
        if !self.next() {
            return None;
        }
        let start = self.cursor?;
        while self.next_arg() {}
        let initial = self.nesting;
        while self.next_block(initial) {}
        let end = self.cursor.map_or(start, |c| c + 1);
        Some(Self::from_tokens(
            self.source.clone(),
            self.tokens[start..end].to_vec(),
        ))
    }

    fn current(&self) -> Option<&Token> {
        self.cursor.and_then(|c| self.tokens.get(c))
    }

    fn peek(&self) -> Option<&Token> {
        let next = self.cursor.map_or(0, |c| c + 1);
        self.tokens.get(next)
    }

    fn next_on_same_line(&self) -> bool {
        match (self.current(), self.peek()) {
            (None, Some(_)) => true,
            (Some(current), Some(next)) => current.end_line == next.line,
            _ => false,
        }
    }
}
