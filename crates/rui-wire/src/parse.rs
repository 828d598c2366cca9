#![forbid(unsafe_code)]

//! Parser for wire records.
//!
//! Accepts everything [`Record::encode`] produces plus the looser forms the
//! server writes by hand: single-quoted strings, newline separators,
//! repeated commas, and `//` / `/* */` comments.
//!
//! Scalars keep the form they were written in: quoted strings come back as
//! [`Value::Text`], backtick strings as [`Value::Raw`], and unquoted tokens
//! (numbers, ids, flags) as [`Value::Bare`]. Re-encoding a parsed record
//! therefore reproduces its canonical wire text.

use crate::error::WireError;
use crate::escape::{is_stop_symbol, unescape};
use crate::record::{ANONYMOUS_TAG, Record, Value};

/// Maximum nesting of records and lists.
pub const MAX_DEPTH: usize = 64;

/// Parse one complete record (`tag{...}`).
///
/// Leading and trailing whitespace and comments are allowed; anything else
/// after the closing brace is an error.
pub fn parse_record(text: &str) -> Result<Record, WireError> {
    let mut parser = Parser::new(text);
    parser.skip_spaces(true);
    let tag = parser.parse_token()?;
    parser.skip_spaces(true);
    let record = parser.parse_object(if tag.is_empty() { ANONYMOUS_TAG } else { tag.as_str() })?;
    parser.skip_spaces(true);
    if parser.pos < parser.data.len() {
        let (line, column) = parser.location();
        return Err(WireError::TrailingInput { line, column });
    }
    Ok(record)
}

/// Scalar value for `token`, typed by the character it started with.
fn scalar(first: char, token: String) -> Value {
    match first {
        '"' | '\'' => Value::Text(token),
        '`' => Value::Raw(token),
        _ => Value::Bare(token),
    }
}

struct Parser {
    data: Vec<char>,
    pos: usize,
    line: usize,
    line_start: usize,
    depth: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            data: text.chars().collect(),
            pos: 0,
            line: 1,
            line_start: 0,
            depth: 0,
        }
    }

    fn location(&self) -> (usize, usize) {
        (self.line, self.pos.saturating_sub(self.line_start) + 1)
    }

    fn peek(&self) -> Option<char> {
        self.data.get(self.pos).copied()
    }

    fn unexpected_end(&self) -> WireError {
        let (line, column) = self.location();
        WireError::UnexpectedEnd { line, column }
    }

    fn expected(&self, expected: &'static str, found: char) -> WireError {
        let (line, column) = self.location();
        WireError::Expected {
            expected,
            found,
            line,
            column,
        }
    }

    fn skip_spaces(&mut self, skip_newline: bool) {
        while let Some(ch) = self.peek() {
            match ch {
                '\n' => {
                    if !skip_newline {
                        return;
                    }
                    self.line += 1;
                    self.line_start = self.pos + 1;
                }
                '/' => match self.data.get(self.pos + 1) {
                    Some('/') => {
                        while self.peek().is_some_and(|c| c != '\n') {
                            self.pos += 1;
                        }
                        continue;
                    }
                    Some('*') => {
                        self.pos += 2;
                        loop {
                            match self.peek() {
                                None => return,
                                Some('*') if self.data.get(self.pos + 1) == Some(&'/') => {
                                    self.pos += 2;
                                    break;
                                }
                                Some('\n') => {
                                    self.line += 1;
                                    self.line_start = self.pos + 1;
                                }
                                Some(_) => {}
                            }
                            self.pos += 1;
                        }
                        continue;
                    }
                    _ => return,
                },
                c if c.is_whitespace() => {}
                _ => return,
            }
            self.pos += 1;
        }
    }

    /// Read a bare, quoted, or raw token. A bare token may be empty.
    fn parse_token(&mut self) -> Result<String, WireError> {
        self.skip_spaces(true);
        let Some(first) = self.peek() else {
            return Err(self.unexpected_end());
        };

        match first {
            '`' => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != '`') {
                    if self.peek() == Some('\n') {
                        self.line += 1;
                        self.line_start = self.pos + 1;
                    }
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(self.unexpected_end());
                }
                let token: String = self.data[start..self.pos].iter().collect();
                self.pos += 1;
                self.skip_spaces(false);
                Ok(token)
            }
            '"' | '\'' => {
                let (line, column) = self.location();
                self.pos += 1;
                let start = self.pos;
                loop {
                    match self.peek() {
                        None => return Err(self.unexpected_end()),
                        Some('\\') => self.pos += 2,
                        Some(c) if c == first => break,
                        Some(_) => self.pos += 1,
                    }
                }
                let body: String = self.data[start..self.pos].iter().collect();
                self.pos += 1;
                let token = unescape(&body).map_err(|err| match err {
                    WireError::InvalidEscape {
                        sequence,
                        column: offset,
                        ..
                    } => WireError::InvalidEscape {
                        sequence,
                        line,
                        column: column + offset,
                    },
                    other => other,
                })?;
                self.skip_spaces(false);
                Ok(token)
            }
            _ => {
                let start = self.pos;
                while self.peek().is_some_and(|c| !is_stop_symbol(c)) {
                    self.pos += 1;
                }
                let token: String = self.data[start..self.pos].iter().collect();
                self.skip_spaces(false);
                Ok(token)
            }
        }
    }

    fn parse_node(&mut self) -> Result<(String, Value), WireError> {
        let name = self.parse_token()?;
        self.skip_spaces(true);
        match self.peek() {
            Some('=') => self.pos += 1,
            Some(other) => return Err(self.expected("'=' after a field name", other)),
            None => return Err(self.unexpected_end()),
        }

        self.skip_spaces(true);
        let value = match self.peek() {
            None => return Err(self.unexpected_end()),
            Some('[') => Value::List(self.parse_array()?),
            Some('{') => Value::Record(self.parse_object(ANONYMOUS_TAG)?),
            Some(other @ ('}' | ']' | '=')) => {
                return Err(self.expected("a value after '='", other));
            }
            Some(first) => {
                let token = self.parse_token()?;
                if self.peek() == Some('{') {
                    Value::Record(self.parse_object(&token)?)
                } else {
                    scalar(first, token)
                }
            }
        };
        Ok((name, value))
    }

    fn enter(&mut self) -> Result<(), WireError> {
        if self.depth == MAX_DEPTH {
            let (line, column) = self.location();
            return Err(WireError::TooDeep {
                limit: MAX_DEPTH,
                line,
                column,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_object(&mut self, tag: &str) -> Result<Record, WireError> {
        match self.peek() {
            Some('{') => self.pos += 1,
            Some(other) => return Err(self.expected("'{'", other)),
            None => return Err(self.unexpected_end()),
        }
        self.enter()?;
        let record = self.parse_fields(tag)?;
        self.depth -= 1;
        Ok(record)
    }

    fn parse_fields(&mut self, tag: &str) -> Result<Record, WireError> {

        let mut record = Record::new(tag);
        loop {
            self.skip_spaces(true);
            while self.peek() == Some(',') {
                self.pos += 1;
                self.skip_spaces(true);
            }
            match self.peek() {
                None => return Err(self.unexpected_end()),
                Some('}') => {
                    self.pos += 1;
                    self.skip_spaces(false);
                    return Ok(record);
                }
                Some(_) => {}
            }

            let (name, value) = self.parse_node()?;
            record.insert(name, value);

            match self.peek() {
                None => return Err(self.unexpected_end()),
                Some('}') => {
                    self.pos += 1;
                    self.skip_spaces(false);
                    return Ok(record);
                }
                Some(',' | '\n') => self.pos += usize::from(self.peek() == Some(',')),
                Some(other) => return Err(self.expected("'}', ',' or a newline", other)),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Vec<Value>, WireError> {
        // Caller has checked the opening bracket.
        self.pos += 1;
        self.enter()?;
        let items = self.parse_items()?;
        self.depth -= 1;
        Ok(items)
    }

    fn parse_items(&mut self) -> Result<Vec<Value>, WireError> {
        let mut items = Vec::new();
        loop {
            self.skip_spaces(true);
            while self.peek() == Some(',') {
                self.pos += 1;
                self.skip_spaces(true);
            }
            match self.peek() {
                None => return Err(self.unexpected_end()),
                Some(']') => {
                    self.pos += 1;
                    self.skip_spaces(false);
                    return Ok(items);
                }
                Some('{') => items.push(Value::Record(self.parse_object(ANONYMOUS_TAG)?)),
                Some(first) => {
                    let quoted = matches!(first, '"' | '\'' | '`');
                    let token = self.parse_token()?;
                    if self.peek() == Some('{') {
                        let tag = if token.is_empty() { ANONYMOUS_TAG } else { token.as_str() };
                        items.push(Value::Record(self.parse_object(tag)?));
                    } else if token.is_empty() && !quoted {
                        return Err(self.expected("a list item", first));
                    } else {
                        items.push(scalar(first, token));
                    }
                }
            }
        }
    }
}
