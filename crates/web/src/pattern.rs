//! Route pattern compilation.
//!
//! A pattern is a path with placeholders:
//!
//! - `<name>`: one or more word characters
//! - `<string:name>`, `<int:name>`, `<float:name>`: a typed value
//! - `<regex:name>`: any other tag is used verbatim as a regex fragment,
//!   e.g. `<[0-9a-f]{6}:color>`
//!
//! `<`, `>`, `\` and `/` can be escaped with `\`. Inside a placeholder `:` can
//! be escaped too, which is how a custom regex containing a backslash is
//! written: `<\\d{3}:code>` compiles to `(\d{3})`.
//!
//! Every literal character is matched as itself, and the compiled regex is
//! anchored on both ends so a pattern always matches the whole path.

use regex::Regex;
use thiserror::Error;

const STRING_FRAGMENT: &str = r"(\w+)";
const INT_FRAGMENT: &str = r"(\d+)";
const FLOAT_FRAGMENT: &str = r"(\d*\.\d+|\d+\.\d*)";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("unexpected `{ch}` at byte {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("`{ch}` at byte {position} cannot be escaped")]
    InvalidEscape { ch: char, position: usize },

    #[error("pattern ends inside a placeholder or an escape")]
    Unterminated,

    #[error("generated regex `{regex}` does not compile: {reason}")]
    Regex { regex: String, reason: String },
}

/// Scanner position relative to placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Outside any placeholder
    Literal,
    /// Right after `<`
    ParamStart,
    /// Inside the first field, which is the name unless a `:` follows
    FirstField,
    /// Right after the `:` separating the tag from the name
    NameStart,
    /// Inside the name that follows a tag
    Name,
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    regex: Regex,
    names: Vec<String>,
}

impl RoutePattern {
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let mut regex = String::with_capacity(pattern.len() + 16);
        regex.push('^');

        let mut names = Vec::new();
        let mut first = String::new();
        let mut name = String::new();
        let mut state = State::Literal;
        let mut escape = false;

        for (position, ch) in pattern.char_indices() {
            if escape {
                escape = false;
                match state {
                    State::Literal => match ch {
                        '<' | '>' | '\\' | '/' => push_literal(&mut regex, ch),
                        _ => return Err(PatternError::InvalidEscape { ch, position }),
                    },
                    State::ParamStart | State::FirstField => match ch {
                        '<' | '>' | ':' | '\\' => {
                            first.push(ch);
                            state = State::FirstField;
                        }
                        _ => return Err(PatternError::InvalidEscape { ch, position }),
                    },
                    State::NameStart | State::Name => match ch {
                        '<' | '>' | ':' | '\\' => {
                            name.push(ch);
                            state = State::Name;
                        }
                        _ => return Err(PatternError::InvalidEscape { ch, position }),
                    },
                }
                continue;
            }

            if ch == '\\' {
                escape = true;
                continue;
            }

            state = match (state, ch) {
                (State::Literal, '<') => State::ParamStart,
                (State::Literal, '>') => return Err(PatternError::UnexpectedChar { ch, position }),
                (State::Literal, _) => {
                    push_literal(&mut regex, ch);
                    State::Literal
                }

                (State::ParamStart | State::NameStart, '<' | '>' | ':') => {
                    return Err(PatternError::UnexpectedChar { ch, position });
                }
                (State::ParamStart, _) => {
                    first.push(ch);
                    State::FirstField
                }

                (State::FirstField, ':') => State::NameStart,
                (State::FirstField, '>') => {
                    regex.push_str(STRING_FRAGMENT);
                    names.push(std::mem::take(&mut first));
                    State::Literal
                }
                (State::FirstField, '<') => return Err(PatternError::UnexpectedChar { ch, position }),
                (State::FirstField, _) => {
                    first.push(ch);
                    State::FirstField
                }

                (State::NameStart, _) => {
                    name.push(ch);
                    State::Name
                }

                (State::Name, '>') => {
                    push_tag(&mut regex, &std::mem::take(&mut first));
                    names.push(std::mem::take(&mut name));
                    State::Literal
                }
                (State::Name, '<' | ':') => return Err(PatternError::UnexpectedChar { ch, position }),
                (State::Name, _) => {
                    name.push(ch);
                    State::Name
                }
            };
        }

        if escape || state != State::Literal {
            return Err(PatternError::Unterminated);
        }

        regex.push('$');
        let compiled =
            Regex::new(&regex).map_err(|e| PatternError::Regex { regex: regex.clone(), reason: e.to_string() })?;

        Ok(Self { source: pattern.to_owned(), regex: compiled, names })
    }

    /// The pattern as it was written
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The generated regex
    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }

    /// Parameter names in placeholder order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Matches the whole `path`, returning `(name, value)` bindings in placeholder order.
    ///
    /// A match whose highest participating capture group differs from the
    /// number of names is treated as no match. That happens when a custom
    /// regex tag brings capture groups of its own.
    pub fn matches<'p>(&self, path: &'p str) -> Option<Vec<(&str, &'p str)>> {
        let captures = self.regex.captures(path)?;

        let highest = captures.iter().enumerate().skip(1).filter(|(_, group)| group.is_some()).map(|(i, _)| i).last();
        if highest.unwrap_or(0) != self.names.len() {
            return None;
        }

        let bindings = self
            .names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), captures.get(i + 1).map_or("", |group| group.as_str())))
            .collect();
        Some(bindings)
    }
}

fn push_literal(regex: &mut String, ch: char) {
    let mut buf = [0u8; 4];
    regex.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
}

fn push_tag(regex: &mut String, tag: &str) {
    match tag {
        "string" => regex.push_str(STRING_FRAGMENT),
        "int" => regex.push_str(INT_FRAGMENT),
        "float" => regex.push_str(FLOAT_FRAGMENT),
        custom => {
            regex.push('(');
            regex.push_str(custom);
            regex.push(')');
        }
    }
}
