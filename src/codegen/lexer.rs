//! Minimal tokenizer for the JavaScript this crate generates.
//!
//! It understands exactly what the module wrapper and JSON data produce: identifiers,
//! punctuation, quoted strings, comments and whitespace. Regular expression literals are
//! not recognised.

use thiserror::Error;

/// Errors raised while compacting or re-indenting generated code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MinifyError {
  /// A string literal is not closed before the end of its line or of the input.
  #[error("unterminated string literal starting at byte {0}")]
  UnterminatedString(usize),
  /// A block comment is not closed.
  #[error("unterminated block comment starting at byte {0}")]
  UnterminatedComment(usize),
  /// A closing delimiter does not match the innermost open one.
  #[error("unexpected `{delimiter}` at byte {offset}")]
  UnbalancedDelimiter {
    /// Offending delimiter.
    delimiter: char,
    /// Byte offset of the delimiter.
    offset: usize,
  },
  /// Input ended while a delimiter was still open.
  #[error("unclosed `{delimiter}` opened at byte {offset}")]
  UnclosedDelimiter {
    /// Delimiter left open.
    delimiter: char,
    /// Byte offset of the delimiter.
    offset: usize,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
  Word,
  Punct,
  Str,
  Comment,
  Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
  pub kind: TokenKind,
  pub text: &'a str,
  pub offset: usize,
}

impl Token<'_> {
  pub fn is_punct(&self, value: char) -> bool {
    self.kind == TokenKind::Punct && self.text.starts_with(value)
  }

  pub fn contains_newline(&self) -> bool {
    self.kind == TokenKind::Space && self.text.contains('\n')
  }
}

pub(crate) fn is_word_char(c: char) -> bool {
  c.is_alphanumeric() || c == '_' || c == '$'
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token<'_>>, MinifyError> {
  let mut tokens = Vec::new();
  let mut chars = source.char_indices().peekable();

  while let Some((start, c)) = chars.next() {
    let kind = if c.is_whitespace() {
      while chars.next_if(|(_, next)| next.is_whitespace()).is_some() {}
      TokenKind::Space
    } else if is_word_char(c) {
      while chars.next_if(|(_, next)| is_word_char(*next)).is_some() {}
      TokenKind::Word
    } else if matches!(c, '"' | '\'' | '`') {
      let mut closed = false;
      while let Some((_, next)) = chars.next() {
        if next == '\\' {
          chars.next();
        } else if next == c {
          closed = true;
          break;
        } else if next == '\n' && c != '`' {
          break;
        }
      }
      if !closed {
        return Err(MinifyError::UnterminatedString(start));
      }
      TokenKind::Str
    } else if c == '/' && chars.peek().is_some_and(|(_, next)| *next == '/') {
      while chars.next_if(|(_, next)| *next != '\n').is_some() {}
      TokenKind::Comment
    } else if c == '/' && chars.peek().is_some_and(|(_, next)| *next == '*') {
      chars.next();
      let mut closed = false;
      while let Some((_, next)) = chars.next() {
        if next == '*' && chars.next_if(|(_, after)| *after == '/').is_some() {
          closed = true;
          break;
        }
      }
      if !closed {
        return Err(MinifyError::UnterminatedComment(start));
      }
      TokenKind::Comment
    } else {
      TokenKind::Punct
    };

    let end = chars.peek().map_or(source.len(), |(index, _)| *index);
    tokens.push(Token {
      kind,
      text: &source[start..end],
      offset: start,
    });
  }

  Ok(tokens)
}

/// Ensure every bracket, brace and parenthesis is closed by its partner.
pub(crate) fn check_delimiters(tokens: &[Token<'_>]) -> Result<(), MinifyError> {
  let mut open: Vec<(char, usize)> = Vec::new();

  for token in tokens.iter().filter(|token| token.kind == TokenKind::Punct) {
    let Some(c) = token.text.chars().next() else {
      continue;
    };
    match c {
      '(' | '[' | '{' => open.push((c, token.offset)),
      ')' | ']' | '}' => {
        let expected = match c {
          ')' => '(',
          ']' => '[',
          _ => '{',
        };
        match open.pop() {
          Some((opened, _)) if opened == expected => {}
          _ => {
            return Err(MinifyError::UnbalancedDelimiter {
              delimiter: c,
              offset: token.offset,
            });
          }
        }
      }
      _ => {}
    }
  }

  match open.pop() {
    Some((delimiter, offset)) => Err(MinifyError::UnclosedDelimiter { delimiter, offset }),
    None => Ok(()),
  }
}
