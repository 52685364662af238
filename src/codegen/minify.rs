//! Token-level compaction for generated modules.

use super::lexer::{MinifyError, TokenKind, check_delimiters, is_word_char, tokenize};

/// Drop comments and insignificant whitespace from generated code.
///
/// String literals are copied byte for byte. A single space survives only where removing
/// it would merge two tokens. Statements must be terminated explicitly, since line
/// breaks are not treated as separators. Running the pass on its own output returns the
/// same text.
pub fn minify_module(source: &str) -> Result<String, MinifyError> {
  let tokens = tokenize(source)?;
  check_delimiters(&tokens)?;

  let mut output = String::with_capacity(source.len());
  let mut separated = false;

  for token in tokens {
    match token.kind {
      TokenKind::Space | TokenKind::Comment => separated = true,
      TokenKind::Word | TokenKind::Punct | TokenKind::Str => {
        if separated && needs_separator(output.chars().last(), token.text.chars().next()) {
          output.push(' ');
        }
        output.push_str(token.text);
        separated = false;
      }
    }
  }

  Ok(output)
}

fn needs_separator(previous: Option<char>, next: Option<char>) -> bool {
  let (Some(previous), Some(next)) = (previous, next) else {
    return false;
  };

  (is_word_char(previous) && is_word_char(next))
    || (previous == next && matches!(previous, '+' | '-'))
    || (previous.is_ascii_digit() && next == '.')
}
