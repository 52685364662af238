//! Canonical re-indentation for readable module output.

use super::lexer::{MinifyError, Token, TokenKind, check_delimiters, tokenize};

const INDENT: &str = "  ";

/// Re-indent generated code with two spaces per open brace or bracket.
///
/// Blank lines are dropped, runs of whitespace inside a line collapse to one space and
/// string literals are left untouched.
pub fn format_module(source: &str) -> Result<String, MinifyError> {
  let tokens = tokenize(source)?;
  check_delimiters(&tokens)?;

  let mut lines: Vec<String> = Vec::new();
  let mut depth = 0usize;

  for line in tokens.split(|token| token.contains_newline()) {
    let line = trim_spaces(line);
    if line.is_empty() {
      continue;
    }

    let leading_closers = line
      .iter()
      .take_while(|token| token.is_punct('}') || token.is_punct(']') || token.is_punct(')'))
      .filter(|token| !token.is_punct(')'))
      .count();

    let mut rendered = INDENT.repeat(depth.saturating_sub(leading_closers));
    for token in line {
      if token.kind == TokenKind::Space {
        rendered.push(' ');
      } else {
        rendered.push_str(token.text);
      }
    }
    lines.push(rendered);

    for token in line {
      if token.is_punct('{') || token.is_punct('[') {
        depth += 1;
      } else if token.is_punct('}') || token.is_punct(']') {
        depth = depth.saturating_sub(1);
      }
    }
  }

  Ok(lines.join("\n"))
}

fn trim_spaces<'t, 'a>(line: &'t [Token<'a>]) -> &'t [Token<'a>] {
  let start = line
    .iter()
    .position(|token| token.kind != TokenKind::Space)
    .unwrap_or(line.len());
  let end = line
    .iter()
    .rposition(|token| token.kind != TokenKind::Space)
    .map_or(start, |index| index + 1);
  &line[start..end]
}
