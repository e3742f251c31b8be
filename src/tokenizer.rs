use std::str::Chars;
use std::sync::Arc;

use crate::galena::GalenaErr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TokenKind {
  LParen,
  RParen,
  Quote,
  Str,
  Symbol,
  /// emitted for completeness, the parser drops these
  Comment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
  pub kind: TokenKind,
  pub text: Arc<str>,
  pub line: usize,
  pub col: usize,
}

impl Token {
  fn new(kind: TokenKind, text: &str, line: usize, col: usize) -> Self {
    Token {
      kind,
      text: Arc::from(text),
      line,
      col,
    }
  }
}

enum State {
  Idle,
  /// accumulating buffer plus the position of its first character
  Symbol(String, usize, usize),
  StringLit(String, usize, usize),
  Comment(String, usize, usize),
}

/// lazy, non-restartable token stream over a character sequence;
/// line/column advance per character, column resets on newline
pub struct Tokenizer<'a> {
  chars: Chars<'a>,
  state: State,
  /// a single char may flush a pending symbol and emit an operator token
  queued: Option<Token>,
  finished: bool,
  line: usize,
  col: usize,
}

impl<'a> Tokenizer<'a> {
  pub fn new(source: &'a str) -> Self {
    Tokenizer {
      chars: source.chars(),
      state: State::Idle,
      queued: None,
      finished: false,
      line: 1,
      col: 0,
    }
  }

  fn flush_symbol(&mut self) -> Option<Token> {
    match std::mem::replace(&mut self.state, State::Idle) {
      State::Symbol(buf, line, col) => Some(Token::new(TokenKind::Symbol, &buf, line, col)),
      other => {
        self.state = other;
        None
      }
    }
  }

  fn operator_token(&self, c: char) -> Token {
    let kind = match c {
      '(' => TokenKind::LParen,
      ')' => TokenKind::RParen,
      _ => TokenKind::Quote,
    };
    Token::new(kind, &c.to_string(), self.line, self.col)
  }
}

impl Iterator for Tokenizer<'_> {
  type Item = Result<Token, GalenaErr>;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(t) = self.queued.take() {
      return Some(Ok(t));
    }
    if self.finished {
      return None;
    }

    while let Some(c) = self.chars.next() {
      self.col += 1;

      match std::mem::replace(&mut self.state, State::Idle) {
        State::Comment(mut buf, line, col) => {
          if c == '\n' {
            self.line += 1;
            self.col = 0;
            return Some(Ok(Token::new(TokenKind::Comment, &buf, line, col)));
          }
          buf.push(c);
          self.state = State::Comment(buf, line, col);
        }
        State::StringLit(mut buf, line, col) => {
          if c == '"' {
            if buf.ends_with('\\') {
              // escaped quote is literal content, not a terminator
              buf.pop();
              buf.push('"');
              self.state = State::StringLit(buf, line, col);
            } else {
              return Some(Ok(Token::new(TokenKind::Str, &buf, line, col)));
            }
          } else {
            if c == '\n' {
              self.line += 1;
              self.col = 0;
            }
            buf.push(c);
            self.state = State::StringLit(buf, line, col);
          }
        }
        pending => {
          self.state = pending;
          match c {
            '(' | ')' | '\'' => {
              let op = self.operator_token(c);
              match self.flush_symbol() {
                Some(sym) => {
                  self.queued = Some(op);
                  return Some(Ok(sym));
                }
                None => return Some(Ok(op)),
              }
            }
            ';' => {
              let flushed = self.flush_symbol();
              self.state = State::Comment(String::new(), self.line, self.col);
              if let Some(sym) = flushed {
                return Some(Ok(sym));
              }
            }
            '"' => {
              let flushed = self.flush_symbol();
              self.state = State::StringLit(String::new(), self.line, self.col);
              if let Some(sym) = flushed {
                return Some(Ok(sym));
              }
            }
            '\n' => {
              let flushed = self.flush_symbol();
              self.line += 1;
              self.col = 0;
              if let Some(sym) = flushed {
                return Some(Ok(sym));
              }
            }
            _ if c.is_whitespace() => {
              if let Some(sym) = self.flush_symbol() {
                return Some(Ok(sym));
              }
            }
            _ => match &mut self.state {
              State::Symbol(buf, ..) => buf.push(c),
              _ => self.state = State::Symbol(c.to_string(), self.line, self.col),
            },
          }
        }
      }
    }

    // end of input: pending symbol or comment flushes, an open string is fatal
    self.finished = true;
    match std::mem::replace(&mut self.state, State::Idle) {
      State::Symbol(buf, line, col) => Some(Ok(Token::new(TokenKind::Symbol, &buf, line, col))),
      State::Comment(buf, line, col) => Some(Ok(Token::new(TokenKind::Comment, &buf, line, col))),
      State::StringLit(_, line, col) => Some(Err(GalenaErr::syntax("unterminated string literal", line, col))),
      State::Idle => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(source: &str) -> Vec<TokenKind> {
    Tokenizer::new(source).map(|t| t.expect("token").kind).collect()
  }

  #[test]
  fn splits_parens_symbols_and_strings() {
    let tokens: Vec<Token> = Tokenizer::new("(add 12 \"hey\")").map(|t| t.expect("token")).collect();
    let texts: Vec<&str> = tokens.iter().map(|t| &*t.text).collect();
    assert_eq!(texts, vec!["(", "add", "12", "hey", ")"]);
    assert_eq!(
      tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
      vec![
        TokenKind::LParen,
        TokenKind::Symbol,
        TokenKind::Symbol,
        TokenKind::Str,
        TokenKind::RParen
      ]
    );
  }

  #[test]
  fn tracks_line_and_column() {
    let tokens: Vec<Token> = Tokenizer::new("a\n  bc").map(|t| t.expect("token")).collect();
    assert_eq!((tokens[0].line, tokens[0].col), (1, 1));
    assert_eq!((tokens[1].line, tokens[1].col), (2, 3));
  }

  #[test]
  fn comments_run_to_end_of_line() {
    assert_eq!(
      kinds("a ; rest of line\nb"),
      vec![TokenKind::Symbol, TokenKind::Comment, TokenKind::Symbol]
    );
  }

  #[test]
  fn quote_flushes_pending_symbol() {
    assert_eq!(kinds("a'b"), vec![TokenKind::Symbol, TokenKind::Quote, TokenKind::Symbol]);
  }

  #[test]
  fn escaped_quote_stays_inside_string() {
    let tokens: Vec<Token> = Tokenizer::new("\"say \\\"hi\\\"\"").map(|t| t.expect("token")).collect();
    assert_eq!(tokens.len(), 1);
    assert_eq!(&*tokens[0].text, "say \"hi\"");
  }

  #[test]
  fn unterminated_string_is_fatal() {
    let result: Result<Vec<Token>, GalenaErr> = Tokenizer::new("(a \"abc").collect();
    let err = result.expect_err("should fail");
    assert_eq!(err.to_string(), "syntax error: unterminated string literal, line 1 col 4");
  }

  #[test]
  fn unterminated_symbol_and_comment_flush() {
    assert_eq!(kinds("abc"), vec![TokenKind::Symbol]);
    assert_eq!(kinds("; tail"), vec![TokenKind::Comment]);
  }
}
