use std::fmt;

use crate::galena::{Cons, Galena, GalenaErr, intern};
use crate::tokenizer::{Token, TokenKind, Tokenizer};

/// a top-level ordered sequence of forms; evaluating one runs each form
/// in order and yields the value of the last
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Package {
  pub body: Vec<Galena>,
}

impl fmt::Display for Package {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (idx, expr) in self.body.iter().enumerate() {
      if idx > 0 {
        f.write_str("\n")?;
      }
      write!(f, "{expr}")?;
    }
    Ok(())
  }
}

/// one unmatched `(`, or the implicit one-element list a `'` opens
struct ListBuilder {
  items: Vec<Galena>,
  quoted: bool,
  line: usize,
  col: usize,
}

impl ListBuilder {
  fn open(token: &Token) -> Self {
    ListBuilder {
      items: vec![],
      quoted: false,
      line: token.line,
      col: token.col,
    }
  }

  fn open_quote(token: &Token) -> Self {
    ListBuilder {
      items: vec![Galena::Symbol(intern("quote"))],
      quoted: true,
      line: token.line,
      col: token.col,
    }
  }
}

pub fn parse(source: &str) -> Result<Package, GalenaErr> {
  let mut stack: Vec<ListBuilder> = vec![];
  let mut body: Vec<Galena> = vec![];

  for token in Tokenizer::new(source) {
    let token = token?;
    match token.kind {
      TokenKind::Comment => (),
      TokenKind::LParen => stack.push(ListBuilder::open(&token)),
      TokenKind::Quote => stack.push(ListBuilder::open_quote(&token)),
      TokenKind::RParen => match stack.pop() {
        Some(builder) if !builder.quoted => {
          let list = Cons::list_from(&builder.items);
          append(&mut stack, &mut body, list);
        }
        _ => return Err(GalenaErr::syntax("unexpected `)`", token.line, token.col)),
      },
      TokenKind::Str => append(&mut stack, &mut body, Galena::Str(token.text.to_owned())),
      TokenKind::Symbol => append(&mut stack, &mut body, classify_atom(&token.text)),
    }
  }

  if let Some(open) = stack.last() {
    return Err(GalenaErr::syntax("unexpected end of input", open.line, open.col));
  }
  Ok(Package { body })
}

/// append a finished element one level up; a quote builder is one-shot,
/// it pops and splices as soon as its single quoted form arrives
fn append(stack: &mut Vec<ListBuilder>, body: &mut Vec<Galena>, value: Galena) {
  let mut value = value;
  loop {
    match stack.last_mut() {
      Some(builder) => {
        builder.items.push(value);
        if builder.quoted && builder.items.len() == 2 {
          let builder = stack.pop().expect("quote builder");
          value = Cons::list_from(&builder.items);
          continue;
        }
        return;
      }
      None => {
        body.push(value);
        return;
      }
    }
  }
}

/// nil/bool first, then integer, then float; anything else is a symbol
fn classify_atom(text: &str) -> Galena {
  match text {
    "nil" => Galena::Nil,
    "true" => Galena::Bool(true),
    "false" => Galena::Bool(false),
    _ => {
      if let Ok(n) = text.parse::<i64>() {
        Galena::Number(n as f64)
      } else if let Ok(f) = text.parse::<f64>() {
        Galena::Number(f)
      } else {
        Galena::Symbol(intern(text))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::galena::GalenaErrKind;

  #[test]
  fn round_trips_a_flat_list() {
    let package = parse("(a 1 2 3)").expect("parse");
    assert_eq!(package.to_string(), "(a 1 2 3)");
  }

  #[test]
  fn quote_is_sugar_for_quote_form() {
    let sugared = parse("'(a b)").expect("parse");
    let spelled = parse("(quote (a b))").expect("parse");
    assert_eq!(sugared, spelled);
  }

  #[test]
  fn nested_quotes_splice_one_level_up() {
    let sugared = parse("''x").expect("parse");
    let spelled = parse("(quote (quote x))").expect("parse");
    assert_eq!(sugared, spelled);
  }

  #[test]
  fn classifies_atoms() {
    let package = parse("nil true 1 2.5 1e66 two-words").expect("parse");
    assert_eq!(package.body[0], Galena::Nil);
    assert_eq!(package.body[1], Galena::Bool(true));
    assert_eq!(package.body[2], Galena::Number(1.0));
    assert_eq!(package.body[3], Galena::Number(2.5));
    assert_eq!(package.body[4], Galena::Number(1e66));
    assert_eq!(package.body[5], Galena::Symbol(intern("two-words")));
  }

  #[test]
  fn comments_are_consumed_but_dropped() {
    let package = parse("(a 1) ; trailing note").expect("parse");
    assert_eq!(package.body.len(), 1);
  }

  #[test]
  fn stray_paren_is_a_syntax_error() {
    let err = parse("(a))").expect_err("should fail");
    assert_eq!(err.kind, GalenaErrKind::Syntax);
    assert_eq!(err.location, Some((1, 4)));
  }

  #[test]
  fn open_list_at_eof_is_a_syntax_error() {
    let err = parse("(a (b 1)").expect_err("should fail");
    assert_eq!(err.kind, GalenaErrKind::Syntax);
    assert!(err.msg.contains("end of input"));
  }

  #[test]
  fn quote_without_operand_is_a_syntax_error() {
    let err = parse("(a ')").expect_err("should fail");
    assert_eq!(err.kind, GalenaErrKind::Syntax);
  }

  #[test]
  fn parses_nested_structure() {
    let package = parse("(define (add a b) (+ a b))").expect("parse");
    assert_eq!(package.to_string(), "(define (add a b) (+ a b))");
  }
}
