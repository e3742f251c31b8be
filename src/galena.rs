pub mod cons;
mod fns;
mod proc_name;
mod symbol;
mod syntax_name;

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

pub use cons::{Cons, ConsIter};
pub use fns::{Continuation, GalenaFn, GalenaHostFn};
pub use proc_name::GalenaProc;
pub use symbol::{SymbolId, intern};
pub use syntax_name::GalenaSyntax;

/// dynamic data flowing through the interpreter
#[derive(Debug, Clone)]
pub enum Galena {
  /// the empty list, also the false-ish default for missing values
  Nil,
  Bool(bool),
  Number(f64),
  Str(Arc<str>),
  /// interned, identity equality by id
  Symbol(SymbolId),
  Cons(Rc<Cons>),
  /// user-defined procedure closing over its defining scope
  Fn(Rc<GalenaFn>),
  /// builtin procedure
  Proc(GalenaProc),
  /// special form, receives unevaluated argument forms
  Syntax(GalenaSyntax),
  HostFn(Rc<GalenaHostFn>),
  Continuation(Rc<Continuation>),
  /// internal marker for tail calls: the target procedure first, then the
  /// already-evaluated arguments. consumed by the call loops, never a result
  Recur(Rc<[Galena]>),
}

impl Galena {
  /// only `nil` and `false` are false, everything else is true
  pub fn truthy(&self) -> bool {
    !matches!(self, Galena::Nil | Galena::Bool(false))
  }

  /// identity in the `eq?` sense: interned id for symbols, pointer for
  /// structures, plain value for the small immutable atoms
  pub fn identical(&self, other: &Galena) -> bool {
    match (self, other) {
      (Galena::Nil, Galena::Nil) => true,
      (Galena::Bool(a), Galena::Bool(b)) => a == b,
      (Galena::Number(a), Galena::Number(b)) => a == b,
      (Galena::Str(a), Galena::Str(b)) => a == b,
      (Galena::Symbol(a), Galena::Symbol(b)) => a == b,
      (Galena::Cons(a), Galena::Cons(b)) => Rc::ptr_eq(a, b),
      (Galena::Fn(a), Galena::Fn(b)) => Rc::ptr_eq(a, b),
      (Galena::Proc(a), Galena::Proc(b)) => a == b,
      (Galena::Syntax(a), Galena::Syntax(b)) => a == b,
      (Galena::HostFn(a), Galena::HostFn(b)) => Rc::ptr_eq(a, b),
      (Galena::Continuation(a), Galena::Continuation(b)) => Rc::ptr_eq(a, b),
      (_, _) => false,
    }
  }

  /// string content for output, other values use their display form
  pub fn turn_string(&self) -> String {
    match self {
      Galena::Str(s) => s.to_string(),
      a => format!("{a}"),
    }
  }
}

impl fmt::Display for Galena {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Galena::Nil => f.write_str("nil"),
      Galena::Bool(v) => write!(f, "{v}"),
      Galena::Number(n) => write!(f, "{n}"),
      Galena::Str(s) => write!(f, "\"{s}\""),
      Galena::Symbol(id) => write!(f, "{id}"),
      Galena::Cons(xs) => {
        f.write_str("(")?;
        let mut cell = xs.to_owned();
        loop {
          write!(f, "{}", cell.car)?;
          let cdr = cell.cdr.to_owned();
          match cdr {
            Galena::Cons(next) => {
              f.write_str(" ")?;
              cell = next;
            }
            Galena::Nil => break,
            tail => {
              write!(f, " . {tail}")?;
              break;
            }
          }
        }
        f.write_str(")")
      }
      Galena::Fn(info) => {
        write!(f, "(&fn {} (", info.display_name())?;
        for (idx, p) in info.params.iter().enumerate() {
          if idx > 0 {
            f.write_str(" ")?;
          }
          write!(f, "{p}")?;
        }
        f.write_str("))")
      }
      Galena::Proc(p) => write!(f, "{p}"),
      Galena::Syntax(s) => write!(f, "{s}"),
      Galena::HostFn(info) => write!(f, "(&host-fn {})", info.name),
      Galena::Continuation(c) => write!(f, "(&continuation {})", c.next),
      Galena::Recur(xs) => {
        f.write_str("(&recur")?;
        for x in xs.iter() {
          write!(f, " {x}")?;
        }
        f.write_str(")")
      }
    }
  }
}

/// structural equality for data, pointer equality for callables
impl PartialEq for Galena {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Galena::Cons(a), Galena::Cons(b)) => {
        // iterate the spine, list length must not become recursion depth
        let mut a = a.to_owned();
        let mut b = b.to_owned();
        loop {
          if a.car != b.car {
            return false;
          }
          let (next_a, next_b) = match (&a.cdr, &b.cdr) {
            (Galena::Cons(x), Galena::Cons(y)) => (x.to_owned(), y.to_owned()),
            (x, y) => return x == y,
          };
          a = next_a;
          b = next_b;
        }
      }
      (Galena::Recur(a), Galena::Recur(b)) => a == b,
      (_, _) => self.identical(other),
    }
  }
}

/// kinds of failures, all abort the current top-level evaluation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalenaErrKind {
  Syntax,
  UnboundName,
  Assignment,
  TypeMismatch,
  Arity,
}

impl fmt::Display for GalenaErrKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GalenaErrKind::Syntax => f.write_str("syntax error"),
      GalenaErrKind::UnboundName => f.write_str("unbound name"),
      GalenaErrKind::Assignment => f.write_str("invalid assignment"),
      GalenaErrKind::TypeMismatch => f.write_str("type mismatch"),
      GalenaErrKind::Arity => f.write_str("arity mismatch"),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalenaErr {
  pub kind: GalenaErrKind,
  pub msg: String,
  /// line and column of the offending source, from tokenizing/parsing
  pub location: Option<(usize, usize)>,
}

impl fmt::Display for GalenaErr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.kind, self.msg)?;
    if let Some((line, col)) = self.location {
      write!(f, ", line {line} col {col}")?;
    }
    Ok(())
  }
}

impl GalenaErr {
  pub fn new<T: Into<String>>(kind: GalenaErrKind, msg: T) -> Self {
    GalenaErr {
      kind,
      msg: msg.into(),
      location: None,
    }
  }

  pub fn syntax<T: Into<String>>(msg: T, line: usize, col: usize) -> Self {
    GalenaErr {
      kind: GalenaErrKind::Syntax,
      msg: msg.into(),
      location: Some((line, col)),
    }
  }

  pub fn unbound(name: &str) -> Self {
    Self::new(GalenaErrKind::UnboundName, format!("unknown symbol `{name}`"))
  }

  pub fn assignment(name: &str) -> Self {
    Self::new(GalenaErrKind::Assignment, format!("`{name}` not defined in any frame"))
  }

  pub fn err_type<T: Into<String>>(msg: T) -> Result<Galena, Self> {
    Err(Self::new(GalenaErrKind::TypeMismatch, msg))
  }

  pub fn err_arity<T: Into<String>>(msg: T) -> Result<Galena, Self> {
    Err(Self::new(GalenaErrKind::Arity, msg))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn displays_lists_and_atoms() {
    let xs = Cons::list_from(&[
      Galena::Symbol(intern("a")),
      Galena::Number(1.0),
      Galena::Number(2.0),
      Galena::Number(3.0),
    ]);
    assert_eq!(xs.to_string(), "(a 1 2 3)");
    assert_eq!(Galena::Str(Arc::from("hi")).to_string(), "\"hi\"");
    assert_eq!(Galena::Nil.to_string(), "nil");
  }

  #[test]
  fn displays_dotted_pairs() {
    let pair = Cons::new(Galena::Number(1.0), Galena::Number(2.0));
    assert_eq!(pair.to_string(), "(1 . 2)");
  }

  #[test]
  fn truthiness_is_nil_and_false_only() {
    assert!(!Galena::Nil.truthy());
    assert!(!Galena::Bool(false).truthy());
    assert!(Galena::Bool(true).truthy());
    assert!(Galena::Number(0.0).truthy());
    assert!(Galena::Str(Arc::from("")).truthy());
  }

  #[test]
  fn structural_equality_follows_cells() {
    let a = Cons::list_from(&[Galena::Number(1.0), Galena::Number(2.0)]);
    let b = Cons::list_from(&[Galena::Number(1.0), Galena::Number(2.0)]);
    assert_eq!(a, b);
    assert!(!a.identical(&b));
  }

  #[test]
  fn equality_walks_long_lists_iteratively() {
    let mut a = Galena::Nil;
    let mut b = Galena::Nil;
    for idx in 0..200_000 {
      a = Cons::new(Galena::Number(idx as f64), a);
      b = Cons::new(Galena::Number(idx as f64), b);
    }
    assert_eq!(a, b);
  }

  #[test]
  fn error_display_carries_location() {
    let e = GalenaErr::syntax("unterminated string literal", 2, 7);
    assert_eq!(e.to_string(), "syntax error: unterminated string literal, line 2 col 7");
  }
}
