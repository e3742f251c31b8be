//! Static tail-call analysis, run once per procedure on its first call.
//!
//! The walk finds call sites in tail position whose operator resolves, in the
//! closure's own lexical scope, to the procedure itself, and produces a
//! decorated copy of the body in which those calls carry the `recur` syntax
//! head with the procedure itself spliced in as the first operand, so any
//! loop receiving the marker can re-enter the body. Shared IR is never
//! mutated, so the same body referenced from several bindings keeps its
//! original shape, and re-running the pass is a no-op.

use std::collections::HashMap;
use std::rc::Rc;

use crate::galena::cons;
use crate::galena::{Cons, Galena, GalenaFn, GalenaSyntax};

/// tail positions: the last expression of the body, then recursively the
/// branches of a tail `if` and the last form of a tail `begin`/`let`
pub fn rewrite_fn_body(f: &Rc<GalenaFn>) -> Rc<[Galena]> {
  match f.body.last() {
    None => f.body.to_owned(),
    Some(last) => {
      let rewritten = rewrite_tail_expr(last, f);
      let mut body: Vec<Galena> = f.body[..f.body.len() - 1].to_vec();
      body.push(rewritten);
      body.into()
    }
  }
}

enum Walk {
  Visit(Rc<Cons>),
  Rebuild(Rc<Cons>),
}

enum Position {
  SelfCall,
  /// a special form whose listed children are themselves in tail position
  Spine(Vec<Rc<Cons>>),
  Plain,
}

/// iterative post-order over the tail spine; an explicit work stack keeps
/// pathological nesting from exhausting the host stack
fn rewrite_tail_expr(expr: &Galena, f: &Rc<GalenaFn>) -> Galena {
  let root = match expr {
    Galena::Cons(cell) => cell.to_owned(),
    _ => return expr.to_owned(),
  };

  let mut tasks: Vec<Walk> = vec![Walk::Visit(root.to_owned())];
  let mut replaced: HashMap<*const Cons, Galena> = HashMap::new();

  while let Some(task) = tasks.pop() {
    match task {
      Walk::Visit(cell) => match classify(&cell, f) {
        Position::SelfCall => {
          replaced.insert(Rc::as_ptr(&cell), recur_call(&cell, f));
        }
        Position::Spine(children) => {
          tasks.push(Walk::Rebuild(cell.to_owned()));
          for child in children {
            tasks.push(Walk::Visit(child));
          }
        }
        Position::Plain => (),
      },
      Walk::Rebuild(cell) => {
        let mut changed = false;
        let items: Vec<Galena> = cons::iter(&Galena::Cons(cell.to_owned()))
          .map(|pair| match &pair.car {
            Galena::Cons(child) => match replaced.get(&Rc::as_ptr(child)) {
              Some(rewritten) => {
                changed = true;
                rewritten.to_owned()
              }
              None => pair.car.to_owned(),
            },
            _ => pair.car.to_owned(),
          })
          .collect();
        if changed {
          replaced.insert(Rc::as_ptr(&cell), Cons::list_from(&items));
        }
      }
    }
  }

  match replaced.remove(&Rc::as_ptr(&root)) {
    Some(rewritten) => rewritten,
    None => expr.to_owned(),
  }
}

fn classify(cell: &Rc<Cons>, f: &Rc<GalenaFn>) -> Position {
  let head = match &cell.car {
    Galena::Symbol(id) => *id,
    _ => return Position::Plain,
  };
  let name = head.read_name();

  if let Ok(syntax) = name.parse::<GalenaSyntax>() {
    let items = cons::cars(&Galena::Cons(cell.to_owned()));
    let tails: Vec<&Galena> = match syntax {
      GalenaSyntax::If => items.iter().skip(2).take(2).collect(),
      GalenaSyntax::Begin => items.iter().skip(1).last().into_iter().collect(),
      GalenaSyntax::Let => items.iter().skip(2).last().into_iter().collect(),
      // a nested lambda's calls belong to its own frame; quote is data
      _ => vec![],
    };
    let children: Vec<Rc<Cons>> = tails
      .into_iter()
      .filter_map(|x| match x {
        Galena::Cons(child) => Some(child.to_owned()),
        _ => None,
      })
      .collect();
    if children.is_empty() {
      return Position::Plain;
    }
    return Position::Spine(children);
  }

  // resolution happens in the defining scope, not the dynamic one
  match f.scope.lookup(head) {
    Some(Galena::Fn(target)) if Rc::ptr_eq(&target, f) => Position::SelfCall,
    _ => Position::Plain,
  }
}

/// keep the argument chain, swap the operator for `recur` carrying the
/// procedure as its target
fn recur_call(cell: &Rc<Cons>, f: &Rc<GalenaFn>) -> Galena {
  Cons::new(
    Galena::Syntax(GalenaSyntax::Recur),
    Cons::new(Galena::Fn(f.to_owned()), cell.cdr.to_owned()),
  )
}
