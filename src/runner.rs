pub mod tail_calls;

use std::rc::Rc;
use std::sync::Arc;

use crate::builtins;
use crate::galena::cons;
use crate::galena::{Cons, Continuation, Galena, GalenaErr, GalenaErrKind, GalenaFn, GalenaProc, GalenaSyntax, SymbolId};
use crate::parser::{Package, parse};
use crate::scope::{HostBindings, Scope};

/// non-value outcomes of evaluation: a failure, or a continuation invocation
/// unwinding to the trampoline. `?` propagation is what discards the
/// invoker's in-flight state on a jump.
enum Signal {
  Fail(GalenaErr),
  Jump(Rc<Continuation>, Galena),
}

impl From<GalenaErr> for Signal {
  fn from(e: GalenaErr) -> Self {
    Signal::Fail(e)
  }
}

type EvalResult = Result<Galena, Signal>;

/// the evaluator: owns the root scope and tracks the statement-level
/// continuation of whatever sequence is currently being run
pub struct Interpreter {
  root: Rc<Scope>,
  current: Option<Continuation>,
}

impl Default for Interpreter {
  fn default() -> Self {
    Self::new()
  }
}

impl Interpreter {
  pub fn new() -> Self {
    Self::with_host(None)
  }

  pub fn with_host(host: Option<Rc<dyn HostBindings>>) -> Self {
    Interpreter {
      root: Scope::new_root(host),
      current: None,
    }
  }

  /// the global frame, for embedders seeding extra bindings
  pub fn root_scope(&self) -> &Rc<Scope> {
    &self.root
  }

  pub fn eval_string(&mut self, source: &str) -> Result<Galena, GalenaErr> {
    let package = parse(source)?;
    self.run(&package)
  }

  /// the trampoline: the only loop that ever resumes "the rest of the
  /// program". every continuation invocation lands back here, so resumption
  /// depth never grows the host stack.
  pub fn run(&mut self, package: &Package) -> Result<Galena, GalenaErr> {
    let exprs: Rc<[Galena]> = package.body.to_owned().into();
    let mut cont = Continuation {
      scope: self.root.to_owned(),
      exprs,
      next: 0,
    };
    let mut value = Galena::Nil;
    loop {
      match self.resume(&cont, value) {
        Ok(v) => return Ok(v),
        Err(Signal::Jump(captured, thrown)) => {
          cont = (*captured).to_owned();
          value = thrown;
        }
        Err(Signal::Fail(e)) => return Err(e),
      }
    }
  }

  /// run the remaining statements of a continuation; `value` stands in for
  /// the result already produced at the resume point
  fn resume(&mut self, cont: &Continuation, mut value: Galena) -> EvalResult {
    let mut idx = cont.next;
    while idx < cont.exprs.len() {
      self.current = Some(Continuation {
        scope: cont.scope.to_owned(),
        exprs: cont.exprs.to_owned(),
        next: idx + 1,
      });
      value = self.evaluate_expr(&cont.exprs[idx], &cont.scope)?;
      // a resumed procedure body can land on a tail marker with no call
      // frame left around it; re-enter the procedure, never hand it back
      while let Galena::Recur(parts) = value {
        let (target, new_args) = split_recur(&parts).map_err(Signal::Fail)?;
        value = self.run_fn(&target, new_args)?;
      }
      idx += 1;
    }
    Ok(value)
  }

  fn evaluate_expr(&mut self, expr: &Galena, scope: &Rc<Scope>) -> EvalResult {
    match expr {
      Galena::Symbol(id) => self.evaluate_symbol(*id, scope),
      Galena::Cons(cell) => self.evaluate_list(cell, scope),
      // literals and host values evaluate to themselves
      _ => Ok(expr.to_owned()),
    }
  }

  /// syntax names resolve first, then the frame chain, then builtin procs,
  /// then the host bindings fallback
  fn evaluate_symbol(&self, id: SymbolId, scope: &Rc<Scope>) -> EvalResult {
    let name = id.read_name();
    if let Ok(syntax) = name.parse::<GalenaSyntax>() {
      return Ok(Galena::Syntax(syntax));
    }
    if let Some(v) = scope.lookup(id) {
      return Ok(v);
    }
    if let Ok(proc) = name.parse::<GalenaProc>() {
      return Ok(Galena::Proc(proc));
    }
    match scope.host_lookup(&name) {
      Some(v) => Ok(v),
      None => Err(Signal::Fail(GalenaErr::unbound(&name))),
    }
  }

  fn evaluate_list(&mut self, cell: &Rc<Cons>, scope: &Rc<Scope>) -> EvalResult {
    let operator = self.evaluate_expr(&cell.car, scope)?;
    match operator {
      Galena::Syntax(syntax) => self.handle_syntax(syntax, &cell.cdr, scope),
      _ => {
        let args = self.evaluate_args(&cell.cdr, scope)?;
        self.apply(&operator, args)
      }
    }
  }

  fn evaluate_args(&mut self, forms: &Galena, scope: &Rc<Scope>) -> Result<Vec<Galena>, Signal> {
    let mut values = Vec::new();
    for pair in cons::iter(forms) {
      values.push(self.evaluate_expr(&pair.car, scope)?);
    }
    Ok(values)
  }

  /// call protocol for everything that takes evaluated arguments
  fn apply(&mut self, callee: &Galena, args: Vec<Galena>) -> EvalResult {
    match callee {
      Galena::Fn(f) => self.run_fn(f, args),
      Galena::Proc(p) => builtins::handle_proc(*p, &args).map_err(Signal::Fail),
      Galena::HostFn(f) => (f.handler)(&args).map_err(Signal::Fail),
      Galena::Continuation(captured) => {
        // control transfer, not a function return
        let thrown = args.first().cloned().unwrap_or(Galena::Nil);
        Err(Signal::Jump(captured.to_owned(), thrown))
      }
      a => Err(Signal::Fail(GalenaErr::new(
        GalenaErrKind::TypeMismatch,
        format!("cannot be used as operator: {a}"),
      ))),
    }
  }

  /// the procedure call loop: fresh frame parented to the defining scope,
  /// body re-run whenever evaluation lands on a `recur` marker. a marker
  /// naming this same procedure rebinds in place, any other target swaps
  /// the whole call, so chained tail calls never grow the host stack
  fn run_fn(&mut self, callee: &Rc<GalenaFn>, args: Vec<Galena>) -> EvalResult {
    let mut f = callee.to_owned();
    let mut args = args;
    'call: loop {
      if args.len() != f.params.len() {
        return Err(Signal::Fail(arity_mismatch(&f, args.len())));
      }
      let scope = Scope::extend(&f.scope);
      for (param, value) in f.params.iter().zip(std::mem::take(&mut args)) {
        scope.define(*param, value);
      }
      let body = self.optimized_body(&f);
      let mut value = self.eval_seq(&body, &scope)?;
      loop {
        let parts = match value {
          Galena::Recur(parts) => parts,
          v => return Ok(v),
        };
        let (target, new_args) = split_recur(&parts).map_err(Signal::Fail)?;
        if !Rc::ptr_eq(&target, &f) {
          f = target;
          args = new_args;
          continue 'call;
        }
        if new_args.len() != f.params.len() {
          return Err(Signal::Fail(arity_mismatch(&f, new_args.len())));
        }
        // rebind in the same frame, no new environment for a tail loop
        for (param, new_value) in f.params.iter().zip(new_args) {
          scope.define(*param, new_value);
        }
        value = self.eval_seq(&body, &scope)?;
      }
    }
  }

  /// analysis runs once, lazily; the decorated copy is cached on the fn
  fn optimized_body(&self, f: &Rc<GalenaFn>) -> Rc<[Galena]> {
    {
      let cached = f.optimized.borrow();
      if let Some(body) = &*cached {
        return body.to_owned();
      }
    }
    let rewritten = tail_calls::rewrite_fn_body(f);
    *f.optimized.borrow_mut() = Some(rewritten.to_owned());
    rewritten
  }

  /// evaluate a statement sequence, keeping `self.current` pointed at what
  /// remains so `call/cc` can snapshot it; the caller's continuation is
  /// restored afterwards
  fn eval_seq(&mut self, exprs: &Rc<[Galena]>, scope: &Rc<Scope>) -> EvalResult {
    let saved = self.current.take();
    let mut value = Galena::Nil;
    let mut outcome = Ok(());
    for idx in 0..exprs.len() {
      self.current = Some(Continuation {
        scope: scope.to_owned(),
        exprs: exprs.to_owned(),
        next: idx + 1,
      });
      match self.evaluate_expr(&exprs[idx], scope) {
        Ok(v) => value = v,
        Err(e) => {
          outcome = Err(e);
          break;
        }
      }
    }
    self.current = saved;
    outcome.map(|()| value)
  }

  fn handle_syntax(&mut self, syntax: GalenaSyntax, forms: &Galena, scope: &Rc<Scope>) -> EvalResult {
    let args = cons::cars(forms);
    match syntax {
      GalenaSyntax::Quote => match args.as_slice() {
        [form] => Ok(form.to_owned()),
        _ => Err(arity_err("quote expected 1 form")),
      },
      GalenaSyntax::If => match args.as_slice() {
        [pred, then] => self.branch(pred, then, &Galena::Nil, scope),
        [pred, then, otherwise] => self.branch(pred, then, otherwise, scope),
        _ => Err(arity_err("if expected 2 or 3 forms")),
      },
      GalenaSyntax::Define => self.define(&args, scope),
      GalenaSyntax::SetBang => match args.as_slice() {
        [Galena::Symbol(sym), form] => {
          let value = self.evaluate_expr(form, scope)?;
          if scope.assign(*sym, value) {
            Ok(Galena::Nil)
          } else {
            Err(Signal::Fail(GalenaErr::assignment(&sym.read_name())))
          }
        }
        [target, _] => Err(type_err(format!("set! expected a symbol, got: {target}"))),
        _ => Err(arity_err("set! expected a symbol and a value")),
      },
      GalenaSyntax::Lambda => match args.as_slice() {
        [params, body @ ..] if !body.is_empty() => {
          let f = make_fn(None, params, body, scope)?;
          Ok(Galena::Fn(f))
        }
        _ => Err(arity_err("lambda expected a parameter list and a body")),
      },
      GalenaSyntax::Let => match args.as_slice() {
        [bindings, body @ ..] => {
          let child = Scope::extend(scope);
          for binding in cons::iter(bindings) {
            match cons::cars(&binding.car).as_slice() {
              [Galena::Symbol(sym), form] => {
                // non-recursive let: values are evaluated in the outer frame
                let value = self.evaluate_expr(form, scope)?;
                child.define(*sym, value);
              }
              _ => return Err(type_err(format!("let binding expected (symbol value), got: {}", binding.car))),
            }
          }
          let body: Rc<[Galena]> = body.to_vec().into();
          self.eval_seq(&body, &child)
        }
        _ => Err(arity_err("let expected a binding list")),
      },
      GalenaSyntax::Begin => {
        let body: Rc<[Galena]> = args.into();
        self.eval_seq(&body, scope)
      }
      GalenaSyntax::CallCc => match args.as_slice() {
        [form] => {
          let receiver = self.evaluate_expr(form, scope)?;
          let captured = match &self.current {
            Some(cont) => Rc::new(cont.to_owned()),
            None => return Err(type_err("call/cc used outside of a running program")),
          };
          self.apply(&receiver, vec![Galena::Continuation(captured)])
        }
        _ => Err(arity_err("call/cc expected 1 procedure")),
      },
      GalenaSyntax::Eval => match args.as_slice() {
        [form] => {
          let data = self.evaluate_expr(form, scope)?;
          self.evaluate_expr(&data, scope)
        }
        _ => Err(arity_err("eval expected 1 form")),
      },
      GalenaSyntax::Recur => {
        let values = self.evaluate_args(forms, scope)?;
        match values.first() {
          Some(Galena::Fn(_)) => Ok(Galena::Recur(values.into())),
          Some(a) => Err(type_err(format!("recur expected a procedure, got: {a}"))),
          None => Err(arity_err("recur expected a procedure and its arguments")),
        }
      }
    }
  }

  fn branch(&mut self, pred: &Galena, then: &Galena, otherwise: &Galena, scope: &Rc<Scope>) -> EvalResult {
    if self.evaluate_expr(pred, scope)?.truthy() {
      self.evaluate_expr(then, scope)
    } else {
      self.evaluate_expr(otherwise, scope)
    }
  }

  /// `(define sym value)` and the `(define (name params...) body...)` sugar
  fn define(&mut self, args: &[Galena], scope: &Rc<Scope>) -> EvalResult {
    match args {
      [Galena::Symbol(sym), form] => {
        let value = self.evaluate_expr(form, scope)?;
        scope.define(*sym, value);
        Ok(Galena::Nil)
      }
      [Galena::Cons(head), body @ ..] if !body.is_empty() => match &head.car {
        Galena::Symbol(sym) => {
          let name: Arc<str> = sym.read_name();
          let f = make_fn(Some(name), &head.cdr, body, scope)?;
          scope.define(*sym, Galena::Fn(f));
          Ok(Galena::Nil)
        }
        a => Err(type_err(format!("define expected a symbol to name, got: {a}"))),
      },
      [a, ..] => Err(type_err(format!("define expected a symbol or (name params), got: {a}"))),
      [] => Err(arity_err("define expected a target and a value")),
    }
  }
}

fn make_fn(name: Option<Arc<str>>, params: &Galena, body: &[Galena], scope: &Rc<Scope>) -> Result<Rc<GalenaFn>, Signal> {
  match params {
    Galena::Nil | Galena::Cons(_) => (),
    a => return Err(type_err(format!("parameter list expected, got: {a}"))),
  }
  let mut names: Vec<SymbolId> = Vec::new();
  for pair in cons::iter(params) {
    match &pair.car {
      Galena::Symbol(sym) => names.push(*sym),
      a => return Err(type_err(format!("parameter expected a symbol, got: {a}"))),
    }
  }
  Ok(Rc::new(GalenaFn::new(name, names, body.to_vec().into(), scope.to_owned())))
}

/// a `recur` marker holds the target procedure first, then its arguments
fn split_recur(parts: &Rc<[Galena]>) -> Result<(Rc<GalenaFn>, Vec<Galena>), GalenaErr> {
  match parts.split_first() {
    Some((Galena::Fn(f), rest)) => Ok((f.to_owned(), rest.to_vec())),
    Some((a, _)) => Err(GalenaErr::new(
      GalenaErrKind::TypeMismatch,
      format!("recur expected a procedure, got: {a}"),
    )),
    None => Err(GalenaErr::new(
      GalenaErrKind::Arity,
      "recur expected a procedure and its arguments",
    )),
  }
}

fn arity_mismatch(f: &GalenaFn, got: usize) -> GalenaErr {
  GalenaErr::new(
    GalenaErrKind::Arity,
    format!("{} expected {} arguments, got {}", f.display_name(), f.params.len(), got),
  )
}

fn type_err<T: Into<String>>(msg: T) -> Signal {
  Signal::Fail(GalenaErr::new(GalenaErrKind::TypeMismatch, msg))
}

fn arity_err(msg: &str) -> Signal {
  Signal::Fail(GalenaErr::new(GalenaErrKind::Arity, msg))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn eval(source: &str) -> Result<Galena, GalenaErr> {
    Interpreter::new().eval_string(source)
  }

  #[test]
  fn evaluates_arithmetic() {
    assert_eq!(eval("(+ 1 2 3)"), Ok(Galena::Number(6.0)));
    assert_eq!(eval("(* 2 3 4)"), Ok(Galena::Number(24.0)));
    assert_eq!(eval("(- 10 1 2)"), Ok(Galena::Number(7.0)));
  }

  #[test]
  fn define_and_set_mutate_bindings() {
    assert_eq!(eval("(define a 1) (set! a 2) a"), Ok(Galena::Number(2.0)));
  }

  #[test]
  fn set_on_undefined_name_is_an_assignment_error() {
    let err = eval("(set! b 1)").expect_err("should fail");
    assert_eq!(err.kind, GalenaErrKind::Assignment);
  }

  #[test]
  fn unknown_symbol_is_an_unbound_error() {
    let err = eval("missing-thing").expect_err("should fail");
    assert_eq!(err.kind, GalenaErrKind::UnboundName);
  }

  #[test]
  fn lambda_checks_arity_both_ways() {
    assert_eq!(eval("((lambda (x y) (+ x y)) 3 4)"), Ok(Galena::Number(7.0)));
    let low = eval("((lambda (x y) (+ x y)) 3)").expect_err("should fail");
    assert_eq!(low.kind, GalenaErrKind::Arity);
    let high = eval("((lambda (x y) (+ x y)) 3 4 5)").expect_err("should fail");
    assert_eq!(high.kind, GalenaErrKind::Arity);
  }

  #[test]
  fn closures_share_their_defining_frame() {
    let source = "
      (define counter 0)
      (define (bump) (set! counter (+ counter 1)) counter)
      (bump)
      (bump)
      (bump)";
    assert_eq!(eval(source), Ok(Galena::Number(3.0)));
  }

  #[test]
  fn define_sugar_builds_named_fns() {
    assert_eq!(eval("(define (add a b) (+ a b)) (add 20 22)"), Ok(Galena::Number(42.0)));
  }

  #[test]
  fn let_evaluates_bindings_in_the_outer_frame() {
    assert_eq!(eval("(define x 1) (let ((x 2) (y x)) y)"), Ok(Galena::Number(1.0)));
    assert_eq!(eval("(let ((a 2) (b 3)) (* a b))"), Ok(Galena::Number(6.0)));
  }

  #[test]
  fn if_uses_nil_and_false_as_the_only_false_values() {
    assert_eq!(eval("(if nil 1 2)"), Ok(Galena::Number(2.0)));
    assert_eq!(eval("(if false 1 2)"), Ok(Galena::Number(2.0)));
    assert_eq!(eval("(if 0 1 2)"), Ok(Galena::Number(1.0)));
    assert_eq!(eval("(if \"\" 1 2)"), Ok(Galena::Number(1.0)));
    // missing else branch defaults to nil
    assert_eq!(eval("(if false 1)"), Ok(Galena::Nil));
  }

  #[test]
  fn begin_returns_the_last_value() {
    assert_eq!(eval("(begin 1 2 3)"), Ok(Galena::Number(3.0)));
    assert_eq!(eval("(begin)"), Ok(Galena::Nil));
  }

  #[test]
  fn quote_returns_forms_unevaluated() {
    assert_eq!(eval("(car '(a b))"), Ok(Galena::Symbol(crate::galena::intern("a"))));
    assert_eq!(eval("(eq? 'a 'a)"), Ok(Galena::Bool(true)));
  }

  #[test]
  fn eval_runs_quoted_code() {
    assert_eq!(eval("(eval '(+ 1 2))"), Ok(Galena::Number(3.0)));
  }

  #[test]
  fn deep_tail_loop_runs_in_constant_stack() {
    let source = "
      (define (count-down n) (if (= n 0) n (count-down (- n 1))))
      (count-down 200000)";
    assert_eq!(eval(source), Ok(Galena::Number(0.0)));
  }

  #[test]
  fn tail_loop_threads_accumulators() {
    let source = "
      (define (sum-to n acc) (if (= n 0) acc (sum-to (- n 1) (+ acc n))))
      (sum-to 100000 0)";
    assert_eq!(eval(source), Ok(Galena::Number(5000050000.0)));
  }

  #[test]
  fn call_cc_escapes_with_the_thrown_value() {
    let source = "(call/cc (lambda (k) (k 42) 99))";
    assert_eq!(eval(source), Ok(Galena::Number(42.0)));
  }

  #[test]
  fn call_cc_returns_normally_without_a_jump() {
    assert_eq!(eval("(call/cc (lambda (k) 7))"), Ok(Galena::Number(7.0)));
  }

  #[test]
  fn continuation_is_multi_shot_after_its_frame_returned() {
    let mut itp = Interpreter::new();
    let first = itp
      .eval_string(
        "
        (define hits 0)
        (define saved nil)
        (call/cc (lambda (k) (set! saved k)))
        (set! hits (+ hits 1))
        hits",
      )
      .expect("eval");
    assert_eq!(first, Galena::Number(1.0));
    // the capturing call has long returned, the snapshot resumes anyway
    assert_eq!(itp.eval_string("(saved nil)"), Ok(Galena::Number(2.0)));
    assert_eq!(itp.eval_string("(saved nil)"), Ok(Galena::Number(3.0)));
  }

  #[test]
  fn continuation_resumed_inside_a_tail_loop_keeps_looping() {
    let mut itp = Interpreter::new();
    let first = itp
      .eval_string(
        "
        (define saved nil)
        (define m 3)
        (define (spin)
          (call/cc (lambda (k) (set! saved k)))
          (if (= m 0) m (begin (set! m (- m 1)) (spin))))
        (spin)",
      )
      .expect("eval");
    assert_eq!(first, Galena::Number(0.0));
    // resuming lands on the rewritten tail call; the loop must run to
    // completion instead of the marker surfacing as the result
    assert_eq!(itp.eval_string("(set! m 5) (saved nil)"), Ok(Galena::Number(0.0)));
  }

  #[test]
  fn explicit_recur_drives_the_call_loop() {
    let source = "
      (define (down n) (if (= n 0) n (recur down (- n 1))))
      (down 100000)";
    assert_eq!(eval(source), Ok(Galena::Number(0.0)));
    assert_eq!(eval("(define (id x) x) (recur id 9)"), Ok(Galena::Number(9.0)));
  }

  #[test]
  fn recur_requires_a_procedure_target() {
    let bad = eval("(recur 1)").expect_err("should fail");
    assert_eq!(bad.kind, GalenaErrKind::TypeMismatch);
    let none = eval("(recur)").expect_err("should fail");
    assert_eq!(none.kind, GalenaErrKind::Arity);
  }

  #[test]
  fn non_callable_operator_is_a_type_error() {
    let err = eval("(1 2 3)").expect_err("should fail");
    assert_eq!(err.kind, GalenaErrKind::TypeMismatch);
  }

  #[test]
  fn host_bindings_resolve_as_the_outermost_fallback() {
    use crate::galena::GalenaHostFn;

    struct DemoHost;

    impl HostBindings for DemoHost {
      fn lookup(&self, name: &str) -> Option<Galena> {
        match name {
          "answer" => Some(Galena::Number(42.0)),
          "double" => Some(GalenaHostFn::new("double", |args| match args {
            [Galena::Number(n)] => Ok(Galena::Number(n * 2.0)),
            _ => GalenaErr::err_type("double expected 1 number"),
          })),
          _ => None,
        }
      }
    }

    let mut itp = Interpreter::with_host(Some(Rc::new(DemoHost)));
    assert_eq!(itp.eval_string("answer"), Ok(Galena::Number(42.0)));
    assert_eq!(itp.eval_string("(double 21)"), Ok(Galena::Number(42.0)));
    // local definitions shadow host names
    assert_eq!(itp.eval_string("(define answer 1) answer"), Ok(Galena::Number(1.0)));
  }

  #[test]
  fn lambda_parameters_must_be_symbols() {
    let err = eval("(lambda (1) 1)").expect_err("should fail");
    assert_eq!(err.kind, GalenaErrKind::TypeMismatch);
  }
}
