use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::galena::{Galena, GalenaErr, SymbolId};
use crate::scope::Scope;

/// a user-defined procedure: fixed parameter list, body sequence and the
/// captured defining scope, shared by reference so later mutation stays visible
#[derive(Debug)]
pub struct GalenaFn {
  pub name: Option<Arc<str>>,
  pub params: Vec<SymbolId>,
  pub body: Rc<[Galena]>,
  pub scope: Rc<Scope>,
  /// decorated copy of `body` with self tail calls rewritten, filled on first call
  pub optimized: RefCell<Option<Rc<[Galena]>>>,
}

impl GalenaFn {
  pub fn new(name: Option<Arc<str>>, params: Vec<SymbolId>, body: Rc<[Galena]>, scope: Rc<Scope>) -> Self {
    GalenaFn {
      name,
      params,
      body,
      scope,
      optimized: RefCell::new(None),
    }
  }

  pub fn display_name(&self) -> Arc<str> {
    match &self.name {
      Some(n) => n.to_owned(),
      None => Arc::from("lambda"),
    }
  }
}

/// a reified point of execution: the scope, the statement sequence being run
/// and the cursor of the next statement. invoking one is a control transfer,
/// valid any number of times, even after the capturing call returned
#[derive(Debug, Clone)]
pub struct Continuation {
  pub scope: Rc<Scope>,
  pub exprs: Rc<[Galena]>,
  pub next: usize,
}

/// a callable registered by the embedding application, receives evaluated arguments
pub struct GalenaHostFn {
  pub name: Arc<str>,
  pub handler: Box<dyn Fn(&[Galena]) -> Result<Galena, GalenaErr>>,
}

impl GalenaHostFn {
  pub fn new<F>(name: &str, handler: F) -> Galena
  where
    F: Fn(&[Galena]) -> Result<Galena, GalenaErr> + 'static,
  {
    Galena::HostFn(Rc::new(GalenaHostFn {
      name: Arc::from(name),
      handler: Box::new(handler),
    }))
  }
}

impl fmt::Debug for GalenaHostFn {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "(&host-fn {})", self.name)
  }
}
