use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::galena::{Galena, SymbolId};

/// read-only capability for names provided by the embedding application,
/// consulted only after the whole frame chain missed
pub trait HostBindings {
  fn lookup(&self, name: &str) -> Option<Galena>;

  fn contains(&self, name: &str) -> bool {
    self.lookup(name).is_some()
  }
}

/// one lexical frame; frames are shared between closures and continuations,
/// so mutation through any holder is visible to all of them
pub struct Scope {
  values: RefCell<HashMap<SymbolId, Galena>>,
  parent: Option<Rc<Scope>>,
  host: Option<Rc<dyn HostBindings>>,
}

impl Scope {
  pub fn new_root(host: Option<Rc<dyn HostBindings>>) -> Rc<Scope> {
    Rc::new(Scope {
      values: RefCell::new(HashMap::new()),
      parent: None,
      host,
    })
  }

  /// child frame parented to the defining environment, never the caller's
  pub fn extend(parent: &Rc<Scope>) -> Rc<Scope> {
    Rc::new(Scope {
      values: RefCell::new(HashMap::new()),
      parent: Some(parent.to_owned()),
      host: None,
    })
  }

  /// bind in this frame, overwriting a local binding and shadowing outer ones
  pub fn define(&self, sym: SymbolId, value: Galena) {
    self.values.borrow_mut().insert(sym, value);
  }

  /// walk this frame and its parents, without the host fallback
  pub fn lookup(&self, sym: SymbolId) -> Option<Galena> {
    let mut frame = self;
    loop {
      if let Some(v) = frame.values.borrow().get(&sym) {
        return Some(v.to_owned());
      }
      match &frame.parent {
        Some(parent) => frame = parent,
        None => return None,
      }
    }
  }

  /// full lookup: frame chain first, then the host bindings at the root
  pub fn get(&self, sym: SymbolId) -> Option<Galena> {
    match self.lookup(sym) {
      Some(v) => Some(v),
      None => self.host_lookup(&sym.read_name()),
    }
  }

  /// ask the root frame's host bindings for a name
  pub fn host_lookup(&self, name: &str) -> Option<Galena> {
    let mut frame = self;
    while let Some(parent) = &frame.parent {
      frame = parent;
    }
    frame.host.as_ref().and_then(|h| h.lookup(name))
  }

  /// `set!` semantics: mutate the nearest frame that already binds `sym`,
  /// report false when no frame does
  pub fn assign(&self, sym: SymbolId, value: Galena) -> bool {
    let mut frame = self;
    loop {
      {
        let mut values = frame.values.borrow_mut();
        if values.contains_key(&sym) {
          values.insert(sym, value);
          return true;
        }
      }
      match &frame.parent {
        Some(parent) => frame = parent,
        None => return false,
      }
    }
  }
}

impl fmt::Debug for Scope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // values are skipped: closures stored in a frame may point back at it
    let keys: Vec<String> = self.values.borrow().keys().map(|k| k.to_string()).collect();
    f.debug_struct("Scope")
      .field("keys", &keys)
      .field("has_parent", &self.parent.is_some())
      .finish()
  }
}
