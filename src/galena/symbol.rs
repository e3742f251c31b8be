use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, RwLock};

/// process-wide registry of interned symbol names, created once and never torn down
static SYMBOLS: LazyLock<RwLock<SymbolTable>> = LazyLock::new(|| RwLock::new(SymbolTable::default()));

#[derive(Default)]
struct SymbolTable {
  names: Vec<Arc<str>>,
  ids: HashMap<Arc<str>, u32>,
}

/// handle of an interned symbol, equality by id is equality by name
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(u32);

/// lookup-or-create, the only mutation of the symbol table
pub fn intern(name: &str) -> SymbolId {
  let mut table = SYMBOLS.write().expect("write symbol table");
  match table.ids.get(name) {
    Some(idx) => SymbolId(*idx),
    None => {
      let idx = table.names.len() as u32;
      let shared: Arc<str> = Arc::from(name);
      table.names.push(shared.to_owned());
      table.ids.insert(shared, idx);
      SymbolId(idx)
    }
  }
}

impl SymbolId {
  pub fn read_name(&self) -> Arc<str> {
    let table = SYMBOLS.read().expect("read symbol table");
    table.names[self.0 as usize].to_owned()
  }
}

impl fmt::Display for SymbolId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.read_name())
  }
}

impl fmt::Debug for SymbolId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "'{}", self.read_name())
  }
}
