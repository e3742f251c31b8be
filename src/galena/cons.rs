use std::rc::Rc;

use crate::Galena;

/// a pair; proper lists chain `cdr` down to `Galena::Nil`,
/// dotted pairs keep any other value in `cdr`
#[derive(Debug, Clone)]
pub struct Cons {
  pub car: Galena,
  pub cdr: Galena,
}

impl Cons {
  pub fn new(car: Galena, cdr: Galena) -> Galena {
    Galena::Cons(Rc::new(Cons { car, cdr }))
  }

  /// build a proper list out of a slice, empty slice gives `Nil`
  pub fn list_from(items: &[Galena]) -> Galena {
    let mut chain = Galena::Nil;
    for item in items.iter().rev() {
      chain = Cons::new(item.to_owned(), chain);
    }
    chain
  }
}

/// unlink the tail iteratively; uniquely-owned chains must drop in constant
/// stack, one native frame per cell is not an option for long lists
impl Drop for Cons {
  fn drop(&mut self) {
    let mut tail = std::mem::replace(&mut self.cdr, Galena::Nil);
    while let Galena::Cons(cell) = tail {
      match Rc::try_unwrap(cell) {
        Ok(mut inner) => tail = std::mem::replace(&mut inner.cdr, Galena::Nil),
        // the rest of the chain is still shared, its owner unlinks it
        Err(_) => break,
      }
    }
  }
}

/// walk the successive pairs of a chain, stopping at `Nil` or a dotted tail
pub struct ConsIter {
  cursor: Galena,
}

impl Iterator for ConsIter {
  type Item = Rc<Cons>;

  fn next(&mut self) -> Option<Self::Item> {
    match &self.cursor {
      Galena::Cons(cell) => {
        let cell = cell.to_owned();
        self.cursor = cell.cdr.to_owned();
        Some(cell)
      }
      _ => None,
    }
  }
}

pub fn iter(value: &Galena) -> ConsIter {
  ConsIter { cursor: value.to_owned() }
}

/// collect the `car`s of a chain; a dotted tail is dropped
pub fn cars(value: &Galena) -> Vec<Galena> {
  iter(value).map(|cell| cell.car.to_owned()).collect()
}
