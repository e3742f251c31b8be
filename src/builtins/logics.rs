use crate::galena::{Galena, GalenaErr};

pub fn equal(args: &[Galena]) -> Result<Galena, GalenaErr> {
  match args {
    [a, b] => Ok(Galena::Bool(a == b)),
    _ => GalenaErr::err_arity(format!("`=` expected 2 arguments, got {}", args.len())),
  }
}

pub fn not_equal(args: &[Galena]) -> Result<Galena, GalenaErr> {
  match args {
    [a, b] => Ok(Galena::Bool(a != b)),
    _ => GalenaErr::err_arity(format!("`!=` expected 2 arguments, got {}", args.len())),
  }
}

/// pointer identity for pairs and procedures, value identity for atoms
pub fn identical(args: &[Galena]) -> Result<Galena, GalenaErr> {
  match args {
    [a, b] => Ok(Galena::Bool(a.identical(b))),
    _ => GalenaErr::err_arity(format!("`eq?` expected 2 arguments, got {}", args.len())),
  }
}

pub fn not(args: &[Galena]) -> Result<Galena, GalenaErr> {
  match args {
    [a] => Ok(Galena::Bool(!a.truthy())),
    _ => GalenaErr::err_arity(format!("`not` expected 1 argument, got {}", args.len())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::galena::{Cons, GalenaErrKind};

  #[test]
  fn equal_compares_structure() {
    let a = Cons::new(Galena::Number(1.0), Galena::Nil);
    let b = Cons::new(Galena::Number(1.0), Galena::Nil);
    assert_eq!(equal(&[a, b]).unwrap(), Galena::Bool(true));
    assert_eq!(
      equal(&[Galena::Number(1.0), Galena::Str("1".into())]).unwrap(),
      Galena::Bool(false)
    );
  }

  #[test]
  fn identical_compares_pointers_for_pairs() {
    let a = Cons::new(Galena::Number(1.0), Galena::Nil);
    let b = Cons::new(Galena::Number(1.0), Galena::Nil);
    assert_eq!(identical(&[a.to_owned(), a.to_owned()]).unwrap(), Galena::Bool(true));
    assert_eq!(identical(&[a, b]).unwrap(), Galena::Bool(false));
  }

  #[test]
  fn not_follows_truthiness() {
    assert_eq!(not(&[Galena::Nil]).unwrap(), Galena::Bool(true));
    assert_eq!(not(&[Galena::Bool(false)]).unwrap(), Galena::Bool(true));
    assert_eq!(not(&[Galena::Number(0.0)]).unwrap(), Galena::Bool(false));
  }

  #[test]
  fn arity_is_checked() {
    assert_eq!(equal(&[Galena::Nil]).unwrap_err().kind, GalenaErrKind::Arity);
  }
}
