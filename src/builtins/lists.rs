use crate::galena::{Cons, Galena, GalenaErr};

pub fn list(args: &[Galena]) -> Result<Galena, GalenaErr> {
  Ok(Cons::list_from(args))
}

pub fn cons_pair(args: &[Galena]) -> Result<Galena, GalenaErr> {
  match args {
    [car, cdr] => Ok(Cons::new(car.to_owned(), cdr.to_owned())),
    _ => GalenaErr::err_arity(format!("`cons` expected 2 arguments, got {}", args.len())),
  }
}

pub fn car(args: &[Galena]) -> Result<Galena, GalenaErr> {
  match args {
    [Galena::Cons(cell)] => Ok(cell.car.to_owned()),
    [a] => GalenaErr::err_type(format!("`car` expected a pair, got: {a}")),
    _ => GalenaErr::err_arity(format!("`car` expected 1 argument, got {}", args.len())),
  }
}

pub fn cdr(args: &[Galena]) -> Result<Galena, GalenaErr> {
  match args {
    [Galena::Cons(cell)] => Ok(cell.cdr.to_owned()),
    [a] => GalenaErr::err_type(format!("`cdr` expected a pair, got: {a}")),
    _ => GalenaErr::err_arity(format!("`cdr` expected 1 argument, got {}", args.len())),
  }
}

pub fn nil_question(args: &[Galena]) -> Result<Galena, GalenaErr> {
  match args {
    [a] => Ok(Galena::Bool(matches!(a, Galena::Nil))),
    _ => GalenaErr::err_arity(format!("`nil?` expected 1 argument, got {}", args.len())),
  }
}
