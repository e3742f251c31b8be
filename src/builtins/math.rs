use crate::galena::{Galena, GalenaErr, GalenaErrKind};

fn number(op: &str, x: &Galena) -> Result<f64, GalenaErr> {
  match x {
    Galena::Number(n) => Ok(*n),
    a => Err(GalenaErr::new(
      GalenaErrKind::TypeMismatch,
      format!("`{op}` expected a number, got: {a}"),
    )),
  }
}

pub fn add(args: &[Galena]) -> Result<Galena, GalenaErr> {
  let mut sum = 0.0;
  for x in args {
    sum += number("+", x)?;
  }
  Ok(Galena::Number(sum))
}

pub fn minus(args: &[Galena]) -> Result<Galena, GalenaErr> {
  match args {
    [] => GalenaErr::err_arity("`-` expected at least 1 argument, got 0"),
    [x] => Ok(Galena::Number(-number("-", x)?)),
    [x, rest @ ..] => {
      let mut acc = number("-", x)?;
      for y in rest {
        acc -= number("-", y)?;
      }
      Ok(Galena::Number(acc))
    }
  }
}

pub fn multiply(args: &[Galena]) -> Result<Galena, GalenaErr> {
  let mut product = 1.0;
  for x in args {
    product *= number("*", x)?;
  }
  Ok(Galena::Number(product))
}

pub fn divide(args: &[Galena]) -> Result<Galena, GalenaErr> {
  match args {
    [] => GalenaErr::err_arity("`/` expected at least 1 argument, got 0"),
    [x] => Ok(Galena::Number(1.0 / number("/", x)?)),
    [x, rest @ ..] => {
      let mut acc = number("/", x)?;
      for y in rest {
        acc /= number("/", y)?;
      }
      Ok(Galena::Number(acc))
    }
  }
}

pub fn rem(args: &[Galena]) -> Result<Galena, GalenaErr> {
  match args {
    [a, b] => Ok(Galena::Number(number("%", a)? % number("%", b)?)),
    _ => GalenaErr::err_arity(format!("`%` expected 2 arguments, got {}", args.len())),
  }
}

fn compare(op: &str, args: &[Galena]) -> Result<(f64, f64), GalenaErr> {
  match args {
    [a, b] => Ok((number(op, a)?, number(op, b)?)),
    _ => Err(GalenaErr::new(
      GalenaErrKind::Arity,
      format!("`{op}` expected 2 arguments, got {}", args.len()),
    )),
  }
}

pub fn less_than(args: &[Galena]) -> Result<Galena, GalenaErr> {
  let (a, b) = compare("<", args)?;
  Ok(Galena::Bool(a < b))
}

pub fn greater_than(args: &[Galena]) -> Result<Galena, GalenaErr> {
  let (a, b) = compare(">", args)?;
  Ok(Galena::Bool(a > b))
}

pub fn less_equal(args: &[Galena]) -> Result<Galena, GalenaErr> {
  let (a, b) = compare("<=", args)?;
  Ok(Galena::Bool(a <= b))
}

pub fn greater_equal(args: &[Galena]) -> Result<Galena, GalenaErr> {
  let (a, b) = compare(">=", args)?;
  Ok(Galena::Bool(a >= b))
}
