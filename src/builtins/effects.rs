use crate::galena::{Galena, GalenaErr};

/// strings print raw, everything else in display form
pub fn print(args: &[Galena]) -> Result<Galena, GalenaErr> {
  let line = args.iter().map(|x| x.turn_string()).collect::<Vec<_>>().join(" ");
  println!("{line}");
  Ok(Galena::Nil)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn print_returns_nil() {
    assert_eq!(print(&[Galena::Str("ok".into())]).unwrap(), Galena::Nil);
  }
}
