use strum_macros::{AsRefStr, EnumString};

/// builtin procedures, called with already-evaluated arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, EnumString, strum_macros::Display, AsRefStr)]
pub enum GalenaProc {
  #[strum(serialize = "+")]
  Add,
  #[strum(serialize = "-")]
  Minus,
  #[strum(serialize = "*")]
  Multiply,
  #[strum(serialize = "/")]
  Divide,
  #[strum(serialize = "%")]
  Rem,
  #[strum(serialize = "=")]
  Equal,
  #[strum(serialize = "!=")]
  NotEqual,
  #[strum(serialize = "<")]
  LessThan,
  #[strum(serialize = ">")]
  GreaterThan,
  #[strum(serialize = "<=")]
  LessEqual,
  #[strum(serialize = ">=")]
  GreaterEqual,
  /// identity comparison, not structural
  #[strum(serialize = "eq?")]
  IdenticalQ,
  #[strum(serialize = "not")]
  Not,
  #[strum(serialize = "list")]
  List,
  #[strum(serialize = "cons")]
  Cons,
  #[strum(serialize = "car")]
  Car,
  #[strum(serialize = "cdr")]
  Cdr,
  #[strum(serialize = "nil?")]
  NilQ,
  #[strum(serialize = "print")]
  Print,
}

impl GalenaProc {
  pub fn is_valid(s: &str) -> bool {
    s.parse::<GalenaProc>().is_ok()
  }
}
