use strum_macros::{AsRefStr, EnumString};

/// special forms receive their argument forms unevaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, EnumString, strum_macros::Display, AsRefStr)]
pub enum GalenaSyntax {
  #[strum(serialize = "quote")]
  Quote,
  #[strum(serialize = "if")]
  If,
  #[strum(serialize = "define")]
  Define,
  #[strum(serialize = "set!")]
  SetBang,
  #[strum(serialize = "lambda")]
  Lambda,
  #[strum(serialize = "let")]
  Let,
  #[strum(serialize = "begin")]
  Begin,
  #[strum(serialize = "call/cc")]
  CallCc,
  /// evaluates its operand, then evaluates the resulting form
  #[strum(serialize = "eval")]
  Eval,
  /// not for data, but for rewritten self tail calls
  #[strum(serialize = "recur")]
  Recur,
}

impl GalenaSyntax {
  /// check if given name is a syntax name
  pub fn is_valid(s: &str) -> bool {
    s.parse::<GalenaSyntax>().is_ok()
  }
}
