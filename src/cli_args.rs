use argh::FromArgs;

pub const GALENA_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(FromArgs, PartialEq, Debug, Clone)]
/// Top-level command.
pub struct ToplevelGalena {
  /// evaluate a snippet and exit
  #[argh(option)]
  pub eval: Option<String>,
  /// input source file; omit it for an interactive session
  #[argh(positional)]
  pub input: Option<String>,
  /// print version only
  #[argh(switch)]
  pub version: bool,
}
