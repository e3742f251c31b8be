pub mod builtins;
pub mod cli_args;
pub mod galena;
pub mod parser;
pub mod runner;
pub mod scope;
pub mod tokenizer;

pub use galena::{Galena, GalenaErr, GalenaErrKind};
pub use parser::{Package, parse};
pub use runner::Interpreter;
pub use scope::{HostBindings, Scope};
