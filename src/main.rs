use std::fs;
use std::io::{self, BufRead, Write};

use colored::*;

use galena::Interpreter;
use galena::cli_args::{GALENA_VERSION, ToplevelGalena};

fn main() -> Result<(), String> {
  let args: ToplevelGalena = argh::from_env();

  if args.version {
    println!("galena {GALENA_VERSION}");
    return Ok(());
  }

  let mut interpreter = Interpreter::new();

  if let Some(snippet) = &args.eval {
    let value = interpreter.eval_string(snippet).map_err(|e| e.to_string())?;
    println!("{value}");
    return Ok(());
  }

  if let Some(path) = &args.input {
    let source = fs::read_to_string(path).map_err(|e| format!("failed to read {path}: {e}"))?;
    interpreter.eval_string(&source).map_err(|e| e.to_string())?;
    return Ok(());
  }

  run_repl(&mut interpreter)
}

/// read one line at a time, report failures and keep going; EOF exits
fn run_repl(interpreter: &mut Interpreter) -> Result<(), String> {
  println!("galena {GALENA_VERSION}");
  let stdin = io::stdin();
  loop {
    print!(">>> ");
    io::stdout().flush().map_err(|e| e.to_string())?;
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
      Ok(0) => {
        println!();
        return Ok(());
      }
      Ok(_) => {
        let trimmed = line.trim();
        if trimmed.is_empty() {
          continue;
        }
        match interpreter.eval_string(trimmed) {
          Ok(value) => println!("{value}"),
          Err(failure) => eprintln!("{}", failure.to_string().red()),
        }
      }
      Err(e) => return Err(e.to_string()),
    }
  }
}
