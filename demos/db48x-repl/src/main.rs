//! A line-oriented REPL over the object runtime: reads one RPL object per
//! line, evaluates it against a persistent stack and root directory, and
//! prints the resulting stack. Demonstrates the public API; not part of
//! the library surface (`repl` feature only).

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use db48x::parser::{self, renderer};
use db48x::{Directory, Evaluator};

/// Minimal REPL for the db48x object runtime.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Evaluate a single line and exit instead of reading stdin.
    #[arg(short, long)]
    eval: Option<String>,

    /// Initial numeric base for `#`-prefixed based integers.
    #[arg(long, default_value_t = 16)]
    base: u32,
}

fn run_line(line: &str, eval: &mut Evaluator, vars: &mut Directory) -> Result<()> {
    let settings = eval.settings().clone();
    let object = parser::parse(line.trim(), &settings).with_context(|| format!("parsing {line:?}"))?;
    eval.evaluate(object, vars).map_err(|e| anyhow::anyhow!("{e:?}"))?;
    Ok(())
}

fn print_stack(eval: &Evaluator) {
    let settings = eval.settings().clone();
    let depth = eval.stack().depth();
    for i in (0..depth).rev() {
        if let Ok(obj) = eval.stack().stack(i) {
            println!("{}: {}", i + 1, renderer::render(obj, &settings));
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut eval = Evaluator::new();
    eval.settings_mut()
        .set_base(cli.base)
        .context("invalid --base")?;
    let mut vars = Directory::new();

    if let Some(line) = cli.eval {
        run_line(&line, &mut eval, &mut vars)?;
        print_stack(&eval);
        return Ok(());
    }

    let stdin = io::stdin();
    print!("> ");
    io::stdout().flush().ok();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        if line.trim().is_empty() {
            print!("> ");
            io::stdout().flush().ok();
            continue;
        }
        match run_line(&line, &mut eval, &mut vars) {
            Ok(()) => print_stack(&eval),
            Err(e) => eprintln!("error: {e:#}"),
        }
        print!("> ");
        io::stdout().flush().ok();
    }
    println!();
    Ok(())
}
