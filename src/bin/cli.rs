//! heapsql - interactive SQL shell
//!
//! Usage: `heapsql [DATA_DIR]`. Without an argument the data directory comes
//! from `HEAPSQL_DATA_DIR`, falling back to `./data`.

use anyhow::Context;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use heapsql::sql::Parser;
use heapsql::{DbConfig, SqlExec};

/// Print help message
fn print_help() {
    println!(
        r#"
Statements:
  CREATE TABLE [IF NOT EXISTS] t (c INT | TEXT | BOOLEAN, ...)
  DROP TABLE t
  CREATE [UNIQUE] INDEX i ON t [USING BTREE | HASH] (c, ...)
  DROP INDEX i FROM t
  INSERT INTO t [(c, ...)] VALUES (v, ...)
  DELETE FROM t [WHERE c = v AND ...]
  SELECT * | c, ... FROM t [WHERE c = v AND ...]
  SHOW TABLES | SHOW COLUMNS [FROM t] | SHOW INDEX FROM t

Type 'quit' to exit.
"#
    );
}

/// Parse one line of input, then echo and execute each statement on it
fn run_line(exec: &mut SqlExec, line: &str) {
    let statements = match Parser::new(line).and_then(|mut parser| parser.parse_all()) {
        Ok(statements) => statements,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };
    for statement in &statements {
        println!("{}", statement);
        match exec.execute(statement) {
            Ok(result) => println!("{}", result),
            Err(e) => println!("Error: {}", e),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(dir) => DbConfig::from_env().data_dir(dir),
        None => DbConfig::from_env(),
    };
    let history = config.history_path();

    let mut editor = DefaultEditor::new().context("failed to start line editor")?;
    // a missing history file is normal on first run
    let _ = editor.load_history(&history);

    println!(
        "heapsql shell, data in {} (type 'help' or 'quit')",
        config.dir().display()
    );
    let mut exec = SqlExec::new(config);

    loop {
        match editor.readline("SQL> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);
                match line {
                    "quit" => break,
                    "help" => print_help(),
                    _ => run_line(&mut exec, line),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("failed to read input"),
        }
    }

    if let Err(e) = editor.save_history(&history) {
        tracing::warn!(error = %e, "could not save history");
    }
    Ok(())
}
