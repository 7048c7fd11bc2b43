//! FeatherDB interactive shell
//!
//! Reads one statement per line. Lines starting with `.` are shell commands.

use anyhow::Context;
use clap::Parser as ClapParser;
use featherdb::sql::{parse_sql, QueryExecutor};
use featherdb::{DbConfig, FileStorage, Storage};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the log filter (e.g. `featherdb=debug`)
const LOG_ENV: &str = "FEATHERDB_LOG";

#[derive(ClapParser, Debug)]
#[command(name = "featherdb", version, about = "FeatherDB interactive SQL shell")]
struct Args {
    /// Directory holding the table files (overrides the config file)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// JSON config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => DbConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DbConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }

    let storage = Arc::new(FileStorage::new(&config));
    interactive_mode(storage)
}

fn interactive_mode(storage: Arc<FileStorage>) -> anyhow::Result<()> {
    println!("FeatherDB v{}", VERSION);
    println!("Type .help for instructions.");

    let executor = QueryExecutor::new(storage.clone());
    let stdin = io::stdin();
    let mut buffer = String::new();

    loop {
        print!("featherdb> ");
        io::stdout().flush()?;

        buffer.clear();
        if stdin.lock().read_line(&mut buffer)? == 0 {
            println!();
            break;
        }

        let input = buffer.trim();
        if input.is_empty() {
            continue;
        }

        if input.starts_with('.') {
            match run_command(&*storage, input) {
                Ok(true) => continue,
                Ok(false) => break,
                Err(e) => println!("Error: {}", e),
            }
            continue;
        }

        match parse_sql(input).and_then(|statement| executor.execute(statement)) {
            Ok(result) => print!("{}", result),
            Err(e) => println!("Error: {}", e),
        }
    }

    Ok(())
}

/// Handle a `.command`; `Ok(false)` ends the session.
fn run_command(storage: &dyn Storage, input: &str) -> featherdb::Result<bool> {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or_default();

    match command {
        ".exit" | ".quit" => return Ok(false),
        ".help" => print_help(),
        ".tables" => {
            for table in storage.list_tables()? {
                println!("{}", table);
            }
        }
        ".schema" => match parts.next() {
            None => println!("Usage: .schema <table_name>"),
            Some(name) => {
                let table = storage.get_table_schema(name)?;
                if table.is_missing() {
                    println!("Table '{}' not found.", name);
                } else {
                    println!("{}", table.create_sql());
                }
            }
        },
        _ => println!("Unknown command: {}", input),
    }
    Ok(true)
}

fn print_help() {
    println!(
        r#"
Commands:
  .help              Show this help
  .exit, .quit       Leave the shell
  .tables            List all tables
  .schema <table>    Show the CREATE TABLE statement of a table

SQL:
  CREATE TABLE users (id INT, name STRING)
  INSERT INTO users (id, name) VALUES (1, 'alice')
  SELECT name FROM users WHERE id > 0 ORDER BY name
  SELECT * FROM users WHERE id IN (SELECT id FROM admins)
  SELECT * FROM (SELECT * FROM users WHERE id < 10) ORDER BY id
  UPDATE users SET name = 'bob' WHERE id = 1
  DELETE FROM users WHERE id = 1

WHERE takes a single `<column> <op> <value>` predicate.
INT columns compare numerically (= != < > <= >=), others as text (= != < >).
"#
    );
}
