//! Telegrid - non-interactive command surface for the grid engine.
//!
//! The interactive grid lives in a host application; this binary exposes the
//! engine for scripting and smoke-testing: `-c` evaluates a single entry,
//! `--feed` drives edits, reads and channel pushes over stdin.

use std::env;
use std::io::{self, BufRead, Write};

use anyhow::Result;
use telegrid_core::GridEngine;

fn print_usage() {
    eprintln!("Usage: telegrid [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <ENTRY>     Evaluate one cell entry and print its value");
    eprintln!("      --feed                Read commands from stdin, one per line:");
    eprintln!("                              set <CELL> <text>   edit a cell");
    eprintln!("                              get <CELL>          print a cell value");
    eprintln!("                              push <json>         deliver a channel envelope");
    eprintln!("  -h, --help                Print help");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut command: Option<String> = None;
    let mut feed = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-c" | "--command" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --command requires an entry");
                    std::process::exit(1);
                }
                command = Some(args[i].to_string());
            }
            "--feed" => feed = true,
            arg => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let result = if let Some(entry) = command {
        run_command(&entry)
    } else if feed {
        run_feed()
    } else {
        print_usage();
        std::process::exit(2);
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Evaluate a single entry in cell A1 of a fresh grid and print its value.
/// Exits nonzero when the result is an error value.
fn run_command(entry: &str) -> Result<()> {
    let mut engine = GridEngine::new();

    // Bare expressions are convenient at the CLI; prepend the marker.
    let entry = if entry.trim_start().starts_with('=') {
        entry.to_string()
    } else {
        format!("={}", entry)
    };

    engine.set_cell_formula("A1", &entry)?;
    let value = engine.cell_value("A1")?;
    println!("{}", value);
    if value.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

/// Drive the engine over a line protocol until stdin closes.
fn run_feed() -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut engine = GridEngine::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        match verb {
            "set" => {
                let (cell, text) = rest.split_once(' ').unwrap_or((rest, ""));
                if cell.is_empty() {
                    eprintln!("feed: set requires a cell id");
                    continue;
                }
                if let Err(err) = engine.set_cell_formula(cell, text) {
                    eprintln!("feed: {}", err);
                }
            }
            "get" => match engine.cell_value(rest.trim()) {
                Ok(value) => writeln!(stdout.lock(), "{}", value)?,
                Err(err) => eprintln!("feed: {}", err),
            },
            "push" => engine.handle_channel_message(rest),
            _ => eprintln!("feed: unknown command: {}", verb),
        }
    }

    Ok(())
}
