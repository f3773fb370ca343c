//! Moonlet CLI: compile, check, run and list scripts.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input/compile/assembly error
//! - 2: Validation failure
//! - 3: Runtime error

mod commands;

use std::io;
use std::process;

use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "compile" => commands::compile(&args[2..]),
        "check" => commands::check(&args[2..]),
        "run" => commands::run(&args[2..]),
        "list" => commands::list(&args[2..]),
        "hash" => commands::hash(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

/// Log to stderr, filtered by `MOONLET_LOG` or else `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("MOONLET_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_usage() {
    eprintln!("Usage: moonlet <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  compile <input.lua> [-o output.lst]   Compile source to a listing");
    eprintln!("  check <input.lst>                     Validate a listing");
    eprintln!("  run <input.lua|input.lst> [options]   Validate and execute a program");
    eprintln!("  list <input.lua>                      Print the compiled listing");
    eprintln!("  hash <input.lua|input.lst>            Print the program fingerprint");
    eprintln!();
    eprintln!("Run options:");
    eprintln!("  --dynamic-scoping      Resolve free names in the caller's scope");
    eprintln!("  --max-call-depth N     Limit nested function calls");
}
