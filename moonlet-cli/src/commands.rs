//! CLI command implementations.

use std::fs;
use std::path::Path;

use moonlet_common::Program;
use moonlet_vm::{Scoping, VmConfig};
use tracing::debug;

/// Compile a source file to a listing file.
pub fn compile(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: compile requires an input file");
        eprintln!("Usage: moonlet compile <input.lua> [-o output.lst]");
        return Err(1);
    }

    let input = &args[0];

    // Parse -o flag
    let output = if args.len() >= 3 && args[1] == "-o" {
        args[2].clone()
    } else if let Some(stem) = input.strip_suffix(".lua") {
        format!("{stem}.lst")
    } else {
        format!("{input}.lst")
    };

    let program = compile_source(input)?;
    let text = render_listing(&program)?;

    fs::write(&output, &text).map_err(|e| {
        eprintln!("error: cannot write '{output}': {e}");
        1
    })?;

    eprintln!("compiled {} instructions -> {output}", program.len());
    Ok(())
}

/// Validate a listing file.
pub fn check(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: check requires an input file");
        eprintln!("Usage: moonlet check <input.lst>");
        return Err(1);
    }

    let input = &args[0];
    let program = load_program(input)?;
    validate(&program)?;

    println!("OK: {input} ({} instructions)", program.len());
    Ok(())
}

/// Validate and execute a source or listing file.
pub fn run(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: moonlet run <input.lua|input.lst> [--dynamic-scoping] [--max-call-depth N]");
        return Err(1);
    }

    let input = &args[0];
    let config = parse_run_options(&args[1..])?;
    let program = load_program(input)?;

    // Validate first
    validate(&program)?;

    debug!(?config, instructions = program.len(), "running");
    moonlet_vm::run_with_config(&program, config).map_err(|e| {
        eprintln!("runtime error: {e}");
        3
    })
}

/// Print the listing of a compiled source file.
pub fn list(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: list requires an input file");
        eprintln!("Usage: moonlet list <input.lua>");
        return Err(1);
    }

    let program = compile_source(&args[0])?;
    print!("{}", render_listing(&program)?);
    Ok(())
}

/// Print the fingerprint of a source or listing file.
pub fn hash(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: hash requires an input file");
        eprintln!("Usage: moonlet hash <input.lua|input.lst>");
        return Err(1);
    }

    let program = load_program(&args[0])?;
    println!("{}", moonlet_assembler::fingerprint(&program));
    Ok(())
}

// --- Helpers ---

fn read_text(path: &str) -> Result<String, i32> {
    fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })
}

fn compile_source(path: &str) -> Result<Program, i32> {
    let source = read_text(path)?;
    moonlet_compiler::compile(&source).map_err(|e| {
        eprintln!("error: {path}: {e}");
        1
    })
}

/// Assemble `.lst` files, compile everything else.
fn load_program(path: &str) -> Result<Program, i32> {
    let is_listing = Path::new(path)
        .extension()
        .is_some_and(|ext| ext == "lst");

    if !is_listing {
        return compile_source(path);
    }

    let text = read_text(path)?;
    moonlet_assembler::assemble(&text).map_err(|e| {
        eprintln!("error: {path}: {e}");
        1
    })
}

fn render_listing(program: &Program) -> Result<String, i32> {
    moonlet_assembler::listing(program).map_err(|e| {
        eprintln!("error: {e}");
        1
    })
}

fn validate(program: &Program) -> Result<(), i32> {
    moonlet_validator::validate(program).map_err(|errors| {
        for e in &errors {
            eprintln!("error: {e}");
        }
        2
    })
}

/// Parse the flags accepted by `run`.
fn parse_run_options(args: &[String]) -> Result<VmConfig, i32> {
    let mut config = VmConfig::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--dynamic-scoping" => config = config.with_scoping(Scoping::Dynamic),
            "--max-call-depth" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("error: --max-call-depth requires a value");
                    return Err(1);
                };
                let limit = value.parse::<usize>().map_err(|_| {
                    eprintln!("error: invalid call depth '{value}'");
                    1
                })?;
                config = config.with_max_call_depth(limit);
                i += 1;
            }
            other => {
                eprintln!("error: unknown option '{other}'");
                return Err(1);
            }
        }
        i += 1;
    }
    Ok(config)
}
