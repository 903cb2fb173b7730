use colored::*;
use std::{io, process};
use clap::Parser as ClapParser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

extern crate frontend;
extern crate runtime;

mod demos;

use demos::Demo;
use runtime::Interpreter;


// --------
//   CLI
// --------

#[derive(ClapParser)]
#[command(version)]
#[command(about="Evaluator for STIMPL programs")]
struct CLI {
    /// Name of the bundled program to run
    #[arg(short, long, default_value = "countdown")]
    program: String,

    /// Runs every bundled program, each one from an empty state
    #[arg(long)]
    all: bool,

    /// Lists the bundled programs
    #[arg(short, long)]
    list: bool,

    /// Prints the AST tree
    #[arg(short, long)]
    ast_print: bool,

    /// Prints the program, final value and final state after the run
    #[arg(short, long)]
    debug: bool,
}


// Logs only when RUST_LOG is set, e.g. RUST_LOG=runtime=trace
fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn list_demos() {
    println!("\nBundled programs:");

    for demo in demos::all() {
        println!("  {:<12} {}", demo.name.green(), demo.description);
    }
}

// Returns whether the program ran to completion
fn run_demo(demo: &Demo, cli: &CLI) -> bool {
    println!("\nRunning program {}...", demo.name.green());

    let program = (demo.build)();

    if cli.ast_print {
        println!("\nProgram tree:\n{:#?}", program);
    }

    println!("\nProgram output:");

    let mut interp = Interpreter::new();
    match interp.run(&program) {
        Ok((value, value_type, state)) => {
            if cli.debug {
                println!("\n{} {:?}", "program:".yellow().bold(), program);
                println!("{} ({:?}, {})", "final_value:".yellow().bold(), value, value_type);
                println!("{}\n{}", "final_state:".yellow().bold(), state);
            }

            true
        }
        Err(e) => {
            println!("{e}");
            false
        }
    }
}

fn main() {
    // Manage command line args
    let cli = CLI::parse();

    init_tracing();

    println!("\n       --- {} evaluator v0.1 ---", "STIMPL".cyan().bold());

    if cli.list {
        list_demos();
        return;
    }

    if cli.all {
        // Every program gets its own interpreter and state, no shared data
        let failures = demos::all()
            .iter()
            .filter(|demo| !run_demo(demo, &cli))
            .count();

        println!("\n{} program(s) aborted with an error", failures);
        return;
    }

    match demos::find(&cli.program) {
        Some(demo) => {
            if !run_demo(&demo, &cli) {
                process::exit(1);
            }
        }
        None => {
            println!("{} unknown program: {}", "Error".red().bold(), cli.program);
            list_demos();
            process::exit(2);
        }
    }
}
