use std::io::{BufRead, Write};

use clap::Parser as ClapParser;
use dakota::interpreter::{evaluator::Interpreter, lexer::Lexer, parser::Parser};

/// Dakota is an indentation-sensitive language for numerical and matrix
/// programming.
#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Source file to run.
    file: Option<String>,

    /// Execute a code string directly.
    #[arg(short = 'c', value_name = "CODE")]
    code: Option<String>,

    /// Start interactive mode (REPL).
    #[arg(short, long)]
    interactive: bool,

    /// Parse only; print the AST instead of executing.
    #[arg(short, long)]
    parse_only: bool,

    /// Print token, node and memory statistics while running.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    if let Err(e) = simple_logger::SimpleLogger::new().with_level(level).init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    if args.interactive {
        interactive_mode();
        return;
    }

    let source = if let Some(code) = args.code {
        code
    } else if let Some(path) = &args.file {
        match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!("Cannot open file '{path}': {e}");
                std::process::exit(1);
            },
        }
    } else {
        eprintln!("Error: No input provided");
        eprintln!("Run with --help for usage.");
        std::process::exit(1);
    };

    run_code(&source, args.parse_only, args.verbose);
}

/// Runs one source string through the pipeline, reporting errors on stderr.
///
/// Parse and runtime errors are printed but do not change the exit code;
/// only unusable input (handled in `main`) exits non-zero.
fn run_code(source: &str, parse_only: bool, verbose: bool) {
    let tokens = match Lexer::new(source).tokenize() {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        },
    };

    if verbose {
        println!("Generated {} tokens", tokens.len());
    }

    let mut parser = Parser::new(tokens);
    parser.parse();

    if parser.has_errors() {
        for diagnostic in parser.diagnostics() {
            eprintln!("Parse error: {diagnostic}");
        }
        return;
    }

    if verbose {
        println!("Generated {} AST nodes", parser.node_count());
        println!("Memory usage: {} bytes", parser.memory_usage());
    }

    if parse_only {
        println!("Parsing completed successfully.");
        print!("{}", parser.ast_string());
        return;
    }

    let mut interpreter = Interpreter::new(&parser);
    if let Err(e) = interpreter.interpret() {
        eprintln!("{e}");
    }
}

/// The REPL: each line is lexed, parsed and interpreted independently.
fn interactive_mode() {
    println!("Dakota Interactive Mode");
    println!("Type 'exit' or 'quit' to exit, 'help' for help\n");

    let stdin = std::io::stdin();
    let mut line_number = 1usize;

    loop {
        print!("dakota:{line_number}> ");
        if std::io::stdout().flush().is_err() {
            return;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => {
                println!();
                return;
            },
            Ok(_) => {},
        }

        let input = line.trim_end();
        match input {
            "exit" | "quit" => {
                println!("Goodbye!");
                return;
            },
            "help" => {
                println!("Available commands:");
                println!("  exit, quit  - Exit the interpreter");
                println!("  help        - Show this help");
                println!("  Any Dakota code to execute\n");
                println!("Example Dakota code:");
                println!("  x = 42");
                println!("  matrix = [1, 2; 3, 4]");
                println!("  print(x, matrix)\n");
                continue;
            },
            "" => continue,
            _ => {},
        }

        run_code(input, false, false);
        line_number += 1;
    }
}
