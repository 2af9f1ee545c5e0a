//! CLI wrapper for the walkjs engine.
//!
//! Usage:
//!   walkjs <file.js>              # Execute a JavaScript file
//!   walkjs -e "code"              # Evaluate JavaScript code and print the result
//!   walkjs                        # Start REPL (interactive mode)
//!
//! Log verbosity is read from `WALKJS_LOG` (for example `WALKJS_LOG=walkjs=debug`).

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use walkjs::parser::{parse_to_token_tree, JsParser};
use walkjs::runner::api::Engine;
use walkjs::runner::ds::value::JsValue;
use walkjs::runner::plugin::EngineConfig;

/// Deeply nested scripts recurse deeply in the evaluator.
const EVALUATOR_STACK_SIZE: usize = 256 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "walkjs", author, version, about = "A tree-walking ECMAScript interpreter")]
struct Cli {
    /// Script to run.
    file: Option<PathBuf>,

    /// Evaluate the given source instead of a file.
    #[arg(short, long, conflicts_with = "file")]
    eval: Option<String>,

    /// Treat every program as strict mode code.
    #[arg(long)]
    strict: bool,

    /// Nested calls allowed before a RangeError.
    #[arg(long, default_value_t = 512)]
    max_call_depth: usize,

    /// Print the syntax tree instead of running the script.
    #[arg(long)]
    print_ast: bool,

    /// Print the raw parse tree instead of running the script.
    #[arg(long)]
    print_tokens: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let worker = thread::Builder::new()
        .name("walkjs-eval".to_string())
        .stack_size(EVALUATOR_STACK_SIZE)
        .spawn(move || run(cli));
    match worker.map(|handle| handle.join()) {
        Ok(Ok(code)) => code,
        Ok(Err(_)) => {
            eprintln!("evaluator thread panicked");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("could not start evaluator thread: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_env("WALKJS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr);
    if let Err(err) = builder.try_init() {
        eprintln!("failed to install tracing subscriber: {}", err);
    }
}

fn run(cli: Cli) -> ExitCode {
    let config = EngineConfig::default()
        .with_strict(cli.strict)
        .with_max_call_depth(cli.max_call_depth);

    let source = match (&cli.eval, &cli.file) {
        (Some(code), _) => code.clone(),
        (None, Some(path)) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        (None, None) => return run_repl(config),
    };

    if cli.print_tokens {
        return match parse_to_token_tree(&source) {
            Ok(tree) => {
                println!("{}", tree);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    let program = match JsParser::parse_to_ast_with_strictness(&source, cli.strict) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if cli.print_ast {
        println!("{:#?}", program);
        return ExitCode::SUCCESS;
    }

    let mut engine = Engine::new(config);
    match engine.evaluate_program(&program) {
        Ok(value) => {
            if cli.eval.is_some() && !matches!(value, JsValue::Undefined) {
                println!("{}", value);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", engine.describe_error(&e));
            ExitCode::FAILURE
        }
    }
}

fn run_repl(config: EngineConfig) -> ExitCode {
    println!("walkjs {} - type JavaScript and press Enter, .exit to quit", env!("CARGO_PKG_VERSION"));

    let mut engine = Engine::new(config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                return ExitCode::FAILURE;
            }
        }

        let input = input.trim();
        if input == ".exit" || input == ".quit" {
            break;
        }
        if input.is_empty() {
            continue;
        }

        match engine.evaluate_source(input) {
            Ok(JsValue::Undefined) => {}
            Ok(value) => println!("{}", value),
            Err(e) => eprintln!("{}", engine.describe_error(&e)),
        }
    }
    ExitCode::SUCCESS
}
