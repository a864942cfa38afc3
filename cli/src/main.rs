use clap::Parser;
use linevm::{
    Engine, EngineOptions, ExecutionOptions, IoSink, LoadOptions, render_diagnostics,
    render_error,
};
use miette::{Diagnostic, IntoDiagnostic, Result};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::debug;

/// linevm - run line-addressed stack machine programs
#[derive(Parser, Debug)]
#[command(name = "linevm")]
#[command(about = "Load and run a linevm program", long_about = None)]
struct Args {
    /// Stop the run after this many instructions
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Maximum number of values on the stack
    #[arg(long, value_name = "N", default_value_t = ExecutionOptions::default().max_stack_size)]
    max_stack: usize,

    /// Print the loaded program to stderr before running
    #[arg(long)]
    listing: bool,

    /// Print the final stack and accumulator to stderr
    #[arg(long)]
    dump_state: bool,

    /// Refuse to run a program with syntax errors
    #[arg(long)]
    strict: bool,

    /// Refuse to run a program with loader warnings
    #[arg(long)]
    deny_warnings: bool,

    /// Program file (if not provided, reads from stdin)
    program: Option<PathBuf>,
}

#[derive(Debug, Error, Diagnostic)]
enum CliError {
    #[error("refusing to read a program from an interactive terminal")]
    #[diagnostic(help("pass a program file, or pipe one in: `linevm < program.lvm`"))]
    InteractiveStdin,

    #[error("could not read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn read_program(args: &Args) -> Result<(String, String), CliError> {
    match &args.program {
        Some(path) => {
            let name = path.display().to_string();
            let source = std::fs::read_to_string(path).map_err(|source| CliError::Read {
                path: name.clone(),
                source,
            })?;
            Ok((name, source))
        }
        None => {
            if atty::is(atty::Stream::Stdin) {
                return Err(CliError::InteractiveStdin);
            }
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .map_err(|source| CliError::Read {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(("<stdin>".to_string(), source))
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use LINEVM_LOG or RUST_LOG environment variable to control log level
    // Default to WARN if not set
    let filter = EnvFilter::try_from_env("LINEVM_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let (name, source) = read_program(&args)?;

    let engine = Engine::new(EngineOptions {
        load: LoadOptions {
            fail_on_errors: args.strict,
            deny_warnings: args.deny_warnings,
        },
        execution: ExecutionOptions {
            max_steps: args.max_steps,
            max_stack_size: args.max_stack,
        },
    });

    let program = match engine.load(&source) {
        Ok(program) => program,
        Err(e) => {
            render_error(&e, &name, &source);
            return Ok(ExitCode::FAILURE);
        }
    };

    // Skipped lines and warnings don't stop the run, but the user should
    // see them.
    if !program.diagnostics().is_empty() {
        let use_color = atty::is(atty::Stream::Stderr);
        render_diagnostics(
            &name,
            &source,
            program.diagnostics(),
            &mut std::io::stderr(),
            use_color,
        )
        .into_diagnostic()?;
    }

    if args.listing {
        eprintln!("=== Program ===");
        eprint!("{}", program.program());
        eprintln!();
    }

    let stdout = std::io::stdout();
    let mut machine = match program.start(IoSink(stdout.lock())) {
        Ok(machine) => machine,
        Err(e) => {
            render_error(&e, &name, &source);
            return Ok(ExitCode::FAILURE);
        }
    };

    let result = machine.run();
    let steps = machine.steps();

    if args.dump_state {
        eprintln!("=== Final State ===");
        eprintln!("stack: {:?}", machine.stack());
        eprintln!("accumulator: {}", machine.accumulator());
        eprintln!("steps: {}", steps);
    }

    // Program output goes out before any error report.
    machine.into_sink().0.flush().into_diagnostic()?;

    match result {
        Ok(reason) => {
            debug!(?reason, steps, "program finished");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            render_error(&program.runtime_error(err), &name, &source);
            Ok(ExitCode::FAILURE)
        }
    }
}
