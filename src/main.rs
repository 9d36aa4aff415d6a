use clap::Parser;
use std::env::var;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wordsmith::{
    lang::tokenizing::{EditorLines, TokenStream},
    runtime::error,
    CodeManagement, Interpreter, InterpreterConfig, WordsmithInterpreter,
};

/// The environment variable holding an extra directory to search for imported files.
const LIB_PATH_VARIABLE: &str = "WORDSMITH_LIB_PATH";

/// The environment variable holding the log filter.
const LOG_VARIABLE: &str = "WORDSMITH_LOG";

#[derive(Parser)]
#[command(name = "wordsmith")]
#[command(about = "An extensible stack language interpreter")]
struct CliArgs {
    /// Source files to run in order.  Without any the interactive prompt is started.
    files: Vec<String>,

    /// Initial capacity of the data stack.
    #[arg(long, default_value_t = 64)]
    stack_size: usize,

    /// Don't load the bundled standard library.
    #[arg(long)]
    no_stdlib: bool,

    /// Extra directories to search when importing files.
    #[arg(long)]
    lib_path: Vec<String>,
}

/// Send log events to stderr, filtered by the log variable.  Only warnings are shown by default.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_VARIABLE).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

/// Ending the session with `bye` is a normal exit.
fn end_of_session_is_ok(result: error::Result<()>) -> error::Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(error) if error.is_end_of_session() => Ok(false),
        Err(error) => Err(error),
    }
}

fn main() -> error::Result<()> {
    init_tracing();

    let cli_args = CliArgs::parse();

    let config = InterpreterConfig {
        stack_capacity: cli_args.stack_size,
        load_stdlib: !cli_args.no_stdlib,
    };

    let mut interpreter = WordsmithInterpreter::with_config(&config)?;

    if let Ok(lib_path) = var(LIB_PATH_VARIABLE) {
        interpreter.add_search_path(&lib_path)?;
    }

    for path in &cli_args.lib_path {
        interpreter.add_search_path(path)?;
    }

    if !cli_args.files.is_empty() {
        for file in &cli_args.files {
            debug!(%file, "running file");

            if !end_of_session_is_ok(interpreter.process_source_file(file))? {
                break;
            }
        }

        return Ok(());
    }

    let editor = EditorLines::new("> ")?;
    let stream = TokenStream::new("<repl>", Box::new(editor));

    end_of_session_is_ok(interpreter.process_stream(stream))?;

    Ok(())
}
