mod highlighter;
mod validator;

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use plang::{Engine, EngineOptions, render_diagnostics_to_string, render_error};
use plang_core::lexer;
use reedline::{
    DefaultPrompt, DefaultPromptSegment, EditCommand, Emacs, FileBackedHistory, KeyCode,
    KeyModifiers, Keybindings, Reedline, ReedlineEvent, Signal, default_emacs_keybindings,
};
use thiserror::Error;
use tracing::debug;

const HISTORY_SIZE: usize = 1000;

/// Plang - a small prototype-based scripting language
#[derive(Parser, Debug)]
#[command(name = "plang")]
#[command(about = "Run Plang programs", long_about = None)]
struct Args {
    /// Program file to run (reads stdin, or starts a REPL on a terminal, when omitted)
    file: Option<PathBuf>,

    /// Program text to run instead of a file
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,

    /// Print the token stream (for debugging)
    #[arg(long)]
    tokens: bool,

    /// Print the syntax tree (for debugging)
    #[arg(long)]
    tree: bool,

    /// Start from an empty root scope without operators or builtins
    #[arg(long)]
    no_prelude: bool,

    /// Report every syntax error instead of stopping at the first one
    #[arg(long)]
    recover: bool,
}

#[derive(Debug, Error, miette::Diagnostic)]
enum CliError {
    #[error("cannot read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read standard input")]
    Stdin(#[source] std::io::Error),

    #[error("program failed")]
    #[diagnostic(help("the error above describes what went wrong"))]
    Failed,
}

fn add_keybindings(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::ALT,
        KeyCode::Enter,
        ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
    );
}

fn setup_reedline() -> (Reedline, DefaultPrompt) {
    let mut keybindings = default_emacs_keybindings();
    add_keybindings(&mut keybindings);
    let edit_mode = Box::new(Emacs::new(keybindings));

    let mut line_editor = Reedline::create()
        .with_highlighter(Box::new(highlighter::Highlighter))
        .with_validator(Box::new(validator::RegionValidator))
        .with_edit_mode(edit_mode);

    let history_path = dirs::data_dir().map(|dir| dir.join("plang").join("history"));
    if let Some(path) = history_path {
        match FileBackedHistory::with_file(HISTORY_SIZE, path) {
            Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
            Err(e) => debug!("history disabled: {}", e),
        }
    }

    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("plang".to_string()),
        DefaultPromptSegment::Empty,
    );

    (line_editor, prompt)
}

/// Run one chunk of source. Errors are rendered to stderr; the return value
/// says whether the chunk succeeded.
fn interpret_input(engine: &Engine, input: &str, args: &Args) -> bool {
    if args.tokens {
        match lexer::tokenize(input) {
            Ok(tokens) => {
                println!("=== Tokens ===");
                for token in &tokens {
                    println!("{}", token);
                }
                println!();
            }
            Err(e) => {
                render_error(input, &e.into());
                return false;
            }
        }
    }

    if args.recover {
        let diagnostics = engine.check(input);
        if !diagnostics.is_empty() {
            let use_color = atty::is(atty::Stream::Stderr);
            eprint!("{}", render_diagnostics_to_string(input, &diagnostics, use_color));
            return false;
        }
    }

    let program = match engine.compile(input) {
        Ok(program) => program,
        Err(e) => {
            render_error(input, &e);
            return false;
        }
    };

    if args.tree {
        println!("=== Syntax Tree ===");
        print!("{}", program.tree());
        println!();
    }

    match engine.run(&program) {
        Ok(value) => {
            if !value.is_undefined() {
                println!("{}", value);
            }
            true
        }
        Err(e) => {
            render_error(input, &e);
            false
        }
    }
}

fn run_batch(engine: &Engine, source: &str, args: &Args) -> Result<()> {
    if interpret_input(engine, source, args) {
        Ok(())
    } else {
        Err(CliError::Failed.into())
    }
}

fn run_repl(engine: &Engine, args: &Args) -> Result<()> {
    let (mut line_editor, prompt) = setup_reedline();

    println!("Plang REPL - Type programs to evaluate (Ctrl+D or Ctrl+C to exit)");

    loop {
        let sig = match line_editor.read_line(&prompt) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Reedline error: {e}");
                return Ok(());
            }
        };

        match sig {
            Signal::Success(buffer) => {
                // Errors are reported and the session keeps its state.
                interpret_input(engine, &buffer, args);
            }
            Signal::CtrlD | Signal::CtrlC => {
                println!("\nGoodbye!");
                return Ok(());
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    // Use PLANG_LOG or RUST_LOG environment variable to control log level
    // Default to WARN if not set
    let filter = EnvFilter::try_from_env("PLANG_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new("warn"))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let engine = Engine::new(EngineOptions {
        prelude: !args.no_prelude,
        ..EngineOptions::default()
    });

    if let Some(source) = &args.eval {
        return run_batch(&engine, source, &args);
    }

    if let Some(path) = &args.file {
        let source = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?;
        return run_batch(&engine, &source, &args);
    }

    if atty::is(atty::Stream::Stdin) {
        run_repl(&engine, &args)
    } else {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .map_err(CliError::Stdin)?;
        run_batch(&engine, &source, &args)
    }
}
