//! Command line host for RSPT grammars.
//!
//! ```bash
//! # Rewrite input.txt with the grammar's exported rule.
//! rspt parse calc.rspt input.txt -o out.txt
//!
//! # Compile a grammar and print it back in canonical form.
//! rspt check calc.rspt --print
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use parsegen::{Grammar, Interpreter, OffsetMode, Options, OutputMode};

#[derive(Parser)]
#[command(name = "rspt")]
#[command(version)]
#[command(about = "Interpret action-annotated PEG grammars")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite an input file using a grammar
    Parse {
        /// Grammar file
        grammar: PathBuf,

        /// Input file ("-" reads stdin)
        input: PathBuf,

        /// Output file (writes stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep output of failed alternatives
        #[arg(long)]
        shared_output: bool,

        /// Report the furthest offset reached on failure
        #[arg(long)]
        deepest_offset: bool,

        /// Start from this non-terminal instead of the single export
        #[arg(long)]
        export: Option<String>,
    },

    /// Compile a grammar and report what it defines
    Check {
        /// Grammar file
        grammar: PathBuf,

        /// Print the grammar in canonical form
        #[arg(long)]
        print: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Parse {
            grammar,
            input,
            output,
            shared_output,
            deepest_offset,
            export,
        } => {
            let mut options = Options::default();
            if shared_output {
                options = options.output(OutputMode::Shared);
            }
            if deepest_offset {
                options = options.offset(OffsetMode::Deepest);
            }
            parse(&grammar, &input, output.as_deref(), options, export.as_deref())
        }
        Commands::Check { grammar, print } => check(&grammar, print),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_grammar(path: &Path) -> Result<Grammar> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read grammar {}", path.display()))?;
    let grammar = text
        .parse()
        .with_context(|| format!("invalid grammar {}", path.display()))?;
    Ok(grammar)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read input {}", path.display()))
    }
}

fn parse(
    grammar: &Path,
    input: &Path,
    output: Option<&Path>,
    options: Options,
    export: Option<&str>,
) -> Result<()> {
    let grammar = load_grammar(grammar)?;
    let text = read_input(input)?;

    let interpreter = Interpreter::with_options(&grammar, options);
    let result = match export {
        Some(name) => interpreter.parse_with(name, &text)?,
        None => interpreter.parse(&text)?,
    };
    tracing::info!(bytes = result.len(), "input rewritten");

    match output {
        Some(path) => fs::write(path, result)
            .with_context(|| format!("failed to write output {}", path.display()))?,
        None => io::stdout()
            .write_all(result.as_bytes())
            .context("failed to write stdout")?,
    }
    Ok(())
}

fn check(path: &Path, print: bool) -> Result<()> {
    let grammar = load_grammar(path)?;
    let exports: Vec<&str> = grammar
        .exports()
        .iter()
        .map(|id| grammar[*id].name.as_str())
        .collect();

    println!(
        "{}: {} non terminals, {} exported ({})",
        path.display(),
        grammar.len(),
        exports.len(),
        exports.join(", ")
    );
    if print {
        println!();
        print!("{}", grammar);
    }
    Ok(())
}
