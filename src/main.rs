//! clasp - command line driver

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clasp::frontend::listing::write_listing;
use clasp::util::config::SessionConfig;
use clasp::util::diagnostic::{DiagnosticEmitter, JsonEmitter, TextEmitter};
use clasp::util::logger;
use clasp::util::span::SourceFile;
use clasp::{FrontendError, Session, NAME, VERSION};

/// Tokenizer, parser and class table of the clasp language
#[derive(Parser, Debug)]
#[command(name = "clasp")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file to use instead of the discovered one
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Print diagnostics and statistics as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored diagnostics
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the tokens of a source file
    Tokens {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List the AST nodes of a source file
    Ast {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Tokenize and parse a source file, reporting the first error
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print name and class table statistics
        #[arg(long)]
        stats: bool,
    },

    /// Print version information
    Version,
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(path) => {
            SessionConfig::load(path).with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => SessionConfig::discover().context("Failed to load config"),
    }
}

fn load_source(path: &Path) -> Result<SourceFile> {
    SourceFile::load(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Render the first error of a unit to stderr
fn report(
    args: &Args,
    config: &SessionConfig,
    source: &SourceFile,
    error: &FrontendError,
) -> Result<()> {
    let diagnostic = error.to_diagnostic();
    let mut stderr = io::stderr().lock();
    if args.json {
        JsonEmitter::default().emit(&diagnostic, source, &mut stderr)?;
    } else {
        let use_colors = !args.no_color && config.log.color && io::stderr().is_terminal();
        TextEmitter::new(use_colors).emit(&diagnostic, source, &mut stderr)?;
    }
    Ok(())
}

fn run(args: &Args) -> Result<ExitCode> {
    let config = load_config(args.config.as_deref())?;
    logger::init_with_level(config.log.level.raised(args.verbose));
    tracing::debug!(version = VERSION, host = std::env::consts::OS, "clasp started");

    let mut session = Session::new(config.clone());
    let mut stdout = io::stdout().lock();

    match &args.command {
        Commands::Tokens { file } => {
            let source = load_source(file)?;
            match session.tokenize(source.bytes()) {
                Ok(tokens) => write_listing(&mut stdout, &tokens, session.names(), session.statics())?,
                Err(err) => {
                    report(args, &config, &source, &FrontendError::from(err))?;
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Ast { file } => {
            let source = load_source(file)?;
            match session.compile_unit(source.bytes()) {
                Ok(unit) => write_listing(&mut stdout, &unit.ast, session.names(), session.statics())?,
                Err(err) => {
                    report(args, &config, &source, &err)?;
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Check { file, stats } => {
            let source = load_source(file)?;
            if let Err(err) = session.compile_unit(source.bytes()) {
                report(args, &config, &source, &err)?;
                return Ok(ExitCode::FAILURE);
            }
            if *stats {
                let stats = session.stats();
                if args.json {
                    serde_json::to_writer_pretty(&mut stdout, &stats)?;
                    writeln!(stdout)?;
                } else {
                    writeln!(stdout, "--- Names ---")?;
                    writeln!(stdout, "Entries: {}", stats.names)?;
                    writeln!(stdout, "Bytes: {}", stats.name_bytes)?;
                    writeln!(stdout, "Collisions: {}", stats.name_collisions)?;
                    writeln!(stdout, "Statics: {} bytes", stats.statics_bytes)?;
                    writeln!(stdout, "--- Classes ---")?;
                    writeln!(stdout, "Records: {}", stats.classes.records)?;
                    writeln!(stdout, "Arrays: {}", stats.classes.arrays)?;
                    writeln!(stdout, "Tuples: {}", stats.classes.tuples)?;
                    writeln!(stdout, "Procedure pointers: {}", stats.classes.proc_pointers)?;
                    writeln!(stdout, "Structs: {}", stats.classes.structs)?;
                    writeln!(stdout, "Enums: {}", stats.classes.enums)?;
                    writeln!(stdout, "Procedures: {}", stats.classes.procedures)?;
                    writeln!(stdout, "Instances: {}", stats.classes.instances)?;
                    writeln!(stdout, "Collisions: {}", stats.classes.collisions)?;
                }
            } else {
                eprintln!("{}: ok", source.name);
            }
        }
        Commands::Version => {
            writeln!(stdout, "{NAME} {VERSION}")?;
            if args.verbose > 0 {
                writeln!(stdout, "Host: {}", std::env::consts::OS)?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    run(&args)
}
