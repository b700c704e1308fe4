//! lrd-editor - headless driver for the editor core
//!
//! Either prints the highlighting of one file (`--highlight`) or runs the
//! command terminal as a line-oriented REPL on stdin/stdout.

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

use lrd_editor::config::Config;
use lrd_editor::session::{CloseDecision, CloseOutcome, Document, SessionPrompt};
use lrd_editor::terminal::OutputBuffer;
use lrd_editor::{ConfigLoader, Editable, Session, Workbench};

/// Command line options
#[derive(Debug, Default, PartialEq)]
struct AppArgs {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Enable debug logging
    debug: bool,
    /// Print highlighting of this file and exit
    highlight: Option<PathBuf>,
    /// Print help and exit
    help: bool,
    /// Print version and exit
    version: bool,
}

impl AppArgs {
    /// Parse arguments, not including the program name
    fn parse_from<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let mut app_args = AppArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().context("Missing config file path")?;
                    app_args.config_path = Some(PathBuf::from(path));
                }
                "--highlight" | "-l" => {
                    let path = args.next().context("Missing file to highlight")?;
                    app_args.highlight = Some(PathBuf::from(path));
                }
                "--debug" | "-d" => app_args.debug = true,
                "--help" | "-h" => app_args.help = true,
                "--version" | "-v" => app_args.version = true,
                other => bail!("Unknown option: {}", other),
            }
        }

        Ok(app_args)
    }
}

fn print_help() {
    println!("lrd-editor - code editor core with an embedded terminal");
    println!();
    println!("USAGE:");
    println!("    lrd-editor [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>      Path to configuration file");
    println!("    -l, --highlight <FILE>   Print the highlighting of FILE and exit");
    println!("    -d, --debug              Enable debug logging");
    println!("    -h, --help               Print this help message");
    println!("    -v, --version            Print version information");
    println!();
    println!("Without options, reads terminal commands from stdin. Besides the");
    println!("terminal built-ins the REPL understands:");
    println!("    :open <FILE>             Open FILE as the active document");
    println!("    :run                     Run the active document");
    println!("    :quit                    Exit");
    println!();
    println!("ENVIRONMENT:");
    println!("    RUST_LOG                 Set logging level (error, warn, info, debug, trace)");
}

/// Prompt for a non-interactive host: never picks a path, keeps unsaved
/// work on close and saves what it can on exit
struct HeadlessPrompt;

impl SessionPrompt for HeadlessPrompt {
    fn confirm_close(&mut self, _document: &Document) -> CloseDecision {
        CloseDecision::Cancel
    }

    fn choose_save_path(&mut self, _document: &Document) -> Option<PathBuf> {
        None
    }

    fn confirm_close_all(&mut self, _unsaved: &[&Document]) -> CloseDecision {
        CloseDecision::Save
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = AppArgs::parse_from(env::args().skip(1)).unwrap_or_else(|e| {
        eprintln!("{}", e);
        print_help();
        process::exit(1);
    });

    if args.help {
        print_help();
        return Ok(());
    }
    if args.version {
        println!("{} v{}", lrd_editor::NAME, lrd_editor::VERSION);
        return Ok(());
    }

    let log_level = if args.debug { "debug" } else { "warn" };
    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = load_configuration(&args)?;

    if let Some(path) = &args.highlight {
        return print_highlighting(&config, path);
    }

    repl(config).await
}

fn load_configuration(args: &AppArgs) -> anyhow::Result<Config> {
    match &args.config_path {
        Some(path) => {
            debug!("Loading config from: {}", path.display());
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => Ok(lrd_editor::init()?),
    }
}

fn print_highlighting(config: &Config, path: &Path) -> anyhow::Result<()> {
    let mut session = Session::new(config);
    let handle = session.open_document(path)?;
    let document = session
        .document(handle)
        .context("Opened document disappeared")?;

    println!("{} ({})", path.display(), document.language());
    let lines = document.text().split('\n');
    for (number, (line, block)) in lines.zip(document.highlights()).enumerate() {
        for run in block.resolved() {
            println!(
                "{:>5} {:>9} {:>3}..{:<3} {:?}",
                number + 1,
                run.style,
                run.range.start,
                run.range.end,
                &line[run.range.clone()]
            );
        }
    }
    Ok(())
}

async fn repl(config: Config) -> anyhow::Result<()> {
    let mut workbench = Workbench::start(config).await?;
    info!("{} interpreters available", workbench.interpreters().len());

    let mut printed = Printed::default();
    print_new_output(workbench.terminal().output(), &mut printed);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_once(' ').map_or((line, ""), |(head, rest)| (head, rest.trim())) {
            (":quit", _) | (":q", _) => break,
            (":open", path) => match workbench.session_mut().open_document(Path::new(path)) {
                Ok(_) => {
                    let label = workbench.session().active().label();
                    workbench.terminal_mut().notify(format!("Opened {}", label));
                }
                Err(e) => {
                    workbench.terminal_mut().report_error(&e);
                }
            },
            (":run", _) => {
                if let Err(e) = workbench.run_active_document(&mut HeadlessPrompt).await {
                    error!("Run failed: {}", e);
                }
            }
            _ => {
                workbench.terminal_mut().execute(line).await;
            }
        }
        print_new_output(workbench.terminal().output(), &mut printed);
    }

    match workbench.session_mut().close_all(&mut HeadlessPrompt) {
        Ok(CloseOutcome::Closed) => {}
        Ok(CloseOutcome::Cancelled) => warn!("Untitled documents with changes were not saved"),
        Err(e) => error!("Saving documents on exit failed: {}", e),
    }
    Ok(())
}

/// How far the REPL has echoed the terminal output
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Printed {
    generation: u64,
    next_line: usize,
}

/// Lines appended since `printed`; a cleared buffer is replayed from its start
fn new_lines<'a>(output: &'a OutputBuffer, printed: &mut Printed) -> Vec<&'a str> {
    if output.generation() != printed.generation {
        *printed = Printed {
            generation: output.generation(),
            next_line: 0,
        };
    }
    let lines = output
        .lines()
        .filter(|line| line.line_number >= printed.next_line)
        .map(|line| line.text.as_str())
        .collect();
    printed.next_line = output.last().map_or(0, |line| line.line_number + 1);
    lines
}

fn print_new_output(output: &OutputBuffer, printed: &mut Printed) {
    for line in new_lines(output, printed) {
        println!("{}", line);
    }
}
