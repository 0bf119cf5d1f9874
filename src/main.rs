//! Selene Notebook - summary export and history from the command line
//!
//! Entry point for the binary. Handles CLI argument parsing,
//! logging initialization, and dispatch to the library.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use selene_notebook::config::Config;
use selene_notebook::export::{
    ChoiceOutcome, DirectorySink, ExportChoice, ExportCoordinator, ExportFormat, ExportOutcome, FixedChoice,
    OfferOutcome,
};
use selene_notebook::history::{FileStore, HistoryStore, NewSummary, PREVIEW_CHARS};
use selene_notebook::layout::PageLayoutEngine;
use selene_notebook::paragraph::Paragraphs;
use selene_notebook::utils::text;

/// Application name for logging
const APP_NAME: &str = "selene-notebook";

/// Parsed command line
#[derive(Debug)]
enum Command {
    Export {
        input: PathBuf,
        format: ExportFormat,
        name: Option<String>,
        out: Option<PathBuf>,
    },
    Segment {
        input: PathBuf,
    },
    Layout {
        input: PathBuf,
    },
    History(HistoryCommand),
}

#[derive(Debug)]
enum HistoryCommand {
    List,
    Count,
    Show(i64),
    Save {
        input: PathBuf,
        original: Option<PathBuf>,
        method: Option<String>,
        model: Option<String>,
    },
    Delete(i64),
    Clear,
    Export {
        id: i64,
        format: ExportFormat,
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let command = parse_args();
    log::debug!("Running {:?}", command);

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Ignoring unusable configuration: {}", e);
        Config::default()
    });

    match command {
        Command::Export {
            input,
            format,
            name,
            out,
        } => {
            let document = read_input(&input)?;
            let exporter = directory_exporter(&config, out)?;
            let result = match name {
                Some(name) => exporter.export(&document, format, &name).await,
                None => exporter.quick_export(&document, format).await,
            };
            match result {
                Ok(outcome) => report_export(&outcome),
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    return Err(e).context("export failed");
                }
            }
        }
        Command::Segment { input } => {
            let document = read_input(&input)?;
            let paragraphs = Paragraphs::parse(&document);
            println!("{} paragraph(s)", paragraphs.len());
            for (i, paragraph) in paragraphs.iter().enumerate() {
                println!(
                    "[{}] {} words: {}",
                    i,
                    text::word_count(paragraph),
                    text::truncate(paragraph.trim(), 80)
                );
            }
        }
        Command::Layout { input } => {
            let document = read_input(&input)?;
            let pages = PageLayoutEngine::new(config.layout.clone()).layout(&document);
            println!("{}", serde_json::to_string_pretty(&pages)?);
        }
        Command::History(command) => run_history(command, &config).await?,
    }

    Ok(())
}

async fn run_history(command: HistoryCommand, config: &Config) -> anyhow::Result<()> {
    let store_dir = Config::store_dir().context("no data directory for the history store")?;
    let history = HistoryStore::new(FileStore::new(store_dir), &config.history);

    match command {
        HistoryCommand::List => {
            let records = history.list();
            if records.is_empty() {
                println!("No saved summaries");
            }
            for record in records {
                println!(
                    "{}  {}  [{} / {}]",
                    record.id,
                    record.display_timestamp(),
                    record.method_label(),
                    record.model_label()
                );
                println!("    {}", record.preview(PREVIEW_CHARS));
            }
        }
        HistoryCommand::Count => println!("{}", history.count()),
        HistoryCommand::Show(id) => match history.get(id) {
            Some(record) => println!("{}", record.to_report_markdown()),
            None => bail!("no saved summary with id {}", id),
        },
        HistoryCommand::Save {
            input,
            original,
            method,
            model,
        } => {
            let mut summary = NewSummary::new(read_input(&input)?);
            if let Some(original) = original {
                summary = summary.with_original_text(read_input(&original)?);
            }
            if let Some(method) = method {
                summary = summary.with_method(method);
            }
            if let Some(model) = model {
                summary = summary.with_model(model);
            }
            match history.save(summary) {
                Some(record) => println!("Saved summary {}", record.id),
                None => bail!("could not save the summary to history"),
            }
        }
        HistoryCommand::Delete(id) => {
            if !history.delete(id) {
                bail!("could not delete summary {}", id);
            }
        }
        HistoryCommand::Clear => {
            if !history.clear() {
                bail!("could not clear the summary history");
            }
        }
        HistoryCommand::Export { id, format, out } => {
            let Some(record) = history.get(id) else {
                bail!("no saved summary with id {}", id);
            };
            let exporter = directory_exporter(config, out)?;
            match exporter
                .export_record(&record, &FixedChoice(ExportChoice::Format(format)))
                .await
            {
                Ok(ChoiceOutcome::Exported(outcome)) => report_export(&outcome),
                Ok(ChoiceOutcome::Cancelled) => println!("Export cancelled"),
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    return Err(e).context("export failed");
                }
            }
        }
    }

    Ok(())
}

fn directory_exporter(config: &Config, out: Option<PathBuf>) -> anyhow::Result<ExportCoordinator<DirectorySink>> {
    let dir = match out.or_else(|| config.export.output_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir().context("could not determine the current directory")?,
    };
    Ok(ExportCoordinator::new(DirectorySink::new(dir), config))
}

fn report_export(outcome: &ExportOutcome) {
    if outcome.fell_back {
        println!("Page layout unavailable, exported a print-ready document instead");
    }
    match &outcome.offer {
        OfferOutcome::Delivered {
            location: Some(path),
        } => println!("Exported {}", path.display()),
        OfferOutcome::Delivered { location: None } => println!("Exported {}", outcome.filename),
        OfferOutcome::Declined => println!("Export of {} was declined", outcome.filename),
    }
}

/// Read a text file, or standard input for `-`
fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        return std::io::read_to_string(std::io::stdin()).context("could not read standard input");
    }
    std::fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))
}

/// Initialize the logging system
fn init_logging() {
    // Set default log level if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,selene_notebook=debug");
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("Use --help for usage information");
    std::process::exit(1);
}

/// Take the value following an option
fn option_value(args: &[String], i: &mut usize, option: &str) -> String {
    if *i + 1 < args.len() {
        *i += 1;
        args[*i].clone()
    } else {
        fail(&format!("{} requires a value", option))
    }
}

fn parse_format(value: &str) -> ExportFormat {
    value.parse().unwrap_or_else(|e| fail(&format!("{}", e)))
}

fn parse_id(value: Option<&String>) -> i64 {
    match value.map(|v| v.parse::<i64>()) {
        Some(Ok(id)) => id,
        Some(Err(_)) => fail("summary id must be a number"),
        None => fail("a summary id is required"),
    }
}

/// Parse command line arguments
fn parse_args() -> Command {
    let args: Vec<String> = std::env::args().collect();

    let mut positional: Vec<String> = Vec::new();
    let mut format = ExportFormat::Plain;
    let mut name = None;
    let mut out = None;
    let mut original = None;
    let mut method = None;
    let mut model = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-f" | "--format" => format = parse_format(&option_value(&args, &mut i, "--format")),
            "-n" | "--name" => name = Some(option_value(&args, &mut i, "--name")),
            "-o" | "--out" => out = Some(PathBuf::from(option_value(&args, &mut i, "--out"))),
            "--original" => original = Some(PathBuf::from(option_value(&args, &mut i, "--original"))),
            "--method" => method = Some(option_value(&args, &mut i, "--method")),
            "--model" => model = Some(option_value(&args, &mut i, "--model")),
            arg if arg.starts_with('-') && arg != "-" => fail(&format!("unknown option: {}", arg)),
            _ => positional.push(args[i].clone()),
        }
        i += 1;
    }

    let input = |at: usize| -> PathBuf {
        positional
            .get(at)
            .map(PathBuf::from)
            .unwrap_or_else(|| fail("an input file is required (use - for standard input)"))
    };

    match positional.first().map(String::as_str) {
        Some("export") => Command::Export {
            input: input(1),
            format,
            name,
            out,
        },
        Some("segment") => Command::Segment { input: input(1) },
        Some("layout") => Command::Layout { input: input(1) },
        Some("history") => Command::History(match positional.get(1).map(String::as_str) {
            None | Some("list") => HistoryCommand::List,
            Some("count") => HistoryCommand::Count,
            Some("show") => HistoryCommand::Show(parse_id(positional.get(2))),
            Some("save") => HistoryCommand::Save {
                input: input(2),
                original,
                method,
                model,
            },
            Some("delete") => HistoryCommand::Delete(parse_id(positional.get(2))),
            Some("clear") => HistoryCommand::Clear,
            Some("export") => HistoryCommand::Export {
                id: parse_id(positional.get(2)),
                format,
                out,
            },
            Some(other) => fail(&format!("unknown history command: {}", other)),
        }),
        Some(other) => fail(&format!("unknown command: {}", other)),
        None => {
            print_help();
            std::process::exit(1);
        }
    }
}

/// Print help message
fn print_help() {
    println!(
        r#"Selene Notebook - summary export and history

USAGE:
    selene-notebook <COMMAND> [OPTIONS]

COMMANDS:
    export <FILE>               Export a markdown summary
    segment <FILE>              List the ###-separated paragraphs of a summary
    layout <FILE>               Print the page layout as JSON
    history [list]              List saved summaries, newest first
    history count               Number of saved summaries
    history show <ID>           Print the report for a saved summary
    history save <FILE>         Save a summary to history
    history delete <ID>         Delete a saved summary
    history clear               Delete every saved summary
    history export <ID>         Export the report for a saved summary

OPTIONS:
    -h, --help          Show this help message
    -v, --version       Show version information
    -f, --format        Export format: plain, rich or pdf (default: plain)
    -n, --name          Base name of the exported file (default: ai-summary)
    -o, --out           Directory for exported files
    --original <FILE>   Source text stored with a saved summary
    --method <NAME>     Summarization method stored with a saved summary
    --model <NAME>      Model name stored with a saved summary

Use - as FILE to read from standard input.

EXAMPLES:
    selene-notebook export summary.md --format pdf
    selene-notebook history save summary.md --model llama3
    selene-notebook history export 1714566605000 -f rich -o ~/Documents
"#
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
}
