// gridcalc CLI - headless batch grid evaluation

mod exit_codes;

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use gridcalc_engine::cell::Cell;
use gridcalc_engine::error::EvalError;
use gridcalc_engine::eval::evaluate_with_report;
use gridcalc_engine::grid::Grid;
use gridcalc_io::error::IoError;

use exit_codes::{eval_exit_code, io_exit_code, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "gcalc")]
#[command(about = "Batch evaluation of grid formula files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a grid and write the fully resolved result
    #[command(after_help = "\
Examples:
  gcalc eval sheet.json
  gcalc eval sheet.csv -o resolved.csv
  gcalc eval sheet.json -t csv
  cat sheet.json | gcalc eval -f json
  gcalc eval sheet.json --stats")]
    Eval {
        /// Input file (omit to read from stdin)
        input: Option<PathBuf>,

        /// Input format (required when reading from stdin)
        #[arg(long, short = 'f')]
        from: Option<Format>,

        /// Output format (inferred from the output path, else same as input)
        #[arg(long, short = 't')]
        to: Option<Format>,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the evaluation report to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Evaluate a grid and report diagnostics without writing the result
    #[command(after_help = "\
Examples:
  gcalc check sheet.json
  cat sheet.csv | gcalc check -f csv
  gcalc check sheet.json --stats")]
    Check {
        /// Input file (omit to read from stdin)
        input: Option<PathBuf>,

        /// Input format (required when reading from stdin)
        #[arg(long, short = 'f')]
        from: Option<Format>,

        /// Print the evaluation report to stderr
        #[arg(long)]
        stats: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Eval {
            input,
            from,
            to,
            output,
            stats,
        } => cmd_eval(input, from, to, output, stats),
        Commands::Check { input, from, stats } => cmd_check(input, from, stats),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError {
            code,
            message,
            hint,
        }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
struct CliError {
    code: u8,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn args(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }

    fn io(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_IO,
            message: msg.into(),
            hint: None,
        }
    }

    /// Evaluation failures carry their class code from the registry.
    fn eval(err: &EvalError) -> Self {
        Self {
            code: eval_exit_code(err),
            message: err.to_string(),
            hint: None,
        }
    }

    fn read(err: IoError) -> Self {
        Self {
            code: io_exit_code(&err),
            message: err.to_string(),
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// eval
// ============================================================================

fn cmd_eval(
    input: Option<PathBuf>,
    from: Option<Format>,
    to: Option<Format>,
    output: Option<PathBuf>,
    stats: bool,
) -> Result<(), CliError> {
    let in_format = resolve_input_format(&input, from)?;

    // Pick the writer before evaluating so a bad -o extension fails fast
    let out_format = match (to, &output) {
        (Some(format), _) => format,
        (None, Some(path)) => {
            infer_format(path).map_err(|e| e.with_hint("use --to with one of: json, csv"))?
        }
        (None, None) => in_format,
    };

    let grid = read_grid(&input, in_format)?;
    let (resolved, report) = evaluate_with_report(grid).map_err(|e| CliError::eval(&e))?;

    if stats {
        eprintln!("{}", report.log_line());
    }

    match output {
        Some(path) => {
            let result = match out_format {
                Format::Json => gridcalc_io::json::export(&resolved, &path),
                Format::Csv => gridcalc_io::csv::export(&resolved, &path),
            };
            result.map_err(CliError::read)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            match out_format {
                Format::Json => {
                    gridcalc_io::json::export_to_writer(&resolved, &mut handle)
                        .map_err(CliError::read)?;
                    writeln!(handle).map_err(|e| CliError::io(e.to_string()))?;
                }
                Format::Csv => {
                    gridcalc_io::csv::export_to_writer(&resolved, &mut handle)
                        .map_err(CliError::read)?;
                }
            }
        }
    }

    Ok(())
}

// ============================================================================
// check
// ============================================================================

fn cmd_check(input: Option<PathBuf>, from: Option<Format>, stats: bool) -> Result<(), CliError> {
    let format = resolve_input_format(&input, from)?;
    let grid = read_grid(&input, format)?;

    let (_, report) = evaluate_with_report(grid).map_err(|e| CliError::eval(&e))?;

    if stats {
        eprintln!("{}", report.log_line());
    }
    println!("ok: {}", report.summary());

    Ok(())
}

// ============================================================================
// input plumbing
// ============================================================================

fn resolve_input_format(
    input: &Option<PathBuf>,
    from: Option<Format>,
) -> Result<Format, CliError> {
    if let Some(format) = from {
        return Ok(format);
    }
    match input {
        Some(path) => {
            infer_format(path).map_err(|e| e.with_hint("use --from with one of: json, csv"))
        }
        None => Err(CliError::args("reading from stdin requires --from")
            .with_hint("cat sheet.json | gcalc eval -f json")),
    }
}

fn infer_format(path: &PathBuf) -> Result<Format, CliError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("json") => Ok(Format::Json),
        Some("csv") => Ok(Format::Csv),
        _ => Err(CliError::args(format!(
            "cannot infer format from extension {:?}",
            ext.as_deref().unwrap_or("(none)")
        ))),
    }
}

fn read_grid(input: &Option<PathBuf>, format: Format) -> Result<Grid<Cell>, CliError> {
    match input {
        Some(path) => {
            let result = match format {
                Format::Json => gridcalc_io::json::import(path),
                Format::Csv => gridcalc_io::csv::import(path),
            };
            result.map_err(|e| match e {
                IoError::Io(inner) => CliError::io(format!("{}: {}", path.display(), inner)),
                other => CliError::read(other),
            })
        }
        None => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .map_err(|e| CliError::io(e.to_string()))?;

            if content.is_empty() {
                return Err(CliError::io("no input received on stdin")
                    .with_hint("cat sheet.json | gcalc eval -f json"));
            }

            let result = match format {
                Format::Json => gridcalc_io::json::import_from_reader(content.as_bytes()),
                Format::Csv => gridcalc_io::csv::import_from_reader(content.as_bytes()),
            };
            result.map_err(CliError::read)
        }
    }
}
