//! Purpose: `fasttrack` CLI entry point and command dispatch.
//! Role: Binary crate root; parses args, reads one file, emits JSON on stdout.
//! Invariants: Commands emit JSON on stdout; `check` also has a human form.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: Logging goes to stderr only and never changes stdout payloads.
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod rows_json;

use fasttrack::api::{
    ColumnErrorPolicy, DecodeReport, Error, ErrorKind, ReadOptions, ReportStatus, TableKind,
    to_exit_code,
};
use fasttrack::notice::{Notice, notice_json};
use rows_json::{blocks_json, data_json, report_json};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let args: Vec<OsString> = std::env::args_os().collect();
    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                let message = clap_error_summary(&err);
                let hint = usage_hint(&args);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(hint),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing(cli.log_level.as_deref());
    let color_mode = cli.color;
    let policy = if cli.strict {
        ColumnErrorPolicy::Stop
    } else {
        ColumnErrorPolicy::Skip
    };
    let options = ReadOptions::new().with_column_errors(policy);

    command_dispatch::dispatch_command(cli.command, options, color_mode)
        .map_err(add_malformed_hint)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

fn init_tracing(filter: Option<&str>) {
    let env_filter = match filter {
        Some(filter) => EnvFilter::new(filter),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "fasttrack",
    version,
    about = "Decode FastTrack Schedule files into JSON tables",
    long_about = None,
    before_help = r#"Reads a FastTrack binary file and recovers the Activities, Resources,
and ActBars tables. Columns that cannot be decoded are skipped and reported.
"#,
    after_help = r#"EXAMPLES
  $ fasttrack dump plan.fts
  $ fasttrack dump plan.fts --table activities
  $ fasttrack blocks plan.fts
  $ fasttrack check plan.fts
  $ RUST_LOG=debug fasttrack dump plan.fts     # trace framing decisions on stderr"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Fail on the first malformed column instead of skipping it"
    )]
    strict: bool,
    #[arg(
        long,
        global = true,
        value_name = "FILTER",
        help = "Log filter for stderr diagnostics (default: RUST_LOG or `warn`)"
    )]
    log_level: Option<String>,
    #[arg(
        long,
        global = true,
        default_value = "auto",
        help = "Colorize human-readable error output"
    )]
    color: ColorMode,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TableArg {
    Activities,
    Resources,
    Actbars,
}

impl From<TableArg> for TableKind {
    fn from(value: TableArg) -> Self {
        match value {
            TableArg::Activities => TableKind::Activities,
            TableArg::Resources => TableKind::Resources,
            TableArg::Actbars => TableKind::ActBars,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        arg_required_else_help = true,
        about = "Print decoded tables as JSON",
        long_about = r#"Decode a file and print its tables as JSON.

Rows are objects keyed by field; null fields are omitted. Columns that were
dropped are reported as notices on stderr."#,
        after_help = r#"EXAMPLES
  $ fasttrack dump plan.fts
  $ fasttrack dump plan.fts --table resources
  $ fasttrack dump --strict plan.fts"#
    )]
    Dump {
        #[arg(help = "FastTrack file", value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long, value_enum, help = "Only print one table")]
        table: Option<TableArg>,
    },
    #[command(
        arg_required_else_help = true,
        about = "Print block layout as JSON",
        long_about = r#"Print every top-level block with its classification and, for column
blocks, each column sub-block with its tag, name, and outcome."#
    )]
    Blocks {
        #[arg(help = "FastTrack file", value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
    #[command(
        arg_required_else_help = true,
        about = "Report dropped columns",
        after_help = r#"NOTES
  - Human-readable output is the default.
  - Use --json for machine-readable output.
  - Exits nonzero when a column was malformed."#
    )]
    Check {
        #[arg(help = "FastTrack file", value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(about = "Print version info as JSON")]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        after_help = r#"EXAMPLES
  $ fasttrack completion bash > ~/.local/share/bash-completion/completions/fasttrack
  $ fasttrack completion zsh > ~/.zfunc/_fasttrack"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::NotFound => err.with_hint("Check the file path."),
        ErrorKind::Permission => err.with_hint("Permission denied. Check file permissions."),
        ErrorKind::Io => err.with_hint("I/O error. Check the path and filesystem."),
        _ => err,
    }
}

fn add_malformed_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Malformed || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "The file does not match a known FastTrack layout. Without --strict, bad columns are skipped.",
    )
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_BACKTRACE=1 and share command/context if it persists.",
    )
}

fn emit_json(value: Value) {
    let pretty = io::stdout().is_terminal();
    let json = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_check_human(file: &str, report: &DecodeReport) {
    let status = match report.status {
        ReportStatus::Clean => "OK",
        ReportStatus::Degraded => "DEGRADED",
    };
    println!(
        "{status}: {file} ({} blocks, {}/{} columns kept)",
        report.block_count, report.columns_registered, report.columns_seen
    );
    for issue in &report.issues {
        let column = issue.name.as_deref().unwrap_or("?");
        println!(
            "  {:<13} offset {:>8}  {column}: {}",
            issue.code, issue.offset, issue.message
        );
    }
}

fn emit_version_output() {
    emit_json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }));
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let label = colorize_label("notice:", color_mode.use_color(is_tty), AnsiColor::Yellow);
        eprintln!("{label} {} ({})", notice.message, notice.kind);
        return;
    }

    let value = notice_json(notice);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Malformed => "malformed record".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(offset) = err.offset() {
        inner.insert("offset".to_string(), json!(offset));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(offset) = err.offset() {
        lines.push(format!(
            "{} {offset}",
            colorize_label("offset:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

/// Points at the help of the subcommand the user was reaching for, if any.
fn usage_hint(args: &[OsString]) -> String {
    let cli = Cli::command();
    let subcommand = args.iter().skip(1).find_map(|arg| {
        let arg = arg.to_str()?;
        cli.get_subcommands()
            .find(|sub| sub.get_name() == arg)
            .map(|sub| sub.get_name().to_string())
    });
    match subcommand {
        Some(name) => format!("Try `fasttrack {name} --help`."),
        None => "Try `fasttrack --help`.".to_string(),
    }
}
