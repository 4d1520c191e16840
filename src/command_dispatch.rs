//! Purpose: Hold top-level CLI command dispatch for `fasttrack`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Every file command reads through `api::read_path_with`.
//! Invariants: Exit code is nonzero for `check` only when a column was malformed.

use super::*;

pub(super) fn dispatch_command(
    command: Command,
    options: ReadOptions,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "fasttrack", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output();
            Ok(RunOutcome::ok())
        }
        Command::Dump { file, table } => {
            let data = fasttrack::api::read_path_with(&file, options)?;
            let label = file.display().to_string();
            for issue in &data.report().issues {
                if issue.code == "malformed" {
                    let notice = fasttrack::notice::column_notice("dump", &label, issue);
                    emit_notice(&notice, color_mode);
                }
            }
            emit_json(data_json(&data, table.map(TableKind::from)));
            Ok(RunOutcome::ok())
        }
        Command::Blocks { file } => {
            let data = fasttrack::api::read_path_with(&file, options)?;
            emit_json(blocks_json(&data));
            Ok(RunOutcome::ok())
        }
        Command::Check { file, json } => {
            let data = fasttrack::api::read_path_with(&file, options)?;
            let label = file.display().to_string();
            let report = data.report();
            if json {
                emit_json(report_json(&label, report));
            } else {
                emit_check_human(&label, report);
            }
            let exit_code = if report.status == ReportStatus::Degraded {
                to_exit_code(ErrorKind::Malformed)
            } else {
                0
            };
            Ok(RunOutcome::with_code(exit_code))
        }
    }
}
