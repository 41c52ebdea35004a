use std::path::Path;

use reserve_core::export::{render_csv_export, render_json_export};

use crate::cli::ExportFormat;
use crate::commands::common::{records_for, write_output, App};
use crate::error::CliError;

pub fn run_export(
    app: &App,
    format: ExportFormat,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let actor = app.actor()?;
    let records = records_for(&app.service, &actor)?;
    let rendered = match format {
        ExportFormat::Json => render_json_export(&records)?,
        ExportFormat::Csv => render_csv_export(&records),
    };
    write_output(&rendered, output_path)
}
