use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::Table;
use serde_json::Value;
use tracing::{debug, info};

use tabmod_cli::{PipelineResult, run_pipeline};
use tabmod_common::table_to_dataframe;
use tabmod_ingest::{
    TableFormat, read_modifier_record, read_table, write_csv_to, write_json_to, write_table,
};
use tabmod_transform::{Modifier, ModifierRecord, ModifierRegistry};

use crate::cli::{ApplyArgs, TableFormatArg};
use crate::summary::{apply_table_style, render_summary};

pub fn run_kinds() -> Result<()> {
    let registry = ModifierRegistry::builtin();
    let mut table = Table::new();
    table.set_header(vec!["Kind", "Description", "Default options"]);
    apply_table_style(&mut table);
    for kind in registry.kinds() {
        let defaults = registry
            .build(&ModifierRecord::new(kind, Value::Null))
            .with_context(|| format!("build default {kind}"))?
            .map(|modifier| modifier.options_json())
            .transpose()
            .with_context(|| format!("serialize default {kind} options"))?
            .unwrap_or(Value::Null);
        table.add_row(vec![
            kind.to_string(),
            kind.description().to_string(),
            defaults.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_apply(args: &ApplyArgs) -> Result<PipelineResult> {
    let table = read_table(&args.table)
        .with_context(|| format!("load table {}", args.table.display()))?;
    let record = read_modifier_record(&args.pipeline)
        .with_context(|| format!("load pipeline {}", args.pipeline.display()))?;
    info!(
        table = %args.table.display(),
        pipeline = %args.pipeline.display(),
        "applying pipeline"
    );

    let result = run_pipeline(&record, &ModifierRegistry::builtin(), table)?;

    let format = output_format(args);
    match &args.output {
        Some(path) => {
            write_table(&result.table, path, format)
                .with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "wrote result");
        }
        None => write_stdout(&result, format)?,
    }

    // Reports go to stderr when the table itself went to stdout.
    let report_to_stdout = args.output.is_some();
    if args.summary {
        emit(&render_summary(&result), report_to_stdout);
    }
    if let Some(rows) = args.preview {
        emit(&preview(&result, rows)?, report_to_stdout);
    }
    Ok(result)
}

fn output_format(args: &ApplyArgs) -> TableFormat {
    match args.format {
        Some(TableFormatArg::Csv) => TableFormat::Csv,
        Some(TableFormatArg::Json) => TableFormat::Json,
        None => args
            .output
            .as_deref()
            .and_then(TableFormat::from_path)
            .unwrap_or(TableFormat::Json),
    }
}

fn write_stdout(result: &PipelineResult, format: TableFormat) -> Result<()> {
    match format {
        TableFormat::Csv => {
            write_csv_to(&result.table, io::stdout().lock(), Path::new("<stdout>"))?;
        }
        TableFormat::Json => {
            write_json_to(&result.table, io::stdout().lock(), Path::new("<stdout>"))?;
        }
    }
    Ok(())
}

fn preview(result: &PipelineResult, rows: usize) -> Result<String> {
    let frame = table_to_dataframe(&result.table).context("convert result to a DataFrame")?;
    debug!(height = frame.height(), width = frame.width(), "previewing result");
    Ok(frame.head(Some(rows)).to_string())
}

fn emit(text: &str, to_stdout: bool) {
    if to_stdout {
        println!("{text}");
    } else {
        eprintln!("{text}");
    }
}
