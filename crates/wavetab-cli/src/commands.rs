use anyhow::Result;
use comfy_table::{Cell, Color, Table};
use tracing::info_span;

use wavetab_cli::pipeline::{PipelineOptions, RunResult, load_run_config, load_wave_table, run};
use wavetab_ingest::{RawTable, build_column_hints};
use wavetab_model::WaveConfig;

use crate::cli::{CheckArgs, RunArgs};
use crate::summary::{apply_table_style, flag_cell, header_cell};

pub fn run_pipeline(args: &RunArgs) -> Result<RunResult> {
    let config = load_run_config(&args.config)?;
    let options = PipelineOptions {
        out_dir: args.out_dir.clone(),
        min_n: args.min_n,
        dry_run: args.dry_run,
    };
    run(&config, &options)
}

/// Validate a configuration against its inputs without running the
/// pipeline. Returns `true` when every wave is runnable.
pub fn run_check(args: &CheckArgs) -> Result<bool> {
    let config = load_run_config(&args.config)?;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Wave"),
        header_cell("Input"),
        header_cell("Found"),
        header_cell("Schemes"),
        header_cell("Missing columns"),
    ]);
    apply_table_style(&mut table);
    let mut all_ok = true;
    let mut profiles: Vec<(&WaveConfig, RawTable)> = Vec::new();
    for wave in &config.waves {
        let span = info_span!("check", wave_id = %wave.wave_id);
        let _guard = span.enter();
        let scheme_problem = scheme_problem(wave);
        let (raw, missing) = input_status(wave)?;
        let found = raw.is_some();
        if scheme_problem.is_some() || !found || !missing.is_empty() {
            all_ok = false;
        }
        let scheme_cell = match &scheme_problem {
            Some(problem) => Cell::new(problem).fg(Color::Red),
            None => flag_cell(true),
        };
        let missing_cell = if missing.is_empty() {
            Cell::new("-").fg(Color::DarkGrey)
        } else {
            Cell::new(missing.join(", ")).fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(&wave.wave_id),
            Cell::new(wave.input.display()),
            flag_cell(found),
            scheme_cell,
            missing_cell,
        ]);
        if let Some(raw) = raw {
            profiles.push((wave, raw));
        }
    }
    println!("{table}");
    for (wave, raw) in &profiles {
        print_column_profile(wave, raw);
    }
    Ok(all_ok)
}

/// Per-column profiling of the configured source columns, so sentinel and
/// coding surprises show up before a run.
fn print_column_profile(wave: &WaveConfig, raw: &RawTable) {
    let hints = build_column_hints(raw);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Numeric"),
        header_cell("Null ratio"),
        header_cell("Unique ratio"),
    ]);
    apply_table_style(&mut table);
    for column in wave.source_columns() {
        let Some(hint) = hints.get(column) else {
            continue;
        };
        table.add_row(vec![
            Cell::new(column),
            flag_cell(hint.is_numeric),
            Cell::new(format!("{:.2}", hint.null_ratio)),
            Cell::new(format!("{:.2}", hint.unique_ratio)),
        ]);
    }
    println!();
    println!("{}: configured columns", wave.wave_id);
    println!("{table}");
}

fn scheme_problem(wave: &WaveConfig) -> Option<String> {
    wave.primary_scheme
        .validate()
        .and_then(|()| wave.macro_scheme.validate())
        .err()
        .map(|error| error.to_string())
}

/// The wave's merged extract when its input exists, and which configured
/// columns it lacks.
fn input_status(wave: &WaveConfig) -> Result<(Option<RawTable>, Vec<String>)> {
    if !wave.input.exists() {
        return Ok((None, Vec::new()));
    }
    let raw = load_wave_table(wave)?;
    let missing = wave
        .source_columns()
        .into_iter()
        .filter(|column| !raw.headers.iter().any(|header| header == column))
        .map(str::to_string)
        .collect();
    Ok((Some(raw), missing))
}
