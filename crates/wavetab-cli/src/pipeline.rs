//! The harmonization pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Normalize**: read each wave's raw extract and map it to the
//!    canonical schema
//! 2. **Stack**: union the wave tables into one pooled dataset
//! 3. **Tabulate**: aggregate by cohort and sex, pooled and by wave
//! 4. **Suppress**: drop cohorts below the publication threshold
//! 5. **Gap**: female-minus-male prevalence gaps with Wald intervals
//! 6. **Output**: write one CSV per logical sheet
//!
//! Each stage takes the output of the previous stage and returns typed
//! results.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use wavetab_ingest::{RawTable, merge_on_key, read_raw_table};
use wavetab_model::{
    AggregateRow, GapRow, RunConfig, StackedDataset, WaveConfig, WaveFrame, WavetabError,
};
use wavetab_report::{
    WrittenTable, write_aggregate_table, write_gap_table, write_stacked_analytic,
    write_wave_analytic,
};
use wavetab_tables::{Grouping, aggregate, gaps, suppress};
use wavetab_transform::{normalize_wave, stack};

/// CLI overrides applied on top of the run configuration.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub out_dir: Option<PathBuf>,
    pub min_n: Option<usize>,
    pub dry_run: bool,
}

/// Per-wave outcome for the end-of-run summary.
#[derive(Debug)]
pub struct WaveSummary {
    pub wave_id: String,
    pub records: usize,
    pub source: PathBuf,
}

/// Result of a full pipeline run.
#[derive(Debug)]
pub struct RunResult {
    pub out_dir: PathBuf,
    pub waves: Vec<WaveSummary>,
    /// Waves skipped because their input file was absent.
    pub skipped: Vec<String>,
    pub stacked_records: usize,
    pub tables: Vec<WrittenTable>,
    pub dry_run: bool,
}

/// Reads a wave's primary extract and left-merges its auxiliary extract
/// (e.g. a household roster) when one is configured.
pub fn load_wave_table(wave: &WaveConfig) -> Result<RawTable> {
    let mut raw = read_raw_table(&wave.input, wave.delimiter)
        .with_context(|| format!("read {}", wave.input.display()))?;
    if let Some(aux) = &wave.aux_input {
        let aux_raw = read_raw_table(&aux.input, aux.delimiter)
            .with_context(|| format!("read {}", aux.input.display()))?;
        raw = merge_on_key(&raw, &aux_raw, &aux.key_column)?;
    }
    Ok(raw)
}

/// Load and parse a JSON run configuration.
pub fn load_run_config(path: &Path) -> Result<RunConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let config: RunConfig = serde_json::from_str(&text)
        .with_context(|| format!("parse config {}", path.display()))?;
    Ok(config)
}

/// Run the full pipeline for one configuration.
///
/// Waves whose input file does not exist are skipped with a warning; the
/// run fails only when no wave yields a table at all.
pub fn run(config: &RunConfig, options: &PipelineOptions) -> Result<RunResult> {
    let out_dir = options
        .out_dir
        .clone()
        .unwrap_or_else(|| config.out_dir.clone());
    let min_n = options.min_n.unwrap_or(config.min_n);

    let normalize_start = Instant::now();
    let mut frames: Vec<WaveFrame> = Vec::new();
    let mut skipped = Vec::new();
    for wave in &config.waves {
        let span = info_span!("wave", wave_id = %wave.wave_id);
        let _guard = span.enter();
        if !wave.input.exists() {
            warn!(input = %wave.input.display(), "input file not found, skipping wave");
            skipped.push(wave.wave_id.clone());
            continue;
        }
        let raw = load_wave_table(wave)?;
        let frame = normalize_wave(wave, &raw)?;
        frames.push(frame);
    }
    if frames.is_empty() {
        return Err(WavetabError::NoWaves.into());
    }
    info!(
        wave_count = frames.len(),
        skipped_count = skipped.len(),
        duration_ms = normalize_start.elapsed().as_millis(),
        "normalization complete"
    );

    let stacked = stack(&frames)?;

    let tabulate_start = Instant::now();
    let pooled = aggregate(&stacked.records, Grouping::Pooled);
    let by_wave = aggregate(&stacked.records, Grouping::ByWave);
    let present = suppress(&pooled, min_n);
    let present_by_wave = suppress(&by_wave, min_n);
    let gap = gaps(&present);
    let gap_by_wave = gaps(&present_by_wave);
    info!(
        pooled_rows = pooled.len(),
        present_rows = present.len(),
        gap_rows = gap.len(),
        min_n,
        duration_ms = tabulate_start.elapsed().as_millis(),
        "tabulation complete"
    );

    let mut tables = Vec::new();
    if options.dry_run {
        info!("dry run, skipping output");
    } else {
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("create output dir {}", out_dir.display()))?;
        tables = write_outputs(&out_dir, &frames, &stacked, &Tabulations {
            pooled: &pooled,
            by_wave: &by_wave,
            present: &present,
            present_by_wave: &present_by_wave,
            gap: &gap,
            gap_by_wave: &gap_by_wave,
        })?;
    }

    let waves = frames
        .iter()
        .map(|frame| WaveSummary {
            wave_id: frame.wave_id.clone(),
            records: frame.record_count(),
            source: frame.source_file.clone().unwrap_or_default(),
        })
        .collect();

    Ok(RunResult {
        out_dir,
        waves,
        skipped,
        stacked_records: stacked.records.len(),
        tables,
        dry_run: options.dry_run,
    })
}

struct Tabulations<'a> {
    pooled: &'a [AggregateRow],
    by_wave: &'a [AggregateRow],
    present: &'a [AggregateRow],
    present_by_wave: &'a [AggregateRow],
    gap: &'a [GapRow],
    gap_by_wave: &'a [GapRow],
}

fn write_outputs(
    out_dir: &Path,
    frames: &[WaveFrame],
    stacked: &StackedDataset,
    tabs: &Tabulations<'_>,
) -> Result<Vec<WrittenTable>> {
    let output_start = Instant::now();
    let mut tables = Vec::new();
    for frame in frames {
        tables.push(write_wave_analytic(out_dir, frame)?);
    }
    tables.push(write_stacked_analytic(out_dir, stacked)?);
    tables.push(write_aggregate_table(out_dir, "primary_all", tabs.pooled, false)?);
    tables.push(write_aggregate_table(
        out_dir,
        "primary_all_by_wave",
        tabs.by_wave,
        true,
    )?);
    tables.push(write_aggregate_table(
        out_dir,
        "primary_present",
        tabs.present,
        false,
    )?);
    tables.push(write_aggregate_table(
        out_dir,
        "primary_present_by_wave",
        tabs.present_by_wave,
        true,
    )?);
    tables.push(write_gap_table(out_dir, "ever_partnered_gap", tabs.gap, false)?);
    tables.push(write_gap_table(
        out_dir,
        "ever_partnered_gap_by_wave",
        tabs.gap_by_wave,
        true,
    )?);
    info!(
        table_count = tables.len(),
        duration_ms = output_start.elapsed().as_millis(),
        "output complete"
    );
    Ok(tables)
}
