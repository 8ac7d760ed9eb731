//! Schema alignment and stacking across waves.

use tracing::info;

use wavetab_model::{Result, StackedDataset, WaveFrame, WavetabError};

/// Merges per-wave canonical tables into one dataset over the union of all
/// fields. Rows keep wave order then each wave's internal order; input
/// frames are not mutated. Audit columns are the sorted name union, so the
/// same inputs in the same order always yield the same schema and row
/// order. Supplying no frames is fatal.
pub fn stack(frames: &[WaveFrame]) -> Result<StackedDataset> {
    if frames.is_empty() {
        return Err(WavetabError::NoWaves);
    }
    let mut audit_columns: Vec<String> = frames
        .iter()
        .flat_map(|frame| frame.audit_columns.iter().cloned())
        .collect();
    audit_columns.sort();
    audit_columns.dedup();

    let records = frames
        .iter()
        .flat_map(|frame| frame.records.iter().cloned())
        .collect::<Vec<_>>();

    info!(
        waves = frames.len(),
        records = records.len(),
        audit_columns = audit_columns.len(),
        "stacked dataset built"
    );

    Ok(StackedDataset {
        records,
        audit_columns,
    })
}
