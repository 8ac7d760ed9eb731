pub mod cohort;
pub mod config;
pub mod error;
pub mod record;
pub mod tables;

pub use cohort::CohortScheme;
pub use config::{
    AgeSource, AuxInput, CohabSignal, CountSemantics, MarriageSignal, MarriedBefore, RowFilter,
    RunConfig, WaveConfig, default_missing_codes,
};
pub use error::{Result, WavetabError};
pub use record::{CANONICAL_FIELDS, CanonicalRecord, Datum, Sex, StackedDataset, WaveFrame};
pub use tables::{AggregateRow, GapRow};
