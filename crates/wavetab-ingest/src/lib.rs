pub mod raw_table;

pub use raw_table::{
    ColumnHint, RawTable, build_column_hints, derive_case_id, merge_on_key, read_raw_table,
};
