pub mod csv_out;

pub use csv_out::{
    WrittenTable, format_number, write_aggregate_table, write_gap_table, write_stacked_analytic,
    write_wave_analytic,
};
