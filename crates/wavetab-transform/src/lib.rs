pub mod binner;
pub mod normalize;
pub mod recode;
pub mod stack;

pub use binner::{bin, cohort_sort_key};
pub use normalize::normalize_wave;
pub use recode::{recode_cell, recode_missing, to_number};
pub use stack::stack;
