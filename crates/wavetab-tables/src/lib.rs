pub mod aggregate;
pub mod gap;
pub mod suppress;

pub use aggregate::{Grouping, aggregate};
pub use gap::gaps;
pub use suppress::suppress;
