pub mod aggregate;
pub mod dedupe;
pub mod rank;

pub use aggregate::{aggregate, aggregate_by, aggregate_by_category, CategoryBreakdown, Dimension, Measures};
pub use rank::{sort_by_year, top_n, top_records, Measure};
