pub mod analysis;
pub mod cache;
pub mod categorizer;
pub mod config;
pub mod country;
pub mod engine;
pub mod error;
pub mod model;
pub mod presentation;
pub mod source;

pub use categorizer::{categorize, Categorizer, MethodCategory};
pub use config::AppConfig;
pub use engine::{DashboardData, DashboardEngine, RunResult};
pub use error::{Error, FetchError};
pub use model::{AggregateGroup, BreachRecord, GroupKey, YearLabel};
pub use presentation::{ChartSink, ChartSlot, ChartView, SilentSink};
