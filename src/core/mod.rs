//! Core business logic: registry, NAV series processing and the comparison pipeline

pub mod cache;
pub mod compare;
pub mod config;
pub mod error;
pub mod log;
pub mod nav;
pub mod registry;
pub mod resolver;
pub mod series;

// Re-export main types for cleaner imports
pub use compare::{ComparisonReport, TargetReport};
pub use error::PipelineError;
pub use nav::{NavHistoryProvider, NavPoint, NavSeries};
pub use registry::{FundMeta, RegistryIndex};
pub use resolver::{ComparisonSession, FetchTarget};
pub use series::{Lookback, Metrics};
