// Parameter sweep: expansion, bounded execution, aggregation, reporting
pub mod aggregator;
pub mod engine;
pub mod executor;
pub mod expander;
pub mod reporting;

pub use aggregator::{Aggregator, JobFailure, SweepStats};
pub use engine::{SweepEngine, SweepPlan};
pub use executor::BoundedExecutor;
pub use expander::ParameterSpace;
pub use reporting::SweepReporter;
