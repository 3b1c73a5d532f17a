pub mod accumulator;
pub mod derived;
pub mod metric;
pub mod scope;

pub use accumulator::{Accumulator, Outcome, Tally, DEFAULT_TOLERANCE};
pub use derived::Metrics;
pub use metric::Metric;
pub use scope::Scope;
