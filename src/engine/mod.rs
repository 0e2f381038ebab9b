// src/engine/mod.rs
mod aggregate;
mod evaluator;
mod report;

pub use aggregate::aggregate;
pub use evaluator::{HealthEngine, ReportScope};
pub use report::{CategoryVerdict, HealthReport, OverallStatus};
