//! CLI library components for the cohort linkage tool.

pub mod logging;
