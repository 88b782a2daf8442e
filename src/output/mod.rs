//! Output module for visit reports and run statistics
//!
//! This module handles:
//! - Ordering collected outcomes into a [`Report`]
//! - Rendering the report as text lines or JSON
//! - Counting what happened during a run ([`VisitStats`])

mod report;
pub mod stats;

pub use report::Report;
pub use stats::{StatsSnapshot, VisitStats};
