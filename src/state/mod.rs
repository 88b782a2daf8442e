//! State module for tracking run progress
//!
//! # Components
//!
//! - `RunState`: lifecycle of a single visitor run, owned by the coordinator

mod run_state;

pub use run_state::RunState;
