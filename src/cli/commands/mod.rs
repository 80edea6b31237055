//! CLI command implementations.

mod analyze;
mod config;
mod doctor;
mod samples;
mod serve;

pub use analyze::{run_analyze, ClaimSource};
pub use config::run_config;
pub use doctor::run_doctor;
pub use samples::run_samples;
pub use serve::run_serve;
