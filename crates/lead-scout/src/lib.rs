//! Lead enrichment and scoring engine.
//!
//! Raw candidate records flow through [`workflows::intake`] into the
//! [`workflows::leads`] pipeline: validation, enrichment, weighted scoring and
//! ranking. Configuration and telemetry live alongside so the CLI and HTTP
//! surfaces share one setup path.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
