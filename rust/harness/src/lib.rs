#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::too_many_lines
)]

//! Foldwise experiment harness
//!
//! Runs repeated stratified k-fold cross-validation of an external trainer
//! under a short and a long budget, appending every result to a per-budget
//! ledger so an interrupted experiment can pick up where it stopped.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod resume;
pub mod state;
pub mod status;

pub use config::{ConfigError, HarnessConfig};
pub use error::{ErrorKind, HarnessError};
pub use orchestrator::{Orchestrator, RunSummary};
pub use resume::{ResumeError, ResumePoint, ResumeSource, prompt_resume_point, resolve_state};
pub use state::{Cell, ExperimentState, Ledger, LedgerError, LedgerPair, LedgerProbe, Record};
pub use status::StatusReport;
