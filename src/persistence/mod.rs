use crate::error::PricingError;
use crate::session::{PlanningSession, SprintLog};
use polars::prelude::PolarsError;
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("dataframe conversion error: {0}")]
    DataFrame(#[from] PolarsError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Checks a loaded session before handing it back to the caller.
pub fn validate_session(session: &PlanningSession) -> PersistenceResult<()> {
    session.rates.validate()?;
    session
        .scope
        .validate()
        .map_err(|err| PersistenceError::InvalidData(format!("scope: {err}")))?;
    validate_log(&session.log)
}

pub fn validate_log(log: &SprintLog) -> PersistenceResult<()> {
    for (position, entry) in log.entries().iter().enumerate() {
        for (label, value) in [
            ("units", entry.units),
            ("exact_units", entry.exact_units),
            ("cost", entry.cost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PersistenceError::InvalidData(format!(
                    "log entry {position} ('{}') has invalid {label} {value}",
                    entry.task_name
                )));
            }
        }
    }
    Ok(())
}

pub mod catalog;
pub mod file;
pub mod proposal;

pub use catalog::{load_catalog_from_csv, read_catalog_csv};
pub use file::{
    load_log_from_csv, load_rates_from_json, load_session_from_json, read_log_csv,
    save_log_to_csv, save_rates_to_json, save_session_to_json, write_log_csv,
};
pub use proposal::{
    render_proposal_markdown, render_sprint_summary, save_proposal_markdown,
    write_proposal_markdown,
};
