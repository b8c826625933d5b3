use super::{PersistenceError, PersistenceResult};
use crate::rates::{Complexity, RateConfig};
use crate::session::{PlanningSession, SprintLog, SprintLogEntry};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub fn save_session_to_json<P: AsRef<Path>>(
    session: &PlanningSession,
    path: P,
) -> PersistenceResult<()> {
    super::validate_session(session)?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, session)?;
    info!(path = %path.as_ref().display(), entries = session.log.len(), "saved session");
    Ok(())
}

pub fn load_session_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<PlanningSession> {
    let file = File::open(path)?;
    let session: PlanningSession = serde_json::from_reader(file)?;
    super::validate_session(&session)?;
    Ok(session)
}

pub fn save_rates_to_json<P: AsRef<Path>>(rates: &RateConfig, path: P) -> PersistenceResult<()> {
    rates.validate()?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, rates)?;
    Ok(())
}

pub fn load_rates_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<RateConfig> {
    let file = File::open(path)?;
    let rates: RateConfig = serde_json::from_reader(file)?;
    rates.validate()?;
    Ok(rates)
}

#[derive(Default, Serialize, Deserialize)]
struct LogCsvRecord {
    domain: String,
    task: String,
    units: f64,
    #[serde(default)]
    exact_units: String,
    cost: f64,
    #[serde(default)]
    complexity: String,
    #[serde(default)]
    phase: String,
    #[serde(default)]
    notes: String,
}

impl From<&SprintLogEntry> for LogCsvRecord {
    fn from(entry: &SprintLogEntry) -> Self {
        Self {
            domain: entry.domain.clone(),
            task: entry.task_name.clone(),
            units: entry.units,
            exact_units: entry.exact_units.to_string(),
            cost: entry.cost,
            complexity: entry
                .complexity
                .map(|c| c.as_str().to_string())
                .unwrap_or_default(),
            phase: entry.phase.clone().unwrap_or_default(),
            notes: entry.notes.clone().unwrap_or_default(),
        }
    }
}

impl LogCsvRecord {
    fn into_entry(self) -> PersistenceResult<SprintLogEntry> {
        let exact_units = if self.exact_units.trim().is_empty() {
            self.units
        } else {
            self.exact_units.trim().parse::<f64>().map_err(|e| {
                PersistenceError::InvalidData(format!(
                    "invalid exact_units '{}': {e}",
                    self.exact_units
                ))
            })?
        };
        let complexity = if self.complexity.trim().is_empty() {
            None
        } else {
            Some(Complexity::from_str(&self.complexity)?)
        };
        Ok(SprintLogEntry {
            domain: self.domain,
            task_name: self.task,
            units: self.units,
            exact_units,
            cost: self.cost,
            complexity,
            phase: parse_string_option(self.phase),
            notes: parse_string_option(self.notes),
        })
    }
}

/// Comma-separated export of the sprint log, one header row.
pub fn write_log_csv<W: Write>(log: &SprintLog, writer: W) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    if log.is_empty() {
        writer.write_record([
            "domain",
            "task",
            "units",
            "exact_units",
            "cost",
            "complexity",
            "phase",
            "notes",
        ])?;
    }
    for entry in log.entries() {
        writer.serialize(LogCsvRecord::from(entry))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_log_csv<R: Read>(reader: R) -> PersistenceResult<SprintLog> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut entries = Vec::new();
    for record in reader.deserialize::<LogCsvRecord>() {
        entries.push(record?.into_entry()?);
    }
    let log: SprintLog = entries.into_iter().collect();
    super::validate_log(&log)?;
    Ok(log)
}

pub fn save_log_to_csv<P: AsRef<Path>>(log: &SprintLog, path: P) -> PersistenceResult<()> {
    let file = File::create(path.as_ref())?;
    write_log_csv(log, file)?;
    info!(path = %path.as_ref().display(), entries = log.len(), "exported sprint log csv");
    Ok(())
}

pub fn load_log_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<SprintLog> {
    let file = File::open(path)?;
    read_log_csv(file)
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
