use super::PersistenceResult;
use crate::catalog::{TaskCatalog, TaskTemplate};
use crate::rates::TierHours;
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Header positions, matched case-insensitively. Any column may be absent.
struct Columns {
    name: Option<usize>,
    domain: Option<usize>,
    short_description: Option<usize>,
    long_description: Option<usize>,
    director_hours: Option<usize>,
    leadership_hours: Option<usize>,
    coordinator_hours: Option<usize>,
    additional_costs: Option<usize>,
    duration_weeks: Option<usize>,
    prerequisites: Option<usize>,
    keywords: Option<usize>,
    notes: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |candidates: &[&str]| {
            headers.iter().position(|header| {
                let normalized = header.trim().to_ascii_lowercase().replace([' ', '-'], "_");
                candidates.contains(&normalized.as_str())
            })
        };
        Self {
            name: find(&["task", "name", "task_name"]),
            domain: find(&["category", "domain"]),
            short_description: find(&["short_description", "description"]),
            long_description: find(&["long_description"]),
            director_hours: find(&["director_hours", "tier1_hours", "tier_1_hours"]),
            leadership_hours: find(&["leadership_hours", "tier2_hours", "tier_2_hours"]),
            coordinator_hours: find(&["coordinator_hours", "tier3_hours", "tier_3_hours"]),
            additional_costs: find(&["additional_costs"]),
            duration_weeks: find(&["duration_weeks", "duration"]),
            prerequisites: find(&["prerequisites", "prerequisite"]),
            keywords: find(&["keywords", "tags"]),
            notes: find(&["notes"]),
        }
    }
}

fn text(record: &StringRecord, column: Option<usize>) -> Option<String> {
    column
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

fn number(record: &StringRecord, column: Option<usize>, field: &str, task: &str) -> Option<f64> {
    let raw = text(record, column)?;
    match raw.trim_start_matches('$').replace(',', "").parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
        _ => {
            warn!(task, field, value = %raw, "defaulting malformed catalog value");
            None
        }
    }
}

fn list(record: &StringRecord, column: Option<usize>) -> Vec<String> {
    text(record, column)
        .map(|value| {
            value
                .split(';')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Reads a task library from CSV.
///
/// Only framing and I/O errors fail. Rows without a task name are skipped;
/// missing or malformed optional fields fall back to zero or empty.
pub fn read_catalog_csv<R: Read>(reader: R) -> PersistenceResult<TaskCatalog> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::from_headers(reader.headers()?);

    let mut tasks = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let Some(name) = text(&record, columns.name) else {
            warn!(row, "skipping catalog row without a task name");
            continue;
        };
        let hours = TierHours::new(
            number(&record, columns.director_hours, "director_hours", &name).unwrap_or(0.0),
            number(&record, columns.leadership_hours, "leadership_hours", &name).unwrap_or(0.0),
            number(&record, columns.coordinator_hours, "coordinator_hours", &name).unwrap_or(0.0),
        );
        let mut template = TaskTemplate::new(
            text(&record, columns.domain).unwrap_or_else(|| "Uncategorized".to_string()),
            name.clone(),
            text(&record, columns.short_description).unwrap_or_default(),
            hours,
        )
        .with_keywords(list(&record, columns.keywords))
        .with_prerequisites(list(&record, columns.prerequisites));
        template.long_description = text(&record, columns.long_description);
        template.default_additional_costs =
            number(&record, columns.additional_costs, "additional_costs", &name).unwrap_or(0.0);
        template.duration_weeks = number(&record, columns.duration_weeks, "duration_weeks", &name);
        template.notes = text(&record, columns.notes);
        tasks.push(template);
    }

    info!(tasks = tasks.len(), "loaded task catalog");
    Ok(TaskCatalog::new(tasks))
}

pub fn load_catalog_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<TaskCatalog> {
    let file = File::open(path)?;
    read_catalog_csv(file)
}
