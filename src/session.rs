use crate::catalog::TaskCatalog;
use crate::cost::{Quote, TaskModifiers, quote};
use crate::error::{PricingError, PricingResult, ensure_positive};
use crate::rates::{Complexity, RateConfig};
use crate::simulation::{
    AllocationPlan, SimulationRequest, simulate, simulation_menu, validate_periods,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A user-committed, costed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintLogEntry {
    pub domain: String,
    pub task_name: String,
    /// Units as displayed when the entry was committed.
    pub units: f64,
    pub exact_units: f64,
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Ordered log of committed tasks. Append-only apart from removal by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SprintLog {
    entries: Vec<SprintLogEntry>,
}

impl SprintLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SprintLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: SprintLogEntry) {
        self.entries.push(entry);
    }

    /// Removes the entry at a 0-based position.
    pub fn remove(&mut self, position: usize) -> PricingResult<SprintLogEntry> {
        if position >= self.entries.len() {
            return Err(PricingError::invalid(format!(
                "log position {position} out of range (log has {} entries)",
                self.entries.len()
            )));
        }
        Ok(self.entries.remove(position))
    }

    pub fn total_units(&self) -> f64 {
        self.entries.iter().map(|e| e.units).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.entries.iter().map(|e| e.cost).sum()
    }

    /// `(domain, units, cost)` in order of first appearance.
    pub fn domain_subtotals(&self) -> Vec<(String, f64, f64)> {
        let mut totals: Vec<(String, f64, f64)> = Vec::new();
        for entry in &self.entries {
            match totals.iter_mut().find(|(domain, _, _)| *domain == entry.domain) {
                Some((_, units, cost)) => {
                    *units += entry.units;
                    *cost += entry.cost;
                }
                None => totals.push((entry.domain.clone(), entry.units, entry.cost)),
            }
        }
        totals
    }

    /// Entries grouped by phase, first-appearance order. Unphased entries go last.
    pub fn phases(&self) -> Vec<(Option<String>, Vec<&SprintLogEntry>)> {
        let mut groups: Vec<(Option<String>, Vec<&SprintLogEntry>)> = Vec::new();
        for entry in &self.entries {
            match groups.iter_mut().find(|(phase, _)| *phase == entry.phase) {
                Some((_, items)) => items.push(entry),
                None => groups.push((entry.phase.clone(), vec![entry])),
            }
        }
        groups.sort_by_key(|(phase, _)| phase.is_none());
        groups
    }
}

impl FromIterator<SprintLogEntry> for SprintLog {
    fn from_iter<T: IntoIterator<Item = SprintLogEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Engagement-level settings for a planning session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeInfo {
    #[serde(default = "ScopeInfo::default_project_name")]
    pub project_name: String,
    #[serde(default)]
    pub partner_name: String,
    #[serde(default = "ScopeInfo::default_start_date")]
    pub start_date: NaiveDate,
    /// Number of quarterly periods in the engagement.
    #[serde(default = "ScopeInfo::default_periods")]
    pub periods: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_units: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ScopeInfo {
    fn default_project_name() -> String {
        "New Engagement".to_string()
    }

    fn default_start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
    }

    fn default_periods() -> u32 {
        4
    }

    /// Rejects period counts outside `1..=MAX_PERIODS` and non-positive budgets.
    pub fn validate(&self) -> PricingResult<()> {
        validate_periods(self.periods)?;
        if let Some(total_units) = self.total_units {
            ensure_positive("total units", total_units)?;
        }
        Ok(())
    }
}

impl Default for ScopeInfo {
    fn default() -> Self {
        Self {
            project_name: Self::default_project_name(),
            partner_name: String::new(),
            start_date: Self::default_start_date(),
            periods: Self::default_periods(),
            total_units: None,
            theme: None,
            summary: None,
        }
    }
}

/// Per-user state. Handlers receive it by reference; nothing is global.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningSession {
    #[serde(default)]
    pub scope: ScopeInfo,
    #[serde(default)]
    pub rates: RateConfig,
    #[serde(default)]
    pub log: SprintLog,
}

impl PlanningSession {
    pub fn new(scope: ScopeInfo, rates: RateConfig) -> Self {
        Self {
            scope,
            rates,
            log: SprintLog::new(),
        }
    }

    pub fn quote(
        &self,
        catalog: &TaskCatalog,
        task_name: &str,
        modifiers: &TaskModifiers,
    ) -> PricingResult<Quote> {
        let template = catalog
            .find(task_name)
            .ok_or_else(|| PricingError::invalid(format!("unknown task '{task_name}'")))?;
        quote(template, modifiers, &self.rates)
    }

    pub fn add_to_log(&mut self, quote: &Quote) -> &SprintLogEntry {
        let entry = quote.to_log_entry();
        info!(task = %entry.task_name, units = entry.units, "added task to sprint log");
        self.log.push(entry);
        &self.log.entries[self.log.len() - 1]
    }

    pub fn remove_from_log(&mut self, position: usize) -> PricingResult<SprintLogEntry> {
        let removed = self.log.remove(position)?;
        info!(task = %removed.task_name, position, "removed task from sprint log");
        Ok(removed)
    }

    /// Budget, period count and theme come from the scope; an unset budget is
    /// an invalid request.
    pub fn simulation_request(&self) -> PricingResult<SimulationRequest> {
        let total_units = self
            .scope
            .total_units
            .ok_or_else(|| PricingError::invalid("scope has no total unit budget"))?;
        let mut request = SimulationRequest::new(total_units, self.scope.periods);
        request.theme = self.scope.theme.clone();
        Ok(request)
    }

    pub fn simulate(&self, catalog: &TaskCatalog) -> PricingResult<AllocationPlan> {
        let request = self.simulation_request()?;
        let menu = simulation_menu(catalog, &self.rates)?;
        simulate(&menu, &request)
    }
}
