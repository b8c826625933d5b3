use crate::catalog::{TaskCatalog, TaskTemplate};
use crate::cost::{TaskModifiers, quote};
use crate::error::{PricingError, PricingResult, ensure_positive};
use crate::rates::RateConfig;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One menu item for the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationTask {
    pub domain: String,
    pub name: String,
    pub unit_cost: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl SimulationTask {
    pub fn new(domain: impl Into<String>, name: impl Into<String>, unit_cost: f64) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            unit_cost,
            keywords: Vec::new(),
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Number of keywords found as a substring of the already-lowercased theme.
    pub fn relevance(&self, lowered_theme: &str) -> usize {
        self.keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty() && lowered_theme.contains(k.as_str()))
            .count()
    }
}

/// Prices every template with its default hours and costs.
///
/// The unit cost follows the configured pricing mode at Medium complexity.
pub fn simulation_menu(
    catalog: &TaskCatalog,
    rates: &RateConfig,
) -> PricingResult<Vec<SimulationTask>> {
    catalog
        .tasks()
        .iter()
        .map(|template| simulation_task(template, rates))
        .collect()
}

fn simulation_task(template: &TaskTemplate, rates: &RateConfig) -> PricingResult<SimulationTask> {
    let quoted = quote(template, &TaskModifiers::default(), rates)?;
    Ok(
        SimulationTask::new(&template.domain, &template.name, quoted.display_units)
            .with_keywords(template.keywords.iter().cloned()),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub total_units: f64,
    pub periods: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl SimulationRequest {
    pub fn new(total_units: f64, periods: u32) -> Self {
        Self {
            total_units,
            periods,
            theme: None,
        }
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// 1-based period number.
    pub period: u32,
    pub domain: String,
    pub task_name: String,
    pub units: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub assignments: Vec<Assignment>,
    pub total_units: f64,
    pub periods: u32,
    pub per_period_share: f64,
    pub total_used: f64,
    pub avg_per_period: f64,
    pub fits: bool,
    /// Units used in each period, index 0 is period 1.
    pub period_totals: Vec<f64>,
    /// Subtotals in order of first assignment.
    pub domain_totals: Vec<(String, f64)>,
    /// Tasks whose unit cost exceeds the per-period share.
    pub unassignable: Vec<String>,
}

impl AllocationPlan {
    pub fn assignments_for(&self, period: u32) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter().filter(move |a| a.period == period)
    }

    pub fn unused_units(&self) -> f64 {
        self.total_units - self.total_used
    }

    pub fn utilization(&self) -> f64 {
        self.total_used / self.total_units
    }

    /// Calendar quarter label for a 1-based period counted from `start`.
    pub fn period_label(period: u32, start: NaiveDate) -> String {
        let offset = period.saturating_sub(1).saturating_mul(3);
        let date = start
            .checked_add_months(Months::new(offset))
            .unwrap_or(start);
        let quarter = (date.month0() / 3) + 1;
        format!("Q{} {}", quarter, date.year())
    }
}

/// Orders the menu for the greedy fill.
///
/// With a non-blank theme: higher relevance first, cheaper first among equal
/// relevance, declaration order among full ties. Without one: unchanged.
pub fn prioritize(tasks: &[SimulationTask], theme: Option<&str>) -> Vec<SimulationTask> {
    let mut ordered = tasks.to_vec();
    let Some(theme) = theme.map(str::trim).filter(|t| !t.is_empty()) else {
        return ordered;
    };
    let lowered = theme.to_lowercase();
    let mut scored: Vec<(usize, SimulationTask)> = ordered
        .drain(..)
        .map(|task| (task.relevance(&lowered), task))
        .collect();
    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .cmp(score_a)
            .then_with(|| a.unit_cost.total_cmp(&b.unit_cost))
    });
    scored.into_iter().map(|(_, task)| task).collect()
}

/// Upper bound on simulated periods (100 years of quarters).
pub const MAX_PERIODS: u32 = 400;

/// Period counts must be in `1..=MAX_PERIODS`.
pub fn validate_periods(periods: u32) -> PricingResult<()> {
    if periods == 0 || periods > MAX_PERIODS {
        return Err(PricingError::invalid(format!(
            "periods must be between 1 and {MAX_PERIODS} (got {periods})"
        )));
    }
    Ok(())
}

/// Greedily fills each period from the prioritized menu.
///
/// A task may be chosen once per period and in any number of periods. Unused
/// capacity is not carried forward and no period is revisited.
pub fn simulate(tasks: &[SimulationTask], request: &SimulationRequest) -> PricingResult<AllocationPlan> {
    ensure_positive("total units", request.total_units)?;
    validate_periods(request.periods)?;
    for task in tasks {
        if !task.unit_cost.is_finite() || task.unit_cost < 0.0 {
            return Err(PricingError::invalid(format!(
                "task '{}' has invalid unit cost {}",
                task.name, task.unit_cost
            )));
        }
    }

    let ordered = prioritize(tasks, request.theme.as_deref());
    let share = request.total_units / f64::from(request.periods);

    let mut assignments = Vec::new();
    let mut period_totals = Vec::new();
    let mut domain_totals: Vec<(String, f64)> = Vec::new();

    for period in 1..=request.periods {
        let mut used = 0.0;
        for task in &ordered {
            if used + task.unit_cost <= share {
                used += task.unit_cost;
                match domain_totals.iter_mut().find(|(d, _)| *d == task.domain) {
                    Some((_, subtotal)) => *subtotal += task.unit_cost,
                    None => domain_totals.push((task.domain.clone(), task.unit_cost)),
                }
                assignments.push(Assignment {
                    period,
                    domain: task.domain.clone(),
                    task_name: task.name.clone(),
                    units: task.unit_cost,
                });
            }
        }
        debug!(period, used, share, "filled period");
        period_totals.push(used);
    }

    let total_used: f64 = period_totals.iter().sum();
    let unassignable = ordered
        .iter()
        .filter(|task| task.unit_cost > share)
        .map(|task| task.name.clone())
        .collect();

    Ok(AllocationPlan {
        assignments,
        total_units: request.total_units,
        periods: request.periods,
        per_period_share: share,
        total_used,
        avg_per_period: total_used / f64::from(request.periods),
        fits: total_used <= request.total_units,
        period_totals,
        domain_totals,
        unassignable,
    })
}
