use crate::catalog::TaskTemplate;
use crate::error::{PricingResult, ensure_non_negative};
use crate::rates::{Complexity, ComplexityFloors, PricingMode, RateConfig, Tier, TierHours};
use crate::session::SprintLogEntry;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Resource consumption of one instantiated task.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostInputs {
    pub hours: TierHours,
    #[serde(default)]
    pub additional_costs: f64,
    /// One-time charge such as a regulatory setup fee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_fee: Option<f64>,
}

impl CostInputs {
    pub fn new(hours: TierHours, additional_costs: f64) -> Self {
        Self {
            hours,
            additional_costs,
            fixed_fee: None,
        }
    }

    pub fn with_fixed_fee(mut self, fee: f64) -> Self {
        self.fixed_fee = Some(fee);
        self
    }

    pub fn validate(&self) -> PricingResult<()> {
        self.hours.validate("hours")?;
        ensure_non_negative("additional costs", self.additional_costs)?;
        if let Some(fee) = self.fixed_fee {
            ensure_non_negative("fixed fee", fee)?;
        }
        Ok(())
    }
}

/// Derived cost of one task. Values are unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub staff_cost: f64,
    pub additional_costs: f64,
    pub fixed_fees: f64,
    pub raw_cost: f64,
    pub overhead_multiplier: f64,
    pub total_cost: f64,
    pub units: f64,
}

impl CostBreakdown {
    pub fn overhead_cost(&self) -> f64 {
        self.total_cost - self.raw_cost
    }

    /// Units as shown to the partner under the configured pricing mode.
    pub fn display_units(&self, rates: &RateConfig, complexity: Complexity) -> f64 {
        display_units(
            self.units,
            rates.pricing_mode,
            &rates.complexity_floors,
            complexity,
        )
    }
}

/// Converts task resource consumption into dollars and units.
pub fn compute_cost(inputs: &CostInputs, rates: &RateConfig) -> PricingResult<CostBreakdown> {
    rates.validate()?;
    inputs.validate()?;

    let staff_cost: f64 = Tier::ALL
        .iter()
        .map(|&tier| inputs.hours.get(tier) * rates.tier_rates.get(tier))
        .sum();
    let fixed_fees = inputs.fixed_fee.unwrap_or(0.0);
    let raw_cost = staff_cost + inputs.additional_costs + fixed_fees;
    let overhead_multiplier = rates.overhead.multiplier();
    let total_cost = raw_cost * overhead_multiplier;
    let units = total_cost / rates.unit_price;

    debug!(staff_cost, raw_cost, total_cost, units, "computed cost breakdown");

    Ok(CostBreakdown {
        staff_cost,
        additional_costs: inputs.additional_costs,
        fixed_fees,
        raw_cost,
        overhead_multiplier,
        total_cost,
        units,
    })
}

/// Applies a display policy to an exact unit count.
pub fn display_units(
    units: f64,
    mode: PricingMode,
    floors: &ComplexityFloors,
    complexity: Complexity,
) -> f64 {
    match mode {
        PricingMode::Exact => units,
        PricingMode::Partner => {
            let rounded = (units * 2.0).round() / 2.0;
            rounded.max(floors.floor(complexity))
        }
    }
}

/// Per-instantiation adjustments on top of a template's defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskModifiers {
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_costs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_fee: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leadership_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TaskModifiers {
    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_additional_costs(mut self, additional_costs: f64) -> Self {
        self.additional_costs = Some(additional_costs);
        self
    }

    pub fn with_fixed_fee(mut self, fee: f64) -> Self {
        self.fixed_fee = Some(fee);
        self
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    pub fn with_hours(mut self, tier: Tier, hours: f64) -> Self {
        match tier {
            Tier::Director => self.director_hours = Some(hours),
            Tier::Leadership => self.leadership_hours = Some(hours),
            Tier::Coordinator => self.coordinator_hours = Some(hours),
        }
        self
    }

    pub fn cost_inputs(&self, template: &TaskTemplate) -> CostInputs {
        let defaults = template.default_hours;
        let hours = TierHours::new(
            self.director_hours.unwrap_or(defaults.director),
            self.leadership_hours.unwrap_or(defaults.leadership),
            self.coordinator_hours.unwrap_or(defaults.coordinator),
        );
        CostInputs {
            hours,
            additional_costs: self
                .additional_costs
                .unwrap_or(template.default_additional_costs),
            fixed_fee: self.fixed_fee,
        }
    }
}

/// A costed template instantiation, ready to be committed to the sprint log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub domain: String,
    pub task_name: String,
    pub description: String,
    pub inputs: CostInputs,
    pub breakdown: CostBreakdown,
    pub complexity: Complexity,
    pub pricing_mode: PricingMode,
    pub display_units: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Quote {
    pub fn to_log_entry(&self) -> SprintLogEntry {
        SprintLogEntry {
            domain: self.domain.clone(),
            task_name: self.task_name.clone(),
            units: self.display_units,
            exact_units: self.breakdown.units,
            cost: self.breakdown.total_cost,
            complexity: Some(self.complexity),
            phase: self.phase.clone(),
            notes: self.notes.clone(),
        }
    }
}

pub fn quote(
    template: &TaskTemplate,
    modifiers: &TaskModifiers,
    rates: &RateConfig,
) -> PricingResult<Quote> {
    let inputs = modifiers.cost_inputs(template);
    let breakdown = compute_cost(&inputs, rates)?;
    let display_units = breakdown.display_units(rates, modifiers.complexity);
    debug!(
        task = %template.name,
        mode = rates.pricing_mode.as_str(),
        display_units,
        "quoted task"
    );
    Ok(Quote {
        domain: template.domain.clone(),
        task_name: template.name.clone(),
        description: template.description.clone(),
        inputs,
        breakdown,
        complexity: modifiers.complexity,
        pricing_mode: rates.pricing_mode,
        display_units,
        phase: modifiers.phase.clone(),
        notes: modifiers.notes.clone(),
    })
}

/// `$1,234.56`; negative amounts keep a leading minus.
pub fn format_currency(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

pub fn format_units(units: f64) -> String {
    format!("{units:.2}")
}
