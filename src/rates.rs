use crate::error::{PricingError, PricingResult, ensure_non_negative, ensure_positive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Staff seniority category with its own hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Director,
    Leadership,
    Coordinator,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Director, Tier::Leadership, Tier::Coordinator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Director => "director",
            Tier::Leadership => "leadership",
            Tier::Coordinator => "coordinator",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Director => "Tier 1 (Director)",
            Tier::Leadership => "Tier 2 (Leadership)",
            Tier::Coordinator => "Tier 3 (Coordinator)",
        }
    }
}

impl FromStr for Tier {
    type Err = PricingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "director" | "tier1" | "1" => Ok(Tier::Director),
            "leadership" | "tier2" | "2" => Ok(Tier::Leadership),
            "coordinator" | "tier3" | "3" => Ok(Tier::Coordinator),
            other => Err(PricingError::invalid(format!("unknown tier '{other}'"))),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One number per tier. Used both for hourly rates and for hours.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TierValues {
    #[serde(default)]
    pub director: f64,
    #[serde(default)]
    pub leadership: f64,
    #[serde(default)]
    pub coordinator: f64,
}

pub type TierRates = TierValues;
pub type TierHours = TierValues;

impl TierValues {
    pub const fn new(director: f64, leadership: f64, coordinator: f64) -> Self {
        Self {
            director,
            leadership,
            coordinator,
        }
    }

    pub fn get(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Director => self.director,
            Tier::Leadership => self.leadership,
            Tier::Coordinator => self.coordinator,
        }
    }

    pub fn set(&mut self, tier: Tier, value: f64) {
        match tier {
            Tier::Director => self.director = value,
            Tier::Leadership => self.leadership = value,
            Tier::Coordinator => self.coordinator = value,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tier, f64)> + '_ {
        Tier::ALL.into_iter().map(move |tier| (tier, self.get(tier)))
    }

    pub fn total(&self) -> f64 {
        self.director + self.leadership + self.coordinator
    }

    pub(crate) fn validate(&self, what: &str) -> PricingResult<()> {
        for (tier, value) in self.iter() {
            ensure_non_negative(&format!("{what} for {tier}"), value)?;
        }
        Ok(())
    }
}

/// Multiplicative loading applied to raw direct cost.
///
/// Both forms are accepted as input; the multiplier is the canonical value
/// every calculation reads (`Overhead::multiplier`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Overhead {
    /// Loading expressed as a percentage, `total = raw * (1 + pct / 100)`.
    ///
    /// Any finite non-negative value is accepted. There is no upper bound, so
    /// `Percent(150.0)` is the same as `Multiplier(2.5)`.
    Percent(f64),
    /// Loading expressed as a raw multiplier, `total = raw * multiplier`.
    Multiplier(f64),
}

impl Default for Overhead {
    fn default() -> Self {
        Overhead::Multiplier(2.0)
    }
}

impl Overhead {
    pub fn multiplier(&self) -> f64 {
        match *self {
            Overhead::Percent(pct) => 1.0 + pct / 100.0,
            Overhead::Multiplier(m) => m,
        }
    }

    pub fn as_percent(&self) -> f64 {
        match *self {
            Overhead::Percent(pct) => pct,
            Overhead::Multiplier(m) => (m - 1.0) * 100.0,
        }
    }

    pub fn validate(&self) -> PricingResult<()> {
        match *self {
            Overhead::Percent(pct) => ensure_non_negative("overhead percent", pct),
            Overhead::Multiplier(m) => {
                if !m.is_finite() || m < 1.0 {
                    return Err(PricingError::invalid(format!(
                        "overhead multiplier must be at least 1.0 (got {m})"
                    )));
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Overhead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Overhead::Percent(pct) => write!(f, "{pct}% (x{:.4})", self.multiplier()),
            Overhead::Multiplier(m) => write!(f, "x{m}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// Units at full precision.
    #[default]
    Exact,
    /// Units rounded to the nearest half unit, then raised to the complexity floor.
    Partner,
}

impl PricingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingMode::Exact => "exact",
            PricingMode::Partner => "partner",
        }
    }
}

impl FromStr for PricingMode {
    type Err = PricingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(PricingMode::Exact),
            "partner" | "rounded" => Ok(PricingMode::Partner),
            other => Err(PricingError::invalid(format!(
                "unknown pricing mode '{other}' (expected exact or partner)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    #[default]
    Medium,
    High,
}

impl Complexity {
    pub const ALL: [Complexity; 3] = [Complexity::Low, Complexity::Medium, Complexity::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Complexity::Low => "Low",
            Complexity::Medium => "Medium",
            Complexity::High => "High",
        }
    }
}

impl FromStr for Complexity {
    type Err = PricingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Complexity::Low),
            "medium" | "med" => Ok(Complexity::Medium),
            "high" => Ok(Complexity::High),
            other => Err(PricingError::invalid(format!(
                "unknown complexity '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Minimum displayed units per complexity in partner mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexityFloors {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for ComplexityFloors {
    fn default() -> Self {
        Self {
            low: 0.5,
            medium: 1.0,
            high: 1.5,
        }
    }
}

impl ComplexityFloors {
    pub fn floor(&self, complexity: Complexity) -> f64 {
        match complexity {
            Complexity::Low => self.low,
            Complexity::Medium => self.medium,
            Complexity::High => self.high,
        }
    }

    pub fn set(&mut self, complexity: Complexity, value: f64) {
        match complexity {
            Complexity::Low => self.low = value,
            Complexity::Medium => self.medium = value,
            Complexity::High => self.high = value,
        }
    }

    fn validate(&self) -> PricingResult<()> {
        for complexity in Complexity::ALL {
            ensure_non_negative(
                &format!("complexity floor for {}", complexity.as_str()),
                self.floor(complexity),
            )?;
        }
        Ok(())
    }
}

/// Session-wide rate configuration read by every cost calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateConfig {
    pub tier_rates: TierRates,
    #[serde(default)]
    pub overhead: Overhead,
    pub unit_price: f64,
    #[serde(default)]
    pub pricing_mode: PricingMode,
    #[serde(default)]
    pub complexity_floors: ComplexityFloors,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            tier_rates: TierRates::new(300.0, 200.0, 100.0),
            overhead: Overhead::default(),
            unit_price: 5000.0,
            pricing_mode: PricingMode::Exact,
            complexity_floors: ComplexityFloors::default(),
        }
    }
}

impl RateConfig {
    pub fn new(tier_rates: TierRates, overhead: Overhead, unit_price: f64) -> Self {
        Self {
            tier_rates,
            overhead,
            unit_price,
            ..Self::default()
        }
    }

    pub fn with_pricing_mode(mut self, mode: PricingMode) -> Self {
        self.pricing_mode = mode;
        self
    }

    pub fn with_complexity_floors(mut self, floors: ComplexityFloors) -> Self {
        self.complexity_floors = floors;
        self
    }

    pub fn validate(&self) -> PricingResult<()> {
        self.tier_rates.validate("hourly rate")?;
        self.overhead.validate()?;
        ensure_positive("unit price", self.unit_price)?;
        self.complexity_floors.validate()
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
