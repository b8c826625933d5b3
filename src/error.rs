use thiserror::Error;

/// Failures raised by the pricing core (cost model, simulator, session log).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl PricingError {
    pub fn invalid(message: impl Into<String>) -> Self {
        PricingError::InvalidInput(message.into())
    }
}

pub type PricingResult<T> = Result<T, PricingError>;

pub(crate) fn ensure_non_negative(label: &str, value: f64) -> PricingResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PricingError::invalid(format!(
            "{label} must be a finite, non-negative number (got {value})"
        )));
    }
    Ok(())
}

pub(crate) fn ensure_positive(label: &str, value: f64) -> PricingResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PricingError::invalid(format!(
            "{label} must be a finite, positive number (got {value})"
        )));
    }
    Ok(())
}
