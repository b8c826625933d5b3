//! Client side of the external planning assistant.
//!
//! The catalog goes out as a plain-text menu together with a free-text goal.
//! What comes back is shown as-is; [`parse_suggestions`] pulls out whatever
//! `(domain, task, units)` lines it can recognise and is best-effort only.
//! Nothing here feeds the simulator or mutates a session.

use crate::catalog::TaskCatalog;
use crate::cost::format_units;
use crate::error::PricingResult;
use crate::rates::RateConfig;
use crate::session::ScopeInfo;
use crate::simulation::simulation_menu;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[cfg(feature = "assistant")]
mod http;
#[cfg(feature = "assistant")]
pub use http::HttpAssistant;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssistantError {
    #[error("planning assistant is not configured: {0}")]
    NotConfigured(String),
    #[error("planning assistant timed out after {0:?}")]
    Timeout(Duration),
    #[error("planning assistant request failed: {0}")]
    ExternalService(String),
}

/// Connection settings for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub endpoint: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AssistantConfig {
    pub const ENDPOINT_VAR: &'static str = "UNIT_PRICING_ASSISTANT_URL";
    pub const KEY_VAR: &'static str = "UNIT_PRICING_ASSISTANT_KEY";
    pub const MODEL_VAR: &'static str = "UNIT_PRICING_ASSISTANT_MODEL";
    pub const TIMEOUT_VAR: &'static str = "UNIT_PRICING_ASSISTANT_TIMEOUT_SECS";

    /// Defaults overridden by any of the `UNIT_PRICING_ASSISTANT_*` variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(endpoint) = std::env::var(Self::ENDPOINT_VAR) {
            config.endpoint = endpoint;
        }
        config.api_key = std::env::var(Self::KEY_VAR).ok().filter(|k| !k.is_empty());
        if let Ok(model) = std::env::var(Self::MODEL_VAR) {
            config.model = model;
        }
        if let Ok(raw) = std::env::var(Self::TIMEOUT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout_secs = secs,
                _ => warn!(value = %raw, "ignoring invalid assistant timeout"),
            }
        }
        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Prompt pair sent to the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantRequest {
    pub system: String,
    pub user: String,
}

/// Seam for the external text-generation service.
pub trait PlanningAssistant {
    fn suggest(&self, request: &AssistantRequest) -> Result<String, AssistantError>;
}

/// One line per catalog task: `domain: task (X units): description`.
pub fn format_menu(catalog: &TaskCatalog, rates: &RateConfig) -> PricingResult<String> {
    let menu = simulation_menu(catalog, rates)?;
    Ok(menu
        .iter()
        .zip(catalog.tasks())
        .map(|(item, template)| {
            format!(
                "{}: {} ({} units): {}",
                item.domain,
                item.name,
                format_units(item.unit_cost),
                template.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

pub fn build_prompt(goal: &str, menu: &str, scope: &ScopeInfo) -> AssistantRequest {
    let system = "You are a research operations planner. Recommend tasks only from the \
                  menu provided. Answer with one task per line in the form \
                  `- Domain: Task (N units)` followed by a short rationale."
        .to_string();
    let mut user = String::new();
    user.push_str(&format!("Goal: {}\n", goal.trim()));
    user.push_str(&format!(
        "Engagement: {} quarter(s) starting {}",
        scope.periods,
        scope.start_date.format("%Y-%m-%d")
    ));
    if let Some(budget) = scope.total_units {
        user.push_str(&format!(", budget {} units", format_units(budget)));
    }
    user.push_str("\n\nTask menu:\n");
    user.push_str(menu);
    AssistantRequest { system, user }
}

/// A structured suggestion recovered from free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub domain: String,
    pub task_name: String,
    pub units: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub text: String,
    pub suggestions: Vec<Suggestion>,
}

impl AssistantReply {
    /// False when the parser found nothing; the free text is still usable.
    pub fn has_suggestions(&self) -> bool {
        !self.suggestions.is_empty()
    }
}

/// Best-effort extraction of `- Domain: Task (N units)` lines.
///
/// Lines lacking a dash, a colon or a parenthesised number are ignored. An
/// empty result is normal and not an error.
pub fn parse_suggestions(text: &str) -> Vec<Suggestion> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Suggestion> {
    let line = line.trim();
    if !line.contains('-') || !line.contains(':') || !line.contains('(') {
        return None;
    }
    let body = line
        .trim_start_matches(|c: char| c == '-' || c == '*' || c == '•' || c.is_whitespace())
        .replace("**", "");
    let (domain, rest) = body.split_once(':')?;
    // Task names may carry their own parentheses, e.g. "Focus Group (1x)".
    let (open, units) = rest.match_indices('(').find_map(|(open, _)| {
        let close = open + rest[open..].find(')')?;
        let units = rest[open + 1..close]
            .split_whitespace()
            .next()?
            .trim_start_matches('~')
            .parse::<f64>()
            .ok()?;
        Some((open, units))
    })?;
    let task_name = rest[..open].trim().trim_matches('"');
    let domain = domain.trim();
    if domain.is_empty() || task_name.is_empty() || !units.is_finite() || units < 0.0 {
        return None;
    }
    Some(Suggestion {
        domain: domain.to_string(),
        task_name: task_name.to_string(),
        units,
    })
}

/// Sends the request and parses the reply. Failures are returned to the
/// caller untouched so it can show them and retry.
pub fn ask<A: PlanningAssistant + ?Sized>(
    assistant: &A,
    request: &AssistantRequest,
) -> Result<AssistantReply, AssistantError> {
    let text = assistant.suggest(request).inspect_err(|err| {
        warn!(error = %err, "planning assistant call failed");
    })?;
    let suggestions = parse_suggestions(&text);
    if suggestions.is_empty() {
        info!("no structured suggestions extracted from assistant reply");
    }
    Ok(AssistantReply { text, suggestions })
}
