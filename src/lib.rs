pub mod assistant;
pub mod catalog;
pub mod cost;
pub mod error;
pub mod graph;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod rates;
pub mod session;
pub mod simulation;
pub mod table;

pub use assistant::{
    AssistantConfig, AssistantError, AssistantReply, AssistantRequest, PlanningAssistant,
    Suggestion, ask, build_prompt, format_menu, parse_suggestions,
};
pub use catalog::{TaskCatalog, TaskTemplate};
pub use cost::{
    CostBreakdown, CostInputs, Quote, TaskModifiers, compute_cost, display_units,
    format_currency, format_units, quote,
};
pub use error::{PricingError, PricingResult};
pub use graph::{MissingPrerequisite, PrerequisiteGraph};
pub use persistence::{
    PersistenceError, load_catalog_from_csv, load_log_from_csv, load_rates_from_json,
    load_session_from_json, read_catalog_csv, read_log_csv, render_proposal_markdown,
    render_sprint_summary, save_log_to_csv, save_proposal_markdown, save_rates_to_json,
    save_session_to_json, write_log_csv, write_proposal_markdown,
};
pub use rates::{
    Complexity, ComplexityFloors, Overhead, PricingMode, RateConfig, Tier, TierHours, TierRates,
};
pub use session::{PlanningSession, ScopeInfo, SprintLog, SprintLogEntry};
pub use simulation::{
    AllocationPlan, Assignment, MAX_PERIODS, SimulationRequest, SimulationTask, prioritize,
    simulate, simulation_menu, validate_periods,
};
