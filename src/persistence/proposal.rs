use super::PersistenceResult;
use crate::cost::{Quote, format_currency, format_units};
use crate::rates::{PricingMode, Tier};
use crate::session::PlanningSession;
use std::fmt::{self, Write};
use std::fs;
use std::path::Path;
use tracing::info;

/// Narrative proposal for the committed log: Overview, Phases, Task Breakdown
/// and Cost Summary sections.
pub fn render_proposal_markdown(session: &PlanningSession) -> String {
    let mut out = String::new();
    // Writing into a String is infallible.
    match write_proposal_markdown(&mut out, session) {
        Ok(()) => out,
        Err(fmt::Error) => String::new(),
    }
}

pub fn write_proposal_markdown<W: Write>(out: &mut W, session: &PlanningSession) -> fmt::Result {
    write_overview(out, session)?;
    write_phases(out, session)?;
    write_task_breakdown(out, session)?;
    write_cost_summary(out, session)
}

fn write_overview<W: Write>(out: &mut W, session: &PlanningSession) -> fmt::Result {
    let scope = &session.scope;
    writeln!(out, "# {}", scope.project_name)?;
    writeln!(out)?;
    writeln!(out, "## Overview")?;
    writeln!(out)?;
    if !scope.partner_name.is_empty() {
        writeln!(out, "- **Partner:** {}", scope.partner_name)?;
    }
    writeln!(out, "- **Start date:** {}", scope.start_date.format("%Y-%m-%d"))?;
    writeln!(out, "- **Periods:** {} quarter(s)", scope.periods)?;
    if let Some(budget) = scope.total_units {
        writeln!(out, "- **Unit budget:** {}", format_units(budget))?;
    }
    if let Some(theme) = scope.theme.as_deref().filter(|t| !t.trim().is_empty()) {
        writeln!(out, "- **Focus:** {theme}")?;
    }
    writeln!(
        out,
        "- **Unit price:** {} ({} pricing)",
        format_currency(session.rates.unit_price),
        session.rates.pricing_mode.as_str()
    )?;
    if let Some(summary) = scope.summary.as_deref() {
        writeln!(out)?;
        writeln!(out, "{summary}")?;
    }
    writeln!(out)
}

fn write_phases<W: Write>(out: &mut W, session: &PlanningSession) -> fmt::Result {
    let log = &session.log;
    writeln!(out, "## Phases")?;
    writeln!(out)?;
    if log.is_empty() {
        writeln!(out, "_No tasks have been added to the sprint log._")?;
        return writeln!(out);
    }
    for (phase, entries) in log.phases() {
        let title = phase.as_deref().unwrap_or("Unphased");
        let units: f64 = entries.iter().map(|e| e.units).sum();
        writeln!(out, "### {title} ({} units)", format_units(units))?;
        for entry in entries {
            writeln!(out, "- {}: {}", entry.domain, entry.task_name)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_task_breakdown<W: Write>(out: &mut W, session: &PlanningSession) -> fmt::Result {
    writeln!(out, "## Task Breakdown")?;
    writeln!(out)?;
    writeln!(out, "| # | Domain | Task | Complexity | Phase | Units | Cost |")?;
    writeln!(out, "|---|---|---|---|---|---:|---:|")?;
    for (idx, entry) in session.log.entries().iter().enumerate() {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} |",
            idx + 1,
            escape_cell(&entry.domain),
            escape_cell(&entry.task_name),
            entry.complexity.map(|c| c.label()).unwrap_or("-"),
            entry.phase.as_deref().map(escape_cell).unwrap_or_else(|| "-".to_string()),
            format_units(entry.units),
            format_currency(entry.cost),
        )?;
    }
    writeln!(out)
}

fn write_cost_summary<W: Write>(out: &mut W, session: &PlanningSession) -> fmt::Result {
    let log = &session.log;
    writeln!(out, "## Cost Summary")?;
    writeln!(out)?;
    for (domain, units, cost) in log.domain_subtotals() {
        writeln!(
            out,
            "- {domain}: {} units, {}",
            format_units(units),
            format_currency(cost)
        )?;
    }
    writeln!(out, "- **Total units:** {}", format_units(log.total_units()))?;
    writeln!(out, "- **Total cost:** {}", format_currency(log.total_cost()))?;
    if let Some(budget) = session.scope.total_units {
        let remaining = budget - log.total_units();
        writeln!(out, "- **Remaining budget:** {} units", format_units(remaining))?;
    }
    Ok(())
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

/// One-task summary block. The sprint name defaults to `"<task> Sprint"`.
pub fn render_sprint_summary(quote: &Quote, sprint_name: Option<&str>) -> String {
    let mut out = String::new();
    match write_sprint_summary(&mut out, quote, sprint_name) {
        Ok(()) => out,
        Err(fmt::Error) => String::new(),
    }
}

fn write_sprint_summary<W: Write>(
    out: &mut W,
    quote: &Quote,
    sprint_name: Option<&str>,
) -> fmt::Result {
    let b = &quote.breakdown;
    writeln!(out, "#### Sprint Summary")?;
    writeln!(out)?;
    match sprint_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => writeln!(out, "- **Sprint Name:** {name}")?,
        None => writeln!(out, "- **Sprint Name:** {} Sprint", quote.task_name)?,
    }
    writeln!(out, "- **Domain:** {}", quote.domain)?;
    writeln!(out, "- **Task:** {}", quote.task_name)?;
    writeln!(out, "- **Description:** {}", quote.description)?;
    for tier in Tier::ALL {
        writeln!(out, "- **{} Hours:** {}", tier.label(), quote.inputs.hours.get(tier))?;
    }
    writeln!(out, "- **Additional Costs:** {}", format_currency(b.additional_costs))?;
    if b.fixed_fees > 0.0 {
        writeln!(out, "- **Fixed Fees:** {}", format_currency(b.fixed_fees))?;
    }
    writeln!(out, "- **Overhead Multiplier:** x{:.2}", b.overhead_multiplier)?;
    writeln!(out, "- **Total Cost:** {}", format_currency(b.total_cost))?;
    writeln!(out, "- **Total Units:** {}", format_units(b.units))?;
    if quote.pricing_mode == PricingMode::Partner {
        writeln!(out, "- **Partner Units:** {}", format_units(quote.display_units))?;
    }
    Ok(())
}

pub fn save_proposal_markdown<P: AsRef<Path>>(
    session: &PlanningSession,
    path: P,
) -> PersistenceResult<()> {
    fs::write(path.as_ref(), render_proposal_markdown(session))?;
    info!(path = %path.as_ref().display(), "exported proposal markdown");
    Ok(())
}
